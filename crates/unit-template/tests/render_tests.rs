//! Rendering behaviour of schema templates.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use rstest::rstest;
use unit_template::{Error, Parameters, SchemaTemplate, render};

const CHANGELOG: &str = r#"<databaseChangeLog>
<!-- section:country -->
  <changeSet id="${changeset}-country" author="${author}">
    <createTable tableName="${table_prefix}country"/>
  </changeSet>
<!-- /section:country -->
<!-- section:city -->
  <changeSet id="${changeset}-city" author="${author}">
    <createTable tableName="${table_prefix}city"/>
  </changeSet>
<!-- /section:city -->
</databaseChangeLog>
"#;

fn params() -> Parameters {
    [
        ("changeset", "geo-1"),
        ("author", "units"),
        ("table_prefix", "shipping_"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn disabled(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn disabled_city_section_leaves_country_verbatim() {
    let template = SchemaTemplate::parse("changelog", CHANGELOG).unwrap();
    let out = render(&template, &params(), &disabled(&["city"])).unwrap();

    assert_eq!(
        out,
        r#"<databaseChangeLog>
  <changeSet id="geo-1-country" author="units">
    <createTable tableName="shipping_country"/>
  </changeSet>
</databaseChangeLog>
"#
    );
    assert!(!out.contains("city"));
    assert!(!out.contains("section:"));
}

#[test]
fn full_render_snapshot() {
    let template = SchemaTemplate::parse("changelog", CHANGELOG).unwrap();
    let out = template.render(&params(), &BTreeSet::new()).unwrap();
    insta::assert_snapshot!(out, @r#"
    <databaseChangeLog>
      <changeSet id="geo-1-country" author="units">
        <createTable tableName="shipping_country"/>
      </changeSet>
      <changeSet id="geo-1-city" author="units">
        <createTable tableName="shipping_city"/>
      </changeSet>
    </databaseChangeLog>
    "#);
}

#[test]
fn unknown_disabled_section_is_rejected() {
    let template = SchemaTemplate::parse("changelog", CHANGELOG).unwrap();
    let err = render(&template, &params(), &disabled(&["state"])).unwrap_err();
    assert!(matches!(err, Error::UnknownSection { ref name } if name == "state"));
}

#[test]
fn unbound_token_reports_name_and_line() {
    let template = SchemaTemplate::parse("changelog", CHANGELOG).unwrap();
    let mut partial = params();
    partial.remove("author");

    let err = render(&template, &partial, &BTreeSet::new()).unwrap_err();
    match err {
        Error::UnboundToken { name, line } => {
            assert_eq!(name, "author");
            assert_eq!(line, 3);
        }
        e => panic!("unexpected error: {e}"),
    }
}

#[rstest]
#[case::unmatched_end("a\n<!-- /section:x -->\n", "has no matching start marker")]
#[case::unclosed("<!-- section:x -->\nbody\n", "is never closed")]
#[case::overlapping(
    "<!-- section:a -->\n<!-- section:b -->\n<!-- /section:a -->\n<!-- /section:b -->\n",
    "while section 'b' is still open"
)]
#[case::duplicate(
    "<!-- section:a -->\n<!-- /section:a -->\n<!-- section:a -->\n<!-- /section:a -->\n",
    "already declared at line 1"
)]
#[case::unterminated_token("x ${oops\n", "Unterminated token at line 1")]
#[case::invalid_token("\n${has space}", "Invalid token '${has space}' at line 2")]
fn malformed_templates_fail_to_parse(#[case] source: &str, #[case] message: &str) {
    let err = SchemaTemplate::parse("bad", source).unwrap_err();
    let text = err.to_string();
    assert!(text.contains(message), "{text}");
}

#[test]
fn markup_errors_are_reported_before_token_binding() {
    // Parsing fails even though no parameters were supplied at all.
    let err = SchemaTemplate::parse("bad", "${a}\n<!-- section:x -->\n").unwrap_err();
    assert!(matches!(err, Error::UnclosedSection { line: 2, .. }));
}

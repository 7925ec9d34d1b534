//! Table-name prefixing for multi-instance deployment

use std::collections::BTreeSet;

use unit_meta::{Artifact, ArtifactKey};

use crate::{Error, Result};

/// `prefix_name`
pub fn prefixed_name(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name)
}

/// Prefix an artifact's name and its references to the unit's own artifacts.
///
/// `own` holds the unprefixed keys of everything the same unit produces in
/// this composition; references to anything else are left alone.
///
/// # Errors
///
/// Returns [`Error::AlreadyPrefixed`] if the name already starts with
/// `prefix_`. Prefixes are applied exactly once.
pub fn apply_prefix(
    mut artifact: Artifact,
    prefix: &str,
    own: &BTreeSet<ArtifactKey>,
) -> Result<Artifact> {
    let marker = format!("{}_", prefix);
    if artifact.name().starts_with(&marker) {
        return Err(Error::AlreadyPrefixed {
            kind: artifact.kind(),
            name: artifact.name().to_string(),
            prefix: prefix.to_string(),
        });
    }

    let name = prefixed_name(prefix, artifact.name());
    artifact.set_name(name);
    artifact.rewrite_refs(|kind, target| {
        own.contains(&ArtifactKey::new(kind, target))
            .then(|| prefixed_name(prefix, target))
    });
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unit_meta::{ArtifactKind, LookupSourceDef, ProcessDef, TableDef, WidgetDef};

    fn own(names: &[&str]) -> BTreeSet<ArtifactKey> {
        names
            .iter()
            .map(|s| ArtifactKey::new(ArtifactKind::Table, *s))
            .collect()
    }

    #[test]
    fn table_name_is_prefixed() {
        let artifact = apply_prefix(TableDef::new("country").into(), "shipping", &own(&["country"]))
            .unwrap();
        assert_eq!(artifact.name(), "shipping_country");
    }

    #[test]
    fn already_prefixed_name_is_rejected() {
        let err = apply_prefix(TableDef::new("shipping_country").into(), "shipping", &own(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyPrefixed { ref name, .. } if name == "shipping_country"));
    }

    #[test]
    fn only_own_table_references_are_rewritten() {
        let lookup = LookupSourceDef {
            name: "country".into(),
            table: "country".into(),
            value_field: "id".into(),
            label_field: "name".into(),
        };
        let artifact = apply_prefix(lookup.into(), "billing", &own(&["country"])).unwrap();
        assert_eq!(artifact.table_refs(), vec!["billing_country"]);

        let process = ProcessDef {
            name: "audit".into(),
            label: None,
            table: Some("audit_log".into()),
        };
        let artifact = apply_prefix(process.into(), "billing", &own(&["country"])).unwrap();
        assert_eq!(artifact.name(), "billing_audit");
        assert_eq!(artifact.table_refs(), vec!["audit_log"]);
    }

    #[test]
    fn widget_process_reference_follows_own_process() {
        let widget = WidgetDef {
            name: "geo".into(),
            label: None,
            process: Some("country_sync".into()),
        };
        let own: BTreeSet<ArtifactKey> = [ArtifactKey::new(ArtifactKind::Process, "country_sync")]
            .into_iter()
            .collect();
        let artifact = apply_prefix(widget.into(), "billing", &own).unwrap();
        assert_eq!(artifact.process_ref(), Some("billing_country_sync"));
    }
}

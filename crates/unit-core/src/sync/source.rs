//! Loading reference datasets from disk

use serde::Deserialize;
use unit_fs::{ConfigStore, NormalizedPath};

use crate::Result;
use crate::reconcile::Record;

/// Accepted dataset layouts: a bare list, or a document with `records`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Dataset {
    List(Vec<Record>),
    Document { records: Vec<Record> },
}

/// Load records from a JSON, TOML or YAML file, chosen by extension.
///
/// TOML has no top-level arrays, so TOML datasets use `[[records]]`.
pub fn load_records(path: &NormalizedPath) -> Result<Vec<Record>> {
    let dataset: Dataset = ConfigStore::new().load(path)?;
    let records = match dataset {
        Dataset::List(records) | Dataset::Document { records } => records,
    };
    tracing::debug!(path = %path, records = records.len(), "Loaded dataset");
    Ok(records)
}

/// Parse records from JSON text.
pub fn parse_json_records(content: &str) -> Result<Vec<Record>> {
    let dataset: Dataset = serde_json::from_str(content)?;
    Ok(match dataset {
        Dataset::List(records) | Dataset::Document { records } => records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("countries.json", r#"[{"code": "US"}, {"code": "CA"}]"#)]
    #[case("countries.json", r#"{"records": [{"code": "US"}, {"code": "CA"}]}"#)]
    #[case("countries.yaml", "- code: US\n- code: CA\n")]
    #[case("countries.toml", "[[records]]\ncode = \"US\"\n\n[[records]]\ncode = \"CA\"\n")]
    fn every_layout_loads(#[case] file: &str, #[case] content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join(file));
        std::fs::write(path.to_native(), content).unwrap();

        let records = load_records(&path).unwrap();
        let codes: Vec<&str> = records
            .iter()
            .map(|r| r["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["US", "CA"]);
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(parse_json_records("42").is_err());
    }
}

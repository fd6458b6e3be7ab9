//! Registry documents: the parsed bundle a snapshot is built from
//!
//! A document carries the taxonomy, source-system namespaces, field
//! definitions and vocabularies. The format on disk may be YAML or JSON;
//! the engine itself only ever sees the parsed structure.

use crate::registry::{FieldSpec, VocabularySpec};
use crate::snapshot::RegistryResult;
use crate::taxonomy::TaxonomyTree;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub taxonomy: TaxonomyTree,
    /// Namespaces of source-system metadata (e.g. `sam`) that overrides may target.
    #[serde(default, alias = "sourceNamespaces")]
    pub source_namespaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub vocabularies: Vec<VocabularySpec>,
}

impl RegistryDocument {
    pub fn from_yaml_str(yaml: &str) -> RegistryResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document, choosing the parser by extension (`.json` or YAML).
    pub fn from_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Read several documents and concatenate them in order.
    ///
    /// Useful when the taxonomy, fields and vocabularies live in separate
    /// files. Repeated definitions surface later as validation errors.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> RegistryResult<Self> {
        let mut merged = Self::default();
        for path in paths {
            merged = merged.merge(Self::from_path(path)?);
        }
        Ok(merged)
    }

    /// Append another document's contents after this one's.
    pub fn merge(mut self, other: Self) -> Self {
        self.taxonomy.domains.extend(other.taxonomy.domains);
        self.source_namespaces.extend(other.source_namespaces);
        self.fields.extend(other.fields);
        self.vocabularies.extend(other.vocabularies);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
taxonomy:
  - name: Federal Acquisition
    categories:
      - name: Contract Vehicles
        types: [Task Order]
sourceNamespaces: [sam]
fields:
  - namespace: contract
    name: contract_number
    extraction_profiles:
      Task Order: { requirement: expected }
vocabularies:
  - name: agencies
    values: [Department of Energy]
"#;

    #[test]
    fn parses_yaml_document() {
        let doc = RegistryDocument::from_yaml_str(YAML).unwrap();
        assert_eq!(doc.taxonomy.domains[0].categories[0].types, vec!["Task Order"]);
        assert_eq!(doc.source_namespaces, vec!["sam"]);
        assert_eq!(doc.fields[0].name, "contract_number");
        assert_eq!(doc.vocabularies[0].values.len(), 1);
    }

    #[test]
    fn parses_json_from_disk_by_extension() {
        let doc = RegistryDocument::from_yaml_str(YAML).unwrap();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&doc).unwrap().as_bytes())
            .unwrap();

        let loaded = RegistryDocument::from_path(file.path()).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn from_paths_concatenates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("taxonomy.yaml");
        let b = dir.path().join("fields.yml");
        std::fs::write(&a, YAML).unwrap();
        std::fs::write(
            &b,
            "fields:\n  - namespace: contract\n    name: ceiling_value\n",
        )
        .unwrap();

        let doc = RegistryDocument::from_paths(&[a, b]).unwrap();
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[1].name, "ceiling_value");
        assert_eq!(doc.taxonomy.domains.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RegistryDocument::from_path("/nonexistent/registry.yaml").unwrap_err();
        assert!(matches!(err, crate::snapshot::RegistryError::Io(_)));
    }
}

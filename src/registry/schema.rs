//! On-disk field schema, as parsed from YAML or JSON
//!
//! Enum-valued attributes stay strings here so that an invalid value turns
//! into a [`ValidationError`](super::ValidationError) during load instead of
//! failing the whole parse. Both `snake_case` and legacy `camelCase` keys
//! are accepted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_data_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

/// One field as written in a registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub namespace: String,
    #[serde(alias = "field")]
    pub name: String,
    #[serde(default = "default_data_type", alias = "dataType", alias = "type")]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default, alias = "extractionProfiles")]
    pub extraction_profiles: Option<ProfilesSpec>,
    #[serde(default, alias = "sourceOverrides")]
    pub source_overrides: BTreeMap<String, SourceOverrideSpec>,
    #[serde(default = "default_true")]
    pub indexed: bool,
    #[serde(default)]
    pub facetable: bool,
    #[serde(default, alias = "facetType")]
    pub facet_type: Option<String>,
    #[serde(default, alias = "facetAlias")]
    pub facet_alias: Option<String>,
    #[serde(default)]
    pub vocabulary: Option<String>,
}

impl FieldSpec {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data_type: default_data_type(),
            description: String::new(),
            display_name: None,
            extraction_profiles: None,
            source_overrides: BTreeMap::new(),
            indexed: true,
            facetable: false,
            facet_type: None,
            facet_alias: None,
            vocabulary: None,
        }
    }

    pub fn with_profiles(mut self, profiles: ProfilesSpec) -> Self {
        self.extraction_profiles = Some(profiles);
        self
    }

    pub fn with_override(
        mut self,
        content_type: impl Into<String>,
        field: impl Into<String>,
        reconciliation: impl Into<String>,
    ) -> Self {
        self.source_overrides.insert(
            content_type.into(),
            SourceOverrideSpec {
                field: field.into(),
                reconciliation: reconciliation.into(),
            },
        );
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: impl Into<String>) -> Self {
        self.vocabulary = Some(vocabulary.into());
        self
    }

    pub fn facetable(mut self, facet_type: impl Into<String>) -> Self {
        self.facetable = true;
        self.facet_type = Some(facet_type.into());
        self
    }
}

/// The three accepted `extraction_profiles` encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfilesSpec {
    /// `"__common__"`
    Sentinel(String),
    /// Legacy: `["Task Order", "IDIQ Contract"]`
    Labels(Vec<String>),
    /// `{"Task Order": {requirement: required, extraction_hints: [...]}}`
    Structured(BTreeMap<String, ProfileEntrySpec>),
}

impl ProfilesSpec {
    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Labels(labels.into_iter().map(Into::into).collect())
    }

    pub fn structured<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ProfileEntrySpec)>,
        S: Into<String>,
    {
        Self::Structured(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A structured profile entry before enum parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntrySpec {
    /// Missing means `expected`.
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default, alias = "extractionHints", alias = "hints")]
    pub extraction_hints: Vec<String>,
}

impl ProfileEntrySpec {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: Some(requirement.into()),
            extraction_hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.extraction_hints.push(hint.into());
        self
    }
}

/// A source override before path and policy parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOverrideSpec {
    /// `namespace.field` in the source-system metadata.
    pub field: String,
    pub reconciliation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_profile_encodings() {
        let yaml = r#"
- namespace: document
  name: title
  extraction_profiles: __common__
- namespace: contract
  name: contract_number
  extractionProfiles: ["Task Order", "IDIQ Contract"]
- namespace: contract
  name: ceiling_value
  data_type: number
  extraction_profiles:
    Task Order:
      requirement: required
      extractionHints: ["Look for 'Total Ceiling'"]
"#;
        let specs: Vec<FieldSpec> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            specs[0].extraction_profiles,
            Some(ProfilesSpec::Sentinel("__common__".to_string()))
        );
        assert!(matches!(
            specs[1].extraction_profiles,
            Some(ProfilesSpec::Labels(ref l)) if l.len() == 2
        ));
        match &specs[2].extraction_profiles {
            Some(ProfilesSpec::Structured(map)) => {
                let entry = &map["Task Order"];
                assert_eq!(entry.requirement.as_deref(), Some("required"));
                assert_eq!(entry.extraction_hints.len(), 1);
            }
            other => panic!("expected structured profiles, got {:?}", other),
        }
    }

    #[test]
    fn defaults_apply_when_keys_are_missing() {
        let spec: FieldSpec = serde_json::from_value(serde_json::json!({
            "namespace": "contract",
            "field": "piid"
        }))
        .unwrap();
        assert_eq!(spec.name, "piid");
        assert_eq!(spec.data_type, "string");
        assert!(spec.indexed);
        assert!(!spec.facetable);
        assert!(spec.extraction_profiles.is_none());
    }

    #[test]
    fn source_overrides_keep_raw_strings() {
        let spec: FieldSpec = serde_yaml::from_str(
            r#"
namespace: contract
name: ordering_agency
sourceOverrides:
  sam_notice: { field: sam.agency, reconciliation: sourcewins }
"#,
        )
        .unwrap();
        let ov = &spec.source_overrides["sam_notice"];
        assert_eq!(ov.field, "sam.agency");
        assert_eq!(ov.reconciliation, "sourcewins");
    }
}

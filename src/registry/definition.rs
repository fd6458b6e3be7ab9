//! Normalized field definitions
//!
//! These are the load-time-resolved forms of the registry schema. Every
//! enum-valued attribute has been parsed, every override path split into a
//! typed [`FieldPath`], and every extraction-profile encoding collapsed into
//! one [`ExtractionProfiles`] shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sentinel profile key marking a field as applicable to every classification.
pub const COMMON_PROFILE: &str = "__common__";

/// Extraction priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    Expected,
    Optional,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Expected => "expected",
            Self::Optional => "optional",
        }
    }
}

impl Default for Requirement {
    fn default() -> Self {
        Self::Expected
    }
}

impl FromStr for Requirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "expected" => Ok(Self::Expected),
            "optional" => Ok(Self::Optional),
            other => Err(format!(
                "requirement must be one of required, expected, optional (got '{}')",
                other
            )),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for merging an extracted value with a source-system value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// The source value always replaces the extracted one.
    SourceWins,
    /// The source value only fills a missing or null extracted value.
    ExtractedWins,
    /// Lists are unioned; scalars behave as `SourceWins`.
    Merge,
}

impl Reconciliation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceWins => "source_wins",
            Self::ExtractedWins => "extracted_wins",
            Self::Merge => "merge",
        }
    }
}

impl FromStr for Reconciliation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source_wins" => Ok(Self::SourceWins),
            "extracted_wins" => Ok(Self::ExtractedWins),
            "merge" => Ok(Self::Merge),
            other => Err(format!(
                "reconciliation must be one of source_wins, extracted_wins, merge (got '{}')",
                other
            )),
        }
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Text,
    Integer,
    Number,
    Boolean,
    Date,
    List,
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" | "keyword" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "integer" | "int" => Ok(Self::Integer),
            "number" | "float" | "decimal" => Ok(Self::Number),
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" | "datetime" => Ok(Self::Date),
            "list" | "array" => Ok(Self::List),
            other => Err(format!("unknown data type '{}'", other)),
        }
    }
}

/// How a facet is rendered and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetType {
    #[default]
    Keyword,
    Range,
    Date,
    Boolean,
    Hierarchy,
}

impl FromStr for FacetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" | "terms" => Ok(Self::Keyword),
            "range" => Ok(Self::Range),
            "date" => Ok(Self::Date),
            "boolean" => Ok(Self::Boolean),
            "hierarchy" => Ok(Self::Hierarchy),
            other => Err(format!("unknown facet type '{}'", other)),
        }
    }
}

/// A typed `(namespace, field)` address into a metadata record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    pub namespace: String,
    pub field: String,
}

impl FieldPath {
    pub fn new(namespace: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            field: field.into(),
        }
    }

    /// Parse `namespace.field`. Exactly one dot; neither side empty or padded.
    pub fn parse(path: &str) -> Result<Self, String> {
        let (namespace, field) = path
            .split_once('.')
            .ok_or_else(|| format!("path '{}' is not of the form namespace.field", path))?;

        let valid = |s: &str| !s.is_empty() && !s.contains('.') && s.trim() == s;
        if !valid(namespace) || !valid(field) {
            return Err(format!("path '{}' is not of the form namespace.field", path));
        }

        Ok(Self::new(namespace, field))
    }

    /// Structural sanity check, used where a path may not have come through [`FieldPath::parse`].
    pub fn is_well_formed(&self) -> bool {
        !self.namespace.is_empty() && !self.field.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.field)
    }
}

/// Requirement and hints for one classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub requirement: Requirement,
    #[serde(default)]
    pub extraction_hints: Vec<String>,
}

impl ProfileEntry {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            extraction_hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.extraction_hints.push(hint.into());
        self
    }
}

/// The single internal shape of a field's extraction profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "profiles", rename_all = "snake_case")]
pub enum ExtractionProfiles {
    /// Applies to any classified document.
    Common(ProfileEntry),
    /// Applies only to the listed classification labels.
    Structured(BTreeMap<String, ProfileEntry>),
}

impl Default for ExtractionProfiles {
    fn default() -> Self {
        Self::Structured(BTreeMap::new())
    }
}

/// Authoritative source for a field under one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOverride {
    pub target: FieldPath,
    pub reconciliation: Reconciliation,
}

/// A registry field, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub namespace: String,
    pub name: String,
    pub data_type: DataType,
    pub description: String,
    pub display_name: Option<String>,
    pub extraction_profiles: ExtractionProfiles,
    /// Keyed by content type.
    pub source_overrides: BTreeMap<String, SourceOverride>,
    pub indexed: bool,
    pub facetable: bool,
    pub facet_type: FacetType,
    /// Canonical facet this field stands in for, when it differs from `name`.
    pub facet_alias: Option<String>,
    pub vocabulary: Option<String>,
}

impl FieldDefinition {
    /// A plain string field with no profiles or overrides.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data_type: DataType::String,
            description: String::new(),
            display_name: None,
            extraction_profiles: ExtractionProfiles::default(),
            source_overrides: BTreeMap::new(),
            indexed: true,
            facetable: false,
            facet_type: FacetType::default(),
            facet_alias: None,
            vocabulary: None,
        }
    }

    /// Where this field's value lives in a metadata record.
    pub fn path(&self) -> FieldPath {
        FieldPath::new(&self.namespace, &self.name)
    }

    pub fn is_common(&self) -> bool {
        matches!(self.extraction_profiles, ExtractionProfiles::Common(_))
    }

    /// The structured profile entry for a label. Common fields have none.
    pub fn profile_for(&self, label: &str) -> Option<&ProfileEntry> {
        match &self.extraction_profiles {
            ExtractionProfiles::Structured(map) => map.get(label),
            ExtractionProfiles::Common(_) => None,
        }
    }

    pub fn override_for(&self, content_type: &str) -> Option<&SourceOverride> {
        self.source_overrides.get(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_parses_namespace_and_field() {
        let path = FieldPath::parse("sam.agency").unwrap();
        assert_eq!(path, FieldPath::new("sam", "agency"));
        assert_eq!(path.to_string(), "sam.agency");
    }

    #[test]
    fn field_path_rejects_malformed_input() {
        for bad in ["agency", ".agency", "sam.", "a.b.c", " sam.agency", "sam. agency"] {
            assert!(FieldPath::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn enum_parsing_matches_wire_names() {
        assert_eq!("required".parse::<Requirement>(), Ok(Requirement::Required));
        assert_eq!("merge".parse::<Reconciliation>(), Ok(Reconciliation::Merge));
        assert!("mandatory".parse::<Requirement>().is_err());
        assert!("source-wins".parse::<Reconciliation>().is_err());
        assert_eq!(Reconciliation::ExtractedWins.to_string(), "extracted_wins");
    }

    #[test]
    fn common_fields_have_no_label_profile() {
        let mut field = FieldDefinition::new("document", "title");
        field.extraction_profiles = ExtractionProfiles::Common(ProfileEntry::default());
        assert!(field.is_common());
        assert!(field.profile_for("Task Order").is_none());
    }
}

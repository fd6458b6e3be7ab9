//! Accumulated, non-fatal validation findings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What went wrong with a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MalformedSchema,
    DuplicateField,
    DuplicateTaxonomyLabel,
    UnknownProfileLabel,
    InvalidOverridePath,
    UnknownNamespace,
    InvalidReconciliation,
    InvalidRequirement,
    UnknownVocabulary,
    InvalidVocabulary,
    InvalidFacetType,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedSchema => "malformed_schema",
            Self::DuplicateField => "duplicate_field",
            Self::DuplicateTaxonomyLabel => "duplicate_taxonomy_label",
            Self::UnknownProfileLabel => "unknown_profile_label",
            Self::InvalidOverridePath => "invalid_override_path",
            Self::UnknownNamespace => "unknown_namespace",
            Self::InvalidReconciliation => "invalid_reconciliation",
            Self::InvalidRequirement => "invalid_requirement",
            Self::UnknownVocabulary => "unknown_vocabulary",
            Self::InvalidVocabulary => "invalid_vocabulary",
            Self::InvalidFacetType => "invalid_facet_type",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding against a field, vocabulary, or taxonomy label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name (or vocabulary name / taxonomy label for those kinds).
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Field names that carry at least one field-scoped finding.
///
/// Vocabulary and taxonomy findings name something other than a field and
/// are left out, as are duplicates (the repeat was already dropped at load
/// and the first definition is sound).
pub fn offending_fields(errors: &[ValidationError]) -> BTreeSet<String> {
    errors
        .iter()
        .filter(|e| {
            !matches!(
                e.kind,
                ValidationErrorKind::InvalidVocabulary
                    | ValidationErrorKind::DuplicateTaxonomyLabel
                    | ValidationErrorKind::DuplicateField
            )
        })
        .map(|e| e.field.clone())
        .collect()
}

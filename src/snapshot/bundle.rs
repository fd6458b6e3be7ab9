//! RegistrySnapshot: the immutable taxonomy + fields + vocabularies bundle

use super::store::{RegistryError, RegistryResult};
use crate::config::{RegistryConfig, ValidationMode};
use crate::document::RegistryDocument;
use crate::registry::{
    offending_fields, FieldDefinition, FieldRegistry, ValidationError, ValidationErrorKind,
    Vocabulary, VocabularySet,
};
use crate::taxonomy::TaxonomyIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identity of one published snapshot. Caches key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the per-document components read, built in one pass.
///
/// Never mutated after construction. Readers hold an `Arc` to exactly one
/// snapshot for the duration of a resolution.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    id: SnapshotId,
    loaded_at: DateTime<Utc>,
    taxonomy: TaxonomyIndex,
    fields: FieldRegistry,
    vocabularies: VocabularySet,
    fuzzy_threshold: f64,
    validation_errors: Vec<ValidationError>,
    /// Content types named by at least one source override.
    override_content_types: BTreeSet<String>,
}

impl RegistrySnapshot {
    /// Build and validate a snapshot from a parsed document.
    ///
    /// In strict mode any finding aborts with [`RegistryError::Validation`].
    /// In lenient mode each finding is logged and the offending fields are
    /// pruned; the findings stay available via [`validation_errors`](Self::validation_errors).
    /// An out-of-range config fails in either mode.
    pub fn build(document: &RegistryDocument, config: &RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let taxonomy = TaxonomyIndex::build(&document.taxonomy);

        let mut errors: Vec<ValidationError> = taxonomy
            .duplicate_labels()
            .iter()
            .map(|label| {
                ValidationError::new(
                    label,
                    ValidationErrorKind::DuplicateTaxonomyLabel,
                    format!("taxonomy label '{}' appears more than once", label),
                )
            })
            .collect();

        let (fields, load_errors) = FieldRegistry::load(&document.fields);
        let fields = fields.with_source_namespaces(document.source_namespaces.iter().cloned());
        errors.extend(load_errors);
        errors.extend(fields.validate(&taxonomy));

        let (vocabularies, vocab_errors) = VocabularySet::load(&document.vocabularies);
        errors.extend(vocab_errors);
        errors.extend(fields.validate_vocabularies(&vocabularies));

        let fields = match config.validation_mode {
            ValidationMode::Strict if !errors.is_empty() => {
                return Err(RegistryError::Validation(errors));
            }
            ValidationMode::Strict => fields,
            ValidationMode::Lenient => {
                for error in &errors {
                    tracing::warn!(
                        field = %error.field,
                        kind = %error.kind,
                        "registry validation: {}",
                        error.message
                    );
                }
                let offending = offending_fields(&errors);
                if offending.is_empty() {
                    fields
                } else {
                    fields.without_fields(&offending)
                }
            }
        };

        Ok(Self::assemble(
            taxonomy,
            fields,
            vocabularies,
            config.fuzzy_threshold,
            errors,
        ))
    }

    /// Assemble a snapshot from already-built parts, without validation.
    pub fn from_parts(
        taxonomy: TaxonomyIndex,
        fields: FieldRegistry,
        vocabularies: VocabularySet,
        config: &RegistryConfig,
    ) -> Self {
        Self::assemble(
            taxonomy,
            fields,
            vocabularies,
            config.fuzzy_threshold,
            Vec::new(),
        )
    }

    fn assemble(
        taxonomy: TaxonomyIndex,
        fields: FieldRegistry,
        vocabularies: VocabularySet,
        fuzzy_threshold: f64,
        validation_errors: Vec<ValidationError>,
    ) -> Self {
        let override_content_types = fields
            .fields()
            .flat_map(|f| f.source_overrides.keys().cloned())
            .collect();
        Self {
            id: SnapshotId::new(),
            loaded_at: Utc::now(),
            taxonomy,
            fields,
            vocabularies,
            fuzzy_threshold,
            validation_errors,
            override_content_types,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn taxonomy(&self) -> &TaxonomyIndex {
        &self.taxonomy
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn vocabularies(&self) -> &VocabularySet {
        &self.vocabularies
    }

    /// The vocabulary a field normalizes against, if any.
    pub fn vocabulary_for(&self, field: &str) -> Option<&Vocabulary> {
        let name = self.fields.get(field)?.vocabulary.as_deref()?;
        self.vocabularies.get(name)
    }

    /// Default threshold for vocabularies that set none.
    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Whether any field declares a source override for `content_type`.
    ///
    /// Content types without one all resolve identically.
    pub fn has_overrides_for(&self, content_type: &str) -> bool {
        self.override_content_types.contains(content_type)
    }

    /// Findings retained from a lenient build.
    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }
}

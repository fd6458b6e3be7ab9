//! FieldRegistry: load-time normalization and cross-reference validation

use super::definition::{
    DataType, ExtractionProfiles, FacetType, FieldDefinition, FieldPath, ProfileEntry,
    Reconciliation, Requirement, SourceOverride, COMMON_PROFILE,
};
use super::schema::{FieldSpec, ProfileEntrySpec, ProfilesSpec};
use super::validation::{ValidationError, ValidationErrorKind};
use super::vocabulary::VocabularySet;
use crate::taxonomy::TaxonomyIndex;
use std::collections::{BTreeMap, BTreeSet};

/// The set of field definitions of one snapshot.
///
/// Fields are keyed by canonical name and iterate in name order, so every
/// pass over the registry is deterministic.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, FieldDefinition>,
    source_namespaces: BTreeSet<String>,
}

impl FieldRegistry {
    /// Normalize raw definitions into a best-effort registry.
    ///
    /// Never stops at the first problem. Definitions without a name or
    /// namespace, and repeats of an existing name, are left out; any other
    /// defect drops only the offending attribute and is reported.
    pub fn load(specs: &[FieldSpec]) -> (Self, Vec<ValidationError>) {
        let mut fields = BTreeMap::new();
        let mut errors = Vec::new();

        for spec in specs {
            if spec.name.trim().is_empty() || spec.namespace.trim().is_empty() {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::MalformedSchema,
                    format!(
                        "field definition needs a name and a namespace (namespace '{}', name '{}')",
                        spec.namespace, spec.name
                    ),
                ));
                continue;
            }
            if fields.contains_key(&spec.name) {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::DuplicateField,
                    format!("field '{}' is defined more than once; keeping the first", spec.name),
                ));
                continue;
            }

            let definition = normalize_field(spec, &mut errors);
            fields.insert(spec.name.clone(), definition);
        }

        (
            Self {
                fields,
                source_namespaces: BTreeSet::new(),
            },
            errors,
        )
    }

    /// Declare source-system namespaces that overrides may target.
    pub fn with_source_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Check every cross-reference against the taxonomy.
    ///
    /// Profile keys must be leaf labels and override targets must name a
    /// known namespace. Enum values were already checked during [`load`](Self::load).
    pub fn validate(&self, taxonomy: &TaxonomyIndex) -> Vec<ValidationError> {
        let known_namespaces = self.namespaces();
        let mut errors = Vec::new();

        for field in self.fields.values() {
            if let ExtractionProfiles::Structured(profiles) = &field.extraction_profiles {
                for label in profiles.keys() {
                    if !taxonomy.contains(label) {
                        errors.push(ValidationError::new(
                            &field.name,
                            ValidationErrorKind::UnknownProfileLabel,
                            format!("profile label '{}' is not a taxonomy leaf", label),
                        ));
                    }
                }
            }

            for (content_type, ov) in &field.source_overrides {
                if !known_namespaces.contains(ov.target.namespace.as_str()) {
                    errors.push(ValidationError::new(
                        &field.name,
                        ValidationErrorKind::UnknownNamespace,
                        format!(
                            "override for '{}' targets unknown namespace '{}'",
                            content_type, ov.target.namespace
                        ),
                    ));
                }
            }
        }

        errors
    }

    /// Check that every referenced vocabulary exists.
    pub fn validate_vocabularies(&self, vocabularies: &VocabularySet) -> Vec<ValidationError> {
        self.fields
            .values()
            .filter_map(|field| {
                let name = field.vocabulary.as_deref()?;
                (!vocabularies.contains(name)).then(|| {
                    ValidationError::new(
                        &field.name,
                        ValidationErrorKind::UnknownVocabulary,
                        format!("vocabulary '{}' is not defined", name),
                    )
                })
            })
            .collect()
    }

    /// A copy without the named fields.
    pub fn without_fields(&self, names: &BTreeSet<String>) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| !names.contains(*name))
                .map(|(name, field)| (name.clone(), field.clone()))
                .collect(),
            source_namespaces: self.source_namespaces.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Field namespaces plus declared source namespaces.
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.fields
            .values()
            .map(|f| f.namespace.as_str())
            .chain(self.source_namespaces.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn normalize_field(spec: &FieldSpec, errors: &mut Vec<ValidationError>) -> FieldDefinition {
    let mut field = FieldDefinition::new(&spec.namespace, &spec.name);
    field.description = spec.description.clone();
    field.display_name = spec.display_name.clone();
    field.indexed = spec.indexed;
    field.facetable = spec.facetable;
    field.facet_alias = spec.facet_alias.clone();
    field.vocabulary = spec.vocabulary.clone();

    match spec.data_type.parse::<DataType>() {
        Ok(dt) => field.data_type = dt,
        Err(msg) => errors.push(ValidationError::new(
            &spec.name,
            ValidationErrorKind::MalformedSchema,
            msg,
        )),
    }

    if let Some(raw) = &spec.facet_type {
        match raw.parse::<FacetType>() {
            Ok(ft) => field.facet_type = ft,
            Err(msg) => errors.push(ValidationError::new(
                &spec.name,
                ValidationErrorKind::InvalidFacetType,
                msg,
            )),
        }
    }

    if let Some(profiles) = &spec.extraction_profiles {
        field.extraction_profiles = normalize_profiles(&spec.name, profiles, errors);
    }

    for (content_type, raw) in &spec.source_overrides {
        let target = match FieldPath::parse(&raw.field) {
            Ok(path) => path,
            Err(msg) => {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidOverridePath,
                    format!("override for '{}': {}", content_type, msg),
                ));
                continue;
            }
        };
        let reconciliation = match raw.reconciliation.parse::<Reconciliation>() {
            Ok(r) => r,
            Err(msg) => {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidReconciliation,
                    format!("override for '{}': {}", content_type, msg),
                ));
                continue;
            }
        };
        field.source_overrides.insert(
            content_type.clone(),
            SourceOverride {
                target,
                reconciliation,
            },
        );
    }

    field
}

/// Collapse the three profile encodings into [`ExtractionProfiles`].
fn normalize_profiles(
    field: &str,
    profiles: &ProfilesSpec,
    errors: &mut Vec<ValidationError>,
) -> ExtractionProfiles {
    match profiles {
        ProfilesSpec::Sentinel(s) if s == COMMON_PROFILE => {
            ExtractionProfiles::Common(ProfileEntry::default())
        }
        ProfilesSpec::Sentinel(other) => {
            errors.push(ValidationError::new(
                field,
                ValidationErrorKind::MalformedSchema,
                format!(
                    "extraction_profiles string must be '{}' (got '{}')",
                    COMMON_PROFILE, other
                ),
            ));
            ExtractionProfiles::default()
        }
        ProfilesSpec::Labels(labels) => {
            if labels.iter().any(|l| l == COMMON_PROFILE) {
                if labels.len() > 1 {
                    mixed_common(field, errors);
                }
                return ExtractionProfiles::Common(ProfileEntry::default());
            }
            ExtractionProfiles::Structured(
                labels
                    .iter()
                    .map(|label| (label.clone(), ProfileEntry::new(Requirement::Expected)))
                    .collect(),
            )
        }
        ProfilesSpec::Structured(map) => {
            if let Some(common) = map.get(COMMON_PROFILE) {
                if map.len() > 1 {
                    mixed_common(field, errors);
                }
                let entry = normalize_entry(field, COMMON_PROFILE, common, errors)
                    .unwrap_or_default();
                return ExtractionProfiles::Common(entry);
            }
            ExtractionProfiles::Structured(
                map.iter()
                    .filter_map(|(label, raw)| {
                        normalize_entry(field, label, raw, errors).map(|e| (label.clone(), e))
                    })
                    .collect(),
            )
        }
    }
}

fn normalize_entry(
    field: &str,
    label: &str,
    raw: &ProfileEntrySpec,
    errors: &mut Vec<ValidationError>,
) -> Option<ProfileEntry> {
    let requirement = match raw.requirement.as_deref() {
        None => Requirement::Expected,
        Some(s) => match s.parse::<Requirement>() {
            Ok(r) => r,
            Err(msg) => {
                errors.push(ValidationError::new(
                    field,
                    ValidationErrorKind::InvalidRequirement,
                    format!("profile '{}': {}", label, msg),
                ));
                return None;
            }
        },
    };
    Some(ProfileEntry {
        requirement,
        extraction_hints: raw.extraction_hints.clone(),
    })
}

fn mixed_common(field: &str, errors: &mut Vec<ValidationError>) {
    errors.push(ValidationError::new(
        field,
        ValidationErrorKind::MalformedSchema,
        format!(
            "'{}' cannot be combined with other profile labels; treating field as common",
            COMMON_PROFILE
        ),
    ));
}

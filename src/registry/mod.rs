//! Field registry: definitions, schema encodings, vocabularies, validation

mod definition;
mod load;
mod schema;
mod validation;
mod vocabulary;

pub use definition::{
    DataType, ExtractionProfiles, FacetType, FieldDefinition, FieldPath, ProfileEntry,
    Reconciliation, Requirement, SourceOverride, COMMON_PROFILE,
};
pub use load::FieldRegistry;
pub use schema::{FieldSpec, ProfileEntrySpec, ProfilesSpec, SourceOverrideSpec};
pub use validation::{offending_fields, ValidationError, ValidationErrorKind};
pub use vocabulary::{Vocabulary, VocabularySet, VocabularySpec};

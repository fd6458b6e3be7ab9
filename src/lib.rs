//! Field Registry: classification-driven metadata resolution and reconciliation
//!
//! Given a document's taxonomy classification and origin system, the engine
//! decides which metadata fields to extract and with what priority, merges
//! machine-extracted values with authoritative source-system values,
//! normalizes values against controlled vocabularies, and derives search
//! facets, all from one declarative registry.
//!
//! # Core Concepts
//!
//! - **Taxonomy**: Domain → Category → Type; leaf types are classification labels
//! - **Field registry**: field definitions with extraction profiles, source
//!   overrides, facet and vocabulary settings
//! - **Snapshot**: the immutable taxonomy + registry + vocabularies bundle,
//!   published atomically on reload
//!
//! # Example
//!
//! ```
//! use field_registry::{MetadataEngine, RegistryConfig, RegistryDocument};
//!
//! let doc = RegistryDocument::from_yaml_str(r#"
//! taxonomy:
//!   - name: Federal Acquisition
//!     categories:
//!       - name: Contract Vehicles
//!         types: [Task Order]
//! fields:
//!   - namespace: contract
//!     name: contract_number
//!     extraction_profiles: [Task Order]
//! "#).unwrap();
//!
//! let engine = MetadataEngine::load(&doc, &RegistryConfig::default()).unwrap();
//! let fields = engine.fields_to_extract(Some("Task Order"), "asset");
//! assert!(fields.contains_key("contract_number"));
//! ```

pub mod config;
pub mod document;
mod engine;
pub mod facets;
pub mod metadata;
pub mod reconcile;
pub mod registry;
pub mod resolve;
pub mod snapshot;
pub mod taxonomy;
pub mod vocabulary;

pub use config::{RegistryConfig, ValidationMode};
pub use document::RegistryDocument;
pub use engine::MetadataEngine;
pub use facets::{derive_facets, FacetDefinition, FacetDeriver};
pub use metadata::Metadata;
pub use reconcile::{reconcile, reconcile_detailed, Decision, ReconcileOutcome};
pub use registry::{
    FieldDefinition, FieldPath, FieldRegistry, Reconciliation, Requirement, ValidationError,
    ValidationErrorKind,
};
pub use resolve::{group_by_tier, resolve, FieldMap, ProfileResolver, ResolvedField, TieredFields};
pub use snapshot::{RegistryError, RegistryResult, RegistrySnapshot, RegistryStore, SnapshotId};
pub use taxonomy::{ClassificationResult, TaxonomyIndex, TaxonomyTree};
pub use vocabulary::{UnmatchedLog, UnmatchedSink, VocabularyNormalizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! MetadataEngine: the main entry point
//!
//! Owns the published snapshot and the per-snapshot caches, and runs the
//! per-document pipeline (resolve, then reconcile and normalize) against a
//! single snapshot so a concurrent reload never mixes generations.

use crate::config::RegistryConfig;
use crate::document::RegistryDocument;
use crate::facets::{FacetDefinition, FacetDeriver};
use crate::metadata::Metadata;
use crate::reconcile::reconcile;
use crate::resolve::{FieldMap, ProfileResolver};
use crate::snapshot::{RegistryResult, RegistrySnapshot, RegistryStore, SnapshotId};
use crate::vocabulary::VocabularyNormalizer;
use std::sync::Arc;

/// Resolution and canonicalization over a reloadable registry.
#[derive(Debug)]
pub struct MetadataEngine {
    store: RegistryStore,
    resolver: ProfileResolver,
    normalizer: VocabularyNormalizer,
    facets: FacetDeriver,
}

impl MetadataEngine {
    /// Create an engine around an already-built snapshot.
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            store: RegistryStore::new(snapshot),
            resolver: ProfileResolver::new(),
            normalizer: VocabularyNormalizer::new(),
            facets: FacetDeriver::new(),
        }
    }

    /// Build the first snapshot from a document.
    pub fn load(document: &RegistryDocument, config: &RegistryConfig) -> RegistryResult<Self> {
        Ok(Self::new(RegistrySnapshot::build(document, config)?))
    }

    /// Replace the normalizer (e.g. to route unmatched values elsewhere).
    pub fn with_normalizer(mut self, normalizer: VocabularyNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The published snapshot. Hold it to run several calls against one generation.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.store.current()
    }

    /// Fields to extract for a document.
    pub fn fields_to_extract(&self, classification: Option<&str>, content_type: &str) -> Arc<FieldMap> {
        self.resolve_on(&self.snapshot(), classification, content_type)
    }

    fn resolve_on(
        &self,
        snapshot: &RegistrySnapshot,
        classification: Option<&str>,
        content_type: &str,
    ) -> Arc<FieldMap> {
        let fields = self.resolver.resolve(classification, content_type, snapshot);
        self.evict_if_stale(snapshot.id());
        fields
    }

    /// A reader still holding a replaced snapshot may have cached under its
    /// id after `reload` evicted; sweep those entries out.
    fn evict_if_stale(&self, used: SnapshotId) {
        let current = self.store.current().id();
        if used != current {
            self.resolver.retain_snapshot(current);
            self.facets.retain_snapshot(current);
        }
    }

    /// Reconcile extracted against source metadata, then normalize.
    ///
    /// The result is the canonical record handed to indexing.
    pub fn canonicalize(&self, extracted: &Metadata, source: &Metadata, content_type: &str) -> Metadata {
        let snapshot = self.snapshot();
        let reconciled = reconcile(extracted, source, content_type, &snapshot);
        self.normalizer.normalize_record(&reconciled, &snapshot)
    }

    /// Canonical form of one raw value.
    pub fn normalize(&self, field: &str, raw: &str) -> String {
        self.normalizer.normalize(field, raw, &self.snapshot())
    }

    /// Search facets for the published snapshot.
    pub fn facets(&self) -> Arc<Vec<FacetDefinition>> {
        self.facets_on(&self.snapshot())
    }

    fn facets_on(&self, snapshot: &RegistrySnapshot) -> Arc<Vec<FacetDefinition>> {
        let facets = self.facets.facets(snapshot);
        self.evict_if_stale(snapshot.id());
        facets
    }

    /// Rebuild from a document and publish; caches for older snapshots are dropped.
    ///
    /// On failure the current snapshot stays in place.
    pub fn reload(&self, document: &RegistryDocument, config: &RegistryConfig) -> RegistryResult<SnapshotId> {
        let id = self.store.reload(document, config)?;
        let current = self.store.current().id();
        self.resolver.retain_snapshot(current);
        self.facets.retain_snapshot(current);
        Ok(id)
    }
}

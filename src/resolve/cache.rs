//! Memoized resolution keyed on (snapshot, classification, content type)

use super::profile::{resolve, FieldMap};
use crate::snapshot::{RegistrySnapshot, SnapshotId};
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Content types without any override share the `None` slot.
type CacheKey = (SnapshotId, String, Option<String>);

fn empty_map() -> Arc<FieldMap> {
    static EMPTY: OnceLock<Arc<FieldMap>> = OnceLock::new();
    EMPTY.get_or_init(|| Arc::new(FieldMap::new())).clone()
}

/// Resolves profiles, reusing earlier results for the same inputs.
///
/// Resolution is a pure function of its inputs and the snapshot, so a
/// result can be shared by every caller asking the same question of the
/// same snapshot. Unclassified inputs are answered without touching the
/// cache, and content types no override names share one entry per label,
/// so a snapshot holds at most `labels × (override content types + 1)`
/// entries.
#[derive(Debug, Default)]
pub struct ProfileResolver {
    cache: DashMap<CacheKey, Arc<FieldMap>>,
}

impl ProfileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        classification: Option<&str>,
        content_type: &str,
        snapshot: &RegistrySnapshot,
    ) -> Arc<FieldMap> {
        let Some(label) = classification.filter(|l| snapshot.taxonomy().contains(l)) else {
            return empty_map();
        };

        let slot = snapshot
            .has_overrides_for(content_type)
            .then(|| content_type.to_string());
        let key = (snapshot.id(), label.to_string(), slot);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(label, content_type, "profile cache hit");
            return hit.clone();
        }

        self.cache
            .entry(key)
            .or_insert_with(|| Arc::new(resolve(Some(label), content_type, snapshot)))
            .clone()
    }

    /// Drop every entry that does not belong to `snapshot`.
    pub fn retain_snapshot(&self, snapshot: SnapshotId) {
        self.cache.retain(|(id, _, _), _| *id == snapshot);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::document::RegistryDocument;

    fn snapshot() -> RegistrySnapshot {
        let doc = RegistryDocument::from_yaml_str(
            r#"
taxonomy:
  - name: Federal Acquisition
    categories:
      - name: Contract Vehicles
        types: [Task Order]
fields:
  - namespace: contract
    name: contract_number
    extraction_profiles: [Task Order]
"#,
        )
        .unwrap();
        RegistrySnapshot::build(&doc, &RegistryConfig::default()).unwrap()
    }

    #[test]
    fn repeated_queries_share_one_result() {
        let resolver = ProfileResolver::new();
        let snapshot = snapshot();

        let a = resolver.resolve(Some("Task Order"), "asset", &snapshot);
        let b = resolver.resolve(Some("Task Order"), "asset", &snapshot);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resolver.len(), 1);
        assert_eq!(*a, resolve(Some("Task Order"), "asset", &snapshot));
    }

    #[test]
    fn unclassified_queries_bypass_cache() {
        let resolver = ProfileResolver::new();
        let snapshot = snapshot();

        assert!(resolver.resolve(None, "asset", &snapshot).is_empty());
        assert!(resolver.resolve(Some("Memo"), "asset", &snapshot).is_empty());
        assert!(resolver.is_empty());
    }

    #[test]
    fn content_types_without_overrides_share_an_entry() {
        let resolver = ProfileResolver::new();
        let snapshot = snapshot();

        let first = resolver.resolve(Some("Task Order"), "ct-0", &snapshot);
        for i in 1..500 {
            let fields = resolver.resolve(Some("Task Order"), &format!("ct-{i}"), &snapshot);
            assert!(Arc::ptr_eq(&first, &fields));
        }
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn override_content_types_get_their_own_entry() {
        let doc = RegistryDocument::from_yaml_str(
            r#"
taxonomy:
  - name: Federal Acquisition
    categories:
      - name: Contract Vehicles
        types: [Task Order, IDIQ Contract]
source_namespaces: [sam]
fields:
  - namespace: contract
    name: ordering_agency
    extraction_profiles: [Task Order, IDIQ Contract]
    source_overrides:
      sam_notice: { field: sam.agency, reconciliation: source_wins }
"#,
        )
        .unwrap();
        let snapshot = RegistrySnapshot::build(&doc, &RegistryConfig::strict()).unwrap();
        let resolver = ProfileResolver::new();

        for label in ["Task Order", "IDIQ Contract"] {
            for ct in ["asset", "crm", "fpds", "sam_notice", "email"] {
                let fields = resolver.resolve(Some(label), ct, &snapshot);
                assert_eq!(*fields, resolve(Some(label), ct, &snapshot));
            }
        }
        // two labels × (one override content type + the shared slot)
        assert_eq!(resolver.len(), 4);
        assert!(resolver
            .resolve(Some("Task Order"), "sam_notice", &snapshot)
            .is_empty());
    }

    #[test]
    fn retain_snapshot_evicts_other_generations() {
        let resolver = ProfileResolver::new();
        let old = snapshot();
        let new = snapshot();

        resolver.resolve(Some("Task Order"), "asset", &old);
        resolver.resolve(Some("Task Order"), "asset", &new);
        assert_eq!(resolver.len(), 2);

        resolver.retain_snapshot(new.id());
        assert_eq!(resolver.len(), 1);
    }
}

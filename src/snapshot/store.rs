//! RegistryStore: publishes snapshots by atomic pointer swap

use super::bundle::{RegistrySnapshot, SnapshotId};
use crate::config::RegistryConfig;
use crate::document::RegistryDocument;
use crate::registry::ValidationError;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Errors that can occur while loading or publishing a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot {expected} is no longer current (current is {actual})")]
    StaleSnapshot {
        expected: SnapshotId,
        actual: SnapshotId,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Holds the currently published snapshot.
///
/// Readers load the `Arc` without taking a lock, so they observe either the
/// old or the new snapshot in full. Writers are serialized by a separate
/// guard; building a snapshot happens before the swap and never blocks
/// readers.
#[derive(Debug)]
pub struct RegistryStore {
    current: ArcSwap<RegistrySnapshot>,
    writer: Mutex<()>,
}

impl RegistryStore {
    /// Create a store publishing `initial`.
    pub fn new(initial: RegistrySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            writer: Mutex::new(()),
        }
    }

    /// Build a snapshot from a document and create a store around it.
    pub fn load(document: &RegistryDocument, config: &RegistryConfig) -> RegistryResult<Self> {
        let snapshot = RegistrySnapshot::build(document, config)?;
        log_published(&snapshot);
        Ok(Self::new(snapshot))
    }

    /// The published snapshot.
    pub fn current(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Publish a snapshot, returning the one it replaced.
    pub fn publish(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(snapshot)
    }

    /// Publish only if `expected` is still the current snapshot.
    pub fn publish_if_current(
        &self,
        expected: SnapshotId,
        snapshot: RegistrySnapshot,
    ) -> RegistryResult<Arc<RegistrySnapshot>> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let actual = self.current().id();
        if actual != expected {
            return Err(RegistryError::StaleSnapshot { expected, actual });
        }
        Ok(self.swap(snapshot))
    }

    /// Build a new snapshot and publish it.
    ///
    /// On failure the current snapshot stays published.
    pub fn reload(
        &self,
        document: &RegistryDocument,
        config: &RegistryConfig,
    ) -> RegistryResult<SnapshotId> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = RegistrySnapshot::build(document, config)?;
        let id = snapshot.id();
        self.swap(snapshot);
        Ok(id)
    }

    fn swap(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        log_published(&snapshot);
        self.current.swap(Arc::new(snapshot))
    }
}

fn log_published(snapshot: &RegistrySnapshot) {
    tracing::info!(
        snapshot = %snapshot.id(),
        fields = snapshot.fields().len(),
        labels = snapshot.taxonomy().len(),
        errors = snapshot.validation_errors().len(),
        "registry snapshot published"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(label: &str) -> RegistryDocument {
        RegistryDocument::from_yaml_str(&format!(
            r#"
taxonomy:
  - name: Federal Acquisition
    categories:
      - name: Contract Vehicles
        types: ["{label}"]
fields:
  - namespace: contract
    name: contract_number
    extraction_profiles: ["{label}"]
"#
        ))
        .unwrap()
    }

    #[test]
    fn reload_swaps_snapshot() {
        let store = RegistryStore::load(&document("Task Order"), &RegistryConfig::default()).unwrap();
        let before = store.current();

        let id = store
            .reload(&document("Delivery Order"), &RegistryConfig::default())
            .unwrap();

        let after = store.current();
        assert_eq!(after.id(), id);
        assert_ne!(before.id(), after.id());
        // The old handle is still a complete snapshot.
        assert!(before.taxonomy().contains("Task Order"));
        assert!(after.taxonomy().contains("Delivery Order"));
    }

    #[test]
    fn failed_reload_keeps_current_snapshot() {
        let store = RegistryStore::load(&document("Task Order"), &RegistryConfig::default()).unwrap();
        let before = store.current().id();

        let mut bad = document("Task Order");
        bad.fields[0].source_overrides.insert(
            "sam_notice".to_string(),
            crate::registry::SourceOverrideSpec {
                field: "nowhere".to_string(),
                reconciliation: "source_wins".to_string(),
            },
        );
        let result = store.reload(&bad, &RegistryConfig::strict());

        assert!(matches!(result, Err(RegistryError::Validation(_))));
        assert_eq!(store.current().id(), before);
    }

    #[test]
    fn publish_if_current_rejects_stale_writer() {
        let config = RegistryConfig::default();
        let store = RegistryStore::load(&document("Task Order"), &config).unwrap();
        let seen = store.current().id();

        store.publish(RegistrySnapshot::build(&document("A"), &config).unwrap());
        let late = RegistrySnapshot::build(&document("B"), &config).unwrap();

        match store.publish_if_current(seen, late) {
            Err(RegistryError::StaleSnapshot { expected, .. }) => assert_eq!(expected, seen),
            other => panic!("expected stale snapshot error, got {:?}", other.map(|s| s.id())),
        }
        assert!(store.current().taxonomy().contains("A"));
    }

    #[test]
    fn publish_returns_previous() {
        let config = RegistryConfig::default();
        let store = RegistryStore::load(&document("Task Order"), &config).unwrap();
        let first = store.current().id();
        let previous = store.publish(RegistrySnapshot::build(&document("A"), &config).unwrap());
        assert_eq!(previous.id(), first);
    }

    #[test]
    fn readers_share_the_published_allocation() {
        let config = RegistryConfig::default();
        let store = RegistryStore::load(&document("Task Order"), &config).unwrap();
        let a = store.current();
        let b = store.current();
        assert!(Arc::ptr_eq(&a, &b));

        let replaced = store.publish(RegistrySnapshot::build(&document("A"), &config).unwrap());
        assert!(Arc::ptr_eq(&replaced, &a));
        assert!(!Arc::ptr_eq(&store.current(), &a));
        // A handle taken before the swap stays whole.
        assert!(a.taxonomy().contains("Task Order"));
    }
}

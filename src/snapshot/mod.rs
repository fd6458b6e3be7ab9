//! Immutable registry snapshots and their publication

mod bundle;
mod store;

pub use bundle::{RegistrySnapshot, SnapshotId};
pub use store::{RegistryError, RegistryResult, RegistryStore};

//! Extraction profile resolution

mod cache;
mod profile;

pub use cache::ProfileResolver;
pub use profile::{group_by_tier, resolve, FieldMap, ResolvedField, TieredFields};

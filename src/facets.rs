//! FacetDeriver: search facets projected from the field registry

use crate::registry::{FacetType, FieldDefinition};
use crate::snapshot::{RegistrySnapshot, SnapshotId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A filterable search dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDefinition {
    /// Facet name exposed to the query layer; the facet alias when one is set.
    pub name: String,
    /// `<namespace>.<field>` in the indexed record.
    pub field_path: String,
    pub display_name: String,
    pub facet_type: FacetType,
    pub vocabulary: Option<String>,
}

impl FacetDefinition {
    fn from_field(field: &FieldDefinition) -> Self {
        let name = field
            .facet_alias
            .clone()
            .unwrap_or_else(|| field.name.clone());
        let display_name = field
            .display_name
            .clone()
            .unwrap_or_else(|| humanize(&name));
        Self {
            field_path: field.path().to_string(),
            display_name,
            facet_type: field.facet_type,
            vocabulary: field.vocabulary.clone(),
            name,
        }
    }
}

/// `ordering_agency` → `Ordering Agency`
fn humanize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every facetable field of a snapshot, sorted by facet name then path.
pub fn derive_facets(snapshot: &RegistrySnapshot) -> Vec<FacetDefinition> {
    let mut facets: Vec<FacetDefinition> = snapshot
        .fields()
        .fields()
        .filter(|f| f.facetable)
        .map(FacetDefinition::from_field)
        .collect();
    facets.sort_by(|a, b| (&a.name, &a.field_path).cmp(&(&b.name, &b.field_path)));
    facets
}

/// Derives facets once per snapshot.
#[derive(Debug, Default)]
pub struct FacetDeriver {
    cache: DashMap<SnapshotId, Arc<Vec<FacetDefinition>>>,
}

impl FacetDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facets(&self, snapshot: &RegistrySnapshot) -> Arc<Vec<FacetDefinition>> {
        self.cache
            .entry(snapshot.id())
            .or_insert_with(|| Arc::new(derive_facets(snapshot)))
            .clone()
    }

    /// Look up one facet by its exposed name.
    pub fn facet(&self, snapshot: &RegistrySnapshot, name: &str) -> Option<FacetDefinition> {
        self.facets(snapshot).iter().find(|f| f.name == name).cloned()
    }

    /// Drop cached lists for every snapshot except `snapshot`.
    pub fn retain_snapshot(&self, snapshot: SnapshotId) {
        self.cache.retain(|id, _| *id == snapshot);
    }

    pub fn cached_snapshots(&self) -> usize {
        self.cache.len()
    }
}

//! Classification taxonomy: Domain → Category → Type
//!
//! The taxonomy tree is supplied already parsed. [`TaxonomyIndex`] flattens
//! it into a reverse map from leaf label to its (domain, category) parents
//! and produces materialized slug paths for indexing.

mod index;

pub use index::{slugify, ClassificationResult, TaxonomyIndex, TaxonomyPlacement};

use serde::{Deserialize, Serialize};

/// A domain and the categories beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainNode {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryNode>,
}

/// A category and its leaf document types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    /// Leaf type labels; these are the classification labels.
    #[serde(default)]
    pub types: Vec<String>,
}

/// The full classification hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyTree {
    pub domains: Vec<DomainNode>,
}

impl TaxonomyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain with its categories.
    pub fn with_domain(mut self, name: impl Into<String>, categories: Vec<CategoryNode>) -> Self {
        self.domains.push(DomainNode {
            name: name.into(),
            categories,
        });
        self
    }
}

impl CategoryNode {
    pub fn new<I, S>(name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

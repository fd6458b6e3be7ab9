//! Reverse label index and materialized paths

use super::TaxonomyTree;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Where a leaf label sits in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyPlacement {
    pub domain: String,
    pub category: String,
}

/// Per-document view of a classification label.
///
/// A pure function of the label and the taxonomy; callers discard it after use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub domain: String,
    pub category: String,
    /// Slash-joined slug path, e.g. `federal_acquisition/pre_solicitation_notices/sources_sought_notice`
    pub path: String,
}

/// Reverse lookup over a [`TaxonomyTree`].
///
/// Leaf labels are globally unique. When the tree repeats a label, the first
/// occurrence in depth-first order is kept and the repeat is reported by
/// [`TaxonomyIndex::duplicate_labels`].
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    by_label: HashMap<String, TaxonomyPlacement>,
    duplicates: Vec<String>,
}

impl TaxonomyIndex {
    /// Walk the tree depth-first and index every leaf label.
    pub fn build(tree: &TaxonomyTree) -> Self {
        let mut by_label = HashMap::new();
        let mut duplicates = Vec::new();

        for domain in &tree.domains {
            for category in &domain.categories {
                for label in &category.types {
                    if by_label.contains_key(label) {
                        duplicates.push(label.clone());
                        continue;
                    }
                    by_label.insert(
                        label.clone(),
                        TaxonomyPlacement {
                            domain: domain.name.clone(),
                            category: category.name.clone(),
                        },
                    );
                }
            }
        }

        Self {
            by_label,
            duplicates,
        }
    }

    /// The (domain, category) a label belongs to, or `None` when unclassified.
    pub fn lookup(&self, label: &str) -> Option<&TaxonomyPlacement> {
        self.by_label.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    /// Materialized path `domain/category/label`, each segment slugified.
    pub fn path(&self, label: &str) -> Option<String> {
        self.lookup(label).map(|p| {
            format!(
                "{}/{}/{}",
                slugify(&p.domain),
                slugify(&p.category),
                slugify(label)
            )
        })
    }

    /// Full classification view for a label.
    pub fn classify(&self, label: &str) -> Option<ClassificationResult> {
        let placement = self.lookup(label)?;
        let path = self.path(label)?;
        Some(ClassificationResult {
            label: label.to_string(),
            domain: placement.domain.clone(),
            category: placement.category.clone(),
            path,
        })
    }

    /// Every leaf label, sorted.
    pub fn all_leaf_labels(&self) -> BTreeSet<&str> {
        self.by_label.keys().map(String::as_str).collect()
    }

    /// Labels that appeared more than once in the source tree.
    pub fn duplicate_labels(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// Lowercase a name and collapse every run of non-alphanumeric characters
/// into a single `_`. Letters outside ASCII are kept. Leading and trailing separators are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch);
        } else {
            pending_sep = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::CategoryNode;

    fn tree() -> TaxonomyTree {
        TaxonomyTree::new()
            .with_domain(
                "Federal Acquisition",
                vec![
                    CategoryNode::new(
                        "Pre-Solicitation Notices",
                        ["Sources Sought Notice", "Request for Information"],
                    ),
                    CategoryNode::new("Contract Vehicles", ["Task Order", "IDIQ Contract"]),
                ],
            )
            .with_domain(
                "Corporate",
                vec![CategoryNode::new("Finance", ["Invoice", "Task Order"])],
            )
    }

    #[test]
    fn lookup_returns_parents() {
        let index = TaxonomyIndex::build(&tree());
        let placement = index.lookup("IDIQ Contract").unwrap();
        assert_eq!(placement.domain, "Federal Acquisition");
        assert_eq!(placement.category, "Contract Vehicles");
    }

    #[test]
    fn unknown_label_is_absent() {
        let index = TaxonomyIndex::build(&tree());
        assert!(index.lookup("Memo").is_none());
        assert!(index.path("Memo").is_none());
        assert!(index.classify("Memo").is_none());
    }

    #[test]
    fn path_slugifies_each_segment() {
        let index = TaxonomyIndex::build(&tree());
        assert_eq!(
            index.path("Sources Sought Notice").as_deref(),
            Some("federal_acquisition/pre_solicitation_notices/sources_sought_notice")
        );
    }

    #[test]
    fn path_is_stable_across_rebuilds() {
        let a = TaxonomyIndex::build(&tree());
        let b = TaxonomyIndex::build(&tree());
        for label in a.all_leaf_labels() {
            assert_eq!(a.path(label), b.path(label));
            assert_eq!(a.path(label), a.path(label));
        }
    }

    #[test]
    fn first_occurrence_wins_and_duplicate_is_reported() {
        let index = TaxonomyIndex::build(&tree());
        assert_eq!(index.lookup("Task Order").unwrap().domain, "Federal Acquisition");
        assert_eq!(index.duplicate_labels(), ["Task Order".to_string()]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn classify_carries_path() {
        let index = TaxonomyIndex::build(&tree());
        let result = index.classify("Invoice").unwrap();
        assert_eq!(result.category, "Finance");
        assert_eq!(result.path, "corporate/finance/invoice");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Dept. of  Energy"), "dept_of_energy");
        assert_eq!(slugify("  (DRAFT) RFP #2 "), "draft_rfp_2");
        assert_eq!(slugify("IDIQ"), "idiq");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn path_keeps_accented_letters() {
        let tree = TaxonomyTree::new().with_domain(
            "Réglementation",
            vec![CategoryNode::new("Café Contracts", ["Résumé"])],
        );
        let index = TaxonomyIndex::build(&tree);
        assert_eq!(
            index.path("Résumé").as_deref(),
            Some("réglementation/café_contracts/résumé")
        );
        assert_eq!(slugify("Straße – Überblick"), "straße_überblick");
    }
}

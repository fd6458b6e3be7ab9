//! Reconciler: merges extracted metadata with source-system metadata
//!
//! Each field with a source override for the record's content type is
//! reconciled under its declared policy. Everything else passes through.

use crate::metadata::Metadata;
use crate::registry::{FieldPath, Reconciliation};
use crate::snapshot::RegistrySnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What reconciliation did to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The source value replaced the extracted one.
    SourceApplied,
    /// The extracted value was present and kept.
    ExtractedKept,
    /// List values were unioned.
    Merged,
    /// No source value; the extracted value is untouched.
    SourceMissing,
    /// The override is unusable and was skipped.
    Defect,
}

/// One field's reconciliation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecision {
    pub field: String,
    pub source: FieldPath,
    pub policy: Reconciliation,
    pub decision: Decision,
}

/// Reconciled metadata plus a record of each override considered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub metadata: Metadata,
    pub decisions: Vec<FieldDecision>,
}

/// Merge `extracted` with `source` for a record of `content_type`.
///
/// Never fails: a source value that is missing (or null) leaves the
/// extracted value alone, and an override whose path is unusable is
/// logged as a registry defect and skipped.
pub fn reconcile(
    extracted: &Metadata,
    source: &Metadata,
    content_type: &str,
    snapshot: &RegistrySnapshot,
) -> Metadata {
    reconcile_detailed(extracted, source, content_type, snapshot).metadata
}

/// [`reconcile`], also reporting what happened to each overridden field.
pub fn reconcile_detailed(
    extracted: &Metadata,
    source: &Metadata,
    content_type: &str,
    snapshot: &RegistrySnapshot,
) -> ReconcileOutcome {
    let known_namespaces = snapshot.fields().namespaces();
    let mut metadata = extracted.clone();
    let mut decisions = Vec::new();

    for field in snapshot.fields().fields() {
        let Some(ov) = field.override_for(content_type) else {
            continue;
        };
        let own_path = field.path();
        let mut record = |decision| {
            decisions.push(FieldDecision {
                field: field.name.clone(),
                source: ov.target.clone(),
                policy: ov.reconciliation,
                decision,
            })
        };

        if !ov.target.is_well_formed()
            || !own_path.is_well_formed()
            || !known_namespaces.contains(ov.target.namespace.as_str())
        {
            tracing::warn!(
                field = %field.name,
                target = %ov.target,
                content_type,
                "registry defect: unusable source override skipped"
            );
            record(Decision::Defect);
            continue;
        }

        let Some(source_value) = source.get_present(&ov.target) else {
            record(Decision::SourceMissing);
            continue;
        };

        let current = metadata.get_present(&own_path);
        let (value, decision) = match ov.reconciliation {
            Reconciliation::SourceWins => (Some(source_value.clone()), Decision::SourceApplied),
            Reconciliation::ExtractedWins => match current {
                Some(_) => (None, Decision::ExtractedKept),
                None => (Some(source_value.clone()), Decision::SourceApplied),
            },
            Reconciliation::Merge => match (current, source_value) {
                (Some(Value::Array(ours)), Value::Array(theirs)) => {
                    (Some(Value::Array(union(ours, theirs))), Decision::Merged)
                }
                _ => (Some(source_value.clone()), Decision::SourceApplied),
            },
        };

        if let Some(value) = value {
            metadata.insert(&own_path, value);
        }
        record(decision);
    }

    ReconcileOutcome {
        metadata,
        decisions,
    }
}

/// Deduplicated union: `ours` first, then unseen items of `theirs`.
fn union(ours: &[Value], theirs: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(ours.len() + theirs.len());
    for item in ours.iter().chain(theirs) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

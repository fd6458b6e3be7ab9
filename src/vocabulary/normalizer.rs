//! VocabularyNormalizer: maps raw values onto canonical vocabulary entries

use super::similarity::{JaroWinkler, Similarity};
use super::unmatched::{TracingUnmatched, UnmatchedSink, UnmatchedValue};
use crate::metadata::Metadata;
use crate::registry::Vocabulary;
use crate::snapshot::RegistrySnapshot;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// How a value was matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// The field has no vocabulary.
    NoVocabulary,
    /// Case-insensitive match on a canonical value.
    Exact,
    /// Alias table hit.
    Alias,
    /// Fuzzy match at or above threshold.
    Fuzzy { score: f64 },
    /// Nothing matched; the raw value passes through.
    Unmatched,
}

/// The normalized value and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyMatch {
    pub value: String,
    pub kind: MatchKind,
}

/// Best fuzzy candidate so far.
struct Candidate<'a> {
    canonical: &'a str,
    score: f64,
}

impl Candidate<'_> {
    /// Higher score wins; ties go to the shorter, then lexicographically
    /// smaller canonical value.
    fn beats(&self, other: &Candidate<'_>) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        let len = |s: &str| s.chars().count();
        (len(self.canonical), self.canonical) < (len(other.canonical), other.canonical)
    }
}

/// Normalizes values against the vocabularies of a snapshot.
///
/// Matching order: case-insensitive canonical value, alias table, then
/// (when the vocabulary enables it) the best fuzzy match at or above the
/// threshold. Unmatched values pass through unchanged and are reported to
/// the unmatched sink. Output is always a fixed point: normalizing it
/// again returns it unchanged.
#[derive(Clone)]
pub struct VocabularyNormalizer {
    similarity: Arc<dyn Similarity>,
    unmatched: Arc<dyn UnmatchedSink>,
}

impl Default for VocabularyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VocabularyNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocabularyNormalizer").finish_non_exhaustive()
    }
}

impl VocabularyNormalizer {
    /// Jaro-Winkler scoring, unmatched values logged.
    pub fn new() -> Self {
        Self {
            similarity: Arc::new(JaroWinkler),
            unmatched: Arc::new(TracingUnmatched),
        }
    }

    pub fn with_similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Arc::new(similarity);
        self
    }

    pub fn with_unmatched_sink(mut self, sink: Arc<dyn UnmatchedSink>) -> Self {
        self.unmatched = sink;
        self
    }

    /// Canonical form of `raw` for `field`, or `raw` itself.
    pub fn normalize(&self, field: &str, raw: &str, snapshot: &RegistrySnapshot) -> String {
        self.match_value(field, raw, snapshot).value
    }

    /// Like [`normalize`](Self::normalize), also reporting the match kind.
    pub fn match_value(&self, field: &str, raw: &str, snapshot: &RegistrySnapshot) -> VocabularyMatch {
        let Some(vocabulary) = snapshot.vocabulary_for(field) else {
            return VocabularyMatch {
                value: raw.to_string(),
                kind: MatchKind::NoVocabulary,
            };
        };

        if let Some(canonical) = vocabulary.canonical(raw) {
            return VocabularyMatch {
                value: canonical.to_string(),
                kind: MatchKind::Exact,
            };
        }

        if let Some(canonical) = vocabulary.alias(raw) {
            return VocabularyMatch {
                value: canonical.to_string(),
                kind: MatchKind::Alias,
            };
        }

        if vocabulary.fuzzy_enabled() {
            let threshold = vocabulary.threshold_or(snapshot.fuzzy_threshold());
            if let Some(best) = self.best_fuzzy(vocabulary, raw) {
                if best.score >= threshold {
                    tracing::debug!(
                        field,
                        raw,
                        canonical = best.canonical,
                        score = best.score,
                        "fuzzy vocabulary match"
                    );
                    return VocabularyMatch {
                        value: best.canonical.to_string(),
                        kind: MatchKind::Fuzzy { score: best.score },
                    };
                }
            }
        }

        self.unmatched.record(UnmatchedValue {
            field: field.to_string(),
            vocabulary: vocabulary.name().to_string(),
            raw_value: raw.to_string(),
            observed_at: Utc::now(),
        });

        VocabularyMatch {
            value: raw.to_string(),
            kind: MatchKind::Unmatched,
        }
    }

    /// Score `raw` against every canonical value and alias.
    fn best_fuzzy<'v>(&self, vocabulary: &'v Vocabulary, raw: &str) -> Option<Candidate<'v>> {
        let needle = raw.trim().to_lowercase();
        let canonical = vocabulary.values().iter().map(|v| (v.as_str(), v.as_str()));
        let aliases = vocabulary
            .aliases()
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.as_str()));

        let mut best: Option<Candidate<'v>> = None;
        for (candidate, target) in canonical.chain(aliases) {
            let next = Candidate {
                canonical: target,
                score: self.similarity.score(&needle, &candidate.to_lowercase()),
            };
            if best.as_ref().map_or(true, |b| next.beats(b)) {
                best = Some(next);
            }
        }
        best
    }

    /// Normalize one JSON value: strings, and strings inside lists.
    /// Other values are returned as they are.
    pub fn normalize_value(&self, field: &str, value: &Value, snapshot: &RegistrySnapshot) -> Value {
        match value {
            Value::String(s) => Value::String(self.normalize(field, s, snapshot)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Value::String(self.normalize(field, s, snapshot)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Normalize every registry field with a vocabulary in a reconciled record.
    ///
    /// Values are matched to a field by namespace and name; anything not in
    /// the registry is copied through.
    pub fn normalize_record(&self, metadata: &Metadata, snapshot: &RegistrySnapshot) -> Metadata {
        let mut normalized = Metadata::new();
        for (path, value) in metadata.entries() {
            let governed = snapshot
                .field(&path.field)
                .is_some_and(|f| f.namespace == path.namespace && f.vocabulary.is_some());
            let value = if governed {
                self.normalize_value(&path.field, value, snapshot)
            } else {
                value.clone()
            };
            normalized.insert(&path, value);
        }
        normalized
    }
}

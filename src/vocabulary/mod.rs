//! Controlled-vocabulary normalization

mod normalizer;
mod similarity;
mod unmatched;

pub use normalizer::{MatchKind, VocabularyMatch, VocabularyNormalizer};
pub use similarity::{JaroWinkler, NormalizedLevenshtein, Similarity};
pub use unmatched::{TracingUnmatched, UnmatchedLog, UnmatchedSink, UnmatchedValue};

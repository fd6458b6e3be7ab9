//! Pluggable string similarity for fuzzy vocabulary matching

/// Scores how alike two strings are.
///
/// Scores lie in `[0, 1]`, with `1.0` for identical input. Implementations
/// must be deterministic. Inputs arrive already case-folded.
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Jaro-Winkler similarity. Favors shared prefixes, which suits
/// abbreviated agency and organization names.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }
}

/// Levenshtein distance normalized by the longer length.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        for sim in [&JaroWinkler as &dyn Similarity, &NormalizedLevenshtein] {
            assert_eq!(sim.score("department of energy", "department of energy"), 1.0);
        }
    }

    #[test]
    fn typo_scores_above_default_threshold() {
        let score = JaroWinkler.score("departmnet of energy", "department of energy");
        assert!(score >= 0.85, "score was {}", score);
        let score = NormalizedLevenshtein.score("departmnet of energy", "department of energy");
        assert!(score >= 0.85, "score was {}", score);
    }

    #[test]
    fn unrelated_strings_score_low() {
        assert!(JaroWinkler.score("navy", "department of energy") < 0.85);
    }
}

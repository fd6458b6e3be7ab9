//! Controlled vocabularies, loaded and versioned with the field registry

use super::validation::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A vocabulary as written in a registry document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularySpec {
    pub name: String,
    #[serde(alias = "canonical")]
    pub values: Vec<String>,
    /// alias → canonical value
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub fuzzy: bool,
    /// Overrides the configured default when set.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// A loaded vocabulary with case-folded lookup tables.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    name: String,
    values: Vec<String>,
    aliases: BTreeMap<String, String>,
    fuzzy: bool,
    threshold: Option<f64>,
    canonical_index: HashMap<String, usize>,
    alias_index: HashMap<String, String>,
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

impl Vocabulary {
    /// Build from a spec, dropping aliases whose target is not canonical.
    fn from_spec(spec: &VocabularySpec, errors: &mut Vec<ValidationError>) -> Self {
        let mut values = Vec::new();
        let mut canonical_index = HashMap::new();
        for value in &spec.values {
            let key = fold(value);
            if key.is_empty() || canonical_index.contains_key(&key) {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidVocabulary,
                    format!("canonical value '{}' is empty or repeated", value),
                ));
                continue;
            }
            canonical_index.insert(key, values.len());
            values.push(value.clone());
        }

        let mut aliases = BTreeMap::new();
        let mut alias_index = HashMap::new();
        for (alias, target) in &spec.aliases {
            let Some(&idx) = canonical_index.get(&fold(target)) else {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidVocabulary,
                    format!("alias '{}' maps to unknown canonical value '{}'", alias, target),
                ));
                continue;
            };
            let canonical = values[idx].clone();
            alias_index.entry(fold(alias)).or_insert_with(|| canonical.clone());
            aliases.insert(alias.clone(), canonical);
        }

        let threshold = match spec.threshold {
            Some(t) if t > 0.0 && t <= 1.0 => Some(t),
            Some(t) => {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidVocabulary,
                    format!("fuzzy threshold {} is outside (0, 1]; using the default", t),
                ));
                None
            }
            None => None,
        };

        Self {
            name: spec.name.clone(),
            values,
            aliases,
            fuzzy: spec.fuzzy,
            threshold,
            canonical_index,
            alias_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// alias → canonical value
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn fuzzy_enabled(&self) -> bool {
        self.fuzzy
    }

    /// This vocabulary's threshold, or `default` when it sets none.
    pub fn threshold_or(&self, default: f64) -> f64 {
        self.threshold.unwrap_or(default)
    }

    /// Case-insensitive exact match against the canonical set.
    pub fn canonical(&self, raw: &str) -> Option<&str> {
        self.canonical_index
            .get(&fold(raw))
            .map(|&idx| self.values[idx].as_str())
    }

    /// Alias lookup: verbatim key first, then case-insensitive.
    pub fn alias(&self, raw: &str) -> Option<&str> {
        self.aliases
            .get(raw)
            .or_else(|| self.alias_index.get(&fold(raw)))
            .map(String::as_str)
    }
}

/// All vocabularies of one snapshot, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct VocabularySet {
    by_name: BTreeMap<String, Vocabulary>,
}

impl VocabularySet {
    /// Load every vocabulary, accumulating findings instead of failing.
    pub fn load(specs: &[VocabularySpec]) -> (Self, Vec<ValidationError>) {
        let mut by_name = BTreeMap::new();
        let mut errors = Vec::new();

        for spec in specs {
            if spec.name.trim().is_empty() {
                errors.push(ValidationError::new(
                    "",
                    ValidationErrorKind::InvalidVocabulary,
                    "vocabulary has no name",
                ));
                continue;
            }
            if by_name.contains_key(&spec.name) {
                errors.push(ValidationError::new(
                    &spec.name,
                    ValidationErrorKind::InvalidVocabulary,
                    "vocabulary declared more than once; keeping the first",
                ));
                continue;
            }
            let vocabulary = Vocabulary::from_spec(spec, &mut errors);
            by_name.insert(spec.name.clone(), vocabulary);
        }

        (Self { by_name }, errors)
    }

    pub fn get(&self, name: &str) -> Option<&Vocabulary> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

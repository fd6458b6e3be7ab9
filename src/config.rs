//! Load-phase configuration

use crate::snapshot::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable selecting `strict` or `lenient` validation.
pub const ENV_VALIDATION_MODE: &str = "FIELD_REGISTRY_VALIDATION_MODE";

/// Environment variable overriding the default fuzzy-match threshold.
pub const ENV_FUZZY_THRESHOLD: &str = "FIELD_REGISTRY_FUZZY_THRESHOLD";

/// Default similarity threshold for vocabularies that do not set their own.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// What a snapshot build does with accumulated validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Abort the load on any validation error.
    Strict,
    /// Log errors, drop the offending field definitions, keep the rest.
    #[default]
    Lenient,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown validation mode '{}'", other)),
        }
    }
}

/// Options recognized when building a registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub validation_mode: ValidationMode,
    pub fuzzy_threshold: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::default().with_validation_mode(ValidationMode::Strict)
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Set the default fuzzy threshold. Must lie in `(0, 1]`.
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> RegistryResult<Self> {
        check_threshold(threshold)?;
        self.fuzzy_threshold = threshold;
        Ok(self)
    }

    /// Parse a YAML config block; missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> RegistryResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no snapshot can be built with.
    pub fn validate(&self) -> RegistryResult<()> {
        check_threshold(self.fuzzy_threshold)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from a key lookup. Unparsable values are ignored.
    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_VALIDATION_MODE) {
            match raw.parse() {
                Ok(mode) => self.validation_mode = mode,
                Err(e) => tracing::warn!("ignoring {}: {}", ENV_VALIDATION_MODE, e),
            }
        }
        if let Some(raw) = lookup(ENV_FUZZY_THRESHOLD) {
            match raw.trim().parse::<f64>() {
                Ok(t) if in_unit_range(t) => self.fuzzy_threshold = t,
                _ => tracing::warn!(
                    "ignoring {}: '{}' is not a number in (0, 1]",
                    ENV_FUZZY_THRESHOLD,
                    raw
                ),
            }
        }
        self
    }
}

fn in_unit_range(threshold: f64) -> bool {
    threshold > 0.0 && threshold <= 1.0
}

fn check_threshold(threshold: f64) -> RegistryResult<()> {
    if in_unit_range(threshold) {
        Ok(())
    } else {
        Err(RegistryError::InvalidConfig(format!(
            "fuzzy_threshold {} is outside (0, 1]",
            threshold
        )))
    }
}

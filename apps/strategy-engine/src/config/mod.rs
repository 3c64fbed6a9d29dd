//! Configuration module for the strategy engine runner.
//!
//! Loads YAML, interpolates environment variables and validates the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strategy_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! let request = config.search.to_request(config.scoring.weight_sets.clone());
//! ```
//!
//! # Example
//!
//! ```yaml
//! search:
//!   max_legs: ${STRATEGY_MAX_LEGS:-3}
//!   mode: branch_and_bound
//!   top_n: 10
//!   constraints:
//!     max_premium: 5.0
//!     delta_min: -0.25
//!     delta_max: 0.25
//! parallel:
//!   max_threads: 8
//! scoring:
//!   weight_sets:
//!     - name: income
//!       weights: { theta_positive: 2.0, max_loss: 1.0 }
//! observability:
//!   logging: { level: info, format: pretty }
//!   metrics: { enabled: true, listen_addr: "0.0.0.0:9090" }
//! ```

mod observability;
mod scoring;
mod search;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use scoring::ScoringConfig;
pub use search::SearchSettings;

use crate::enumerator::{MAX_LEGS, ParallelConfig};
use crate::scoring::WeightSet;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Search defaults.
    #[serde(default)]
    pub search: SearchSettings,
    /// Worker pool settings.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Weight sets.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. A missing variable
/// without a default becomes the empty string.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let search = &config.search;

    if search.max_legs == 0 || search.max_legs > MAX_LEGS {
        return Err(ConfigError::ValidationError(format!(
            "search.max_legs must be between 1 and {MAX_LEGS}"
        )));
    }

    if search.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "search.top_n must be at least 1".to_string(),
        ));
    }

    let c = &search.constraints;
    if c.delta_min > c.delta_max {
        return Err(ConfigError::ValidationError(
            "search.constraints.delta_min must not exceed delta_max".to_string(),
        ));
    }
    if c.max_premium < 0.0 || c.max_loss_left < 0.0 || c.max_loss_right < 0.0 {
        return Err(ConfigError::ValidationError(
            "premium and loss limits must be non-negative".to_string(),
        ));
    }

    validate_weight_sets(&config.scoring.weight_sets)?;

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of {LOG_FORMATS:?}, got '{format}'"
        )));
    }

    Ok(())
}

fn validate_weight_sets(weight_sets: &[WeightSet]) -> Result<(), ConfigError> {
    if weight_sets.is_empty() {
        return Err(ConfigError::ValidationError(
            "scoring.weight_sets must not be empty".to_string(),
        ));
    }

    let mut names = BTreeSet::new();
    for set in weight_sets {
        if !names.insert(set.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate weight set name '{}'",
                set.name
            )));
        }
        set.resolve()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::enumerator::EnumerationMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_legs, 4);
        assert_eq!(config.search.top_n, 10);
        assert!(config.search.dedup);
        assert_eq!(config.scoring.weight_sets.len(), 1);
        assert_eq!(config.observability.logging.format, "json");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let yaml = r"
search:
  max_legs: 2
  mode: branch_and_bound
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.search.max_legs, 2);
        assert_eq!(config.search.mode, EnumerationMode::BranchAndBound);
        assert_eq!(config.parallel, ParallelConfig::default());
    }

    #[test]
    fn test_load_weight_sets() {
        let yaml = r"
scoring:
  weight_sets:
    - name: income
      weights:
        theta_positive: 2.0
        max_loss: 1.0
    - name: pnl
      weights:
        average_pnl: 1.0
";
        let config = load_config_from_string(yaml).unwrap();
        let request = config.search.to_request(config.scoring.weight_sets.clone());
        assert_eq!(request.weight_sets.len(), 2);
        assert_eq!(request.weight_sets[0].name, "income");
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let yaml = r"
scoring:
  weight_sets:
    - name: bad
      weights: { sharpe_ratio: 1.0 }
";
        let err = load_config_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("sharpe_ratio")));
    }

    #[test]
    fn test_rejects_duplicate_weight_set_names() {
        let yaml = r"
scoring:
  weight_sets:
    - name: a
    - name: a
";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_leg_count_above_cap() {
        let yaml = "search:\n  max_legs: 11\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let yaml = "observability:\n  logging:\n    format: xml\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "max_legs: ${STRATEGY_CONFIG_TEST_NONEXISTENT_VAR:-3}";
        assert_eq!(interpolate_env_vars(input), "max_legs: 3");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let result = interpolate_env_vars("path: ${PATH:-default}");
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "name: ${STRATEGY_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "name: ");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search:\n  top_n: 3\nparallel:\n  max_threads: 2").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.search.top_n, 3);
        assert_eq!(config.parallel.max_threads, 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = load_config(path.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Symptom Match";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum similarity (0..=1) for a fuzzy vocabulary match to be accepted.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;
/// Upper bound on the ranked candidate list.
pub const DEFAULT_MAX_CANDIDATES: usize = 10;
/// Candidates handed to downstream reporting.
pub const DEFAULT_REPORT_TOP: usize = 5;
/// Top coverage strictly below this is low confidence.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 50.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load failed ({0}): {1}")]
    Load(String, String),

    #[error("Config parse failed ({0}): {1}")]
    Parse(String, String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Get the application data directory
/// ~/SymptomMatch/ on all platforms. `None` when no home directory is known.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("SymptomMatch"))
}

/// Default location of the vocabulary database.
pub fn default_database_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("vocabulary.db"))
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,symptom_match_lib=debug"
}

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
    if installed.is_ok() {
        tracing::info!("{} v{}", APP_NAME, APP_VERSION);
    }
}

/// Tunables for the matching engine. Passed in at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Similarity cut-off for the fuzzy vocabulary fallback.
    pub fuzzy_threshold: f64,
    /// Size bound of the ranked candidate list.
    pub max_candidates: usize,
    /// How many candidates a report carries.
    pub report_top: usize,
    /// Coverage percentage below which confidence is low.
    pub low_confidence_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            report_top: DEFAULT_REPORT_TOP,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(path.display().to_string(), e.to_string()))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid("max_candidates must be at least 1".into()));
        }
        if self.report_top == 0 || self.report_top > self.max_candidates {
            return Err(ConfigError::Invalid(format!(
                "report_top must be in 1..={}, got {}",
                self.max_candidates, self.report_top
            )));
        }
        if !(0.0..=100.0).contains(&self.low_confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "low_confidence_threshold must be in [0, 100], got {}",
                self.low_confidence_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("SymptomMatch"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = default_database_path().unwrap();
        assert!(db.starts_with(app_data_dir().unwrap()));
        assert!(db.ends_with("vocabulary.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_candidates, 10);
        assert_eq!(config.report_top, 5);
        assert!((config.fuzzy_threshold - 0.6).abs() < f64::EPSILON);
        assert!((config.low_confidence_threshold - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = EngineConfig {
            fuzzy_threshold: 1.5,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_report_top_above_max() {
        let config = EngineConfig {
            max_candidates: 3,
            report_top: 5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fuzzy_threshold": 0.75}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert!((config.fuzzy_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.max_candidates, DEFAULT_MAX_CANDIDATES);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        match EngineConfig::load(file.path()) {
            Err(ConfigError::Parse(_, _)) => {}
            other => panic!("Expected Parse error, got: {:?}", other),
        }
    }

    #[test]
    fn load_missing_file_is_load_error() {
        let result = EngineConfig::load(Path::new("/nonexistent/engine.json"));
        assert!(matches!(result, Err(ConfigError::Load(_, _))));
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}

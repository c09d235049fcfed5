//! Configuration management for lotmeter
//!
//! Everything has a built-in default; a config file is only needed to adapt
//! the analyzer to a log-format variant (different endpoints, token
//! positions, or retrieval semantics). CLI flags override file values.

use crate::classify::{EndpointsConfig, RetrievalConfig};
use crate::error::{LotmeterError, Result};
use crate::fields::FieldLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta", default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub fields: FieldLayout,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
            created_at: current_timestamp(),
        }
    }
}

/// Analysis defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Interval count used when the CLI does not pass one
    #[serde(default = "default_intervals")]
    pub default_intervals: usize,
}

fn default_intervals() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_intervals: default_intervals(),
        }
    }
}

impl Config {
    /// Load configuration from a file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LotmeterError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| LotmeterError::Io {
            source: e,
            context: format!("Failed to read config file: {}", path.display()),
        })?;
        let config: Config = toml::from_str(&raw)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LotmeterError::Io {
                source: e,
                context: format!("Failed to create config directory: {}", parent.display()),
            })?;
        }

        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| LotmeterError::Io {
            source: e,
            context: format!("Failed to write config file: {}", path.display()),
        })
    }

    /// Default configuration file location
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| LotmeterError::Config("Cannot determine config directory".to_string()))?;
        Ok(base.join("lotmeter").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
        assert_eq!(config.analysis.default_intervals, 5);
        assert_eq!(config.retrieval.policy, "status-code");
        assert!(!config.retrieval.count_timeouts);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();

        assert_eq!(parsed.analysis.default_intervals, config.analysis.default_intervals);
        assert_eq!(parsed.endpoints.submission, config.endpoints.submission);
        assert_eq!(parsed.fields.path_token, config.fields.path_token);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let raw = r#"
[retrieval]
policy = "response-size"
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.retrieval.policy, "response-size");
        assert_eq!(config.analysis.default_intervals, 5);
        assert_eq!(config.endpoints.runtime_suffixes.len(), 2);
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/lotmeter.toml"));
        assert!(matches!(result, Err(LotmeterError::ConfigNotFound { .. })));
    }
}

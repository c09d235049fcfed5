use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the lotmeter analyzer
#[derive(Error, Debug)]
pub enum LotmeterError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Interval count must be a positive integer
    #[error("Invalid interval count: {value} (must be a positive integer)")]
    InvalidIntervalCount { value: usize },

    /// Unknown retrieval policy name
    #[error("Unknown retrieval policy: {name} (expected \"status-code\" or \"response-size\")")]
    UnknownPolicy { name: String },

    /// The log contains no canonical-format timestamp, so the analysis
    /// window cannot be established
    #[error("No canonical-format timestamp found in {path}: cannot establish the analysis window")]
    NoCanonicalTimestamp { path: PathBuf },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for lotmeter operations
pub type Result<T> = std::result::Result<T, LotmeterError>;

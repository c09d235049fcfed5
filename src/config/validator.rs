use crate::config::Config;
use crate::error::{LotmeterError, Result, ValidationError};
use regex::Regex;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every failure before reporting
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_analysis(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_endpoints(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LotmeterError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_analysis(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.analysis.default_intervals == 0 {
            errors.push(ValidationError::new(
                "analysis.default_intervals",
                "Interval count must be a positive integer",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let policy = &config.retrieval.policy;
        if policy != "status-code" && policy != "response-size" {
            errors.push(ValidationError::new(
                "retrieval.policy",
                format!("Unknown retrieval policy: {}", policy),
            ));
        }

        if let Err(e) = Regex::new(&config.retrieval.timeout_pattern) {
            errors.push(ValidationError::new(
                "retrieval.timeout_pattern",
                format!("Invalid pattern: {}", e),
            ));
        }
    }

    fn validate_endpoints(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.endpoints.submission.is_empty() {
            errors.push(ValidationError::new(
                "endpoints.submission",
                "Submission endpoint cannot be empty",
            ));
        }

        if config.endpoints.runtime_suffixes.is_empty() {
            errors.push(ValidationError::new(
                "endpoints.runtime_suffixes",
                "At least one runtime suffix is required",
            ));
        }

        if config
            .endpoints
            .runtime_suffixes
            .iter()
            .any(|s| s.is_empty())
        {
            errors.push(ValidationError::new(
                "endpoints.runtime_suffixes",
                "Runtime suffixes cannot be empty strings",
            ));
        }
    }
}

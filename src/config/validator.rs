//! Validation of scope configurations.
//!
//! Control identifiers are not checked against the framework catalog; only
//! the shape of the configuration is validated.

use crate::error::{ComplyTimeError, ConfigError, Result};
use tracing::debug;

use super::spec::ScopeConfig;

/// Validator for scope configurations.
#[derive(Debug, Default)]
pub struct ScopeConfigValidator {
    /// Framework the configuration is expected to target.
    expected_framework: Option<String>,
}

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ScopeConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expected_framework: None,
        }
    }

    /// Warns when the configuration targets another framework.
    #[must_use]
    pub fn expect_framework(mut self, framework_id: impl Into<String>) -> Self {
        self.expected_framework = Some(framework_id.into());
        self
    }

    /// Validates a scope configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error if validation fails.
    pub fn validate(&self, config: &ScopeConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        self.validate_framework(config, &mut result);
        Self::validate_controls(config, &mut result);

        if result.errors.is_empty() {
            debug!("Scope configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(ComplyTimeError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    fn validate_framework(&self, config: &ScopeConfig, result: &mut ValidationResult) {
        if config.framework_id.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("frameworkId"),
                message: String::from("Framework id cannot be empty"),
            });
            return;
        }

        if let Some(expected) = &self.expected_framework {
            if *expected != config.framework_id {
                result.warnings.push(format!(
                    "frameworkId: scope targets '{}' but the plan is for '{expected}'",
                    config.framework_id
                ));
            }
        }
    }

    fn validate_controls(config: &ScopeConfig, result: &mut ValidationResult) {
        if config.include_controls.is_empty() {
            result.warnings.push(String::from(
                "includeControls: no controls in scope, the tailored plan will retain no controls",
            ));
            return;
        }

        for (i, id) in config.include_controls.iter().enumerate() {
            if id.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("includeControls[{i}]"),
                    message: String::from("Control id cannot be empty"),
                });
            } else if id.trim() != id {
                result.errors.push(ValidationError {
                    field: format!("includeControls[{i}]"),
                    message: format!("Control id '{id}' has surrounding whitespace"),
                });
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

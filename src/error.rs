//! Error types for the ComplyTime plan tooling.
//!
//! This module provides the error hierarchy for every fallible step around
//! the scope engine: configuration loading, plan synthesis and validation,
//! and workspace persistence. The scope engine itself cannot fail.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ComplyTime operations.
#[derive(Debug, Error)]
pub enum ComplyTimeError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Assessment plan errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Workspace and persistence errors.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Scope configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Assessment plan errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// No plan exists in the workspace.
    #[error("assessment plan does not exist in workspace {workspace}\n\nDid you run the plan command?")]
    NotFound {
        /// Workspace that was searched.
        workspace: PathBuf,
    },

    /// The plan document could not be parsed.
    #[error("Failed to parse assessment plan: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The plan document could not be serialized.
    #[error("Failed to serialize assessment plan: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// The plan is not structurally valid.
    #[error("Assessment plan validation failed at {field}: {message}")]
    ValidationFailed {
        /// Description of the violation.
        message: String,
        /// Document path of the violation.
        field: String,
    },

    /// No component definitions were available for synthesis.
    #[error("no component definitions found in {path}")]
    NoComponentDefinitions {
        /// Directory or source that was searched.
        path: String,
    },

    /// No component definition implements the requested framework.
    #[error("no control implementations found for framework '{framework_id}'")]
    FrameworkNotFound {
        /// Requested framework identifier.
        framework_id: String,
    },
}

/// Workspace and persistence errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The application or workspace directory could not be resolved or created.
    #[error("Workspace directory unavailable: {message}")]
    DirectoryUnavailable {
        /// Description of the failure.
        message: String,
    },

    /// Workspace lock acquisition failed.
    #[error("Failed to acquire workspace lock: {message}")]
    LockFailed {
        /// Description of the lock failure.
        message: String,
    },

    /// Workspace lock is held by another process.
    #[error("Workspace is locked by another process (lock holder: {holder}, since: {since})")]
    LockedByOther {
        /// Identifier of the lock holder.
        holder: String,
        /// When the lock was acquired.
        since: String,
    },

    /// A workspace file is unreadable.
    #[error("Workspace file is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for ComplyTime operations.
pub type Result<T> = std::result::Result<T, ComplyTimeError>;

impl ComplyTimeError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl PlanError {
    /// Creates a validation error for a document path.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            field: field.into(),
        }
    }
}

impl WorkspaceError {
    /// Creates a lock failure with the given message.
    #[must_use]
    pub fn lock(message: impl Into<String>) -> Self {
        Self::LockFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_hints_at_plan_command() {
        let err = ComplyTimeError::from(PlanError::NotFound {
            workspace: PathBuf::from("./complytime"),
        });
        let message = err.to_string();
        assert!(message.contains("./complytime"));
        assert!(message.contains("Did you run the plan command?"));
    }

    #[test]
    fn test_validation_helpers_keep_field() {
        match ConfigError::validation("bad", "frameworkId") {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("frameworkId"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

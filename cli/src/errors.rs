//! Error types for the UNMS CLI

use thiserror::Error;

/// Main error type for the UNMS CLI
#[derive(Error, Debug)]
pub enum CliError {
    /// Bad global or command arguments. Carries the fully rendered message,
    /// including the command's usage text.
    #[error("{0}")]
    UsageError(String),

    /// The deployment is not in the run state the command requires.
    #[error("{message}\n{remedy}")]
    PreconditionError { message: String, remedy: String },

    /// An orchestrator, database or filesystem call failed.
    #[error("{operation} failed: {reason}")]
    AdapterError { operation: String, reason: String },

    #[error("Operation cancelled by the operator")]
    ConfirmationDeclined,

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CliError {
    pub fn adapter(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        CliError::AdapterError {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

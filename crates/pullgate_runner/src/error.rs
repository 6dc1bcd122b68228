//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while fetching inputs or publishing a verdict.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{operation} failed: {message}")]
    Collaborator { operation: String, message: String },

    #[error("Policy error: {0}")]
    Policy(#[from] pullgate_core::CoreError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunnerError {
    pub fn collaborator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether the policy document itself was missing or malformed.
    pub fn is_config_error(&self) -> bool {
        matches!(self, RunnerError::Policy(_))
    }
}

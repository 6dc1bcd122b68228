//! Error types for the approval engine.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading or validating a policy document.
///
/// Condition strings never produce an error: an unrecognized condition
/// evaluates to `false` instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Policy configuration not found: {0}")]
    ConfigMissing(String),

    #[error("Invalid policy structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid group '{group}': {message}")]
    InvalidGroup { group: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Pipeline finished in the aborted state
    #[error("Pipeline aborted: {reason}")]
    PipelineAborted { reason: String },

    /// Dataset check found the data invalid
    #[error("Data quality check failed: {issues}")]
    InvalidData { issues: String },

    /// Contract-level failure (invalid transition, source construction, ...)
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn pipeline_aborted(reason: impl Into<String>) -> Self {
        Self::PipelineAborted {
            reason: reason.into(),
        }
    }

    pub fn invalid_data(issues: &[String]) -> Self {
        Self::InvalidData {
            issues: issues.join("; "),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

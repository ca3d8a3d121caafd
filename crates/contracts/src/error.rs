//! Layered error definitions
//!
//! Categorized by source: config / source / store / pipeline / sink.
//! Data errors (missing fields, non-numeric quantities) are deliberately absent:
//! the sanitizer drops or defaults them instead of failing.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Work order source unreachable or answered with a non-2xx status
    #[error("transport error for '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    /// Source payload could not be decoded
    #[error("decode error for '{endpoint}': {message}")]
    Decode { endpoint: String, message: String },

    // ===== Store Errors =====
    /// Record lookup by identifier missed
    #[error("order not found: {order_id}")]
    NotFound { order_id: String },

    /// Record with the same identifier already exists
    #[error("order already exists: {order_id}")]
    Conflict { order_id: String },

    /// Backing store failure
    #[error("store error: {message}")]
    Store { message: String },

    // ===== Pipeline Errors =====
    /// Illegal pipeline state transition
    #[error("invalid pipeline transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ===== Sink Errors =====
    /// Sink write error; `written` lists artifacts created before the failure
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite {
        sink_name: String,
        message: String,
        written: Vec<PathBuf>,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::sink_write_partial(sink_name, message, Vec::new())
    }

    /// Create sink write error for a batch that was only partly persisted
    pub fn sink_write_partial(
        sink_name: impl Into<String>,
        message: impl Into<String>,
        written: Vec<PathBuf>,
    ) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
            written,
        }
    }

    /// Artifacts that exist on disk despite the error
    pub fn written_artifacts(&self) -> &[PathBuf] {
        match self {
            Self::SinkWrite { written, .. } => written,
            _ => &[],
        }
    }

    /// Whether the error came from reaching the work order source
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Decode { .. })
    }
}

//! Error handling for the work client
//!
//! Parse and decode failures are local, non-recoverable conditions: they
//! abort the affected operation immediately and surface at the boundary.
//! The search itself has no failure kind, only cancellation.

use thiserror::Error;

/// Result type alias for work client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the work client
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed root hex string at the input boundary
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Malformed work string during decode
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Worker errors
    #[error("worker error: {worker_type}: {message}")]
    Worker { worker_type: String, message: String },

    /// Cancellation of an in-flight operation
    #[error("operation was cancelled: {operation}")]
    Cancelled { operation: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization errors (configuration printing)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a worker error
    pub fn worker(worker_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            worker_type: worker_type.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// True for malformed-input failures (bad root or work string).
    ///
    /// These map to a distinct process exit code so callers can tell bad
    /// input apart from runtime failures.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::Decode { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "parse",
            Error::Decode { .. } => "decode",
            Error::Config { .. } => "config",
            Error::Worker { .. } => "worker",
            Error::Cancelled { .. } => "cancelled",
            Error::Io(_) => "io",
            Error::Yaml(_) => "yaml",
        }
    }
}

//! # Error Types
//!
//! Typed error handling for the Mollie integration.
//! All operations return `Result<T, MollieError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum MollieError {
    /// A caller-supplied field failed a local invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// The gateway replied, but the reply is missing a key or has a bad value
    #[error("Malformed gateway reply: {0}")]
    MalformedReply(String),

    /// Transport failure or error status from the gateway
    #[error("Gateway error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Gateway {
        status: Option<u16>,
        message: String,
    },

    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MollieError {
    pub fn validation(message: impl Into<String>) -> Self {
        MollieError::Validation(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        MollieError::MalformedReply(message.into())
    }

    /// Gateway error without an HTTP status (connection refused, timeout, ...)
    pub fn transport(message: impl Into<String>) -> Self {
        MollieError::Gateway {
            status: None,
            message: message.into(),
        }
    }

    /// Returns true if the gateway call timed out
    pub fn is_timeout(&self) -> bool {
        match self {
            MollieError::Gateway { status, message } => {
                *status == Some(408) || (status.is_none() && message.contains("timed out"))
            }
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            MollieError::Validation(_) => 400,
            MollieError::MalformedReply(_) => 502,
            MollieError::Gateway { .. } if self.is_timeout() => 504,
            MollieError::Gateway { status: None, .. } => 503,
            MollieError::Gateway { .. } => 502,
            MollieError::Configuration(_) => 500,
            MollieError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for MollieError {
    fn from(err: serde_json::Error) -> Self {
        MollieError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type MollieResult<T> = Result<T, MollieError>;

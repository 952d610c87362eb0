//! Error types for report delivery.

use thiserror::Error;

/// Result type for delivery operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while delivering a report.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-2xx status.
    #[error("HTTP error ({status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        message: String,
    },

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Sender not configured.
    #[error("{0}")]
    NotConfigured(String),
}

impl NotificationError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Creates a not configured error.
    pub fn not_configured(sender: impl Into<String>) -> Self {
        Self::NotConfigured(format!("{} sender not configured", sender.into()))
    }

    /// Returns the HTTP status if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

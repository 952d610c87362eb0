//! Error types for Playreport.
//!
//! Nothing in this crate hands an error back to the orchestration runtime:
//! the reporter logs these and carries on. They exist so configuration
//! loading can still be written with `?`. Delivery has its own
//! [`NotificationError`](crate::notify::NotificationError).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Playreport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Playreport.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Settings file could not be parsed.
    #[error("Failed to read settings file '{path}': {source}")]
    Settings {
        /// Path of the settings file
        path: PathBuf,
        /// Source error
        #[source]
        source: config::ConfigError,
    },
}

impl Error {
    /// Creates a new invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

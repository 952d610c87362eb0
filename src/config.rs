//! Reporter configuration
//!
//! Handles loading and merging configuration from multiple sources, lowest
//! precedence first:
//! - Default values
//! - The first ini settings file found (see [`ReporterConfig::settings_paths`])
//! - Environment variables
//!
//! # Settings File Format
//!
//! ```ini
//! [callback_ansiboard]
//! api_url = https://dashboard.example.com/api/plays
//! timeout = 15
//! api_token = s3cr3t
//! ```
//!
//! # Environment Variables
//!
//! - `ANSIBLE_ansiboard_URL` - destination endpoint
//! - `ANSIBLE_ansiboard_TIMEOUT` - request timeout in seconds
//! - `ANSIBLE_ansiboard_TOKEN` - bearer token

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as Settings, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Settings section holding the reporter options.
pub const SETTINGS_SECTION: &str = "callback_ansiboard";

/// Environment variable for the destination URL.
pub const ENV_URL: &str = "ANSIBLE_ansiboard_URL";
/// Environment variable for the request timeout.
pub const ENV_TIMEOUT: &str = "ANSIBLE_ansiboard_TIMEOUT";
/// Environment variable for the bearer token.
pub const ENV_TOKEN: &str = "ANSIBLE_ansiboard_TOKEN";
/// Environment variable pointing at a settings file.
pub const ENV_SETTINGS_FILE: &str = "ANSIBLE_CONFIG";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reporter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Destination endpoint; reporting is disabled when unset
    pub api_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token sent in the Authorization header
    pub api_token: Option<String>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
        }
    }
}

impl ReporterConfig {
    /// Load configuration from the standard sources.
    ///
    /// An explicit `settings_path` replaces the search for a settings file.
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let found = Self::settings_paths(settings_path)
            .into_iter()
            .find(|path| path.is_file());

        if let Some(path) = found {
            debug!("Reading reporter settings from {}", path.display());
            config.merge_from_file(&path)?;
        } else if let Some(path) = settings_path {
            return Err(Error::Config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Settings files to check, in priority order. Only the first existing
    /// one is read.
    pub fn settings_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.to_path_buf()];
        }

        let mut paths = Vec::new();

        if let Ok(env_config) = env::var(ENV_SETTINGS_FILE) {
            if !env_config.is_empty() {
                paths.push(PathBuf::from(env_config));
            }
        }

        paths.push(PathBuf::from("ansible.cfg"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ansible.cfg"));
        }

        paths.push(PathBuf::from("/etc/ansible/ansible.cfg"));

        paths
    }

    /// Merge the reporter section of an ini settings file.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let settings = Settings::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()
            .map_err(|source| Error::Settings {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(url) = lookup(&settings, "api_url") {
            self.set_api_url(url);
        }
        if let Some(timeout) = lookup(&settings, "timeout") {
            self.timeout_secs = parse_timeout(&timeout)?;
        }
        if let Some(token) = lookup(&settings, "api_token") {
            self.set_api_token(token);
        }

        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var(ENV_URL) {
            self.set_api_url(url);
        }
        if let Ok(timeout) = env::var(ENV_TIMEOUT) {
            self.timeout_secs = parse_timeout(&timeout)?;
        }
        if let Ok(token) = env::var(ENV_TOKEN) {
            self.set_api_token(token);
        }
        Ok(())
    }

    fn set_api_url(&mut self, url: String) {
        let url = url.trim();
        self.api_url = if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        };
    }

    fn set_api_token(&mut self, token: String) {
        let token = token.trim();
        self.api_token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }

    /// Set the destination URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.set_api_url(url.into());
        self
    }

    /// Set the timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the bearer token.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.set_api_token(token.into());
        self
    }

    /// Whether a destination is configured.
    pub fn is_enabled(&self) -> bool {
        self.api_url.is_some()
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn lookup(settings: &Settings, key: &str) -> Option<String> {
    settings
        .get_string(&format!("{}.{}", SETTINGS_SECTION, key))
        .ok()
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::invalid_config("timeout", "must be at least 1 second")),
        Ok(secs) => Ok(secs),
        Err(_) => Err(Error::invalid_config(
            "timeout",
            format!("expected a whole number of seconds, got '{}'", raw),
        )),
    }
}

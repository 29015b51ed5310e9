//! Configuration for a conformance run.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `PANELPROBE_*` environment variables. The CLI applies its flags last.

use crate::error::{ProbeError, Result};
use crate::sequences::SequenceKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "panelprobe.toml";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "PANELPROBE_BASE_URL";
/// Environment variable overriding the login username.
pub const ENV_USERNAME: &str = "PANELPROBE_USERNAME";
/// Environment variable overriding the login password.
pub const ENV_PASSWORD: &str = "PANELPROBE_PASSWORD";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_SECS: &str = "PANELPROBE_TIMEOUT_SECS";

/// Comprehensive configuration for a harness run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Where the admin-panel API lives.
    #[serde(default)]
    pub target: TargetConfig,

    /// Super-admin credentials used for the authenticated sequences.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Sequence selection and expectations.
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ProbeError::Config(format!("failed to read config: {}", e)))?;
            Self::from_toml_str(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ProbeError::Config(format!("failed to parse config: {}", e)))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProbeError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| ProbeError::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Apply `PANELPROBE_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Split out from [`Config::apply_env`] so tests never mutate the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.target.base_url = url;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.credentials.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.credentials.password = password;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.target.timeout_secs = raw.trim().parse().map_err(|_| {
                ProbeError::Config(format!("{} must be a whole number, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        Ok(())
    }

    /// Check values that would make every request fail before it is sent.
    pub fn validate(&self) -> Result<()> {
        let url = self.target.base_url.trim();
        if url.is_empty() {
            return Err(ProbeError::Config("target.base_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ProbeError::Config(format!(
                "target.base_url must start with http:// or https://, got {}",
                url
            )));
        }
        if self.target.timeout_secs == 0 {
            return Err(ProbeError::Config(
                "target.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Keep only the listed sequences. Authentication always stays selected.
    pub fn restrict_to(&mut self, only: &[SequenceKind]) {
        self.run.sequences.retain(|kind| only.contains(kind));
    }

    /// Drop the listed sequences. Authentication cannot be dropped.
    pub fn exclude(&mut self, skip: &[SequenceKind]) {
        self.run
            .sequences
            .retain(|kind| *kind == SequenceKind::Auth || !skip.contains(kind));
    }

    /// The sequences to run, in execution order, always led by authentication.
    pub fn selected_sequences(&self) -> Vec<SequenceKind> {
        SequenceKind::ALL
            .iter()
            .copied()
            .filter(|kind| *kind == SequenceKind::Auth || self.run.sequences.contains(kind))
            .collect()
    }
}

/// Target API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// Base URL of the API, including any `/api` prefix (default: http://localhost:3000/api).
    pub base_url: String,

    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TargetConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Super-admin login credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Sequence selection and server-specific expectations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Sequences to run (default: all). Order here is ignored.
    pub sequences: Vec<SequenceKind>,

    /// Status `/contact/send` is expected to fail with when no mail
    /// credential is configured on the server (default: 500).
    pub contact_send_expected_status: u16,

    /// Prefix for names of every entity the harness creates (default: "probe").
    pub fixture_prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sequences: SequenceKind::ALL.to_vec(),
            contact_send_expected_status: 500,
            fixture_prefix: "probe".to_string(),
        }
    }
}

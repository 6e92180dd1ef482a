// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace configuration.
//!
//! A namespace is usually configured in code, but the same settings can be
//! read from a TOML file:
//!
//! ```toml
//! url = "ws://localhost:3000/ws"
//! name = "sandbox"
//! write_key = "soup"     # optional
//! stringify = true       # default
//! autoconnect = true     # default
//! retry_delay_ms = 1000  # default
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid server url '{0}': must start with ws:// or wss://")]
    InvalidUrl(String),

    #[error("invalid namespace name '{0}': must be non-empty and contain no '/'")]
    InvalidName(String),

    #[error("invalid retry delay: must be at least 1 ms")]
    InvalidRetryDelay,
}

/// Settings for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Base WebSocket URL of the server, without the namespace segment.
    #[serde(default = "default_url")]
    pub url: String,
    /// Namespace name.
    pub name: String,
    /// Credential granting write access, appended to the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_key: Option<String>,
    /// Double-encode payload values as JSON text.
    #[serde(default = "default_true")]
    pub stringify: bool,
    /// Open a connection at all. When false the namespace only keeps local
    /// state.
    #[serde(default = "default_true")]
    pub autoconnect: bool,
    /// Delay before every reconnection attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Floor applied to the reconnect delay so a dead server is not polled in
/// a tight loop.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(10);

fn default_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl NamespaceConfig {
    /// Configuration for `name` with every other field at its default.
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceConfig {
            url: default_url(),
            name: name.into(),
            write_key: None,
            stringify: true,
            autoconnect: true,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Sets the server URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the write key.
    pub fn with_write_key(mut self, write_key: impl Into<String>) -> Self {
        self.write_key = Some(write_key.into());
        self
    }

    /// Sets the stringify mode.
    pub fn with_stringify(mut self, stringify: bool) -> Self {
        self.stringify = stringify;
        self
    }

    /// Sets whether a connection is opened.
    pub fn with_autoconnect(mut self, autoconnect: bool) -> Self {
        self.autoconnect = autoconnect;
        self
    }

    /// Sets the reconnect delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Reconnect delay, never shorter than [`MIN_RETRY_DELAY`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms).max(MIN_RETRY_DELAY)
    }

    /// Write key, if one is set and non-empty.
    pub fn write_key(&self) -> Option<&str> {
        self.write_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Connection target: `<url>/<name>`, plus `/<write_key>` when writing.
    pub fn target(&self) -> String {
        let base = self.url.trim_end_matches('/');
        match self.write_key() {
            Some(key) => format!("{}/{}/{}", base, self.name, key),
            None => format!("{}/{}", base, self.name),
        }
    }

    /// Check that the URL scheme, the name and the retry delay are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.name.is_empty() || self.name.contains('/') {
            return Err(ConfigError::InvalidName(self.name.clone()));
        }
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::InvalidRetryDelay);
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: NamespaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Configuration for a record sync session.
//!
//! Loaded from TOML (all keys optional) and then overridden from the
//! environment:
//!
//! ```toml
//! base_url = "https://jsonplaceholder.typicode.com"
//! resource = "users"
//! label = "User"
//! request_timeout_ms = 5000
//! ```
//!
//! | Variable             | Field                |
//! |----------------------|----------------------|
//! | `RECORDS_BASE_URL`   | `base_url`           |
//! | `RECORDS_RESOURCE`   | `resource`           |
//! | `RECORDS_LABEL`      | `label`              |
//! | `RECORDS_TIMEOUT_MS` | `request_timeout_ms` |

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_RESOURCE: &str = "users";
pub const DEFAULT_LABEL: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Service root, without the resource path.
    pub base_url: String,
    /// Collection path under `base_url`.
    pub resource: String,
    /// Singular display name used in notifications ("User Created").
    pub label: String,
    /// Per-request timeout for the HTTP client. `None` waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            label: DEFAULT_LABEL.to_string(),
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config io error: {}", e),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl SyncConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        info!(path = %path.display(), "loaded record sync config");
        Self::from_toml_str(&contents)
    }

    /// Apply `RECORDS_*` variables from the process environment.
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("RECORDS_BASE_URL") {
            debug!(%url, "RECORDS_BASE_URL override");
            self.base_url = url;
        }
        if let Some(resource) = lookup("RECORDS_RESOURCE") {
            self.resource = resource;
        }
        if let Some(label) = lookup("RECORDS_LABEL") {
            self.label = label;
        }
        if let Some(raw) = lookup("RECORDS_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::Invalid(format!("RECORDS_TIMEOUT_MS={:?}: {}", raw, e))
            })?;
            self.request_timeout_ms = Some(ms);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) url, got {:?}",
                self.base_url
            )));
        }
        if self.resource.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid("resource must not be empty".into()));
        }
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("label must not be empty".into()));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

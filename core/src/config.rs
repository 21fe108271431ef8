//! Connection settings consumed by `RequestContext`.
//!
//! Values are plain data; where they come from is up to the caller.
//! `from_env` covers the common case of a CI job exporting a few variables.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://reqres.in";
pub const DEFAULT_API_KEY: &str = "reqres-free-v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const ENV_BASE_URL: &str = "REQRES_BASE_URL";
pub const ENV_API_KEY: &str = "REQRES_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "REQRES_TIMEOUT_MS";

/// Base URL, default headers and per-request timeout for one transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
            .with_header("Content-Type", "application/json")
            .with_header("x-api-key", DEFAULT_API_KEY)
    }
}

impl ClientConfig {
    /// A config with no default headers and the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Defaults overridden by `REQRES_BASE_URL`, `REQRES_API_KEY` and
    /// `REQRES_TIMEOUT_MS` when they are set.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            config.default_headers.insert("x-api-key".to_string(), key);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw.trim().parse().map_err(|_| {
                ApiError::InvalidConfig(format!("{ENV_TIMEOUT_MS} is not a number: {raw:?}"))
            })?;
        }
        Ok(config)
    }
}

//! Client configuration.
//!
//! Values come from `WALKER_*` environment variables. Parsing goes through a
//! lookup function so it can be exercised without touching the process
//! environment.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

const ENV_API_BASE_URL: &str = "WALKER_API_BASE_URL";
const ENV_API_TOKEN: &str = "WALKER_API_TOKEN";
const ENV_SYNC_INTERVAL_SECS: &str = "WALKER_SYNC_INTERVAL_SECS";
const ENV_HTTP_TIMEOUT_SECS: &str = "WALKER_HTTP_TIMEOUT_SECS";
const ENV_DB_PATH: &str = "WALKER_DB_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the storefront REST API, without trailing slash
    pub api_base_url: String,
    /// Bearer token sent with every API request
    pub api_token: Option<String>,
    /// Period of the background reconciler
    pub sync_interval: Duration,
    /// Per-request timeout; `None` leaves it to the transport
    pub http_timeout: Option<Duration>,
    /// Local store file override
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            http_timeout: None,
            db_path: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("sync_interval", &self.sync_interval)
            .field("http_timeout", &self.http_timeout)
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = optional_trimmed(&lookup, ENV_API_BASE_URL)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !is_http_url(&api_base_url) {
            return Err(ConfigError::Invalid(format!(
                "{ENV_API_BASE_URL} must start with http:// or https://"
            )));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let api_token = optional_trimmed(&lookup, ENV_API_TOKEN);

        let sync_interval_secs = match optional_trimmed(&lookup, ENV_SYNC_INTERVAL_SECS) {
            Some(value) => parse_positive_secs(ENV_SYNC_INTERVAL_SECS, &value)?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };

        let http_timeout = optional_trimmed(&lookup, ENV_HTTP_TIMEOUT_SECS)
            .map(|value| parse_positive_secs(ENV_HTTP_TIMEOUT_SECS, &value))
            .transpose()?
            .map(Duration::from_secs);

        let db_path = optional_trimmed(&lookup, ENV_DB_PATH).map(PathBuf::from);

        Ok(Self {
            api_base_url,
            api_token,
            sync_interval: Duration::from_secs(sync_interval_secs),
            http_timeout,
            db_path,
        })
    }
}

fn parse_positive_secs(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid(format!(
            "{name} must be a positive integer number of seconds"
        ))),
    }
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}

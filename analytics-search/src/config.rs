use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Backend major versions below this use the legacy histogram and scan behavior.
const CURRENT_API_VERSION: u32 = 2;

/// Read-only settings consumed by the query builder and fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Timezone used to bucket date histograms (e.g. "America/Denver").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Major version of the search backend API.
    #[serde(default = "default_api_version")]
    pub backend_api_version: u32,
    /// Request-log indices are named `<index_prefix>-YYYY-MM`.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            backend_api_version: default_api_version(),
            index_prefix: default_index_prefix(),
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AnalyticsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Builds a config from `ANALYTICS_*` environment variables.
    /// Unset or empty variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(timezone) = env_var("ANALYTICS_TIMEZONE") {
            config.timezone = timezone;
        }
        if let Some(version) = env_var("ANALYTICS_BACKEND_API_VERSION") {
            config.backend_api_version = version
                .parse()
                .context("ANALYTICS_BACKEND_API_VERSION must be a number")?;
        }
        if let Some(prefix) = env_var("ANALYTICS_INDEX_PREFIX") {
            config.index_prefix = prefix;
        }
        if let Some(url) = env_var("ANALYTICS_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Some(timeout) = env_var("ANALYTICS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .parse()
                .context("ANALYTICS_REQUEST_TIMEOUT_SECS must be a number")?;
        }
        Ok(config)
    }

    pub fn is_legacy_backend(&self) -> bool {
        self.backend_api_version < CURRENT_API_VERSION
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

// Default functions
fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_api_version() -> u32 {
    CURRENT_API_VERSION
}

fn default_index_prefix() -> String {
    "api-umbrella-logs".to_string()
}

fn default_backend_url() -> String {
    "http://127.0.0.1:9200".to_string()
}

fn default_request_timeout() -> u64 {
    90
}

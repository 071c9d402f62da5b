use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "DUDWALLS_ENDPOINT";
pub const ENV_API_KEY: &str = "DUDWALLS_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "DUDWALLS_TIMEOUT_SECS";

/// Connection settings for a Dudwalls server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_endpoint() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("dudwalls-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Build a config purely from `DUDWALLS_*` environment variables.
    ///
    /// Endpoint and API key are required; the timeout is optional.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply any `DUDWALLS_*` variables that are set on top of this config.
    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.overridden_by(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let endpoint = lookup(ENV_ENDPOINT)
            .ok_or_else(|| anyhow::anyhow!("{} is not set", ENV_ENDPOINT))?;
        let api_key =
            lookup(ENV_API_KEY).ok_or_else(|| anyhow::anyhow!("{} is not set", ENV_API_KEY))?;

        Self::new(endpoint, api_key).overridden_by(lookup)
    }

    fn overridden_by(mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("{} must be a whole number of seconds: {}", ENV_TIMEOUT_SECS, e)
            })?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint with trailing slashes removed
    pub fn normalized_endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            insecure_skip_verify: false,
        }
    }
}

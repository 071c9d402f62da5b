//! dudwalls-demo - a walkthrough of the Dudwalls client
//!
//! The library half holds the scenario so it can be driven against any
//! server; the binary wires it to `config.json`, environment overrides and
//! file logging.
//!
//! ```rust,no_run
//! use dudwalls_demo::scenario::{self, ScenarioOptions};
//! use dudwalls_rs::Client;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::connect("http://localhost:3000", "your-api-key")?;
//!     let report = scenario::run(&client, &ScenarioOptions::default()).await?;
//!     println!("{} users stored", report.total);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use dudwalls_rs;

pub mod scenario;
pub mod telemetry;

use dudwalls_rs::Config;
use scenario::ScenarioOptions;

/// Contents of the demo's `config.json`: client settings plus scenario options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(flatten)]
    pub client: Config,
    #[serde(default)]
    pub scenario: ScenarioOptions,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            client: Config::default(),
            scenario: ScenarioOptions::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl DemoConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DemoConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_config_flattens_client_settings() {
        let config: DemoConfig = serde_json::from_str(
            r#"{
                "endpoint": "https://db.example.com",
                "api_key": "k",
                "timeout_secs": 5,
                "scenario": {"database": "demo", "cleanup": true},
                "log_dir": "/var/log/dudwalls"
            }"#,
        )
        .unwrap();

        assert_eq!(config.client.endpoint, "https://db.example.com");
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.scenario.database, "demo");
        assert_eq!(config.scenario.collection, "users");
        assert!(config.scenario.cleanup);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/dudwalls"));
    }

    #[test]
    fn test_demo_config_defaults() {
        let config: DemoConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.client, Config::default());
        assert_eq!(config.scenario.database, "rust-app");
        assert!(!config.scenario.cleanup);
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }
}

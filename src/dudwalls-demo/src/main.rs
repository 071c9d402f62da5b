use anyhow::Result;
use dudwalls_demo::{scenario, telemetry, DemoConfig};
use dudwalls_rs::Client;

const CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // Logging needs the configured directory, so report a load failure once it is up
    let (config, load_error) = match DemoConfig::load(CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(e) => (DemoConfig::default(), Some(e)),
    };

    let guard = telemetry::init_telemetry(&config.log_dir)?;
    if let Some(e) = load_error {
        tracing::warn!("Failed to load {} ({}), using defaults", CONFIG_PATH, e);
    }

    let client_config = config.client.with_env_overrides()?;

    tracing::info!("dudwalls demo starting");
    tracing::info!("  Endpoint: {}", client_config.endpoint);
    tracing::info!("  Timeout: {}s", client_config.timeout_secs);
    tracing::info!(
        "  Scenario: database={}, collection={}, cleanup={}",
        config.scenario.database,
        config.scenario.collection,
        config.scenario.cleanup
    );
    if client_config.api_key.is_empty() {
        tracing::warn!("No API key configured; set api_key in {} or DUDWALLS_API_KEY", CONFIG_PATH);
    }

    let client = Client::new(client_config)?;
    let outcome = scenario::run(&client, &config.scenario).await;

    match &outcome {
        Ok(report) => {
            println!(
                "\n✅ Example completed: {} inserted, {} total, {} active",
                report.inserted, report.total, report.active
            );
        }
        Err(e) => {
            tracing::error!("Scenario failed: {:#}", e);
            println!("\n❌ Error: {:#}", e);
        }
    }

    telemetry::shutdown_telemetry(guard);

    outcome.map(|_| ())
}

//! Voice Agent Manager
//!
//! Headless entry point: loads configuration from the environment, runs the
//! dashboard's initial load against the Retell API and prints the resulting
//! snapshot as JSON.

use tracing::{info, warn};
use voice_agent_manager::{AppState, ClientConfig, RetellClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = ClientConfig::from_env();
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&config).unwrap_or_default()
    );
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let client = RetellClient::new(config)?;
    let state = AppState::new(client);

    let report = state.initial_load().await;
    for (collection, err) in report.failures() {
        warn!(collection = collection, error = %err, "Failed to load collection");
    }

    let snapshot = state.snapshot().await;
    info!(
        agents = snapshot.agents.len(),
        voices = snapshot.voices.len(),
        llms = snapshot.llms.len(),
        calls = snapshot.calls.len(),
        "Dashboard loaded"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

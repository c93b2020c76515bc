//! # Location Relay
//!
//! Real-time location sharing hub.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Broadcast hub task
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use location_relay::config::Settings;
use location_relay::startup::Application;
use location_relay::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    telemetry::init_tracing(telemetry::SERVER_FILTER);

    info!("Starting Location Relay...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

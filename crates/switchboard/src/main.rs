//! Switchboard server binary

use switchboard::{Config, SwitchboardServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first (needed for logging settings)
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Can't use tracing yet - not initialized
            eprintln!("Configuration error: {}", e);
            eprintln!("Using default configuration");
            Config::default()
        }
    };

    let level = config.logging.level.as_deref().unwrap_or("info");
    let json = config
        .logging
        .format
        .as_deref()
        .is_some_and(|format| format.eq_ignore_ascii_case("json"));
    common::logging::init_with_level(level, json);

    tracing::info!("Switchboard starting");

    let server = SwitchboardServer::new(config);
    server.run().await?;

    Ok(())
}

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use voyage_risk::{Config, RiskService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Load configuration (.env, defaults, VOYAGE_RISK__* variables)
    let config = Config::from_env()?;

    if config.has_traffic_feed() {
        tracing::info!("AIS traffic feed configured");
    } else {
        tracing::warn!("No AIS credential - traffic risk will use simulated estimates");
    }

    // Create and run service
    let service = Arc::new(RiskService::new(config)?);
    service.run().await?;

    Ok(())
}

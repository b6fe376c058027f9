use anyhow::Context;
use tempgraph::{TempGraphConfig, telemetry, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TempGraphConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    tracing::info!(
        geocoding = %config.geocoding.base_url,
        forecast = %config.forecast.base_url,
        "Starting TempGraph {}",
        tempgraph::VERSION
    );

    web::run(config).await
}

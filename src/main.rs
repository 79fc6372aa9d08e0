use muleflow::api;
use muleflow::core::config::Config;
use muleflow::metrics;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚀 MuleFlow - Money Muling Detection Engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    metrics::init_metrics();
    info!("📊 Metrics initialized");

    // Load configuration from environment
    let config = Config::from_env();

    api::start_server(config).await?;

    Ok(())
}

use anyhow::Result;
use echo_stream::config::Config;
use echo_stream::server::Server;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let config = Arc::new(Config::load(config_path.as_deref())?);

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.filter.as_str())
        .init();

    info!("Starting echo-stream");
    match &config_path {
        Some(path) => info!("Loaded config from {}", path),
        None => info!("No config file given, using defaults"),
    }

    let server = Server::bind(config).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("echo-stream stopped.");
    Ok(())
}

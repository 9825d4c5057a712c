use std::path::PathBuf;

use anyhow::{Context, Result};
use market_data::GraphQlClient;
use market_observability::init_logging;
use market_storefront::{build_app, AppState, StorefrontConfig};

const CONFIG_ENV: &str = "STOREFRONT_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("storefront.toml"));
    let config = StorefrontConfig::load(&path).context("Failed to load storefront config")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    let shop = GraphQlClient::new(config.shop_api_url.clone(), config.timeout)
        .context("Failed to build shop API client")?;
    let app = build_app(AppState::new(shop), config.max_concurrency);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    tracing::info!(listen = %config.listen, shop_api_url = %config.shop_api_url, "storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

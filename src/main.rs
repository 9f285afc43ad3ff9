//! OpenSASE Variants - product variant combination service

use anyhow::Result;
use opensase_variants::{api, config::EngineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = EngineConfig::from_env()?;
    let port = config.port;
    tracing::info!(max_combinations = config.max_combinations, reconcile_on_load = config.reconcile_on_load, "variant engine configured");

    let app = api::router(api::AppState::new(config));
    tracing::info!("🚀 OpenSASE Variants listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

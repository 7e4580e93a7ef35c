use anyhow::Context;
use tracing_subscriber::EnvFilter;

use roster_api::config::{self, AppConfig};
use roster_api::{app, is_development, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster_api=info,tower_http=info")),
        )
        .init();

    let config: AppConfig = config::config().clone();
    tracing::info!("Starting Roster API in {:?} mode", config.environment);
    if is_development!() {
        tracing::warn!("Development defaults in use; set JWT_SECRET and ADMIN_PASSWORD before deploying");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)
        .await
        .context("failed to initialise employee store")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Roster API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}

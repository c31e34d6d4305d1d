use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_smarter::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    // Initialize tracing/logging: JSON in production, human-readable otherwise
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iptv_smarter=info,tower_http=debug".into()),
        )
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting IPTV Smarter v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);
    match config.fallback_proxy() {
        Some(prefix) => tracing::info!("Fallback proxy: {}", prefix),
        None => tracing::info!("Fallback proxy disabled"),
    }

    let state = Arc::new(AppState::new(config)?);
    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use notesapi_server::{AppConfig, AppState, create_router};
use notesapi_storage::SqliteStorage;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notesapi=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().inspect_err(|e| tracing::error!("configuration: {e}"))?;

    tracing::info!(path = %config.database_path.display(), "opening database");
    let storage = SqliteStorage::open_with_busy_timeout(&config.database_path, config.busy_timeout)
        .inspect_err(|e| tracing::error!("error initializing database: {e}"))?;
    tracing::info!(path = %storage.path().display(), "database initialized");

    let state = AppState::from_config(Arc::new(storage), &config);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(
        mode = %config.counter_mode,
        race_delay_ms = config.race_delay.as_millis() as u64,
        "listening on http://{bind_address}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

//! Fieldday API server entry point.

use std::error::Error;
use std::sync::Arc;

use fieldday_api::config::ApiConfig;
use fieldday_api::error::AppError;
use fieldday_api::state::AppState;
use fieldday_authoring::application::event_store::KeyValueEventStore;
use fieldday_core::clock::SystemClock;
use fieldday_core::store::KeyValueStore;
use fieldday_store::memory_key_value_store::MemoryKeyValueStore;
use fieldday_store::pg_key_value_store::PgKeyValueStore;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Connects the configured key-value backend.
async fn connect_store(
    config: &ApiConfig,
) -> Result<(Arc<dyn KeyValueStore>, &'static str), AppError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory store");
        return Ok((Arc::new(MemoryKeyValueStore::new()), "memory"));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    let store = PgKeyValueStore::new(pool);
    store.ensure_schema().await?;
    Ok((Arc::new(store), "postgres"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Fieldday API server");

    let config = ApiConfig::from_env()?;
    let addr = config.socket_addr()?;

    let (kv, backend) = connect_store(&config).await?;
    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(KeyValueEventStore::new(kv)),
        config.default_editor(),
        backend,
    );

    // TODO: Replace CorsLayer::permissive() with the editor UI's origin once it is deployed.
    let app = fieldday_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(%addr, storage = backend, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;

    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}

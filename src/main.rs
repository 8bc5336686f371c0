//! Server binary: reads settings, opens the document store, serves the API until ctrl-c or SIGTERM.

use catalog_api::{
    app, ensure_collections, ensure_database_exists, resource, AppState, DocumentStore, MemoryDocumentStore,
    PgDocumentStore, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog_api=info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    let store = open_store(&settings).await?;
    let state = AppState::new(Arc::clone(&store));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, settings.body_limit_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn DocumentStore>, Box<dyn std::error::Error>> {
    let Some(database_url) = settings.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; documents are kept in memory");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    };
    ensure_database_exists(database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(database_url)
        .await?;
    ensure_collections(&pool, &settings.schema, &resource::collections()).await?;
    tracing::info!(schema = %settings.schema, "database ready");
    Ok(Arc::new(PgDocumentStore::new(pool, settings.schema.clone())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

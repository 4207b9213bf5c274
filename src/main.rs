use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brasa_api::{
    config::{Config, StorageBackend},
    create_router,
    db::{create_pool, create_redis_client, Cache, MemoryNewsStore, NewsStore, PgNewsStore},
    services::{AuthService, GeminiSummarizer, Summarizer},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brasa_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn NewsStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.database_max_connections).await?;
            let store = PgNewsStore::new(pool);
            store.migrate().await.context("Failed to run database migrations")?;
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(MemoryNewsStore::new()),
    };
    tracing::info!(backend = store.name(), "Storage ready");

    let (cache, cache_handle) = match config.redis_url.as_deref() {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, handle) = Cache::new(client).await;
            tracing::info!("Redis cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, caching disabled");
            (None, None)
        }
    };

    let summarizer: Option<Arc<dyn Summarizer>> = match config.gemini_key() {
        Some(key) => Some(Arc::new(GeminiSummarizer::new(
            key.to_string(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        ))),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, summaries use the local fallback");
            None
        }
    };

    let auth = AuthService::new(store.clone(), &config);
    let app = create_router(AppState::new(store, cache, summarizer, auth));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}

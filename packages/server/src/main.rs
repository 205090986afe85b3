use std::sync::Arc;

use anyhow::Context;
use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::s3::S3BlobStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::{AppConfig, StorageBackend, StorageConfig};
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let blob_store = build_blob_store(&config.storage).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = server::build_router(AppState::new(db, config, blob_store));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemBlobStore::new(&config.data_dir, config.max_blob_size)
                .await
                .with_context(|| {
                    format!("Failed to open blob directory {}", config.data_dir.display())
                })?;
            info!(dir = %config.data_dir.display(), "Using filesystem blob store");
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let settings = config
                .s3
                .as_ref()
                .context("storage.backend is \"s3\" but [storage.s3] is missing")?;
            let store = S3BlobStore::new(settings, config.max_blob_size)
                .context("Failed to configure S3 blob store")?;
            info!(bucket = %settings.bucket, "Using S3 blob store");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}

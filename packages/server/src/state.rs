use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::metrics::HttpMetrics;
use crate::service::{Clock, IdGenerator, Services, SystemClock, UuidV7Ids};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub blob_store: Arc<dyn BlobStore>,
    pub services: Services,
    pub metrics: HttpMetrics,
}

impl AppState {
    /// State with UUIDv7 ids and the system clock.
    pub fn new(db: DatabaseConnection, config: AppConfig, blob_store: Arc<dyn BlobStore>) -> Self {
        Self::with_sources(
            db,
            config,
            blob_store,
            Arc::new(UuidV7Ids),
            Arc::new(SystemClock),
        )
    }

    pub fn with_sources(
        db: DatabaseConnection,
        config: AppConfig,
        blob_store: Arc<dyn BlobStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let services = Services::new(db.clone(), blob_store.clone(), ids, clock);
        Self {
            db,
            config: Arc::new(config),
            blob_store,
            services,
            metrics: HttpMetrics::new(),
        }
    }
}

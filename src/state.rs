use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::storage::BlobStore;

/// Shared service handles, constructed in `main` and injected into the
/// router. No module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blob_store: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

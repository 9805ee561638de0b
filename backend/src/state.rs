use crate::config::AppConfig;
use crate::db::sqlite::SqliteStore;
use crate::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Shared application state, injected into every handler as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SqliteStore, config: AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Runs synchronous store work on tokio's blocking pool so the async workers
    /// are never held up by SQLite I/O or password hashing.
    pub async fn blocking<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&SqliteStore) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|join_err| ApiError::internal(format!("join error: {}", join_err)))?
    }
}

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    DefaultFilmService, DefaultUserService, FilmService, UserService,
};
use crate::storage::memory::MemoryCatalog;
use crate::storage::{FilmStorage, UserStorage};

/// Wired application state. The storage backend is chosen here, once;
/// everything downstream sees only the service traits.
pub struct SharedState {
    pub film_service: Arc<dyn FilmService>,
    pub user_service: Arc<dyn UserService>,

    /// Present only with the sqlite backend; used by the readiness probe.
    pub store: Option<Store>,

    pub backend_name: &'static str,

    pub cors_allowed_origins: Vec<String>,
}

impl SharedState {
    pub async fn new(config: &Config) -> Result<Self> {
        let (films, users, store, backend_name): (
            Arc<dyn FilmStorage>,
            Arc<dyn UserStorage>,
            Option<Store>,
            &'static str,
        ) = match config.storage.backend.as_str() {
            "sqlite" => {
                let store = Store::with_pool_options(
                    &config.storage.database_path,
                    config.storage.max_db_connections,
                    config.storage.min_db_connections,
                )
                .await?;
                (
                    Arc::new(store.clone()),
                    Arc::new(store.clone()),
                    Some(store),
                    "sqlite",
                )
            }
            _ => {
                let catalog = Arc::new(MemoryCatalog::new());
                (catalog.clone(), catalog, None, "memory")
            }
        };

        info!(backend = backend_name, "storage backend selected");

        let film_service: Arc<dyn FilmService> =
            Arc::new(DefaultFilmService::new(films.clone(), users.clone()));
        let user_service: Arc<dyn UserService> =
            Arc::new(DefaultUserService::new(users, films));

        Ok(Self {
            film_service,
            user_service,
            store,
            backend_name,
            cors_allowed_origins: config.server.cors_allowed_origins.clone(),
        })
    }
}

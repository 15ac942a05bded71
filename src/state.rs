use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::repositories::{
    contact::{ContactRepository, PgContactRepository},
    memory::MemoryStore,
    user::{PgUserRepository, UserRepository},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// User records and tokens.
    pub users: Arc<dyn UserRepository>,
    /// Contact records.
    pub contacts: Arc<dyn ContactRepository>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState` for the configured storage backend.
    ///
    /// For PostgreSQL this builds the pool and applies the schema.
    pub async fn new(config: &Config) -> Result<Self> {
        match config.storage {
            StorageBackend::Postgres => {
                let db = crate::db::create_pool(&config.database_url, config.db_pool_max_size)?;
                tracing::info!(
                    "✅ PostgreSQL pool initialized (max {} connections)",
                    config.db_pool_max_size
                );
                crate::db::migrate(&db).await?;

                Ok(Self::with_repositories(
                    config.clone(),
                    Arc::new(PgUserRepository::new(db.clone())),
                    Arc::new(PgContactRepository::new(db)),
                ))
            }
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory storage, data will not survive a restart");
                Ok(Self::in_memory(config.clone()))
            }
        }
    }

    /// Builds state around explicit repositories.
    pub fn with_repositories(
        config: Config,
        users: Arc<dyn UserRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        Self { users, contacts, config }
    }

    /// Builds state backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: Config) -> Self {
        let store = MemoryStore::new();
        Self::with_repositories(config, Arc::new(store.clone()), Arc::new(store))
    }
}

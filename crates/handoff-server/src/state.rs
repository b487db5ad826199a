use anyhow::Result;
use handoff_core::{
    DirectoryService, InboxService, RequestService, SessionRegistry, ShareService,
    TokenCoordinator,
};
use handoff_storage::{KvStore, MemoryStore, RocksDbStore};
use std::sync::Arc;

use crate::config::Config;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    /// Direct storage handle for health checks and tests.
    pub storage: Arc<dyn KvStore>,
    pub directory: Arc<DirectoryService<dyn KvStore>>,
    pub shares: Arc<ShareService<dyn KvStore>>,
    pub inbox: Arc<InboxService<dyn KvStore>>,
    pub sessions: Arc<SessionRegistry<dyn KvStore>>,
    pub requests: Arc<RequestService<dyn KvStore>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let storage: Arc<dyn KvStore> = match &config.database_path {
            Some(path) => {
                tracing::info!("Opening RocksDB store at {:?}", path);
                Arc::new(RocksDbStore::open(path)?)
            }
            None => {
                tracing::info!("No DATABASE_PATH set, using the in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_storage(config, storage))
    }

    /// Build the service graph over an existing storage handle.
    pub fn with_storage(config: Config, storage: Arc<dyn KvStore>) -> Self {
        let directory = Arc::new(DirectoryService::new(
            storage.clone(),
            config.admin_users.clone(),
        ));
        let coordinator = Arc::new(TokenCoordinator::new(storage.clone()));
        let shares = Arc::new(ShareService::new(
            storage.clone(),
            directory.clone(),
            coordinator,
            config.limits,
        ));
        let inbox = Arc::new(InboxService::new(
            storage.clone(),
            directory.clone(),
            config.limits,
        ));
        let sessions = Arc::new(SessionRegistry::new(storage.clone(), inbox.clone()));
        let requests = Arc::new(RequestService::new(
            storage.clone(),
            config.admin_users.clone(),
        ));

        AppState {
            config,
            storage,
            directory,
            shares,
            inbox,
            sessions,
            requests,
        }
    }
}

//! Application state for the MotherDuck API.

use std::sync::Arc;

use common::config::AppConfig;
use crate::pool_manager::PoolManager;
use crate::query_cache::QueryCache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool_manager: Arc<PoolManager>,
    pub query_cache: Option<QueryCache>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig) -> Self {
        let query_cache = config
            .cache_enabled()
            .then(|| QueryCache::new(config.query_cache_size));
        Self {
            pool_manager: Arc::new(PoolManager::new(&config)),
            query_cache,
            config,
        }
    }
}

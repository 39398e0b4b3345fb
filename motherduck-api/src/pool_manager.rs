//! DuckDB connection manager.
//!
//! Opens connections to the configured target and, when reuse is enabled,
//! keeps at most one open connection per connection key. DuckDB calls are
//! blocking, so all work on a connection runs on the blocking thread pool.

use std::collections::HashMap;
use std::sync::Arc;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::connection::{DatabaseTarget, IN_MEMORY_PATH};
use duckdb::Connection;
use tokio::sync::{Mutex, RwLock};

type SharedConnection = Arc<Mutex<Connection>>;

/// Manages DuckDB connections.
///
/// Connections are cached by connection key (the full connection string, so
/// one per credential token and database). Each cached connection sits
/// behind its own mutex; requests sharing a key run one at a time.
pub struct PoolManager {
    target: DatabaseTarget,
    token: Option<String>,
    reuse_connections: bool,
    connections: RwLock<HashMap<String, SharedConnection>>,
}

impl PoolManager {
    /// Creates a pool manager for the configured target. No connection is
    /// opened until the first request needs one.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            target: config.target.clone(),
            token: config.motherduck_token.clone(),
            reuse_connections: config.reuse_connections,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// The configured target.
    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    /// Whether requests share cached connections, and with them session
    /// and transaction state.
    pub fn shares_connections(&self) -> bool {
        self.reuse_connections
    }

    /// Runs `f` with a connection to the target.
    ///
    /// # Errors
    /// Returns `AppError::MissingToken` when the target needs a token and
    /// none is configured, `AppError::DatabaseConnection` when the
    /// connection cannot be opened, or whatever `f` returns.
    pub async fn run<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
    {
        let conn_str = self.target.connection_string(self.token.as_deref())?;

        if !self.reuse_connections {
            return tokio::task::spawn_blocking(move || {
                let conn = open_connection(&conn_str)?;
                f(&conn)
            })
            .await?;
        }

        let shared = self.shared_connection(conn_str).await?;
        let guard = shared.lock_owned().await;
        tokio::task::spawn_blocking(move || f(&guard)).await?
    }

    /// Returns the cached connection for `key`, opening it on first use.
    ///
    /// The write lock is held while opening so concurrent first requests
    /// cannot open two connections for the same key.
    async fn shared_connection(&self, key: String) -> AppResult<SharedConnection> {
        if let Some(conn) = self.connections.read().await.get(&key) {
            return Ok(conn.clone());
        }

        let mut connections = self.connections.write().await;
        if let Some(conn) = connections.get(&key) {
            return Ok(conn.clone());
        }

        let conn_str = key.clone();
        let conn = tokio::task::spawn_blocking(move || open_connection(&conn_str)).await??;
        let shared = Arc::new(Mutex::new(conn));
        connections.insert(key, shared.clone());
        tracing::info!(target_db = %self.target, "connection opened and cached");
        Ok(shared)
    }

    /// Number of cached connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Drops every cached connection.
    pub async fn close_all(&self) {
        let mut connections = self.connections.write().await;
        let count = connections.len();
        connections.clear();
        if count > 0 {
            tracing::info!(count, "closed cached connections");
        }
    }
}

/// Opens a DuckDB connection from a connection string.
fn open_connection(conn_str: &str) -> AppResult<Connection> {
    let result = if conn_str == IN_MEMORY_PATH {
        Connection::open_in_memory()
    } else {
        Connection::open(conn_str)
    };
    result.map_err(|e| AppError::DatabaseConnection(e.to_string()))
}

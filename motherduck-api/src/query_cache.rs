//! Memoizing cache for read-only query results.
//!
//! Keyed by the exact SQL text. Entries are never invalidated; the cache only
//! evicts when it reaches capacity.

use std::sync::Arc;

use common::models::query::QueryResult;
use common::utils::SqlClassifier;
use moka::future::Cache;

/// Bounded cache of successful read-only query results.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<String, Arc<QueryResult>>,
}

impl QueryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Whether results of `sql` may be memoized.
    pub fn is_cacheable(sql: &str) -> bool {
        SqlClassifier::is_read_only(sql)
    }

    /// Looks up a cached result.
    pub async fn get(&self, sql: &str) -> Option<Arc<QueryResult>> {
        self.inner.get(sql).await
    }

    /// Stores a result if the statement is read-only.
    pub async fn insert(&self, sql: &str, result: Arc<QueryResult>) {
        if Self::is_cacheable(sql) {
            self.inner.insert(sql.to_string(), result).await;
        }
    }

    /// Approximate number of cached entries.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

//! 查询执行服务模块

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use duckdb::Connection;
use serde_json::Value;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::query::{QueryRequest, QueryResult};
use common::utils::SqlClassifier;
use crate::pool_manager::PoolManager;
use crate::query_cache::QueryCache;
use crate::value::to_json;

/// Statement run by the connection test.
pub const CONNECTION_TEST_SQL: &str = "SELECT 42 AS test_number, 'Hello MotherDuck' AS test_message";

/// Outcome of a successful connection test.
#[derive(Debug, Clone)]
pub struct ConnectionCheck {
    /// Values of the test row.
    pub values: Vec<Value>,
    /// Round-trip time including connection setup.
    pub latency_ms: u64,
}

/// 查询服务 Trait
#[async_trait]
pub trait QueryServiceTrait: Send + Sync {
    /// 执行 SQL 查询
    async fn execute(&self, req: QueryRequest) -> AppResult<QueryResult>;

    /// 测试数据库连接
    async fn test_connection(&self) -> AppResult<ConnectionCheck>;
}

/// SQL 查询执行服务
pub struct QueryService {
    pool_manager: Arc<PoolManager>,
    cache: Option<QueryCache>,
}

impl QueryService {
    /// 创建新的查询服务实例
    pub fn new(pool_manager: Arc<PoolManager>, cache: Option<QueryCache>) -> Self {
        Self {
            pool_manager,
            cache,
        }
    }
}

#[async_trait]
impl QueryServiceTrait for QueryService {
    async fn execute(&self, req: QueryRequest) -> AppResult<QueryResult> {
        req.validate()?;

        // An open transaction on a shared connection would capture every
        // other client's statements.
        if self.pool_manager.shares_connections()
            && SqlClassifier::has_transaction_control(&req.sql)
        {
            return Err(AppError::Validation(
                "transaction control statements are not allowed while DUCKDB_REUSE_CONNECTIONS is enabled"
                    .to_string(),
            ));
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&req.sql).await {
                tracing::debug!(rows = hit.row_count(), "query served from cache");
                return Ok(QueryResult::clone(&hit));
            }
        }

        let sql = req.sql.clone();
        let start = Instant::now();
        let mut result = self
            .pool_manager
            .run(move |conn| fetch_all(conn, &sql))
            .await?;
        result.execution_time_ms = elapsed_ms(start);

        tracing::info!(
            rows = result.row_count(),
            columns = result.columns.len(),
            elapsed_ms = result.execution_time_ms,
            "query executed"
        );

        if let Some(cache) = &self.cache {
            cache.insert(&req.sql, Arc::new(result.clone())).await;
        }
        Ok(result)
    }

    async fn test_connection(&self) -> AppResult<ConnectionCheck> {
        let start = Instant::now();
        let result = self
            .pool_manager
            .run(|conn| fetch_all(conn, CONNECTION_TEST_SQL))
            .await?;
        let latency_ms = elapsed_ms(start);

        let values = result.rows.into_iter().next().unwrap_or_default();
        tracing::info!(target_db = %self.pool_manager.target(), latency_ms, "connection test passed");
        Ok(ConnectionCheck { values, latency_ms })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Executes one statement and collects every row.
fn fetch_all(conn: &Connection, sql: &str) -> AppResult<QueryResult> {
    let query_err = |e: duckdb::Error| AppError::DatabaseQuery(e.to_string());

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let mut rows = stmt.query([]).map_err(query_err)?;
    let columns = rows
        .as_ref()
        .map(|stmt| stmt.column_names())
        .unwrap_or_default();

    let mut data = Vec::new();
    while let Some(row) = rows.next().map_err(query_err)? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            let value: duckdb::types::Value = row.get(idx).map_err(query_err)?;
            values.push(to_json(value));
        }
        data.push(values);
    }

    Ok(QueryResult {
        columns,
        rows: data,
        execution_time_ms: 0,
    })
}

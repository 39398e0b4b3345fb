//! Handler模块

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use common::errors::AppError;
use common::models::query::QueryRequest;
use common::response::{ConnectionTestResponse, HealthResponse, QueryResponse};
use crate::service::{QueryService, QueryServiceTrait};
use crate::state::AppState;

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// 测试数据库连接
#[utoipa::path(
    get,
    path = "/test",
    tag = "connection",
    responses(
        (status = 200, description = "连接测试结果（失败时 success 为 false）", body = ConnectionTestResponse)
    )
)]
pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionTestResponse> {
    let label = state.pool_manager.target().label();
    let service = QueryService::new(state.pool_manager, state.query_cache);
    match service.test_connection().await {
        Ok(check) => Json(ConnectionTestResponse::ok(
            format!("{label} connection successful"),
            check.values,
            check.latency_ms,
        )),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "connection test failed");
            Json(ConnectionTestResponse::failure(e.to_string()))
        }
    }
}

/// 执行 SQL 查询
#[utoipa::path(
    post,
    path = "/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "查询执行成功", body = QueryResponse),
        (status = 400, description = "SQL 执行失败", body = QueryResponse),
        (status = 422, description = "请求体无效", body = QueryResponse),
        (status = 500, description = "MOTHERDUCK_TOKEN 未配置", body = QueryResponse),
        (status = 503, description = "无法连接数据库", body = QueryResponse)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let service = QueryService::new(state.pool_manager, state.query_cache);
    let result = service.execute(req).await?;
    Ok(Json(QueryResponse::from(result)))
}

//! MotherDuck SQL API
//!
//! 将 HTTP 请求转发到 MotherDuck / DuckDB，包括：
//! - 健康检查
//! - 数据库连接测试
//! - SQL 查询执行与结果序列化

pub mod handlers;
pub mod pool_manager;
pub mod query_cache;
pub mod routes;
pub mod service;
pub mod state;
pub mod value;

use axum::{middleware, routing::get, Json, Router};
use common::middleware::request_id::request_id_middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MotherDuck SQL API",
        version = "1.0.0",
        description = "将 SQL 查询转发到 MotherDuck / DuckDB"
    ),
    paths(
        handlers::health_check,
        handlers::test_connection,
        handlers::execute_query,
    ),
    components(schemas(
        common::models::QueryRequest,
        common::response::QueryResponse,
        common::response::HealthResponse,
        common::response::ConnectionTestResponse,
    )),
    tags(
        (name = "query", description = "查询执行端点"),
        (name = "connection", description = "连接测试端点"),
        (name = "health", description = "健康检查端点")
    )
)]
pub struct ApiDoc;

/// Builds the application router with its middleware stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

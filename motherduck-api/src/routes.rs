//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/test", get(handlers::test_connection))
        .route("/query", post(handlers::execute_query))
}

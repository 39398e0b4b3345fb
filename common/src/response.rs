//! API response types.
//!
//! The wire shapes returned by the three public endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::models::query::QueryResult;

/// Name reported by the health check.
pub const SERVICE_NAME: &str = "motherduck-api";

/// Response of `POST /query`.
///
/// Successful and failed queries share this shape; on failure `data` is
/// empty, `row_count` is zero and `error` carries the engine's message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    /// Whether the statement executed.
    pub success: bool,

    /// One JSON object per row, keys in column order.
    #[schema(value_type = Vec<Object>)]
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,

    /// Number of rows in `data`.
    #[serde(default)]
    pub row_count: usize,

    /// Error text, empty on success.
    #[serde(default)]
    pub error: String,
}

impl QueryResponse {
    /// Creates a successful response from row records.
    pub fn ok(data: Vec<Map<String, Value>>) -> Self {
        Self {
            success: true,
            row_count: data.len(),
            data,
            error: String::new(),
        }
    }

    /// Creates a failed response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            row_count: 0,
            error: error.into(),
        }
    }
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self::ok(result.into_records())
    }
}

/// Response of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Service name.
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}

/// Response of `GET /test`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestResponse {
    /// Whether the round-trip succeeded.
    pub success: bool,

    /// Human-readable outcome (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Values of the test row (present on success).
    #[schema(value_type = Option<Vec<Object>>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_result: Option<Vec<Value>>,

    /// Round-trip time including connection setup, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// Error text (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionTestResponse {
    pub fn ok(message: impl Into<String>, test_result: Vec<Value>, latency_ms: u64) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            test_result: Some(test_result),
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            test_result: None,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

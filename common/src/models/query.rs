//! SQL query models.
//!
//! Contains models for SQL query execution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Request body for executing a SQL query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// SQL statement to execute, passed to the engine verbatim.
    #[validate(custom(function = "validate_not_blank"))]
    pub sql: String,
}

fn validate_not_blank(sql: &str) -> Result<(), ValidationError> {
    if sql.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("SQL statement is required".into());
        return Err(err);
    }
    Ok(())
}

/// Result of a SQL query execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,

    /// Row values, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,

    /// Query execution time in milliseconds.
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Converts rows into JSON objects keyed by column name.
    ///
    /// Duplicate column names keep the last value, so `SELECT 1 AS a, 2 AS a`
    /// yields `{"a": 2}`.
    pub fn into_records(self) -> Vec<Map<String, Value>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_sql_is_rejected() {
        let req = QueryRequest { sql: "  \n ".into() };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("sql"));
    }

    #[test]
    fn test_sql_is_accepted() {
        let req = QueryRequest { sql: "SELECT 1".into() };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_records_keep_column_order() {
        let result = QueryResult {
            columns: vec!["z".into(), "a".into()],
            rows: vec![vec![json!(1), json!("x")]],
            execution_time_ms: 0,
        };
        let records = result.into_records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }
}

//! Connection target models.
//!
//! Describes which database the service talks to and how the DuckDB
//! connection string is built for it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Default MotherDuck database name.
pub const DEFAULT_MOTHERDUCK_DATABASE: &str = "financial_db";

/// In-memory DuckDB path.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Database the service forwards queries to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatabaseTarget {
    /// Hosted MotherDuck database, authenticated with the token.
    MotherDuck {
        /// Database (optionally `database.schema`) name.
        database: String,
    },
    /// Local DuckDB file or `:memory:`.
    Local {
        /// File path or `:memory:`.
        path: String,
    },
}

impl Default for DatabaseTarget {
    fn default() -> Self {
        DatabaseTarget::MotherDuck {
            database: DEFAULT_MOTHERDUCK_DATABASE.to_string(),
        }
    }
}

impl DatabaseTarget {
    /// Returns whether this target needs a credential token.
    pub fn requires_token(&self) -> bool {
        matches!(self, DatabaseTarget::MotherDuck { .. })
    }

    /// Returns whether this is a private in-memory database.
    pub fn is_in_memory(&self) -> bool {
        matches!(self, DatabaseTarget::Local { path } if path == IN_MEMORY_PATH)
    }

    /// Product name used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            DatabaseTarget::MotherDuck { .. } => "MotherDuck",
            DatabaseTarget::Local { .. } => "DuckDB",
        }
    }

    /// Builds the DuckDB connection string.
    ///
    /// # Errors
    /// Returns `AppError::MissingToken` for a MotherDuck target without a
    /// non-empty token.
    pub fn connection_string(&self, token: Option<&str>) -> AppResult<String> {
        match self {
            DatabaseTarget::MotherDuck { database } => {
                let token = token
                    .filter(|t| !t.is_empty())
                    .ok_or(AppError::MissingToken)?;
                Ok(format!("md:{}?motherduck_token={}", database, token))
            }
            DatabaseTarget::Local { path } => Ok(path.clone()),
        }
    }
}

/// Redacted form, safe for logs.
impl std::fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseTarget::MotherDuck { database } => write!(f, "md:{}", database),
            DatabaseTarget::Local { path } => write!(f, "duckdb:{}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motherduck_connection_string() {
        let target = DatabaseTarget::default();
        assert_eq!(
            target.connection_string(Some("tok")).unwrap(),
            "md:financial_db?motherduck_token=tok"
        );
    }

    #[test]
    fn test_motherduck_requires_token() {
        let target = DatabaseTarget::default();
        assert!(matches!(
            target.connection_string(None),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            target.connection_string(Some("")),
            Err(AppError::MissingToken)
        ));
    }

    #[test]
    fn test_local_ignores_token() {
        let target = DatabaseTarget::Local {
            path: IN_MEMORY_PATH.into(),
        };
        assert_eq!(target.connection_string(None).unwrap(), ":memory:");
        assert!(target.is_in_memory());
        assert!(!target.requires_token());
    }

    #[test]
    fn test_display_hides_token() {
        let target = DatabaseTarget::MotherDuck {
            database: "analytics".into(),
        };
        assert_eq!(target.to_string(), "md:analytics");
    }
}

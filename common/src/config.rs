//! Service configuration.
//!
//! Configuration comes from environment variables. A `.env` file in the
//! working directory is loaded first; variables already present in the
//! process environment take precedence over it.

use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};
use crate::models::connection::{DatabaseTarget, DEFAULT_MOTHERDUCK_DATABASE};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Listen address.
    pub host: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// MotherDuck credential (`MOTHERDUCK_TOKEN`); blank values count as unset.
    pub motherduck_token: Option<String>,
    /// Database queries are forwarded to.
    pub target: DatabaseTarget,
    /// Keep one open connection per connection key instead of one per request
    /// (`DUCKDB_REUSE_CONNECTIONS`, off by default).
    pub reuse_connections: bool,
    /// Query cache capacity in entries; 0 disables the cache.
    pub query_cache_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            motherduck_token: None,
            target: DatabaseTarget::default(),
            reuse_connections: false,
            query_cache_size: 0,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "motherduck_token",
                &self.motherduck_token.as_ref().map(|_| "<redacted>"),
            )
            .field("target", &self.target)
            .field("reuse_connections", &self.reuse_connections)
            .field("query_cache_size", &self.query_cache_size)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// Call [`load_dotenv`] first so `.env` values are visible.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key lookup.
    ///
    /// # Errors
    /// Returns `AppError::Configuration` when a present value does not parse.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let target = match get("DUCKDB_PATH") {
            Some(path) => DatabaseTarget::Local { path },
            None => DatabaseTarget::MotherDuck {
                database: get("MOTHERDUCK_DATABASE")
                    .unwrap_or_else(|| DEFAULT_MOTHERDUCK_DATABASE.to_string()),
            },
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_opt(get("PORT"), "PORT")?.unwrap_or(defaults.port),
            motherduck_token: get("MOTHERDUCK_TOKEN").map(|t| t.trim().to_string()),
            target,
            reuse_connections: match get("DUCKDB_REUSE_CONNECTIONS") {
                Some(v) => parse_bool(&v, "DUCKDB_REUSE_CONNECTIONS")?,
                None => defaults.reuse_connections,
            },
            query_cache_size: parse_opt(get("QUERY_CACHE_SIZE"), "QUERY_CACHE_SIZE")?
                .unwrap_or(defaults.query_cache_size),
        })
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_enabled(&self) -> bool {
        self.query_cache_size > 0
    }
}

/// Loads `.env` from the working directory into the process environment.
///
/// Returns the file path when one was found. Variables that are already set
/// keep their values.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn parse_opt<T: FromStr>(value: Option<String>, key: &str) -> AppResult<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| AppError::Configuration(format!("{key}={v:?} is not valid")))
        })
        .transpose()
}

fn parse_bool(value: &str, key: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Configuration(format!(
            "{key}={value:?} is not a boolean"
        ))),
    }
}

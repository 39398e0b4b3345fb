//! Shared building blocks for the MotherDuck SQL API.
//!
//! - [`config`]: environment-driven configuration
//! - [`errors`]: the application error type and its HTTP mapping
//! - [`models`]: request, result and connection target models
//! - [`response`]: wire shapes of the public endpoints
//! - [`middleware`]: request ID propagation
//! - [`utils`]: SQL statement classification

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;

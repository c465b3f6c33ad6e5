//! YomiTomo Common Library
//!
//! Shared code for the YomiTomo manga server:
//! - Database schema, entities and repository
//! - Admin authentication and session storage
//! - Upload storage
//! - Error types and handling
//! - Configuration management
//! - Metrics

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod uploads;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

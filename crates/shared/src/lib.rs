//! Shared library for the filler-scraper workspace.
//!
//! This crate provides common functionality used by the scraper crate:
//! - Configuration management
//! - SQLite database handle and schema
//! - Logging infrastructure
//! - Data models for cached responses, parsed pages and filler records

pub mod config;
pub mod db;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use logging::LogConfig;
pub use models::*;

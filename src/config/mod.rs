//! Configuration module for crawls
//!
//! This module provides the `CrawlConfig` struct and its type-safe builder
//! for configuring crawls with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{CrawlConfigBuilder, WithStartUrls};
pub use types::CrawlConfig;

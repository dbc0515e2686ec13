// src/models/mod.rs

//! Domain models for the job aggregator.
//!
//! This module contains the data structures shared across adapters,
//! the search pipeline and the cache.

pub mod config;
pub mod job;
pub mod options;

// Re-export all public types
pub use config::{CacheConfig, Config, HttpConfig, LoggingConfig, SearchConfig, SourcesConfig};
pub use job::{JobSource, NormalizedJob, UNKNOWN_COMPANY, UNTITLED, format_salary, is_remote_location};
pub use options::{BoardSite, DEFAULT_RESULTS, SearchOptions};

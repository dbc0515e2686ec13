// src/lib.rs

//! jobscout: job posting aggregator library.
//!
//! The entry point is [`pipeline::JobSearch`], which fans a query out to the
//! enabled [`services::SourceAdapter`]s, merges and deduplicates their
//! results, and caches them in a [`storage::CacheStore`].

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

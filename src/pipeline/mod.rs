//! Search pipeline.
//!
//! - `JobSearch`: cache lookup, adapter fan-out, merge and store
//! - `dedup_jobs`: first-wins deduplication by normalized URL

pub mod dedup;
pub mod search;

pub use dedup::dedup_jobs;
pub use search::{JobSearch, SearchReport, SourceReport};

//! Source adapters.
//!
//! Each adapter turns one external job source into `NormalizedJob`s:
//! - `AggregatedAdapter`: multi-site scraper (Indeed, LinkedIn)
//! - `GreenhouseAdapter`: Greenhouse job-board API, one board per request
//! - `LeverAdapter`: Lever postings API, one site per request
//!
//! Adapters never fail a search. Errors are logged at the boundary and
//! reported as `FetchOutcome::Failed`, which folds to an empty list.

mod aggregated;
mod greenhouse;
mod lever;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{JobSource, NormalizedJob, SearchOptions};

pub use aggregated::{AggregatedAdapter, HttpScraper, JobScraper, ScrapeRequest, ScrapedJob};
pub use greenhouse::{GreenhouseAdapter, GreenhouseJob, GreenhouseLocation};
pub use lever::{LeverAdapter, LeverCategories, LeverPosting, LeverSalaryRange};

/// Result of one adapter run.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The source answered (possibly with nothing relevant)
    Fetched(Vec<NormalizedJob>),
    /// The source could not be used at all
    Failed { reason: String },
}

impl FetchOutcome {
    /// Collapse to the job list, treating failure as no results.
    pub fn into_jobs(self) -> Vec<NormalizedJob> {
        match self {
            FetchOutcome::Fetched(jobs) => jobs,
            FetchOutcome::Failed { .. } => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    /// Number of jobs fetched (zero on failure).
    pub fn job_count(&self) -> usize {
        match self {
            FetchOutcome::Fetched(jobs) => jobs.len(),
            FetchOutcome::Failed { .. } => 0,
        }
    }
}

/// A job source the search pipeline can fan out to.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Tag stamped on every job this adapter produces.
    fn source(&self) -> JobSource;

    /// Whether the adapter takes part in a search with these options.
    fn is_enabled(&self, options: &SearchOptions) -> bool;

    /// Fetch and normalize jobs. Never panics or propagates errors.
    async fn fetch(&self, query: &str, options: &SearchOptions) -> FetchOutcome;
}

/// Source-native record, tagged by where it came from.
///
/// Native shapes never leave the adapter layer; `normalize` is the only
/// way out.
#[derive(Debug, Clone)]
pub enum NativeJob {
    Scraped(ScrapedJob),
    Greenhouse { board: String, job: GreenhouseJob },
    Lever { site: String, posting: LeverPosting },
}

impl NativeJob {
    /// Map to the canonical shape. `None` when the record has no URL.
    pub fn normalize(self) -> Option<NormalizedJob> {
        match self {
            NativeJob::Scraped(job) => aggregated::normalize(job),
            NativeJob::Greenhouse { board, job } => greenhouse::normalize(&board, job),
            NativeJob::Lever { site, posting } => lever::normalize(&site, posting),
        }
    }
}

/// Fold per-identifier results for a board-scoped source.
///
/// Failed identifiers are logged and skipped. The outcome is `Failed` only
/// when every identifier failed.
fn fold_identifier_results(
    source: JobSource,
    results: Vec<(&str, Result<Vec<NormalizedJob>>)>,
) -> FetchOutcome {
    let total = results.len();
    let mut jobs = Vec::new();
    let mut failures = Vec::new();

    for (identifier, result) in results {
        match result {
            Ok(found) => {
                log::debug!("{} {}: {} matching jobs", source, identifier, found.len());
                jobs.extend(found);
            }
            Err(error) => {
                log::warn!("Failed to fetch {} board {}: {}", source, identifier, error);
                failures.push(format!("{identifier}: {error}"));
            }
        }
    }

    if total > 0 && failures.len() == total {
        return FetchOutcome::Failed {
            reason: failures.join("; "),
        };
    }
    FetchOutcome::Fetched(jobs)
}

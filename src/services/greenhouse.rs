// src/services/greenhouse.rs

//! Greenhouse job-board adapter.
//!
//! `GET {base}/{board}/jobs?content=true` returns `{ "jobs": [...] }` for a
//! single board. The payload carries no company name, so the board token
//! stands in for it.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{JobSource, NormalizedJob, SearchOptions, UNTITLED, is_remote_location};
use crate::services::{FetchOutcome, NativeJob, SourceAdapter, fold_identifier_results};
use crate::utils::html::escaped_to_plain_text;
use crate::utils::http::HttpFetch;
use crate::utils::time::normalize_timestamp;
use crate::utils::url::endpoint;
use crate::utils::{matches_any_token, query_tokens};

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<GreenhouseJob>,
}

/// A job as returned by the Greenhouse board API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreenhouseJob {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub absolute_url: Option<String>,
    #[serde(default)]
    pub location: Option<GreenhouseLocation>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Entity-escaped HTML
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreenhouseLocation {
    #[serde(default)]
    pub name: Option<String>,
}

impl GreenhouseJob {
    fn location_name(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .unwrap_or("")
    }

    fn matches(&self, tokens: &[String]) -> bool {
        matches_any_token(
            tokens,
            &[self.title.as_deref().unwrap_or(""), self.location_name()],
        )
    }
}

pub(super) fn normalize(board: &str, job: GreenhouseJob) -> Option<NormalizedJob> {
    let job_url = job.absolute_url.clone().filter(|u| !u.trim().is_empty())?;
    let location = job.location_name().to_string();

    Some(NormalizedJob {
        title: job
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        company: board.to_string(),
        is_remote: is_remote_location(&location),
        location,
        job_url,
        source: JobSource::Greenhouse,
        date_posted: job.updated_at.as_deref().map(normalize_timestamp),
        salary: None,
        description: job
            .content
            .as_deref()
            .map(escaped_to_plain_text)
            .unwrap_or_default(),
    })
}

/// Adapter over the Greenhouse job-board API.
pub struct GreenhouseAdapter {
    http: Arc<dyn HttpFetch>,
    base_url: String,
}

impl GreenhouseAdapter {
    pub fn new(http: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch one board and keep the relevant postings.
    async fn fetch_board(
        &self,
        board: &str,
        tokens: &[String],
        cap: usize,
    ) -> Result<Vec<NormalizedJob>> {
        let mut url = endpoint(&self.base_url, &[board, "jobs"])?;
        url.query_pairs_mut().append_pair("content", "true");

        let response = self.http.get(url.as_str()).await?;
        if !response.is_success() {
            return Err(AppError::source_failure(
                format!("greenhouse/{board}"),
                format!("HTTP {}", response.status),
            ));
        }

        let payload: BoardResponse = response.json()?;
        Ok(payload
            .jobs
            .into_iter()
            .filter(|job| job.matches(tokens))
            .filter_map(|job| {
                NativeJob::Greenhouse {
                    board: board.to_string(),
                    job,
                }
                .normalize()
            })
            .take(cap)
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for GreenhouseAdapter {
    fn source(&self) -> JobSource {
        JobSource::Greenhouse
    }

    fn is_enabled(&self, options: &SearchOptions) -> bool {
        !options.greenhouse_boards.is_empty()
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> FetchOutcome {
        let tokens = query_tokens(query);
        let boards = &options.greenhouse_boards;

        let results = join_all(
            boards
                .iter()
                .map(|board| self.fetch_board(board, &tokens, options.results)),
        )
        .await;

        fold_identifier_results(
            self.source(),
            boards.iter().map(String::as_str).zip(results).collect(),
        )
    }
}

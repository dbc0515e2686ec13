// src/services/aggregated.rs

//! Multi-site scraper adapter.
//!
//! The scraper itself lives outside this crate and is reached through the
//! `JobScraper` capability. `HttpScraper` talks to a scraper service that
//! accepts a JSON `ScrapeRequest` and answers with an array of records.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{
    JobSource, NormalizedJob, SearchOptions, UNKNOWN_COMPANY, UNTITLED, format_salary,
};
use crate::services::{FetchOutcome, NativeJob, SourceAdapter};

/// Parameters handed to the scraper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub site_name: Vec<String>,
    pub search_term: String,
    pub location: Option<String>,
    pub is_remote: bool,
    pub results_wanted: usize,
    pub job_type: Option<String>,
    pub hours_old: Option<u32>,
    pub description_format: String,
    pub fetch_full_description: bool,
    pub proxy: Option<String>,
}

impl ScrapeRequest {
    /// Build the request for a query. `None` when no scraped site applies.
    pub fn from_options(query: &str, options: &SearchOptions) -> Option<Self> {
        let sites = options.scraped_sites();
        if sites.is_empty() {
            return None;
        }

        Some(Self {
            site_name: sites.iter().map(|s| s.as_str().to_string()).collect(),
            search_term: query.to_string(),
            location: options.location.clone(),
            is_remote: options.remote,
            results_wanted: options.results,
            job_type: options.job_type.clone(),
            hours_old: options.hours_old,
            description_format: "markdown".to_string(),
            fetch_full_description: true,
            proxy: options.proxy.clone(),
        })
    }
}

/// A record as produced by the scraper. Accepts camelCase or snake_case keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedJob {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "is_remote")]
    pub is_remote: Option<bool>,
    #[serde(default, alias = "job_url")]
    pub job_url: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default, alias = "date_posted")]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "min_amount")]
    pub min_amount: Option<f64>,
    #[serde(default, alias = "max_amount")]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

pub(super) fn normalize(job: ScrapedJob) -> Option<NormalizedJob> {
    let job_url = job.job_url.filter(|u| !u.trim().is_empty())?;
    let salary = format_salary(
        job.min_amount,
        job.max_amount,
        job.interval.as_deref(),
        job.currency.as_deref(),
    );

    Some(NormalizedJob {
        title: job
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        company: job
            .company
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
        location: job.location.unwrap_or_default(),
        is_remote: job.is_remote.unwrap_or(false),
        job_url,
        source: JobSource::Aggregated,
        date_posted: job.date_posted.filter(|d| !d.trim().is_empty()),
        salary,
        description: job.description.unwrap_or_default(),
    })
}

/// External multi-site scraping capability.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<ScrapedJob>>;
}

/// `JobScraper` that POSTs the request to a scraper service.
pub struct HttpScraper {
    client: reqwest::Client,
    url: String,
}

impl HttpScraper {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl JobScraper for HttpScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<ScrapedJob>> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::source_failure(
                "scraper",
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Adapter over the multi-site scraper.
pub struct AggregatedAdapter {
    scraper: Arc<dyn JobScraper>,
}

impl AggregatedAdapter {
    pub fn new(scraper: Arc<dyn JobScraper>) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl SourceAdapter for AggregatedAdapter {
    fn source(&self) -> JobSource {
        JobSource::Aggregated
    }

    fn is_enabled(&self, options: &SearchOptions) -> bool {
        !options.scraped_sites().is_empty()
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> FetchOutcome {
        let Some(request) = ScrapeRequest::from_options(query, options) else {
            return FetchOutcome::Fetched(Vec::new());
        };

        match self.scraper.scrape(&request).await {
            Ok(records) => {
                let total = records.len();
                let jobs: Vec<NormalizedJob> = records
                    .into_iter()
                    .filter_map(|record| NativeJob::Scraped(record).normalize())
                    .collect();
                if jobs.len() < total {
                    log::debug!("Dropped {} scraped records without a URL", total - jobs.len());
                }
                FetchOutcome::Fetched(jobs)
            }
            Err(error) => {
                log::warn!(
                    "Scraper failed for sites [{}]: {}",
                    request.site_name.join(", "),
                    error
                );
                FetchOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}

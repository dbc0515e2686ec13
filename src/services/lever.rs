// src/services/lever.rs

//! Lever postings adapter.
//!
//! `GET {base}/{site}?mode=json` returns a bare array of postings.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{
    JobSource, NormalizedJob, SearchOptions, UNTITLED, format_salary, is_remote_location,
};
use crate::services::{FetchOutcome, NativeJob, SourceAdapter, fold_identifier_results};
use crate::utils::http::HttpFetch;
use crate::utils::time::millis_to_iso;
use crate::utils::url::endpoint;
use crate::utils::{matches_any_token, query_tokens};

/// A posting as returned by the Lever postings API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverPosting {
    /// Posting title
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub hosted_url: Option<String>,
    #[serde(default)]
    pub categories: LeverCategories,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub description_plain: Option<String>,
    /// Raw HTML
    #[serde(default)]
    pub description: Option<String>,
    /// "remote", "hybrid", "on-site" or "unspecified"
    #[serde(default)]
    pub workplace_type: Option<String>,
    #[serde(default)]
    pub salary_range: Option<LeverSalaryRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeverCategories {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub commitment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeverSalaryRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

impl LeverPosting {
    fn matches(&self, tokens: &[String]) -> bool {
        matches_any_token(
            tokens,
            &[
                self.text.as_deref().unwrap_or(""),
                self.categories.location.as_deref().unwrap_or(""),
                self.categories.team.as_deref().unwrap_or(""),
            ],
        )
    }
}

pub(super) fn normalize(site: &str, posting: LeverPosting) -> Option<NormalizedJob> {
    let job_url = posting.hosted_url.filter(|u| !u.trim().is_empty())?;
    let location = posting.categories.location.unwrap_or_default();
    let remote_workplace = posting
        .workplace_type
        .as_deref()
        .is_some_and(|w| w.eq_ignore_ascii_case("remote"));

    let salary = posting.salary_range.and_then(|range| {
        format_salary(
            range.min,
            range.max,
            range.interval.as_deref(),
            range.currency.as_deref(),
        )
    });

    let description = posting
        .description_plain
        .filter(|d| !d.trim().is_empty())
        .or(posting.description)
        .unwrap_or_default();

    Some(NormalizedJob {
        title: posting
            .text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        company: site.to_string(),
        is_remote: remote_workplace || is_remote_location(&location),
        location,
        job_url,
        source: JobSource::Lever,
        date_posted: posting.created_at.and_then(millis_to_iso),
        salary,
        description,
    })
}

/// Adapter over the Lever postings API.
pub struct LeverAdapter {
    http: Arc<dyn HttpFetch>,
    base_url: String,
}

impl LeverAdapter {
    pub fn new(http: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch one site and keep the relevant postings.
    async fn fetch_site(
        &self,
        site: &str,
        tokens: &[String],
        cap: usize,
    ) -> Result<Vec<NormalizedJob>> {
        let mut url = endpoint(&self.base_url, &[site])?;
        url.query_pairs_mut().append_pair("mode", "json");

        let response = self.http.get(url.as_str()).await?;
        if !response.is_success() {
            return Err(AppError::source_failure(
                format!("lever/{site}"),
                format!("HTTP {}", response.status),
            ));
        }

        let postings: Vec<LeverPosting> = response.json()?;
        Ok(postings
            .into_iter()
            .filter(|posting| posting.matches(tokens))
            .filter_map(|posting| {
                NativeJob::Lever {
                    site: site.to_string(),
                    posting,
                }
                .normalize()
            })
            .take(cap)
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for LeverAdapter {
    fn source(&self) -> JobSource {
        JobSource::Lever
    }

    fn is_enabled(&self, options: &SearchOptions) -> bool {
        !options.lever_sites.is_empty()
    }

    async fn fetch(&self, query: &str, options: &SearchOptions) -> FetchOutcome {
        let tokens = query_tokens(query);
        let sites = &options.lever_sites;

        let results = join_all(
            sites
                .iter()
                .map(|site| self.fetch_site(site, &tokens, options.results)),
        )
        .await;

        fold_identifier_results(
            self.source(),
            sites.iter().map(String::as_str).zip(results).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::HttpResponse;

    struct StaticFetch(HttpResponse);

    #[async_trait]
    impl HttpFetch for StaticFetch {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            assert!(url.ends_with("?mode=json"), "unexpected url {url}");
            Ok(self.0.clone())
        }
    }

    fn adapter(status: u16, body: serde_json::Value) -> LeverAdapter {
        LeverAdapter::new(
            Arc::new(StaticFetch(HttpResponse {
                status,
                body: body.to_string(),
            })),
            "https://lever.test/v0/postings",
        )
    }

    fn options() -> SearchOptions {
        SearchOptions {
            lever_sites: vec!["globex".to_string()],
            ..SearchOptions::default()
        }
    }

    fn postings() -> serde_json::Value {
        serde_json::json!([
            {
                "text": "Site Reliability Engineer",
                "hostedUrl": "https://jobs.lever.co/globex/abc",
                "categories": {"location": "Toronto", "team": "Infrastructure"},
                "createdAt": 1700000000000i64,
                "descriptionPlain": "Keep things up.",
                "description": "<div>Keep things up.</div>",
                "workplaceType": "remote",
                "salaryRange": {"min": 120000, "max": 150000, "currency": "CAD", "interval": "per-year-salary"}
            },
            {
                "text": "Account Executive",
                "hostedUrl": "https://jobs.lever.co/globex/def",
                "categories": {"location": "Austin", "team": "Platform Sales"},
                "description": "<p>Sell</p>"
            }
        ])
    }

    #[tokio::test]
    async fn test_maps_posting() {
        let jobs = adapter(200, postings())
            .fetch("reliability", &options())
            .await
            .into_jobs();

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.company, "globex");
        assert_eq!(job.location, "Toronto");
        assert!(job.is_remote);
        assert_eq!(job.date_posted.as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(job.description, "Keep things up.");
        assert_eq!(
            job.salary.as_deref(),
            Some("CAD 120,000-150,000/per-year-salary")
        );
    }

    #[tokio::test]
    async fn test_team_field_is_searched() {
        let jobs = adapter(200, postings())
            .fetch("platform", &options())
            .await
            .into_jobs();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Account Executive");
        assert!(!jobs[0].is_remote);
        assert_eq!(jobs[0].description, "<p>Sell</p>");
        assert_eq!(jobs[0].date_posted, None);
        assert_eq!(jobs[0].salary, None);
    }

    #[tokio::test]
    async fn test_server_error_fails_source() {
        let outcome = adapter(503, serde_json::json!({"ok": false}))
            .fetch("engineer", &options())
            .await;
        assert!(outcome.is_failed());
    }

    #[tokio::test]
    async fn test_object_payload_is_malformed() {
        let outcome = adapter(200, serde_json::json!({"postings": []}))
            .fetch("engineer", &options())
            .await;
        assert!(outcome.is_failed());
    }
}

// src/pipeline/search.rs

//! Search orchestration: cache lookup, adapter fan-out, merge, dedup, store.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, JobSource, NormalizedJob, SearchOptions};
use crate::pipeline::dedup::dedup_jobs;
use crate::services::{
    AggregatedAdapter, FetchOutcome, GreenhouseAdapter, HttpScraper, LeverAdapter, SourceAdapter,
};
use crate::storage::{
    CacheKey, CacheStore, FileCache, SEARCH_CACHE_TTL, SEARCH_NAMESPACE, get_typed, set_typed,
};
use crate::utils::http::{ReqwestFetcher, create_async_client};

/// What one adapter contributed to a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: JobSource,
    pub fetched: usize,
    /// Set when the source failed entirely
    pub error: Option<String>,
}

/// Result of a search plus how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub jobs: Vec<NormalizedJob>,
    pub cache_hit: bool,
    /// One entry per adapter that ran, in source order. Empty on a cache hit.
    pub sources: Vec<SourceReport>,
}

/// Aggregates job postings from all configured sources.
pub struct JobSearch {
    /// Adapters in source order; merge order follows this list
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl JobSearch {
    /// Create a search over the given adapters and cache.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            adapters,
            cache,
            ttl: SEARCH_CACHE_TTL,
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Wire the standard adapters and the on-disk cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let fetcher = Arc::new(ReqwestFetcher::new(client.clone()));
        let scraper = Arc::new(HttpScraper::new(client, &config.sources.scraper_url));

        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(AggregatedAdapter::new(scraper)),
            Arc::new(GreenhouseAdapter::new(
                fetcher.clone(),
                &config.sources.greenhouse_api,
            )),
            Arc::new(LeverAdapter::new(fetcher, &config.sources.lever_api)),
        ];
        let cache = Arc::new(FileCache::new(&config.cache.dir));

        Ok(Self::new(adapters, cache).with_ttl(config.cache_ttl()))
    }

    /// TTL this search applies to cached results.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a query and its options.
    pub fn cache_key(query: &str, options: &SearchOptions) -> Result<CacheKey> {
        CacheKey::new(SEARCH_NAMESPACE, &(query.trim(), options))
    }

    /// Search every enabled source and return the deduplicated jobs.
    ///
    /// The query must be non-blank; that is the only error returned.
    /// Unreachable sources and cache faults degrade to fewer results.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<NormalizedJob>> {
        Ok(self.search_with_report(query, options).await?.jobs)
    }

    /// Same as [`JobSearch::search`], also reporting cache and per-source status.
    pub async fn search_with_report(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("search query must not be empty"));
        }

        let key = Self::cache_key(query, options)?;
        match get_typed::<Vec<NormalizedJob>>(self.cache.as_ref(), &key, self.ttl).await {
            Ok(Some(jobs)) => {
                log::info!("Cache hit for '{}': {} jobs", query, jobs.len());
                return Ok(SearchReport {
                    jobs,
                    cache_hit: true,
                    sources: Vec::new(),
                });
            }
            Ok(None) => log::debug!("Cache miss for '{}'", query),
            Err(e) => log::warn!("Cache read failed for '{}', fetching live: {}", query, e),
        }

        let enabled: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|adapter| adapter.is_enabled(options))
            .collect();

        log::info!(
            "Searching '{}' across {} source(s)",
            query,
            enabled.len()
        );

        let outcomes = join_all(enabled.iter().map(|adapter| adapter.fetch(query, options))).await;

        let mut sources = Vec::with_capacity(outcomes.len());
        let mut merged = Vec::new();
        for (adapter, outcome) in enabled.iter().zip(outcomes) {
            let report = SourceReport {
                source: adapter.source(),
                fetched: outcome.job_count(),
                error: match &outcome {
                    FetchOutcome::Failed { reason } => Some(reason.clone()),
                    FetchOutcome::Fetched(_) => None,
                },
            };
            match &report.error {
                Some(reason) => log::warn!("Source {} failed: {}", report.source, reason),
                None => log::info!("Source {}: {} jobs", report.source, report.fetched),
            }
            sources.push(report);
            merged.extend(outcome.into_jobs());
        }

        let total = merged.len();
        let jobs = dedup_jobs(merged);
        log::info!(
            "Merged {} jobs ({} duplicates removed)",
            jobs.len(),
            total - jobs.len()
        );

        if let Err(e) = set_typed(self.cache.as_ref(), &key, &jobs).await {
            log::warn!("Cache write failed for '{}': {}", query, e);
        }

        Ok(SearchReport {
            jobs,
            cache_hit: false,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoardSite;
    use crate::storage::MemoryCache;
    use crate::utils::time::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAdapter {
        source: JobSource,
        enabled: bool,
        outcome: FetchOutcome,
        calls: AtomicUsize,
    }

    impl FakeAdapter {
        fn new(source: JobSource, outcome: FetchOutcome) -> Arc<Self> {
            Arc::new(Self {
                source,
                enabled: true,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceAdapter for FakeAdapter {
        fn source(&self) -> JobSource {
            self.source
        }

        fn is_enabled(&self, _options: &SearchOptions) -> bool {
            self.enabled
        }

        async fn fetch(&self, _query: &str, _options: &SearchOptions) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &CacheKey, _ttl: Duration) -> Result<Option<Value>> {
            Err(AppError::cache("disk on fire"))
        }
        async fn set(&self, _key: &CacheKey, _value: Value) -> Result<()> {
            Err(AppError::cache("disk on fire"))
        }
        async fn clear(&self) -> Result<usize> {
            Err(AppError::cache("disk on fire"))
        }
        async fn prune(&self, _ttl: Duration) -> Result<usize> {
            Err(AppError::cache("disk on fire"))
        }
        async fn len(&self) -> Result<usize> {
            Err(AppError::cache("disk on fire"))
        }
    }

    fn job(url: &str, source: JobSource) -> NormalizedJob {
        NormalizedJob {
            title: "Software Engineer".to_string(),
            company: "acme".to_string(),
            location: "Remote".to_string(),
            is_remote: true,
            job_url: url.to_string(),
            source,
            date_posted: None,
            salary: None,
            description: String::new(),
        }
    }

    fn adapters(list: &[Arc<FakeAdapter>]) -> Vec<Arc<dyn SourceAdapter>> {
        list.iter()
            .map(|a| a.clone() as Arc<dyn SourceAdapter>)
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_merge_and_cache() {
        let first = FakeAdapter::new(
            JobSource::Aggregated,
            FetchOutcome::Fetched(vec![
                job("https://jobs.example.com/1", JobSource::Aggregated),
                job("https://jobs.example.com/2", JobSource::Aggregated),
            ]),
        );
        let second = FakeAdapter::new(
            JobSource::Greenhouse,
            FetchOutcome::Fetched(vec![
                job("https://jobs.example.com/2/?gh_src=x", JobSource::Greenhouse),
                job("https://jobs.example.com/3", JobSource::Greenhouse),
            ]),
        );
        let cache = Arc::new(MemoryCache::new());
        let search = JobSearch::new(adapters(&[first.clone(), second.clone()]), cache.clone());
        let options = SearchOptions::default();

        let report = search
            .search_with_report("software engineer", &options)
            .await
            .unwrap();
        assert!(!report.cache_hit);
        assert_eq!(report.jobs.len(), 3);
        assert_eq!(report.jobs[1].source, JobSource::Aggregated);
        assert_eq!(report.jobs[2].job_url, "https://jobs.example.com/3");
        assert_eq!(cache.len().await.unwrap(), 1);

        let key = JobSearch::cache_key("software engineer", &options).unwrap();
        let cached: Vec<NormalizedJob> = get_typed(cache.as_ref(), &key, SEARCH_CACHE_TTL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached, report.jobs);

        let again = search
            .search_with_report("software engineer", &options)
            .await
            .unwrap();
        assert!(again.cache_hit);
        assert_eq!(again.jobs, report.jobs);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let ok_a = FakeAdapter::new(
            JobSource::Aggregated,
            FetchOutcome::Fetched(vec![job("https://a.test/1", JobSource::Aggregated)]),
        );
        let broken = FakeAdapter::new(
            JobSource::Greenhouse,
            FetchOutcome::Failed {
                reason: "HTTP 500".to_string(),
            },
        );
        let ok_b = FakeAdapter::new(
            JobSource::Lever,
            FetchOutcome::Fetched(vec![job("https://b.test/1", JobSource::Lever)]),
        );
        let search = JobSearch::new(
            adapters(&[ok_a, broken, ok_b]),
            Arc::new(MemoryCache::new()),
        );

        let report = search
            .search_with_report("engineer", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(report.jobs.len(), 2);
        assert_eq!(report.sources.len(), 3);
        assert_eq!(report.sources[1].error.as_deref(), Some("HTTP 500"));
        assert_eq!(report.sources[2].fetched, 1);
    }

    #[tokio::test]
    async fn test_all_sources_failed_is_empty_not_error() {
        let broken = FakeAdapter::new(
            JobSource::Lever,
            FetchOutcome::Failed {
                reason: "timeout".to_string(),
            },
        );
        let search = JobSearch::new(adapters(&[broken]), Arc::new(MemoryCache::new()));

        let jobs = search
            .search("engineer", &SearchOptions::default())
            .await
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let adapter = FakeAdapter::new(JobSource::Lever, FetchOutcome::Fetched(Vec::new()));
        let search = JobSearch::new(adapters(&[adapter.clone()]), Arc::new(MemoryCache::new()));

        let err = search.search("   ", &SearchOptions::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_disabled_adapters_are_skipped() {
        let enabled = FakeAdapter::new(JobSource::Aggregated, FetchOutcome::Fetched(Vec::new()));
        let disabled = Arc::new(FakeAdapter {
            source: JobSource::Lever,
            enabled: false,
            outcome: FetchOutcome::Fetched(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let search = JobSearch::new(
            adapters(&[enabled.clone(), disabled.clone()]),
            Arc::new(MemoryCache::new()),
        );

        let report = search
            .search_with_report("engineer", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(report.sources.len(), 1);
        assert_eq!(enabled.calls(), 1);
        assert_eq!(disabled.calls(), 0);
    }

    #[tokio::test]
    async fn test_broken_cache_falls_back_to_live_fetch() {
        let adapter = FakeAdapter::new(
            JobSource::Aggregated,
            FetchOutcome::Fetched(vec![job("https://a.test/1", JobSource::Aggregated)]),
        );
        let search = JobSearch::new(adapters(&[adapter.clone()]), Arc::new(BrokenCache));

        for _ in 0..2 {
            let jobs = search
                .search("engineer", &SearchOptions::default())
                .await
                .unwrap();
            assert_eq!(jobs.len(), 1);
        }
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        ));
        let adapter = FakeAdapter::new(JobSource::Aggregated, FetchOutcome::Fetched(Vec::new()));
        let search = JobSearch::new(
            adapters(&[adapter.clone()]),
            Arc::new(MemoryCache::with_clock(clock.clone())),
        );
        let options = SearchOptions::default();

        search.search("rust", &options).await.unwrap();
        clock.advance(chrono::Duration::minutes(10));
        search.search("rust", &options).await.unwrap();
        assert_eq!(adapter.calls(), 1);

        clock.advance(chrono::Duration::minutes(25));
        search.search("rust", &options).await.unwrap();
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_different_options_use_different_entries() {
        let adapter = FakeAdapter::new(JobSource::Aggregated, FetchOutcome::Fetched(Vec::new()));
        let search = JobSearch::new(adapters(&[adapter.clone()]), Arc::new(MemoryCache::new()));

        let indeed = SearchOptions {
            site: Some(BoardSite::Indeed),
            ..SearchOptions::default()
        };
        search.search("rust", &SearchOptions::default()).await.unwrap();
        search.search("rust", &indeed).await.unwrap();
        search.search("  rust ", &indeed).await.unwrap();
        assert_eq!(adapter.calls(), 2);
    }
}

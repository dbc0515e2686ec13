//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SearchOptions;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Source endpoints and default identifiers
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Search result cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.cache.ttl_minutes == 0 {
            return Err(AppError::config("cache.ttl_minutes must be > 0"));
        }
        if self.search.results == 0 {
            return Err(AppError::config("search.results must be > 0"));
        }
        for (name, value) in [
            ("sources.greenhouse_api", &self.sources.greenhouse_api),
            ("sources.lever_api", &self.sources.lever_api),
            ("sources.scraper_url", &self.sources.scraper_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::config(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_minutes.saturating_mul(60))
    }

    /// Fill unset option fields from the configured defaults.
    pub fn apply_defaults(&self, options: &mut SearchOptions) {
        if options.greenhouse_boards.is_empty() {
            options.greenhouse_boards = self.sources.greenhouse_boards.clone();
        }
        if options.lever_sites.is_empty() {
            options.lever_sites = self.sources.lever_sites.clone();
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Source endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Greenhouse job-board API base
    #[serde(default = "defaults::greenhouse_api")]
    pub greenhouse_api: String,

    /// Lever postings API base
    #[serde(default = "defaults::lever_api")]
    pub lever_api: String,

    /// Multi-site scraper service endpoint
    #[serde(default = "defaults::scraper_url")]
    pub scraper_url: String,

    /// Greenhouse boards searched when the caller names none
    #[serde(default)]
    pub greenhouse_boards: Vec<String>,

    /// Lever sites searched when the caller names none
    #[serde(default)]
    pub lever_sites: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            greenhouse_api: defaults::greenhouse_api(),
            lever_api: defaults::lever_api(),
            scraper_url: defaults::scraper_url(),
            greenhouse_boards: Vec::new(),
            lever_sites: Vec::new(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cache entries
    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,

    #[serde(default = "defaults::ttl_minutes")]
    pub ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: defaults::cache_dir(),
            ttl_minutes: defaults::ttl_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-source result cap when the caller gives none
    #[serde(default = "defaults::results")]
    pub results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results: defaults::results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter (overridden by RUST_LOG)
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::options::DEFAULT_RESULTS;
    use crate::storage::SEARCH_CACHE_TTL;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobscout/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Source defaults
    pub fn greenhouse_api() -> String {
        "https://boards-api.greenhouse.io/v1/boards".into()
    }
    pub fn lever_api() -> String {
        "https://api.lever.co/v0/postings".into()
    }
    pub fn scraper_url() -> String {
        "http://127.0.0.1:8765/scrape".into()
    }

    // Cache defaults
    pub fn cache_dir() -> PathBuf {
        PathBuf::from(".cache/jobscout")
    }
    pub fn ttl_minutes() -> u64 {
        SEARCH_CACHE_TTL.as_secs() / 60
    }

    pub fn results() -> usize {
        DEFAULT_RESULTS
    }
    pub fn level() -> String {
        "info".into()
    }
}

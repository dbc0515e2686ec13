//! Per-search options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default number of results requested from each source.
pub const DEFAULT_RESULTS: usize = 15;

/// A board that `SearchOptions::site` can restrict a search to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSite {
    Indeed,
    Linkedin,
    Greenhouse,
    Lever,
}

impl BoardSite {
    /// Sites reachable through the multi-site scraper.
    pub const SCRAPED: [BoardSite; 2] = [BoardSite::Indeed, BoardSite::Linkedin];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardSite::Indeed => "indeed",
            BoardSite::Linkedin => "linkedin",
            BoardSite::Greenhouse => "greenhouse",
            BoardSite::Lever => "lever",
        }
    }

    /// Whether the scraper serves this site.
    pub fn is_scraped(&self) -> bool {
        Self::SCRAPED.contains(self)
    }
}

impl fmt::Display for BoardSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardSite {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indeed" => Ok(BoardSite::Indeed),
            "linkedin" => Ok(BoardSite::Linkedin),
            "greenhouse" => Ok(BoardSite::Greenhouse),
            "lever" => Ok(BoardSite::Lever),
            other => Err(AppError::validation(format!(
                "unknown site '{other}' (expected indeed, linkedin, greenhouse or lever)"
            ))),
        }
    }
}

/// Immutable configuration for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Restrict the search to a single board
    #[serde(default)]
    pub site: Option<BoardSite>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub remote: bool,

    /// Advisory per-source cap on how many records to request
    #[serde(default = "default_results")]
    pub results: usize,

    /// e.g. "fulltime", "contract"
    #[serde(default)]
    pub job_type: Option<String>,

    /// Maximum posting age in hours
    #[serde(default)]
    pub hours_old: Option<u32>,

    /// Greenhouse board tokens
    #[serde(default)]
    pub greenhouse_boards: Vec<String>,

    /// Lever site identifiers
    #[serde(default)]
    pub lever_sites: Vec<String>,

    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_results() -> usize {
    DEFAULT_RESULTS
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            site: None,
            location: None,
            remote: false,
            results: DEFAULT_RESULTS,
            job_type: None,
            hours_old: None,
            greenhouse_boards: Vec::new(),
            lever_sites: Vec::new(),
            proxy: None,
        }
    }
}

impl SearchOptions {
    /// Scraper sites to query given the `site` restriction.
    ///
    /// Empty when `site` names a board the scraper does not serve.
    pub fn scraped_sites(&self) -> Vec<BoardSite> {
        match self.site {
            Some(site) if site.is_scraped() => vec![site],
            Some(_) => Vec::new(),
            None => BoardSite::SCRAPED.to_vec(),
        }
    }
}

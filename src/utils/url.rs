// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Normalize a job URL into a key comparable across sources.
///
/// Drops the query string and fragment, trailing slashes and surrounding
/// whitespace, then case-folds.
///
/// # Examples
/// ```
/// use jobscout::utils::url::dedup_key;
///
/// assert_eq!(
///     dedup_key("https://Jobs.Example.com/123/?utm_source=x"),
///     "https://jobs.example.com/123"
/// );
/// ```
pub fn dedup_key(url: &str) -> String {
    let trimmed = url.trim();
    let without_query = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed);
    without_query.trim_end_matches('/').to_lowercase()
}

/// Append path segments to a base URL, percent-encoding each segment.
///
/// # Examples
/// ```
/// use jobscout::utils::url::endpoint;
///
/// let url = endpoint("https://api.lever.co/v0/postings", &["acme co"]).unwrap();
/// assert_eq!(url.as_str(), "https://api.lever.co/v0/postings/acme%20co");
/// ```
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("base URL cannot take a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

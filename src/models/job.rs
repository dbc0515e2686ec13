//! Normalized job record shared by every source.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::utils::url::dedup_key;

/// Placeholder used when a source omits the job title.
pub const UNTITLED: &str = "Untitled";

/// Placeholder used when a source omits the company name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Which adapter produced a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    /// Multi-site scraper (Indeed, LinkedIn)
    Aggregated,
    /// Greenhouse job-board API
    Greenhouse,
    /// Lever postings API
    Lever,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Aggregated => "aggregated",
            JobSource::Greenhouse => "greenhouse",
            JobSource::Lever => "lever",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting in the canonical, source-agnostic shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub is_remote: bool,

    /// Canonical identity anchor, never empty
    pub job_url: String,

    pub source: JobSource,

    /// ISO-8601 timestamp or date when the source exposes one
    pub date_posted: Option<String>,

    /// Pre-formatted salary, see [`format_salary`]
    pub salary: Option<String>,

    pub description: String,
}

impl NormalizedJob {
    /// Key used to detect the same posting across sources.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.job_url)
    }

    /// Stable content-derived identifier (first 16 hex chars of SHA-256 over the URL).
    pub fn id(&self) -> String {
        let digest = Sha256::digest(self.job_url.as_bytes());
        hex::encode(digest)[..16].to_string()
    }
}

/// Whether a free-form location string describes a remote position.
pub fn is_remote_location(location: &str) -> bool {
    location.to_lowercase().contains("remote")
}

/// Format a salary range for display.
///
/// - both bounds: `"USD 120,000-150,000/yearly"`
/// - only min: `"USD 120,000+/yearly"`
/// - only max: `"up to USD 150,000/yearly"`
/// - neither: `None`
///
/// Zero or non-finite bounds count as absent. Missing currency falls back to
/// `USD` and missing interval to `yearly`.
pub fn format_salary(
    min: Option<f64>,
    max: Option<f64>,
    interval: Option<&str>,
    currency: Option<&str>,
) -> Option<String> {
    let min = min.filter(|v| v.is_finite() && *v > 0.0);
    let max = max.filter(|v| v.is_finite() && *v > 0.0);
    let currency = currency.filter(|c| !c.trim().is_empty()).unwrap_or("USD");
    let interval = interval.filter(|i| !i.trim().is_empty()).unwrap_or("yearly");

    match (min, max) {
        (Some(min), Some(max)) => Some(format!(
            "{currency} {}-{}/{interval}",
            group_thousands(min),
            group_thousands(max)
        )),
        (Some(min), None) => Some(format!("{currency} {}+/{interval}", group_thousands(min))),
        (None, Some(max)) => Some(format!(
            "up to {currency} {}/{interval}",
            group_thousands(max)
        )),
        (None, None) => None,
    }
}

fn group_thousands(value: f64) -> String {
    let digits = (value.round() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(url: &str) -> NormalizedJob {
        NormalizedJob {
            title: "Backend Engineer".to_string(),
            company: "acme".to_string(),
            location: "Remote".to_string(),
            is_remote: true,
            job_url: url.to_string(),
            source: JobSource::Greenhouse,
            date_posted: None,
            salary: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_format_salary_range() {
        assert_eq!(
            format_salary(Some(120000.0), Some(150000.0), Some("yearly"), Some("USD")),
            Some("USD 120,000-150,000/yearly".to_string())
        );
    }

    #[test]
    fn test_format_salary_max_only() {
        assert_eq!(
            format_salary(None, Some(150000.0), Some("yearly"), Some("USD")),
            Some("up to USD 150,000/yearly".to_string())
        );
    }

    #[test]
    fn test_format_salary_min_only() {
        assert_eq!(
            format_salary(Some(45.5), None, Some("hourly"), Some("EUR")),
            Some("EUR 46+/hourly".to_string())
        );
    }

    #[test]
    fn test_format_salary_none() {
        assert_eq!(format_salary(None, None, None, None), None);
        assert_eq!(format_salary(Some(0.0), None, None, None), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
    }

    #[test]
    fn test_remote_detection() {
        assert!(is_remote_location("Remote - US"));
        assert!(is_remote_location("New York or REMOTE"));
        assert!(!is_remote_location("Berlin"));
    }

    #[test]
    fn test_id_is_stable_per_url() {
        let a = sample_job("https://jobs.example.com/1");
        let b = sample_job("https://jobs.example.com/1");
        let c = sample_job("https://jobs.example.com/2");
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().len(), 16);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample_job("https://x.test/1")).unwrap();
        assert_eq!(json["jobUrl"], "https://x.test/1");
        assert_eq!(json["isRemote"], true);
        assert_eq!(json["source"], "greenhouse");
        assert!(json["datePosted"].is_null());
    }
}

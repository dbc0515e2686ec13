// src/pipeline/dedup.rs

//! Cross-source deduplication.

use std::collections::HashSet;

use crate::models::NormalizedJob;

/// Keep the first job for each normalized URL, preserving input order.
pub fn dedup_jobs(jobs: impl IntoIterator<Item = NormalizedJob>) -> Vec<NormalizedJob> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for job in jobs {
        if seen.insert(job.dedup_key()) {
            deduped.push(job);
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobSource;

    fn make_job(url: &str, source: JobSource) -> NormalizedJob {
        NormalizedJob {
            title: "Engineer".to_string(),
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

    #[test]
    fn test_first_occurrence_wins() {
        let jobs = vec![
            make_job("https://jobs.example.com/1", JobSource::Aggregated),
            make_job("https://JOBS.example.com/1/?ref=lever", JobSource::Lever),
            make_job("https://jobs.example.com/2", JobSource::Greenhouse),
        ];

        let deduped = dedup_jobs(jobs);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].source, JobSource::Aggregated);
        assert_eq!(deduped[0].job_url, "https://jobs.example.com/1");
        assert_eq!(deduped[1].job_url, "https://jobs.example.com/2");
    }

    #[test]
    fn test_idempotent() {
        let jobs = vec![
            make_job("https://a.test/x", JobSource::Lever),
            make_job("https://a.test/x/", JobSource::Lever),
            make_job("https://a.test/y", JobSource::Lever),
        ];

        let once = dedup_jobs(jobs);
        let twice = dedup_jobs(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_distinct_paths_survive() {
        let jobs = vec![
            make_job("https://a.test/jobs/1", JobSource::Greenhouse),
            make_job("https://a.test/jobs/10", JobSource::Greenhouse),
        ];
        assert_eq!(dedup_jobs(jobs).len(), 2);
    }
}

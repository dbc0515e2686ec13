//! jobscout CLI
//!
//! Thin command-line surface over the search pipeline and its cache.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobscout::{
    error::Result,
    models::{BoardSite, Config, LoggingConfig, NormalizedJob, SearchOptions},
    pipeline::{JobSearch, SearchReport},
    storage::{CacheStore, FileCache},
};
use serde::Serialize;

/// jobscout - Job Posting Aggregator
#[derive(Parser, Debug)]
#[command(
    name = "jobscout",
    version,
    about = "Search job boards and public job APIs in one go"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "jobscout.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all enabled sources
    Search(SearchArgs),

    /// Manage the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Validate configuration file
    Validate,

    /// Show configuration and cache info
    Info,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Search terms, e.g. "software engineer"
    query: String,

    /// Restrict to one board: indeed, linkedin, greenhouse, lever
    #[arg(long, value_parser = parse_site)]
    site: Option<BoardSite>,

    #[arg(short, long)]
    location: Option<String>,

    /// Only remote positions (scraped boards)
    #[arg(long)]
    remote: bool,

    /// Results requested per source
    #[arg(short = 'n', long, value_parser = parse_results)]
    results: Option<usize>,

    /// Job type, e.g. fulltime, contract
    #[arg(long)]
    job_type: Option<String>,

    /// Maximum posting age in hours
    #[arg(long)]
    hours_old: Option<u32>,

    /// Greenhouse board tokens (comma separated)
    #[arg(long, value_delimiter = ',')]
    greenhouse: Vec<String>,

    /// Lever site identifiers (comma separated)
    #[arg(long, value_delimiter = ',')]
    lever: Vec<String>,

    /// Proxy forwarded to the scraper
    #[arg(long)]
    proxy: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Remove every cached search
    Clear,
    /// Remove expired cached searches
    Prune,
}

/// Job plus its derived identifier, as printed by `--json`.
#[derive(Serialize)]
struct JobRow<'a> {
    id: String,
    #[serde(flatten)]
    job: &'a NormalizedJob,
}

fn parse_site(value: &str) -> std::result::Result<BoardSite, String> {
    value.parse().map_err(|e: jobscout::error::AppError| e.to_string())
}

fn parse_results(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

impl SearchArgs {
    fn into_options(self, config: &Config) -> (String, SearchOptions, bool) {
        let mut options = SearchOptions {
            site: self.site,
            location: self.location,
            remote: self.remote,
            results: self.results.unwrap_or(config.search.results),
            job_type: self.job_type,
            hours_old: self.hours_old,
            greenhouse_boards: self.greenhouse,
            lever_sites: self.lever,
            proxy: self.proxy,
        };
        config.apply_defaults(&mut options);
        (self.query, options, self.json)
    }
}

fn print_report(report: &SearchReport) {
    if report.cache_hit {
        log::info!("Served from cache");
    }
    for source in &report.sources {
        match &source.error {
            Some(error) => log::warn!("{}: failed ({})", source.source, error),
            None => log::info!("{}: {} jobs", source.source, source.fetched),
        }
    }

    if report.jobs.is_empty() {
        println!("No jobs found.");
        return;
    }

    for (i, job) in report.jobs.iter().enumerate() {
        let remote = if job.is_remote { " [remote]" } else { "" };
        println!("{:>3}. {} @ {}{}", i + 1, job.title, job.company, remote);
        if !job.location.is_empty() {
            println!("     {}", job.location);
        }
        if let Some(salary) = &job.salary {
            println!("     {}", salary);
        }
        if let Some(date) = &job.date_posted {
            println!("     posted {}", date);
        }
        println!("     {} ({}, id {})", job.job_url, job.source, job.id());
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| LoggingConfig::default().level);
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::debug!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Search(args) => {
            config.validate()?;
            let (query, options, as_json) = args.into_options(&config);
            let search = JobSearch::from_config(&config)?;
            let report = search.search_with_report(&query, &options).await?;

            if as_json {
                let rows: Vec<JobRow<'_>> = report
                    .jobs
                    .iter()
                    .map(|job| JobRow { id: job.id(), job })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_report(&report);
            }
        }

        Command::Cache { action } => {
            let cache = FileCache::new(&config.cache.dir);
            match action {
                CacheAction::Clear => {
                    let removed = cache.clear().await?;
                    println!("Removed {} cached searches", removed);
                }
                CacheAction::Prune => {
                    let removed = cache.prune(config.cache_ttl()).await?;
                    println!("Removed {} expired cached searches", removed);
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let cache = FileCache::new(&config.cache.dir);
            println!("Config file: {}", cli.config.display());
            println!("Cache directory: {}", cache.root_dir().display());
            println!("Cache TTL: {} minutes", config.cache.ttl_minutes);
            println!("Cached searches: {}", cache.len().await?);
            println!(
                "Default boards: greenhouse [{}], lever [{}]",
                config.sources.greenhouse_boards.join(", "),
                config.sources.lever_sites.join(", ")
            );
        }
    }

    Ok(())
}

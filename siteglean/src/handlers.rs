use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use siteglean_core::crawl::{CrawlOptions, execute_crawl};
use siteglean_core::openai::API_KEY_ENV;
use siteglean_core::output::documents_to_json;
use siteglean_core::report::{ReportFormat, render_report, save_report};
use siteglean_core::scanner::{CrawlConfig, Crawler};
use siteglean_core::{HarvestError, InstructionParser, KeywordParser, OpenAiParser, ScrapeClient};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Install the global subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(url: Option<&Url>, hosts_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err(anyhow!("Either --url or --hosts-file must be provided"))
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(anyhow!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if url.has_host() && !line.contains(char::is_whitespace) => Some(with_scheme),
        _ => None,
    }
}

/// Expand a leading `~` in a user-supplied output path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Crawl tuning shared by the `crawl` and `scrape` subcommands.
pub fn crawl_config_from_args(args: &ArgMatches) -> CrawlConfig {
    let defaults = CrawlConfig::default();
    CrawlConfig {
        workers: args.get_one::<usize>("threads").copied().unwrap_or(defaults.workers).max(1),
        max_retries: args
            .get_one::<u32>("retries")
            .copied()
            .unwrap_or(defaults.max_retries)
            .max(1),
        timeout: args
            .get_one::<u64>("timeout")
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(defaults.timeout),
        ..defaults
    }
}

fn depth_from_args(args: &ArgMatches) -> usize {
    args.get_one::<usize>("depth").copied().unwrap_or(3)
}

/// A receiver that flips to `true` on Ctrl-C.
fn ctrl_c_cancellation() -> watch::Receiver<bool> {
    let (cancel, cancelled) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with the pages fetched so far");
            let _ = cancel.send(true);
        }
    });
    cancelled
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let config = crawl_config_from_args(sub_matches);
    let max_depth = depth_from_args(sub_matches);
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let urls = load_urls_from_source(url, hosts_file)?;

    // Only the report itself goes to stdout.
    if !quiet {
        eprintln!("\nCrawling {} host(s)", urls.len());
        eprintln!("Workers: {}", config.workers);
        eprintln!("Max depth: {}", max_depth);
        eprintln!("Attempts per page: {}\n", config.max_retries);
    }

    let options = CrawlOptions {
        urls,
        config,
        max_depth,
        show_progress_bars: !quiet,
        cancel: Some(ctrl_c_cancellation()),
    };

    let progress_callback = Arc::new(|msg: String| {
        eprintln!("{}", msg);
    });

    let reports = execute_crawl(options, Some(progress_callback)).await?;
    if reports.is_empty() {
        return Err(anyhow!("No host could be crawled"));
    }

    let report = render_report(&reports, format)?;
    match sub_matches.get_one::<PathBuf>("output") {
        Some(path) => {
            let path = expand_path(path);
            save_report(&report, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("{} Report saved to {}", "✓".green(), path.display());
        }
        None => print!("{}", report),
    }

    Ok(())
}

/// Pick the instruction parser: local keywords with `--offline`, otherwise
/// the chat model keyed by `--api-key` / `OPENAI_API_KEY`.
pub fn parser_from_args(sub_matches: &ArgMatches) -> Result<Arc<dyn InstructionParser>> {
    if sub_matches.get_flag("offline") {
        return Ok(Arc::new(KeywordParser::new()));
    }

    let api_key = sub_matches
        .get_one::<String>("api-key")
        .filter(|key| !key.trim().is_empty())
        .ok_or(HarvestError::MissingApiKey(API_KEY_ENV))?;
    let mut parser = OpenAiParser::new(api_key.clone())?;
    if let Some(model) = sub_matches.get_one::<String>("model") {
        parser = parser.with_model(model.clone());
    }
    Ok(Arc::new(parser))
}

pub async fn handle_scrape(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches
        .get_one::<Url>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;
    let instructions = sub_matches
        .get_one::<String>("instructions")
        .ok_or_else(|| anyhow!("--instructions is required"))?;
    let max_depth = depth_from_args(sub_matches);

    let parser = parser_from_args(sub_matches)?;
    let crawler = Crawler::with_config(crawl_config_from_args(sub_matches))?
        .with_cancellation(ctrl_c_cancellation());
    let client = ScrapeClient::new(parser, crawler);

    info!("Scraping {} (max depth {})", url, max_depth);

    match sub_matches.get_one::<PathBuf>("output") {
        Some(path) => {
            let path = expand_path(path);
            let written = client
                .scrape_to_file(url.as_str(), instructions, max_depth, &path)
                .await?;
            if !quiet {
                eprintln!("{} Wrote {} document(s) to {}", "✓".green(), written, path.display());
            }
        }
        None => {
            let documents = client.scrape(url.as_str(), instructions, max_depth).await?;
            println!("{}", documents_to_json(&documents)?);
        }
    }

    Ok(())
}

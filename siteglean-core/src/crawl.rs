use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use siteglean_scanner::{CrawlConfig, CrawlReport, CrawlTask, Crawler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub urls: Vec<String>,
    pub config: CrawlConfig,
    pub max_depth: usize,
    pub show_progress_bars: bool,
    /// Flips to `true` to abandon the crawl in progress.
    pub cancel: Option<watch::Receiver<bool>>,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting crawl...");
    pb
}

/// Crawl each seed in turn. A seed that cannot be crawled is reported
/// through `progress_callback` and skipped; the rest still run.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<Vec<CrawlReport>> {
    let CrawlOptions {
        urls,
        config,
        max_depth,
        show_progress_bars,
        cancel,
    } = options;

    let progress_bar = show_progress_bars.then(|| Arc::new(spinner()));
    let processed_count = Arc::new(AtomicUsize::new(0));

    let mut crawler = Crawler::with_config(config)?;
    if let Some(cancel) = cancel {
        crawler = crawler.with_cancellation(cancel);
    }
    if let Some(ref pb) = progress_bar {
        let pb = pb.clone();
        let count = processed_count.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |task: &CrawlTask| {
            let n = count.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!(
                "Crawling... {} URLs started (depth {}: {})",
                n,
                task.depth,
                extract_url_path(&task.url)
            ));
        }));
    }

    let mut reports = Vec::new();
    for (idx, url) in urls.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && urls.len() > 1
        {
            callback(format!("Crawling host {}/{}: {}", idx + 1, urls.len(), url));
        }

        match crawler.crawl_report(url, max_depth).await {
            Ok(report) => {
                let cancelled = report.cancelled;
                reports.push(report);
                if cancelled {
                    break;
                }
            }
            Err(e) => {
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to crawl {}: {}", url, e));
                }
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
    }

    Ok(reports)
}

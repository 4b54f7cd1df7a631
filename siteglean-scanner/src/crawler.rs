use crate::config::CrawlConfig;
use crate::error::{Result, ScanError};
use crate::extract::extract_hrefs;
use crate::fetcher::Fetcher;
use crate::result::{CrawlReport, FailedFetch};
use crate::scope::DomainScope;
use crate::store::{PageStore, VisitedSet};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(&CrawlTask) + Send + Sync>;

/// One URL to fetch, and how many links away from the seed it was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub url: String,
    pub depth: usize,
}

impl CrawlTask {
    fn child(&self, url: String) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

enum TaskOutcome {
    /// Page stored; these children were discovered and claimed.
    Expanded(Vec<CrawlTask>),
    Failed(FailedFetch),
}

// Lives for exactly one crawl call.
struct CrawlState {
    scope: DomainScope,
    visited: VisitedSet,
    pages: PageStore,
    max_depth: usize,
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
    progress_callback: Option<ProgressCallback>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlConfig::default())
    }

    pub fn with_config(config: CrawlConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            progress_callback: None,
            cancel: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Abandon the crawl once `true` is sent on the paired sender. Queued
    /// tasks are dropped, in-flight fetches are aborted, and the pages
    /// stored so far are returned.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from `seed` and return URL -> body for every page fetched.
    /// Depth 0 fetches only the seed.
    pub async fn crawl(&self, seed: &str, max_depth: usize) -> Result<HashMap<String, String>> {
        Ok(self.crawl_report(seed, max_depth).await?.pages)
    }

    /// Like [`Crawler::crawl`], but also reports which tasks failed and why.
    pub async fn crawl_report(&self, seed: &str, max_depth: usize) -> Result<CrawlReport> {
        let seed = parse_seed(seed)?;
        let workers = self.config.workers.max(1);
        info!(
            "Starting crawl of {} with {} workers, max depth {}",
            seed, workers, max_depth
        );

        let state = Arc::new(CrawlState {
            scope: DomainScope::new(&seed).map_err(|e| ScanError::InvalidUrl(e.to_string()))?,
            visited: VisitedSet::new(),
            pages: PageStore::new(),
            max_depth,
        });
        state.visited.test_and_set(&seed).await;

        let mut report = CrawlReport::new(seed.clone(), max_depth);
        let mut queue = VecDeque::from([CrawlTask {
            url: seed.clone(),
            depth: 0,
        }]);
        let mut in_flight: JoinSet<TaskOutcome> = JoinSet::new();
        let mut panicked = 0usize;

        // Without an external signal, hold a sender so `changed()` stays pending.
        let (_idle_sender, idle_receiver) = watch::channel(false);
        let mut cancel = self.cancel.clone().unwrap_or(idle_receiver);
        let mut cancel_open = true;
        let mut cancelled = *cancel.borrow_and_update();

        loop {
            while !cancelled && in_flight.len() < workers {
                let Some(task) = queue.pop_front() else {
                    break;
                };
                if let Some(ref callback) = self.progress_callback {
                    callback(&task);
                }
                let fetcher = self.fetcher.clone();
                let state = state.clone();
                in_flight.spawn(async move { run_task(fetcher, state, task).await });
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                joined = in_flight.join_next() => match joined {
                    Some(Ok(TaskOutcome::Expanded(children))) => {
                        if !cancelled {
                            queue.extend(children);
                        }
                    }
                    Some(Ok(TaskOutcome::Failed(failure))) => report.failures.push(failure),
                    Some(Err(e)) if e.is_cancelled() => {}
                    Some(Err(e)) => {
                        error!("Crawl task panicked: {}", e);
                        panicked += 1;
                    }
                    None => {}
                },
                changed = cancel.changed(), if cancel_open => match changed {
                    Ok(()) => {
                        if *cancel.borrow_and_update() && !cancelled {
                            warn!(
                                "Crawl of {} cancelled; dropping {} queued and {} running task(s)",
                                seed,
                                queue.len(),
                                in_flight.len()
                            );
                            cancelled = true;
                            queue.clear();
                            in_flight.abort_all();
                        }
                    }
                    Err(_) => cancel_open = false,
                },
            }
        }

        report.pages = state.pages.take().await;
        report.visited = state.visited.len().await;
        report.cancelled = cancelled;

        info!(
            "Crawl complete. Fetched {} pages, {} failed, {} URLs visited",
            report.pages.len(),
            report.failures.len(),
            report.visited
        );

        let failures = report.failures.len() + panicked;
        if report.pages.is_empty() && failures > 0 {
            return Err(ScanError::NothingFetched {
                url: seed,
                failures,
            });
        }

        Ok(report)
    }
}

fn parse_seed(seed: &str) -> Result<String> {
    let parsed = Url::parse(seed).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ScanError::InvalidUrl(format!(
            "{}: only http(s) URLs with a host can be crawled",
            seed
        )));
    }
    Ok(parsed.to_string())
}

async fn run_task(fetcher: Fetcher, state: Arc<CrawlState>, task: CrawlTask) -> TaskOutcome {
    debug!("Crawling {} at depth {}", task.url, task.depth);

    let page = match fetcher.fetch(&task.url).await {
        Ok(page) => page,
        Err(e) => return TaskOutcome::Failed(FailedFetch::new(task.url, task.depth, &e)),
    };
    if !state.scope.contains(&page.url) {
        warn!("{} redirected out of scope to {}", task.url, page.url);
        return TaskOutcome::Failed(FailedFetch::off_site(task.url, task.depth, &page.url));
    }

    // Relative links are relative to where the body was actually served from.
    let mut children = Vec::new();
    if task.depth < state.max_depth {
        for href in extract_hrefs(&page.body) {
            if let Some(url) = state.scope.admit(&page.url, &href)
                && state.visited.test_and_set(&url).await
            {
                children.push(task.child(url));
            }
        }
        debug!("{} yielded {} new link(s)", task.url, children.len());
    }

    state.pages.put(task.url, page.body).await;
    TaskOutcome::Expanded(children)
}

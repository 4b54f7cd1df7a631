use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    RetriesExhausted,
    /// Redirected to a URL outside the crawl's host.
    OffSite,
}

/// A task that produced no page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFetch {
    pub url: String,
    pub depth: usize,
    pub kind: FailureKind,
    pub reason: String,
}

impl FailedFetch {
    pub fn new(url: String, depth: usize, error: &FetchError) -> Self {
        let kind = if error.is_not_found() {
            FailureKind::NotFound
        } else {
            FailureKind::RetriesExhausted
        };
        Self {
            url,
            depth,
            kind,
            reason: error.to_string(),
        }
    }

    pub fn off_site(url: String, depth: usize, landed_on: &str) -> Self {
        Self {
            reason: format!("redirected off-site to {}", landed_on),
            url,
            depth,
            kind: FailureKind::OffSite,
        }
    }
}

/// Everything one crawl produced: the page bodies plus the per-task
/// failures that were contained along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: usize,
    pub pages: HashMap<String, String>,
    pub failures: Vec<FailedFetch>,
    /// URLs that were scheduled, fetched or not.
    pub visited: usize,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn new(seed: String, max_depth: usize) -> Self {
        Self {
            seed,
            max_depth,
            ..Self::default()
        }
    }

    pub fn not_found(&self) -> impl Iterator<Item = &FailedFetch> {
        self.failures
            .iter()
            .filter(|f| f.kind == FailureKind::NotFound)
    }

    /// Page URLs in sorted order.
    pub fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }
}

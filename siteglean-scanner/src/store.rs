use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// URLs already handed to a worker during one crawl.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `url`, returning `true` only for the caller that inserted it.
    /// Check and insert happen under the same lock.
    pub async fn test_and_set(&self, url: &str) -> bool {
        let mut visited = self.inner.lock().await;
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

/// Bodies of successfully fetched pages, keyed by URL.
#[derive(Debug, Default)]
pub struct PageStore {
    pages: Mutex<HashMap<String, String>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are write-once; a second `put` for the same URL is ignored
    /// and reported as `false`.
    pub async fn put(&self, url: String, body: String) -> bool {
        let mut pages = self.pages.lock().await;
        if pages.contains_key(&url) {
            return false;
        }
        pages.insert(url, body);
        true
    }

    pub async fn len(&self) -> usize {
        self.pages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.pages.lock().await.clone()
    }

    /// Drain the store once the crawl has finished.
    pub async fn take(&self) -> HashMap<String, String> {
        std::mem::take(&mut *self.pages.lock().await)
    }
}

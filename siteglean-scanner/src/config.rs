use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_USER_AGENT: &str = concat!("siteglean/", env!("CARGO_PKG_VERSION"));

/// Tunables shared by the fetcher and the scheduler.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Upper bound on fetches in flight.
    pub workers: usize,
    /// Total attempts per URL, including the first one.
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            backoff: DEFAULT_BACKOFF,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

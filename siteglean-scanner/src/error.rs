use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Nothing fetched from {url}: all {failures} task(s) failed")]
    NothingFetched { url: String, failures: usize },
}

/// Why a single fetch produced no page. These never abort a crawl; the
/// scheduler records them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("not found (404): {0}")]
    NotFound(String),

    #[error("transient failure for {url}: {reason}")]
    Transient { url: String, reason: String },

    #[error("gave up on {url} after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::NotFound(url) => url,
            FetchError::Transient { url, .. } => url,
            FetchError::RetriesExhausted { url, .. } => url,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

use siteglean_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Crawl failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Relevance check failed: {0}")]
    Relevance(String),

    #[error("An API key must be provided (pass one explicitly or set {0})")]
    MissingApiKey(&'static str),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;

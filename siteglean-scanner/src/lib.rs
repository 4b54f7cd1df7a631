pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod result;
pub mod scope;
pub mod store;

pub use config::CrawlConfig;
pub use crawler::{CrawlTask, Crawler, ProgressCallback};
pub use error::{FetchError, ScanError};
pub use extract::{ExtractedContent, extract_content};
pub use fetcher::{FetchedPage, Fetcher};
pub use result::{CrawlReport, FailedFetch, FailureKind};
pub use scope::{DomainScope, in_scope};
pub use store::{PageStore, VisitedSet};

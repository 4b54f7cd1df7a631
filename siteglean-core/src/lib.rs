pub mod client;
pub mod crawl;
pub mod document;
pub mod error;
pub mod openai;
pub mod output;
pub mod relevance;
pub mod report;

pub use client::ScrapeClient;
pub use document::{Document, generate_doc};
pub use error::{HarvestError, Result};
pub use openai::OpenAiParser;
pub use relevance::{InstructionParser, KeywordParser};

/// Re-exported so downstream crates need only one dependency.
pub use siteglean_scanner as scanner;
pub use siteglean_scanner::{ExtractedContent, extract_content};

/// Printed to stderr so stdout stays clean for reports and documents.
pub fn print_banner() {
    use colored::Colorize;
    eprintln!(
        "{} {}",
        "siteglean".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    eprintln!("{}", "crawl a site, keep what matters\n".dimmed());
}

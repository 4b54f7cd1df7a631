use crate::document::{Document, generate_doc};
use crate::error::Result;
use crate::openai::OpenAiParser;
use crate::output::write_documents;
use crate::relevance::InstructionParser;
use futures::stream::{self, StreamExt};
use siteglean_scanner::{CrawlConfig, Crawler, extract_content};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Crawl a site, keep the pages that match the user's instructions, and
/// turn them into documents.
pub struct ScrapeClient {
    parser: Arc<dyn InstructionParser>,
    crawler: Crawler,
}

impl ScrapeClient {
    pub fn new(parser: Arc<dyn InstructionParser>, crawler: Crawler) -> Self {
        Self { parser, crawler }
    }

    /// OpenAI parser keyed from the environment, default crawl settings.
    pub fn from_env() -> Result<Self> {
        let parser = OpenAiParser::from_env()?;
        let crawler = Crawler::with_config(CrawlConfig::default())?;
        info!("Scrape client initialized with API key from the environment");
        Ok(Self::new(Arc::new(parser), crawler))
    }

    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }

    /// Documents for every relevant page within `max_depth` links of `url`,
    /// ordered by URL.
    pub async fn scrape(&self, url: &str, instructions: &str, max_depth: usize) -> Result<Vec<Document>> {
        info!("Starting scrape on {} with max depth {}", url, max_depth);

        let keywords = self.parser.parse_instructions(instructions).await?;
        debug!("Keywords extracted: {}", keywords);

        let pages = self.crawler.crawl(url, max_depth).await?;
        info!("Crawled {} pages from {}", pages.len(), url);

        let documents = self.select_documents(pages, &keywords).await;
        info!("Scraping completed, {} documents extracted", documents.len());
        Ok(documents)
    }

    /// Same as [`ScrapeClient::scrape`] but writes the documents to `path`
    /// as JSON and returns how many were written.
    pub async fn scrape_to_file(
        &self,
        url: &str,
        instructions: &str,
        max_depth: usize,
        path: &Path,
    ) -> Result<usize> {
        let documents = self.scrape(url, instructions, max_depth).await?;
        write_documents(path, &documents)?;
        info!("Wrote {} documents to {}", documents.len(), path.display());
        Ok(documents.len())
    }

    /// Extract and classify crawled pages. Relevance failures skip the page.
    pub async fn select_documents(&self, pages: HashMap<String, String>, keywords: &str) -> Vec<Document> {
        let parser = &self.parser;
        let concurrency = self.crawler.config().workers.max(1);

        let mut documents: Vec<Document> = stream::iter(pages)
            .map(|(url, html)| async move {
                let content = extract_content(&html);
                debug!("Extracted content from {}", url);
                match parser.is_relevant(&content, keywords).await {
                    Ok(true) => {
                        debug!("Document generated for {}", url);
                        Some(generate_doc(&url, &content))
                    }
                    Ok(false) => {
                        debug!("Irrelevant content skipped for {}", url);
                        None
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", url, e);
                        None
                    }
                }
            })
            .buffer_unordered(concurrency)
            .filter_map(|document| async move { document })
            .collect()
            .await;

        documents.sort_by(|a, b| a.url.cmp(&b.url));
        documents
    }
}

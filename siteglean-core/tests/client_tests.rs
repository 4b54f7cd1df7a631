// End-to-end tests for the scrape pipeline

use async_trait::async_trait;
use siteglean_core::output::read_documents;
use siteglean_core::scanner::{CrawlConfig, Crawler};
use siteglean_core::{
    ExtractedContent, HarvestError, InstructionParser, KeywordParser, Result, ScrapeClient,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn crawler() -> Crawler {
    Crawler::with_config(CrawlConfig {
        workers: 4,
        max_retries: 2,
        backoff: Duration::from_millis(5),
        timeout: Duration::from_secs(2),
        ..CrawlConfig::default()
    })
    .unwrap()
}

async fn mount(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html.to_string()),
        )
        .mount(server)
        .await;
}

async fn university_site() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        r#"<html><head><title>Computer Science</title></head><body>
            <h1>Department</h1>
            <p>Welcome to the department.</p>
            <a href="/admissions">Admissions</a>
            <a href="/faculty">Faculty</a>
            <a href="https://elsewhere.example/">Partner</a>
        </body></html>"#,
    )
    .await;
    mount(
        &server,
        "/admissions",
        r#"<html><head><title>Admissions</title></head><body>
            <h2>Applying</h2>
            <p>Admissions deadlines are in January.</p>
            <p>Tuition is listed per credit.</p>
        </body></html>"#,
    )
    .await;
    mount(
        &server,
        "/faculty",
        r#"<html><head><title>Faculty</title></head><body>
            <p>Our researchers work on compilers.</p>
        </body></html>"#,
    )
    .await;
    server
}

#[tokio::test]
async fn test_scrape_keeps_only_relevant_pages() {
    let server = university_site().await;
    let client = ScrapeClient::new(Arc::new(KeywordParser::new()), crawler());

    let documents = client
        .scrape(&server.uri(), "Find admissions deadlines", 1)
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    let doc = &documents[0];
    assert_eq!(doc.url, format!("{}/admissions", server.uri()));
    assert_eq!(doc.title, "Admissions");
    assert_eq!(
        doc.content,
        vec!["Admissions deadlines are in January.", "Tuition is listed per credit."]
    );
}

#[tokio::test]
async fn test_scrape_documents_are_sorted_by_url() {
    let server = university_site().await;
    let client = ScrapeClient::new(Arc::new(KeywordParser::new()), crawler());

    // No content words: every page is relevant.
    let documents = client.scrape(&server.uri(), "all of it", 1).await.unwrap();

    let urls: Vec<_> = documents.iter().map(|d| d.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", server.uri()),
            format!("{}/admissions", server.uri()),
            format!("{}/faculty", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_scrape_to_file_writes_json() {
    let server = university_site().await;
    let client = ScrapeClient::new(Arc::new(KeywordParser::new()), crawler());
    let dir = tempdir().unwrap();
    let out = dir.path().join("nested").join("docs.json");

    let written = client
        .scrape_to_file(&server.uri(), "compilers research", 1, &out)
        .await
        .unwrap();

    assert_eq!(written, 1);
    let documents = read_documents(&out).unwrap();
    assert_eq!(documents[0].title, "Faculty");

    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(raw.starts_with("[\n  {"));
}

struct FlakyJudge;

#[async_trait]
impl InstructionParser for FlakyJudge {
    async fn parse_instructions(&self, _instructions: &str) -> Result<String> {
        Ok("anything".to_string())
    }

    async fn is_relevant(&self, content: &ExtractedContent, _keywords: &str) -> Result<bool> {
        if content.title == "Faculty" {
            Err(HarvestError::Relevance("classifier unavailable".to_string()))
        } else {
            Ok(true)
        }
    }
}

#[tokio::test]
async fn test_relevance_failure_skips_page_but_not_crawl() {
    let server = university_site().await;
    let client = ScrapeClient::new(Arc::new(FlakyJudge), crawler());

    let documents = client.scrape(&server.uri(), "whatever", 1).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.title != "Faculty"));
}

#[tokio::test]
async fn test_scrape_of_unreachable_site_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ScrapeClient::new(Arc::new(KeywordParser::new()), crawler());
    let err = client.scrape(&server.uri(), "anything", 2).await.unwrap_err();

    assert!(matches!(err, HarvestError::Scan(_)));
}

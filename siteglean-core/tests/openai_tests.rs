// Tests for the chat-completions backed instruction parser

use siteglean_core::{ExtractedContent, HarvestError, InstructionParser, OpenAiParser};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": text}}]
    }))
}

fn parser(server: &MockServer) -> OpenAiParser {
    OpenAiParser::new("test-key")
        .unwrap()
        .with_base_url(format!("{}/v1/", server.uri()))
}

fn page(paragraphs: &[&str]) -> ExtractedContent {
    ExtractedContent {
        title: "Page".to_string(),
        headings: vec!["Heading".to_string()],
        paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        links: Vec::new(),
    }
}

#[tokio::test]
async fn test_parse_instructions_returns_trimmed_keywords() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("graduate admissions"))
        .respond_with(completion("  admissions, deadlines \n"))
        .expect(1)
        .mount(&server)
        .await;

    let keywords = parser(&server)
        .parse_instructions("Tell me about graduate admissions")
        .await
        .unwrap();

    assert_eq!(keywords, "admissions, deadlines");
}

#[tokio::test]
async fn test_parse_instructions_degrades_to_empty_on_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let keywords = parser(&server).parse_instructions("anything").await.unwrap();
    assert_eq!(keywords, "");
}

#[tokio::test]
async fn test_relevance_prompt_includes_paragraph_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("Tuition is listed per credit"))
        .respond_with(completion("Yes."))
        .expect(1)
        .mount(&server)
        .await;

    let relevant = parser(&server)
        .is_relevant(&page(&["Tuition is listed per credit."]), "tuition")
        .await
        .unwrap();

    assert!(relevant);
}

#[tokio::test]
async fn test_relevance_stops_at_first_yes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("alpha"))
        .respond_with(completion("No"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("beta"))
        .respond_with(completion("YES"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("gamma"))
        .respond_with(completion("Yes"))
        .expect(0)
        .mount(&server)
        .await;

    // Each word fills a chunk on its own.
    let relevant = parser(&server)
        .with_max_split_chars(4)
        .is_relevant(&page(&["alpha", "beta", "gamma"]), "greek")
        .await
        .unwrap();

    assert!(relevant);
}

#[tokio::test]
async fn test_relevance_errors_only_when_every_chunk_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = parser(&server)
        .is_relevant(&page(&["some text"]), "keywords")
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Relevance(_)));
}

#[tokio::test]
async fn test_relevance_no_answer_is_not_relevant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("No"))
        .mount(&server)
        .await;

    let relevant = parser(&server)
        .is_relevant(&page(&["unrelated"]), "keywords")
        .await
        .unwrap();

    assert!(!relevant);
}

#[tokio::test]
async fn test_relevance_unreachable_api_is_a_relevance_error() {
    // Bind then drop, so nothing is listening on the port.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let parser = OpenAiParser::new("test-key")
        .unwrap()
        .with_base_url(format!("http://127.0.0.1:{}/v1", port));

    let err = parser
        .is_relevant(&page(&["some text"]), "keywords")
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Relevance(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_relevance_malformed_reply_is_a_relevance_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = parser(&server)
        .is_relevant(&page(&["some text"]), "keywords")
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Relevance(_)), "got {:?}", err);
}

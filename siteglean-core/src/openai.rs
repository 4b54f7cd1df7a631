use crate::error::{HarvestError, Result};
use crate::relevance::{DEFAULT_MAX_SPLIT_CHARS, InstructionParser, relevance_text, split_text};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use siteglean_scanner::ExtractedContent;
use std::time::Duration;
use tracing::{debug, error};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const KEYWORD_PROMPT: &str = "Your task is to extract only the most relevant keywords from the \
    user's provided instructions. Return the keywords as a comma-separated list without \
    additional text or explanations.";
const RELEVANCE_PROMPT: &str = "Your task is to determine whether the provided content is \
    relevant to the given keywords. Be flexible in your assessment, allowing content that fits \
    the context.";

/// Chat-completions backed keyword extraction and relevance checks.
pub struct OpenAiParser {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_instruction_tokens: u32,
    max_relevance_tokens: u32,
    temperature: f32,
    max_split_chars: usize,
}

impl OpenAiParser {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_instruction_tokens: 60,
            max_relevance_tokens: 5,
            temperature: 0.0,
            max_split_chars: DEFAULT_MAX_SPLIT_CHARS,
        })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key),
            _ => Err(HarvestError::MissingApiKey(API_KEY_ENV)),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_split_chars(mut self, max_split_chars: usize) -> Self {
        self.max_split_chars = max_split_chars.max(1);
        self
    }

    async fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| HarvestError::Relevance("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(HarvestError::Relevance(format!(
                "chat completions returned {}: {}",
                status, text
            )));
        }

        let parsed: ChatResponse = resp.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default())
    }
}

#[async_trait]
impl InstructionParser for OpenAiParser {
    /// API failures degrade to an empty keyword list.
    async fn parse_instructions(&self, instructions: &str) -> Result<String> {
        debug!("Parsing instructions: {}", instructions);
        match self
            .chat(KEYWORD_PROMPT, instructions, self.max_instruction_tokens)
            .await
        {
            Ok(keywords) => {
                debug!("Extracted keywords: {}", keywords);
                Ok(keywords)
            }
            Err(e) => {
                error!("API error during instruction parsing: {}", e);
                Ok(String::new())
            }
        }
    }

    /// Relevant as soon as one chunk is judged relevant. A chunk whose call
    /// fails counts as "no"; if every call fails the error is returned.
    async fn is_relevant(&self, content: &ExtractedContent, keywords: &str) -> Result<bool> {
        let chunks = split_text(&relevance_text(content), self.max_split_chars);
        let mut last_error = None;
        let mut answered = 0;

        for chunk in &chunks {
            let prompt = format!(
                "Given the keywords: {}\n\nDetermine if the following content is relevant. \
                 Answer 'Yes' or 'No'.\n\nContent:\n{}",
                keywords, chunk
            );
            match self
                .chat(RELEVANCE_PROMPT, &prompt, self.max_relevance_tokens)
                .await
            {
                Ok(answer) => {
                    answered += 1;
                    let answer = answer.to_lowercase();
                    debug!("Relevance assessment result for chunk: {}", answer);
                    if answer.contains("yes") {
                        return Ok(true);
                    }
                }
                Err(e) => {
                    error!("API error during relevance assessment: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(HarvestError::Relevance(reason)) if answered == 0 => {
                Err(HarvestError::Relevance(reason))
            }
            Some(e) if answered == 0 => Err(HarvestError::Relevance(format!(
                "no relevance check succeeded: {}",
                e
            ))),
            _ => Ok(false),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

//! Turning free-text instructions into keywords, and deciding whether a
//! page matches them.

use crate::error::Result;
use async_trait::async_trait;
use siteglean_scanner::ExtractedContent;
use tracing::debug;

/// Chunk size, in characters, for text sent to a classifier.
pub const DEFAULT_MAX_SPLIT_CHARS: usize = 3000;

#[async_trait]
pub trait InstructionParser: Send + Sync {
    /// Reduce user instructions to a comma-separated keyword list.
    async fn parse_instructions(&self, instructions: &str) -> Result<String>;

    /// Whether `content` is relevant to `keywords`. An `Err` is treated by
    /// callers as "not relevant".
    async fn is_relevant(&self, content: &ExtractedContent, keywords: &str) -> Result<bool>;
}

/// Headings followed by paragraphs, space separated.
pub fn relevance_text(content: &ExtractedContent) -> String {
    content
        .headings
        .iter()
        .chain(content.paragraphs.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `text` on whitespace into chunks whose word lengths add up to at
/// least `max_chars` (the last chunk may be shorter).
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut length = 0;

    for word in text.split_whitespace() {
        length += word.chars().count();
        current.push(word);
        if length >= max_chars {
            chunks.push(current.join(" "));
            current.clear();
            length = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "from", "with", "about", "all", "any", "are", "that", "this", "these",
    "those", "into", "onto", "what", "which", "who", "how", "when", "where", "why", "find",
    "get", "give", "show", "list", "me", "please", "information", "info", "details", "data",
    "page", "pages", "site", "website", "extract", "collect", "gather", "want", "need", "can",
    "you", "your", "our", "their", "its", "has", "have", "was", "were", "will", "would",
    "should", "could", "not", "but", "more", "most", "some", "such", "than", "then", "there",
];

/// Offline parser: keywords are the distinct content words of the
/// instructions, and a page is relevant if it mentions any of them.
#[derive(Debug, Clone, Default)]
pub struct KeywordParser;

impl KeywordParser {
    pub fn new() -> Self {
        Self
    }

    pub fn keywords(instructions: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for word in instructions
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .map(|w| w.trim_matches('-').to_lowercase())
        {
            if word.chars().count() < 3 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }
        keywords
    }
}

#[async_trait]
impl InstructionParser for KeywordParser {
    async fn parse_instructions(&self, instructions: &str) -> Result<String> {
        let keywords = Self::keywords(instructions).join(", ");
        debug!("Extracted keywords: {}", keywords);
        Ok(keywords)
    }

    async fn is_relevant(&self, content: &ExtractedContent, keywords: &str) -> Result<bool> {
        let keywords = split_keywords(keywords);
        if keywords.is_empty() {
            return Ok(true);
        }
        let haystack = format!("{} {}", content.title, relevance_text(content)).to_lowercase();
        Ok(keywords.iter().any(|k| haystack.contains(k.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(headings: &[&str], paragraphs: &[&str]) -> ExtractedContent {
        ExtractedContent {
            title: String::new(),
            headings: headings.iter().map(|s| s.to_string()).collect(),
            paragraphs: paragraphs.iter().map(|s| s.to_string()).collect(),
            links: Vec::new(),
        }
    }

    #[test]
    fn test_split_text_flushes_once_threshold_is_reached() {
        let chunks = split_text("aaaa bbbb cc dddd", 8);
        assert_eq!(chunks, vec!["aaaa bbbb", "cc dddd"]);
    }

    #[test]
    fn test_split_text_keeps_short_tail_and_handles_empty() {
        assert_eq!(split_text("one two", 100), vec!["one two"]);
        assert!(split_text("   \n ", 100).is_empty());
    }

    #[test]
    fn test_relevance_text_includes_paragraphs() {
        let c = content(&["Heading"], &["First.", "Second."]);
        assert_eq!(relevance_text(&c), "Heading First. Second.");
    }

    #[test]
    fn test_keyword_parser_drops_stop_words_and_duplicates() {
        let keywords = KeywordParser::keywords("Find information about graduate admissions and admissions deadlines");
        assert_eq!(keywords, vec!["graduate", "admissions", "deadlines"]);
    }

    #[tokio::test]
    async fn test_keyword_parser_relevance() {
        let parser = KeywordParser::new();
        let keywords = parser
            .parse_instructions("Tuition fees for the masters program")
            .await
            .unwrap();
        assert_eq!(keywords, "tuition, fees, masters, program");

        let relevant = content(&["Costs"], &["Tuition is charged per credit."]);
        let unrelated = content(&["Faculty"], &["Meet our researchers."]);
        assert!(parser.is_relevant(&relevant, &keywords).await.unwrap());
        assert!(!parser.is_relevant(&unrelated, &keywords).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_keywords_match_everything() {
        let parser = KeywordParser::new();
        assert!(parser.is_relevant(&content(&[], &[]), " , ").await.unwrap());
    }
}

use serde::{Deserialize, Serialize};
use siteglean_scanner::ExtractedContent;

/// The relevant text of one page, ready for a retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub content: Vec<String>,
}

/// Project extracted content into a document: its title and paragraphs.
pub fn generate_doc(url: &str, content: &ExtractedContent) -> Document {
    Document {
        url: url.to_string(),
        title: content.title.clone(),
        content: content.paragraphs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_doc_keeps_title_and_paragraphs_only() {
        let content = ExtractedContent {
            title: "Admissions".to_string(),
            headings: vec!["Apply".to_string()],
            paragraphs: vec!["Deadline is May 1.".to_string(), "Fees apply.".to_string()],
            links: vec!["/apply".to_string()],
        };

        let doc = generate_doc("https://example.edu/admissions", &content);
        assert_eq!(doc.url, "https://example.edu/admissions");
        assert_eq!(doc.title, "Admissions");
        assert_eq!(doc.content, content.paragraphs);
    }

    #[test]
    fn test_document_serializes_as_url_title_content() {
        let doc = Document {
            url: "https://example.com/".to_string(),
            title: "Café".to_string(),
            content: vec!["Hi".to_string()],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://example.com/", "title": "Café", "content": ["Hi"]})
        );
    }
}

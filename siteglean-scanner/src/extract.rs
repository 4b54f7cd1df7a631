use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("title selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").expect("heading selector"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("p selector"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("a selector"));

/// What a single page has to say, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: String,
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    /// Raw `href` values; resolution against the page URL happens later.
    pub links: Vec<String>,
}

/// Parse an HTML body. Malformed markup is tolerated: a missing title is an
/// empty string and absent tags give empty lists.
pub fn extract_content(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(normalized_text)
        .unwrap_or_default();

    ExtractedContent {
        title,
        headings: document.select(&HEADINGS).map(normalized_text).collect(),
        paragraphs: document.select(&PARAGRAPHS).map(normalized_text).collect(),
        links: extract_links(&document),
    }
}

/// Only the raw `href`s, for the scheduler's hot path.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    extract_links(&Html::parse_document(html))
}

fn extract_links(document: &Html) -> Vec<String> {
    document
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

// Tag-stripped, whitespace collapsed to single spaces.
fn normalized_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_title_heading_paragraphs_and_link() {
        let html = r#"<html>
            <head><title>T</title></head>
            <body>
                <h1>Welcome</h1>
                <p>First paragraph.</p>
                <p>Second paragraph.</p>
                <a href="/next">Next</a>
            </body></html>"#;

        let content = extract_content(html);
        assert_eq!(content.title, "T");
        assert_eq!(content.headings, vec!["Welcome"]);
        assert_eq!(content.paragraphs.len(), 2);
        assert_eq!(content.links, vec!["/next"]);
    }

    #[test]
    fn test_attribute_order_and_whitespace_do_not_matter() {
        let html = "<html><head><title>\n   T  \n</title></head><body>\
            <h1   class='x'  >  Big\n  heading </h1>\
            <p>  one\t\ttwo  </p><p>three</p>\
            <a class=\"c\"\n   id='l' href = '/x' >x</a></body></html>";

        let content = extract_content(html);
        assert_eq!(content.title, "T");
        assert_eq!(content.headings, vec!["Big heading"]);
        assert_eq!(content.paragraphs, vec!["one two", "three"]);
        assert_eq!(content.links, vec!["/x"]);
    }

    #[test]
    fn test_only_levels_one_to_three_are_headings() {
        let html = "<h1>a</h1><h2>b</h2><h4>skip</h4><h3>c</h3><h6>skip</h6>";
        assert_eq!(extract_content(html).headings, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_tags_are_stripped() {
        let html = "<p>Hello <b>bold</b> and <a href='/l'>linked</a> world</p>";
        let content = extract_content(html);
        assert_eq!(content.paragraphs, vec!["Hello bold and linked world"]);
        assert_eq!(content.links, vec!["/l"]);
    }

    #[test]
    fn test_missing_tags_yield_empty_content() {
        let content = extract_content("<div>just text<a>no href</a></div>");
        assert_eq!(content, ExtractedContent::default());
    }

    #[test]
    fn test_links_keep_raw_href_values() {
        let html = r##"<a href="#top">t</a><a href="https://other.org/">o</a><a href="rel/page">r</a>"##;
        assert_eq!(
            extract_hrefs(html),
            vec!["#top", "https://other.org/", "rel/page"]
        );
    }
}

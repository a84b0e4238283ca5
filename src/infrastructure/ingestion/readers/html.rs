//! HTML reader

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::read_source_file;
use crate::domain::ingestion::Reader;
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Reader for HTML files: visible body text, skipping scripts and styles
#[derive(Debug, Clone, Default)]
pub struct HtmlReader;

impl HtmlReader {
    /// Create a new HTML reader
    pub fn new() -> Self {
        Self
    }

    fn extract_title(document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;
        document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_text(document: &Html) -> String {
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| document.select(&sel).next());

        match body {
            Some(body) => Self::element_text(&body),
            None => Self::normalize_text(&document.root_element().text().collect::<String>()),
        }
    }

    /// Visible text of an element, one line per block element
    pub(crate) fn element_text(element: &ElementRef) -> String {
        Self::normalize_text(&Self::collect_text(element))
    }

    fn collect_text(element: &ElementRef) -> String {
        let mut text = String::new();

        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag_name = el.value().name();

                if matches!(tag_name, "script" | "style" | "noscript" | "head") {
                    continue;
                }

                if matches!(
                    tag_name,
                    "p" | "div"
                        | "h1"
                        | "h2"
                        | "h3"
                        | "h4"
                        | "h5"
                        | "h6"
                        | "br"
                        | "li"
                        | "tr"
                        | "td"
                        | "th"
                ) && !text.is_empty()
                    && !text.ends_with('\n')
                {
                    text.push('\n');
                }

                text.push_str(&Self::collect_text(&el));

                if matches!(tag_name, "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
                    text.push('\n');
                }
            } else if let Some(txt) = node.value().as_text() {
                text.push_str(txt);
            }
        }

        text
    }

    fn normalize_text(text: &str) -> String {
        text.lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text and title of a page; kept synchronous so the parsed tree never crosses an await
    fn parse(raw: &str) -> (String, Option<String>) {
        let document = Html::parse_document(raw);
        (Self::extract_text(&document), Self::extract_title(&document))
    }
}

#[async_trait]
impl Reader for HtmlReader {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let raw = read_source_file(source).await?;
        let (content, title) = Self::parse(&raw);

        if content.is_empty() {
            return Ok(vec![]);
        }

        let mut document = Document::new(content).with_name(source);

        if let Some(title) = title {
            document = document.with_meta("title", serde_json::Value::String(title));
        }

        Ok(vec![document])
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Test Page</title><style>body { color: red; }</style></head>
        <body>
            <h1>Hello World</h1>
            <p>This is a <b>test</b> paragraph.</p>
            <script>console.log("hidden");</script>
            <ul><li>Item 1</li><li>Item 2</li></ul>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_extracts_visible_text() {
        let (text, title) = HtmlReader::parse(PAGE);

        assert_eq!(title.as_deref(), Some("Test Page"));
        assert!(text.contains("Hello World"));
        assert!(text.contains("This is a test paragraph."));
        assert!(text.contains("Item 1"));
        assert!(!text.contains("console.log"));
        assert!(!text.contains("color: red"));
    }

    #[tokio::test]
    async fn test_read_html_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", PAGE).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let docs = HtmlReader::new().read(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name.as_deref(), Some(path.as_str()));
        assert_eq!(
            docs[0].meta_data.get("title"),
            Some(&serde_json::json!("Test Page"))
        );
    }
}

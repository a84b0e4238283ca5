//! Markdown reader

use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, Tag};

use super::read_source_file;
use crate::domain::ingestion::Reader;
use crate::domain::knowledge_base::Document;
use crate::domain::DomainError;

/// Reader for Markdown files: markup is stripped, the first H1 becomes the title
#[derive(Debug, Clone, Default)]
pub struct MarkdownReader;

impl MarkdownReader {
    /// Create a new Markdown reader
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn extract_text_and_title(markdown: &str) -> (String, Option<String>) {
        let parser = Parser::new(markdown);
        let mut text = String::new();
        let mut title: Option<String> = None;
        let mut in_heading = false;
        let mut heading_level: i32 = 0;
        let mut current_heading = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::Heading(level, ..)) => {
                    in_heading = true;
                    heading_level = level as i32;
                    current_heading.clear();
                }
                Event::End(Tag::Heading(..)) => {
                    if heading_level == 1 && title.is_none() {
                        title = Some(current_heading.trim().to_string());
                    }

                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&current_heading);
                    text.push_str("\n\n");
                    in_heading = false;
                    current_heading.clear();
                }
                Event::Text(t) | Event::Code(t) => {
                    if in_heading {
                        current_heading.push_str(&t);
                    } else {
                        text.push_str(&t);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if in_heading {
                        current_heading.push(' ');
                    } else {
                        text.push('\n');
                    }
                }
                Event::Start(Tag::Paragraph)
                | Event::Start(Tag::Item)
                | Event::Start(Tag::CodeBlock(_)) => {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Event::End(Tag::Paragraph) | Event::End(Tag::CodeBlock(_)) => {
                    text.push_str("\n\n");
                }
                Event::End(Tag::Item) => {
                    if !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                _ => {}
            }
        }

        // Paragraph ends become blank lines so paragraph-aware chunking still sees them
        let text = text
            .split("\n\n")
            .map(|block| {
                block
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        (text, title)
    }
}

#[async_trait]
impl Reader for MarkdownReader {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let raw = read_source_file(source).await?;
        let (content, title) = Self::extract_text_and_title(&raw);

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
        "markdown"
    }
}

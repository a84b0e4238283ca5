//! Website reader: a bounded, polite breadth-first crawler

use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Url;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::html::HtmlReader;
use crate::domain::ingestion::{ChunkingStrategy, Reader};
use crate::domain::knowledge_base::{Document, META_URL};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// Class names that mark the main content block of a page, in priority order
const CONTENT_CLASSES: [&str; 5] = [
    "content",
    "main-content",
    "post-content",
    "entry-content",
    "article-body",
];

/// Link targets that are never crawled
const EXCLUDED_EXTENSIONS: [&str; 4] = [".pdf", ".jpg", ".jpeg", ".png"];

/// Crawl bounds and politeness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Deepest link level followed; the seed is depth 1
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of pages with extracted content
    #[serde(default = "default_max_links")]
    pub max_links: usize,
    /// Lower bound of the random delay before each fetch, in seconds
    #[serde(default = "default_min_delay")]
    pub min_delay: f64,
    /// Upper bound of the random delay before each fetch, in seconds
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_depth() -> usize {
    3
}

fn default_max_links() -> usize {
    10
}

fn default_min_delay() -> f64 {
    1.0
}

fn default_max_delay() -> f64 {
    3.0
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_links: default_max_links(),
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CrawlerConfig {
    /// Set the maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of extracted pages
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    /// Set the delay window in seconds
    pub fn with_delay(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_depth == 0 {
            return Err(DomainError::validation("max_depth must be at least 1"));
        }

        if self.max_links == 0 {
            return Err(DomainError::validation("max_links must be greater than 0"));
        }

        if !(self.min_delay >= 0.0 && self.min_delay <= self.max_delay) {
            return Err(DomainError::validation(
                "delay window must satisfy 0 <= min_delay <= max_delay",
            ));
        }

        if !self.max_delay.is_finite() {
            return Err(DomainError::validation("max_delay must be finite"));
        }

        Ok(())
    }

    /// Uniformly random delay inside the window
    fn politeness_delay(&self) -> Duration {
        if self.max_delay <= 0.0 {
            return Duration::ZERO;
        }

        let seconds = rand::thread_rng().gen_range(self.min_delay..=self.max_delay);
        Duration::from_secs_f64(seconds)
    }
}

/// Registrable part of a host: the last two labels, or the whole host for IPs
fn primary_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if bare.parse::<IpAddr>().is_ok() {
        return Some(host.to_lowercase());
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let start = labels.len().saturating_sub(2);

    Some(labels[start..].join(".").to_lowercase())
}

/// Main content of a page and every absolute link it contains.
///
/// Synchronous so the parsed document never lives across an await.
fn extract_page(base: &Url, html: &str) -> (String, Vec<Url>) {
    let document = Html::parse_document(html);

    (main_content(&document), page_links(base, &document))
}

fn main_content(document: &Html) -> String {
    let selectors = ["article".to_string(), "main".to_string()]
        .into_iter()
        .chain(CONTENT_CLASSES.iter().map(|class| format!(".{}", class)));

    for selector in selectors {
        let Ok(selector) = Selector::parse(&selector) else {
            continue;
        };

        if let Some(element) = document.select(&selector).next() {
            return HtmlReader::element_text(&element);
        }
    }

    String::new()
}

fn page_links(base: &Url, document: &Html) -> Vec<Url> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .collect()
}

fn is_excluded(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// State of one crawl; created fresh for every call so crawls never share state
#[derive(Debug)]
pub struct CrawlSession {
    domain: String,
    frontier: VecDeque<(Url, usize)>,
    visited: HashSet<String>,
    queued: HashSet<String>,
    pages: Vec<(String, String)>,
}

impl CrawlSession {
    /// Start a session seeded with `seed` at depth 1
    pub fn new(seed: &str) -> Result<Self, DomainError> {
        let mut seed = Url::parse(seed)
            .map_err(|e| DomainError::validation(format!("Invalid seed URL '{}': {}", seed, e)))?;
        seed.set_fragment(None);

        let domain = primary_domain(&seed).ok_or_else(|| {
            DomainError::validation(format!("Seed URL '{}' has no host", seed))
        })?;

        let mut queued = HashSet::new();
        queued.insert(seed.as_str().to_string());

        Ok(Self {
            domain,
            frontier: VecDeque::from([(seed, 1)]),
            visited: HashSet::new(),
            queued,
            pages: Vec::new(),
        })
    }

    /// Primary domain every crawled page must share
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Number of pages visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Extracted pages as (url, content), in crawl order
    pub fn into_pages(self) -> Vec<(String, String)> {
        self.pages
    }

    fn same_domain(&self, url: &Url) -> bool {
        primary_domain(url).is_some_and(|d| d == self.domain)
    }

    /// Next URL to fetch, applying every skip rule
    fn next_target(&mut self, config: &CrawlerConfig) -> Option<(Url, usize)> {
        while let Some((url, depth)) = self.frontier.pop_front() {
            if self.pages.len() >= config.max_links {
                return None;
            }

            if self.visited.contains(url.as_str())
                || !self.same_domain(&url)
                || depth > config.max_depth
            {
                continue;
            }

            self.visited.insert(url.as_str().to_string());
            return Some((url, depth));
        }

        None
    }

    fn record(&mut self, url: &Url, content: String) {
        if !content.is_empty() {
            self.pages.push((url.as_str().to_string(), content));
        }
    }

    fn enqueue(&mut self, links: Vec<Url>, depth: usize) {
        for link in links {
            let key = link.as_str().to_string();

            if self.visited.contains(&key)
                || self.queued.contains(&key)
                || is_excluded(&link)
                || !self.same_domain(&link)
            {
                continue;
            }

            self.queued.insert(key);
            self.frontier.push_back((link, depth));
        }
    }
}

/// Reader that crawls a website from a seed URL, one document per page
pub struct WebsiteReader<C: HttpClientTrait> {
    client: C,
    config: CrawlerConfig,
    chunker: Option<Arc<dyn ChunkingStrategy>>,
}

impl<C: HttpClientTrait> std::fmt::Debug for WebsiteReader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsiteReader")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("chunker", &self.chunker.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl<C: HttpClientTrait> WebsiteReader<C> {
    /// Create a new website reader
    pub fn new(client: C, config: CrawlerConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            client,
            config,
            chunker: None,
        })
    }

    /// Chunk every crawled page with this strategy
    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Get the crawler configuration
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl from `seed` and return (url, main content) for every extracted page
    pub async fn crawl(&self, seed: &str) -> Result<Vec<(String, String)>, DomainError> {
        let mut session = CrawlSession::new(seed)?;

        while let Some((url, depth)) = session.next_target(&self.config) {
            let delay = self.config.politeness_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let html = match self.client.get_text(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    debug!(url = %url, error = %e, "Failed to fetch page");
                    continue;
                }
            };

            let (content, links) = extract_page(&url, &html);
            debug!(url = %url, depth, chars = content.len(), links = links.len(), "Crawled page");

            session.record(&url, content);
            session.enqueue(links, depth + 1);
        }

        info!(
            seed = %seed,
            visited = session.visited_count(),
            pages = session.pages.len(),
            "Crawl finished"
        );

        Ok(session.into_pages())
    }

    async fn chunk_pages(&self, documents: Vec<Document>) -> Vec<Document> {
        let Some(ref chunker) = self.chunker else {
            return documents;
        };

        let mut chunked = Vec::with_capacity(documents.len());

        for document in documents {
            match chunker.chunk(&document).await {
                Ok(chunks) => chunked.extend(chunks),
                Err(e) => {
                    warn!(error = %e, "Chunking crawled page failed, keeping it whole");
                    chunked.push(document);
                }
            }
        }

        chunked
    }
}

#[async_trait]
impl<C: HttpClientTrait> Reader for WebsiteReader<C> {
    async fn read(&self, source: &str) -> Result<Vec<Document>, DomainError> {
        let pages = self.crawl(source).await?;

        let documents = pages
            .into_iter()
            .map(|(url, content)| {
                Document::new(content)
                    .with_name(source)
                    .with_meta(META_URL, serde_json::Value::String(url))
            })
            .collect();

        Ok(self.chunk_pages(documents).await)
    }

    fn name(&self) -> &'static str {
        "website"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::MockChunkingStrategy;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    fn no_delay() -> CrawlerConfig {
        CrawlerConfig::default().with_delay(0.0, 0.0)
    }

    fn page(content: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();

        format!(
            "<html><body><nav>{}</nav><article><p>{}</p></article></body></html>",
            anchors, content
        )
    }

    #[test]
    fn test_primary_domain() {
        let url = |s: &str| Url::parse(s).unwrap();

        assert_eq!(primary_domain(&url("https://docs.example.com/a")).unwrap(), "example.com");
        assert_eq!(primary_domain(&url("https://example.com")).unwrap(), "example.com");
        assert_eq!(primary_domain(&url("http://127.0.0.1:8080/")).unwrap(), "127.0.0.1");
        assert_eq!(primary_domain(&url("http://[::1]/")).unwrap(), "[::1]");
    }

    #[test]
    fn test_main_content_priority() {
        let base = Url::parse("https://example.com/").unwrap();

        let (content, _) = extract_page(
            &base,
            r#"<body><div class="content">side</div><main>primary</main></body>"#,
        );
        assert_eq!(content, "primary");

        let (content, _) = extract_page(
            &base,
            r#"<body><div class="post-content">post body</div></body>"#,
        );
        assert_eq!(content, "post body");

        let (content, _) = extract_page(&base, "<body><div>no markers</div></body>");
        assert!(content.is_empty());
    }

    #[test]
    fn test_links_resolved_and_fragments_removed() {
        let base = Url::parse("https://example.com/docs/").unwrap();
        let (_, links) = extract_page(
            &base,
            r##"<a href="intro#top">a</a><a href="mailto:x@example.com">b</a><a href="/abs">c</a>"##,
        );

        let links: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://example.com/docs/intro", "https://example.com/abs"]
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(CrawlerConfig::default().validate().is_ok());
        assert!(CrawlerConfig::default().with_max_depth(0).validate().is_err());
        assert!(CrawlerConfig::default().with_max_links(0).validate().is_err());
        assert!(CrawlerConfig::default().with_delay(2.0, 1.0).validate().is_err());
        assert!(CrawlerConfig::default().with_delay(0.0, f64::INFINITY).validate().is_err());
        assert!(CrawlerConfig::default().with_delay(0.0, f64::NAN).validate().is_err());
        assert!(WebsiteReader::new(
            MockHttpClient::new(),
            CrawlerConfig::default().with_delay(1.0, f64::INFINITY)
        )
        .is_err());
    }

    #[test]
    fn test_politeness_delay_within_window() {
        let config = CrawlerConfig::default().with_delay(0.01, 0.02);

        for _ in 0..20 {
            let delay = config.politeness_delay();
            assert!(delay >= Duration::from_secs_f64(0.01));
            assert!(delay <= Duration::from_secs_f64(0.02));
        }
    }

    #[tokio::test]
    async fn test_crawl_follows_same_domain_links() {
        let client = MockHttpClient::new()
            .with_page(
                "https://example.com/",
                page(
                    "Home",
                    &["/a", "https://blog.example.com/b", "https://other.org/c", "/file.pdf"],
                ),
            )
            .with_page("https://example.com/a", page("Page A", &["/"]))
            .with_page("https://blog.example.com/b", page("Blog B", &[]));

        let reader = WebsiteReader::new(client, no_delay()).unwrap();
        let pages = reader.crawl("https://example.com/").await.unwrap();

        let urls: Vec<&str> = pages.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/",
                "https://example.com/a",
                "https://blog.example.com/b"
            ]
        );

        let fetched = reader.client.fetched();
        assert!(!fetched.iter().any(|u| u.contains("other.org")));
        assert!(!fetched.iter().any(|u| u.ends_with(".pdf")));
        assert_eq!(fetched.iter().filter(|u| *u == "https://example.com/").count(), 1);
    }

    #[tokio::test]
    async fn test_max_links_bounds_extracted_pages() {
        let client = MockHttpClient::new()
            .with_page("https://example.com/", page("Home", &["/1", "/2", "/3"]))
            .with_page("https://example.com/1", page("One", &[]))
            .with_page("https://example.com/2", page("Two", &[]))
            .with_page("https://example.com/3", page("Three", &[]));

        let reader = WebsiteReader::new(client, no_delay().with_max_links(2)).unwrap();
        let pages = reader.crawl("https://example.com/").await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(reader.client.fetched().len(), 2);
    }

    #[tokio::test]
    async fn test_max_depth_one_fetches_only_seed() {
        let client = MockHttpClient::new()
            .with_page("https://example.com/", page("Home", &["/a", "/b"]))
            .with_page("https://example.com/a", page("A", &[]));

        let reader = WebsiteReader::new(client, no_delay().with_max_depth(1)).unwrap();
        let pages = reader.crawl("https://example.com/").await.unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(reader.client.fetched(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_skipped() {
        let client = MockHttpClient::new()
            .with_page("https://example.com/", page("Home", &["/broken", "/ok"]))
            .with_error("https://example.com/broken", "connection reset")
            .with_page("https://example.com/ok", page("Fine", &[]));

        let reader = WebsiteReader::new(client, no_delay()).unwrap();
        let pages = reader.crawl("https://example.com/").await.unwrap();

        let contents: Vec<&str> = pages.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(contents, vec!["Home", "Fine"]);
    }

    #[tokio::test]
    async fn test_pages_without_main_content_do_not_count() {
        let client = MockHttpClient::new()
            .with_page(
                "https://example.com/",
                r#"<body><div>menu</div><a href="/a">a</a></body>"#,
            )
            .with_page("https://example.com/a", page("Real", &[]));

        let reader = WebsiteReader::new(client, no_delay().with_max_links(1)).unwrap();
        let pages = reader.crawl("https://example.com/").await.unwrap();

        assert_eq!(pages, vec![("https://example.com/a".to_string(), "Real".to_string())]);
    }

    #[tokio::test]
    async fn test_read_builds_documents() {
        let client = MockHttpClient::new()
            .with_page("https://example.com/", page("Home", &["/a"]))
            .with_page("https://example.com/a", page("Page A", &[]));

        let reader = WebsiteReader::new(client, no_delay()).unwrap();
        let docs = reader.read("https://example.com/").await.unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.name.as_deref() == Some("https://example.com/")));
        assert_eq!(docs[1].meta_data.get(META_URL), Some(&json!("https://example.com/a")));
    }

    #[tokio::test]
    async fn test_read_applies_chunker() {
        let client =
            MockHttpClient::new().with_page("https://example.com/", page("Home", &[]));
        let chunker = Arc::new(MockChunkingStrategy::new());

        let reader = WebsiteReader::new(client, no_delay())
            .unwrap()
            .with_chunker(chunker.clone());
        let docs = reader.read("https://example.com/").await.unwrap();

        assert_eq!(chunker.calls(), 1);
        assert!(docs[0].is_chunked());
    }

    #[tokio::test]
    async fn test_invalid_seed() {
        let reader = WebsiteReader::new(MockHttpClient::new(), no_delay()).unwrap();
        assert!(reader.crawl("not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let client = MockHttpClient::new().with_page("https://example.com/", page("Home", &[]));
        let reader = WebsiteReader::new(client, no_delay()).unwrap();

        let first = reader.crawl("https://example.com/").await.unwrap();
        let second = reader.crawl("https://example.com/").await.unwrap();

        assert_eq!(first, second);
    }
}

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    /// Fetch a page body as text
    async fn get_text(&self, url: &str) -> Result<String, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        Self::build(reqwest::Client::builder().timeout(timeout))
    }

    /// Client for crawling: request timeout plus a user agent
    pub fn for_crawling(timeout: Duration, user_agent: &str) -> Result<Self, DomainError> {
        Self::build(
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(user_agent),
        )
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, DomainError> {
        let client = builder.build().map_err(|e| {
            DomainError::configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }

    async fn get_text(&self, url: &str) -> Result<String, DomainError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::fetch(url, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::fetch(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DomainError::fetch(url, format!("Failed to read body: {}", e)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer key"))
            .and(body_json(json!({"input": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let response = client
            .post_json(
                &format!("{}/v1/embeddings", server.uri()),
                vec![("Authorization", "Bearer key")],
                &json!({"input": "hi"}),
            )
            .await
            .unwrap();

        assert_eq!(response, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_post_json_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let result = client
            .post_json(&format!("{}/x", server.uri()), vec![], &json!({}))
            .await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_get_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        let body = client
            .get_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_get_text_not_found_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::for_crawling(Duration::from_secs(5), "pmp-knowledge").unwrap();
        let result = client.get_text(&format!("{}/missing", server.uri())).await;

        assert!(matches!(result, Err(DomainError::Fetch { .. })));
    }
}

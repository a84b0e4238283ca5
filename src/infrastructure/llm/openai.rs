use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::{DomainError, LanguageModel};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Language model backed by an OpenAI-compatible `/v1/chat/completions` endpoint
#[derive(Debug)]
pub struct OpenAiChatModel<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl<C: HttpClientTrait> OpenAiChatModel<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: Some(0.0),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl<C: HttpClientTrait> LanguageModel for OpenAiChatModel<C> {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(prompt);
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.client.post_json(&url, headers, &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

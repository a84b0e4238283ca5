//! Language model implementations and the shared HTTP client

mod http_client;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiChatModel;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;

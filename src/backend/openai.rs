//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{JitsError, Result};

use super::{GenerationBackend, GenerationRequest};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const PROVIDER: &str = "openai";

/// Blocking client for `{base_url}/chat/completions`.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn backend_error(message: impl Into<String>) -> JitsError {
    JitsError::Backend {
        provider: PROVIDER.to_string(),
        message: message.into(),
    }
}

fn map_http_error(error: reqwest::Error) -> JitsError {
    if error.is_timeout() {
        backend_error(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        backend_error(format!("Connection error: {}", error))
    } else {
        backend_error(format!("HTTP error: {}", error))
    }
}

impl OpenAiBackend {
    /// Create a client. `base_url` defaults to [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jits/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| backend_error(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
        })
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &request.params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("POST {} (model {})", url, request.params.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(backend_error(match status.as_u16() {
                401 => format!("Authentication failed: {}", detail),
                404 => format!("Model not found: {}", detail),
                429 => format!("Rate limit or quota exceeded: {}", detail),
                _ => format!("Request failed with status {}: {}", status, detail),
            }));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .map_err(|e| backend_error(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| backend_error("No content in response"))?;

        Ok(content.trim().to_string())
    }
}

//! Text-generation clients.
//!
//! Every task talks to the model through the [`TextGenerator`] trait, so the
//! pipeline can run against Ollama in production and against stubs in tests.

use crate::error::ExternalCallError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name of the model behind this generator.
    fn model(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ExternalCallError>;
}

/// Connection settings for [`OllamaGenerator`].
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 300,
        }
    }
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// [`TextGenerator`] backed by Ollama's `/api/chat` endpoint.
pub struct OllamaGenerator {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaGenerator {
    /// Create a generator with its own HTTP client.
    pub fn new(config: OllamaConfig) -> Result<Self, ExternalCallError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ExternalCallError::Request(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'))
    }

    fn build_request(&self, prompt: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        }
    }

    fn classify(&self, e: reqwest::Error) -> ExternalCallError {
        if e.is_timeout() {
            ExternalCallError::Timeout(Duration::from_secs(self.config.timeout_seconds))
        } else if e.is_connect() {
            ExternalCallError::Connection(self.config.ollama_url.clone())
        } else {
            ExternalCallError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model(&self) -> &str {
        &self.config.model_name
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model_name))]
    async fn generate(&self, prompt: &str) -> Result<String, ExternalCallError> {
        let url = self.chat_url();
        debug!("Sending chat request ({} prompt bytes)", prompt.len());

        let response = self
            .http_client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalCallError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ExternalCallError::InvalidResponse(e.to_string()))?;

        let content = chat_response.message.content;
        if content.trim().is_empty() {
            return Err(ExternalCallError::EmptyResponse);
        }

        Ok(content)
    }
}

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::InferenceError;

/// Trait for the chat model endpoints LlamaOCR talks to.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "ollama", "mock").
    fn name(&self) -> &str;

    /// Send one chat request and return the assistant message.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, InferenceError>;
}

/// An image forwarded to a multimodal model alongside the prompt.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub filename: String,
    pub data: Bytes,
}

/// A single-turn user request to a chat model.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<ImageAttachment>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }
}

/// Response from a chat model.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

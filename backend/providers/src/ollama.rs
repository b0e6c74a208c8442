use std::time::Instant;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use llamaocr_core::{InferenceError, LlmProvider, LlmRequest, LlmResponse};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed on the Ollama server (`GET /api/tags`).
    pub async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let tags: OllamaTagsResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether `model` is installed; a bare name also matches its `:latest` tag.
    pub async fn has_model(&self, model: &str) -> Result<bool, InferenceError> {
        let installed = self.list_models().await?;
        let latest = format!("{model}:latest");
        Ok(installed.iter().any(|m| m == model || *m == latest))
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct OllamaChatMessage {
    role: String,
    content: String,
    /// Base64-encoded image payloads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
    eval_count: Option<u64>,
    prompt_eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}

fn build_body(request: &LlmRequest) -> OllamaChatRequest {
    let options = if request.temperature.is_some() || request.max_tokens.is_some() {
        Some(OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        })
    } else {
        None
    };

    OllamaChatRequest {
        model: request.model.clone(),
        messages: vec![OllamaChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
            images: request.images.iter().map(|img| STANDARD.encode(&img.data)).collect(),
        }],
        stream: false,
        options,
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, InferenceError> {
        let start = Instant::now();
        let body = build_body(request);

        debug!(
            model = %request.model,
            images = request.images.len(),
            prompt_chars = request.prompt.len(),
            "Sending request to Ollama"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let chat_response: OllamaChatResponse = serde_json::from_str(&text)
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        if chat_response.message.content.trim().is_empty() {
            return Err(InferenceError::EmptyResponse);
        }

        let tokens_used = chat_response.eval_count.unwrap_or(0)
            + chat_response.prompt_eval_count.unwrap_or(0);

        Ok(LlmResponse {
            content: chat_response.message.content,
            provider: "ollama".to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

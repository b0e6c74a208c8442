use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use llamaocr_core::{InferenceError, LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns canned responses.
///
/// Scripted outcomes are consumed first, in order; once they run out the
/// fixed response (or an echo of the prompt) is returned. With
/// [`MockProvider::with_capture`] every request is recorded so callers can
/// inspect what was sent.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    script: Mutex<VecDeque<Result<String, InferenceError>>>,
    delay: Option<Duration>,
    capture: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            script: Mutex::new(VecDeque::new()),
            delay: None,
            capture: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Queue one outcome to be returned by the next unscripted call.
    pub fn then(self, outcome: Result<String, InferenceError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record every request, images included. Off by default.
    pub fn with_capture(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Requests received so far, oldest first. Empty unless capturing.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, InferenceError> {
        if self.capture {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        let content = match scripted {
            Some(outcome) => outcome?,
            None => self.fixed_response.clone().unwrap_or_else(|| {
                format!(
                    "Mock response ({} image(s)): {}",
                    request.images.len(),
                    request.prompt.lines().last().unwrap_or_default()
                )
            }),
        };

        Ok(LlmResponse {
            content,
            provider: self.name.clone(),
            model: request.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_outcomes_come_first() {
        let provider = MockProvider::new("mock")
            .with_capture()
            .with_response("fallback")
            .then(Ok("first".into()))
            .then(Err(InferenceError::EmptyResponse));
        let req = LlmRequest::text("m", "p");

        assert_eq!(provider.complete(&req).await.unwrap().content, "first");
        assert_eq!(
            provider.complete(&req).await.unwrap_err(),
            InferenceError::EmptyResponse
        );
        assert_eq!(provider.complete(&req).await.unwrap().content, "fallback");
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn echoes_last_prompt_line_without_fixed_response() {
        let provider = MockProvider::new("mock");
        let resp = provider
            .complete(&LlmRequest::text("m", "context\n\nQuestion: why?"))
            .await
            .unwrap();
        assert_eq!(resp.content, "Mock response (0 image(s)): Question: why?");
    }

    #[tokio::test]
    async fn requests_are_not_kept_unless_capturing() {
        let provider = MockProvider::new("mock").with_response("ok");
        provider.complete(&LlmRequest::text("m", "p")).await.unwrap();
        assert!(provider.requests().is_empty());
    }
}

//! Follow-up questions about a transcription.

use std::sync::Arc;

use tracing::{debug, warn};

use llamaocr_core::{follow_up_prompt, run_bounded, InferenceError, InflightSlot, LlmProvider, LlmRequest};

use crate::{loggable_error, ModelSettings};

/// Answers free-text questions using the transcription as context.
///
/// The whole transcription is resent with every question; no image is attached.
pub struct FollowUpService {
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
}

impl FollowUpService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn answer(
        &self,
        ocr_text: &str,
        question: &str,
        slot: &InflightSlot,
    ) -> Result<String, InferenceError> {
        let mut request = LlmRequest::text(&self.settings.model, follow_up_prompt(ocr_text, question));
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;

        debug!(
            context_chars = ocr_text.len(),
            question_chars = question.len(),
            "Asking follow-up question"
        );

        let provider = Arc::clone(&self.provider);
        let result = run_bounded(slot, self.settings.timeout, async move {
            provider.complete(&request).await
        })
        .await;

        result
            .and_then(|r| {
                if r.content.trim().is_empty() {
                    Err(InferenceError::EmptyResponse)
                } else {
                    Ok(r.content)
                }
            })
            .inspect_err(|e| {
                warn!(
                    kind = e.kind(),
                    error = %loggable_error(e),
                    "Follow-up question failed"
                );
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamaocr_providers::MockProvider;

    #[tokio::test]
    async fn sends_transcription_and_question_without_image() {
        let provider = Arc::new(MockProvider::new("mock").with_capture().with_response("42"));
        let service = FollowUpService::new(provider.clone(), ModelSettings::new("llama3.2-vision"));

        let answer = service
            .answer("Total: 42", "What is the total?", &InflightSlot::new())
            .await
            .unwrap();
        assert_eq!(answer, "42");

        let requests = provider.requests();
        assert_eq!(
            requests[0].prompt,
            "Based on this extracted text:\nTotal: 42\n\nQuestion: What is the total?"
        );
        assert!(requests[0].images.is_empty());
    }

    #[tokio::test]
    async fn failure_kind_is_preserved() {
        let provider = Arc::new(MockProvider::new("mock").then(Err(InferenceError::Status {
            status: 500,
            body: "oom".into(),
        })));
        let service = FollowUpService::new(provider, ModelSettings::new("m"));

        let err = service.answer("t", "q", &InflightSlot::new()).await.unwrap_err();
        assert_eq!(err.kind(), "status");
    }

    #[tokio::test]
    async fn blank_answer_is_empty_response() {
        let provider = Arc::new(MockProvider::new("mock").then(Ok("   ".into())));
        let service = FollowUpService::new(provider, ModelSettings::new("m"));

        let err = service.answer("t", "q", &InflightSlot::new()).await.unwrap_err();
        assert_eq!(err, InferenceError::EmptyResponse);
    }
}

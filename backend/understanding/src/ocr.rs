//! Optical Character Recognition (OCR)
//!
//! Sends an image on disk to the vision model together with the fixed
//! transcription instruction and returns the model's markdown transcription.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use llamaocr_core::{
    run_bounded, ImageAttachment, InferenceError, InflightSlot, LlmProvider, LlmRequest, OCR_PROMPT,
};

use crate::{loggable_error, ModelSettings};

pub struct OcrService {
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
}

impl OcrService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Transcribe the image at `image_path`.
    ///
    /// The call runs as a bounded task registered in `slot`, so it can be
    /// cancelled or superseded by the owning session.
    pub async fn extract_text(
        &self,
        image_path: &Path,
        slot: &InflightSlot,
    ) -> Result<String, InferenceError> {
        let data = tokio::fs::read(image_path)
            .await
            .map_err(|e| InferenceError::ImageRead(format!("{}: {e}", image_path.display())))?;
        let filename = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            file = %filename,
            bytes = data.len(),
            model = %self.settings.model,
            "Running OCR"
        );

        let mut request = LlmRequest::text(&self.settings.model, OCR_PROMPT).with_image(ImageAttachment {
            filename: filename.clone(),
            data: Bytes::from(data),
        });
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;

        let provider = Arc::clone(&self.provider);
        let result = run_bounded(slot, self.settings.timeout, async move {
            provider.complete(&request).await
        })
        .await
        .and_then(|response| {
            if response.content.trim().is_empty() {
                Err(InferenceError::EmptyResponse)
            } else {
                Ok(response)
            }
        });

        match result {
            Ok(response) => {
                info!(
                    file = %filename,
                    chars = response.content.len(),
                    latency_ms = response.latency_ms,
                    "OCR completed"
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!(
                    file = %filename,
                    kind = e.kind(),
                    error = %loggable_error(&e),
                    "OCR failed"
                );
                Err(e)
            }
        }
    }
}

//! Model-backed understanding of uploaded images.
//!
//! `ocr` transcribes an image; `followup` answers questions about a transcription.

pub mod followup;
pub mod ocr;

use std::time::Duration;

use llamaocr_core::InferenceError;
use llamaocr_logging::redact_sensitive_data;

pub use followup::FollowUpService;
pub use ocr::OcrService;

/// Default upper bound for a single model call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Which model to call and how.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Error text safe for logs; endpoint bodies may echo secrets.
pub(crate) fn loggable_error(error: &InferenceError) -> String {
    redact_sensitive_data(&error.to_string())
}

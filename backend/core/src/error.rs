use std::time::Duration;

use thiserror::Error;

/// Why a call to the model endpoint did not produce usable text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("model endpoint unreachable: {0}")]
    Transport(String),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model call was cancelled")]
    Cancelled,

    #[error("could not read image for inference: {0}")]
    ImageRead(String),
}

impl InferenceError {
    /// Stable machine-readable name, used in API error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::Transport(_) => "transport",
            InferenceError::Status { .. } => "status",
            InferenceError::MalformedResponse(_) => "malformed_response",
            InferenceError::EmptyResponse => "empty_response",
            InferenceError::Timeout(_) => "timeout",
            InferenceError::Cancelled => "cancelled",
            InferenceError::ImageRead(_) => "image_read",
        }
    }
}

/// Top-level error type for LlamaOCR operations.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("unsupported image type: {0:?} (accepted: jpg, jpeg, png, gif)")]
    UnsupportedImageType(String),

    #[error("invalid upload filename: {0:?}")]
    InvalidFilename(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("no OCR result yet; upload an image first")]
    NoCurrentResult,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("history index {index} out of range (history has {len} entries)")]
    HistoryIndexOutOfRange { index: usize, len: usize },
}

impl OcrError {
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::Inference(e) => e.kind(),
            OcrError::UnsupportedImageType(_) => "unsupported_image_type",
            OcrError::InvalidFilename(_) => "invalid_filename",
            OcrError::Storage(_) => "storage",
            OcrError::NoCurrentResult => "no_current_result",
            OcrError::EmptyQuestion => "empty_question",
            OcrError::HistoryIndexOutOfRange { .. } => "history_index_out_of_range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_kinds_are_stable() {
        assert_eq!(InferenceError::EmptyResponse.kind(), "empty_response");
        assert_eq!(
            InferenceError::Timeout(Duration::from_secs(1)).kind(),
            "timeout"
        );
        assert_eq!(
            InferenceError::Status { status: 500, body: String::new() }.kind(),
            "status"
        );
    }

    #[test]
    fn ocr_error_delegates_inference_kind() {
        let err: OcrError = InferenceError::Cancelled.into();
        assert_eq!(err.kind(), "cancelled");
        assert_eq!(OcrError::NoCurrentResult.kind(), "no_current_result");
    }

    #[test]
    fn status_error_message_includes_body() {
        let err = InferenceError::Status {
            status: 404,
            body: "model not found".into(),
        };
        assert_eq!(err.to_string(), "model endpoint returned 404: model not found");
    }
}

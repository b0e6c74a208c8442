//! API error responses.
//!
//! Every failure leaves the gateway as `{ "error": ..., "kind": ... }` with a
//! status derived from the error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use llamaocr_core::{ChatTurn, InferenceError, OcrError};

pub const OCR_FAILED_MESSAGE: &str = "OCR failed. Please try again.";
pub const ANSWER_FAILED_MESSAGE: &str = "The model could not answer. Please try again.";

/// nginx's "client closed request"; no standard code fits a cancelled call.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat: Option<&'a [ChatTurn]>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
    /// Chat as it stands after a failed follow-up.
    pub chat: Option<Vec<ChatTurn>>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: kind.into(),
            message: message.into(),
            chat: None,
        }
    }

    pub fn bad_request(kind: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    /// A failed OCR call, with the generic user-facing message.
    pub fn ocr_failed(err: &InferenceError) -> Self {
        Self::new(inference_status(err), err.kind(), OCR_FAILED_MESSAGE)
    }

    /// A failed follow-up call, carrying the chat so the page can redraw it.
    pub fn answer_failed(err: &InferenceError, chat: Vec<ChatTurn>) -> Self {
        Self {
            chat: Some(chat),
            ..Self::new(inference_status(err), err.kind(), ANSWER_FAILED_MESSAGE)
        }
    }
}

pub fn inference_status(err: &InferenceError) -> StatusCode {
    match err {
        InferenceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        InferenceError::Cancelled => {
            StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
        }
        InferenceError::ImageRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        InferenceError::Transport(_)
        | InferenceError::Status { .. }
        | InferenceError::MalformedResponse(_)
        | InferenceError::EmptyResponse => StatusCode::BAD_GATEWAY,
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        let status = match &err {
            OcrError::Inference(e) => inference_status(e),
            OcrError::UnsupportedImageType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            OcrError::InvalidFilename(_) | OcrError::EmptyQuestion => StatusCode::BAD_REQUEST,
            OcrError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OcrError::NoCurrentResult => StatusCode::CONFLICT,
            OcrError::HistoryIndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        };
        let message = match &err {
            OcrError::Inference(_) => OCR_FAILED_MESSAGE.to_string(),
            OcrError::Storage(_) => "Could not save the uploaded image.".to_string(),
            other => other.to_string(),
        };
        Self::new(status, err.kind(), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            kind: &self.kind,
            chat: self.chat.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

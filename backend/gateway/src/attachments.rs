//! Image upload endpoint.
//!
//! `POST /api/ocr` takes one multipart `file` field, stores it and runs OCR on
//! it within the caller's session.

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use llamaocr_core::{OcrRecord, UploadedImage};
use llamaocr_logging::{EventLogger, SessionEvent};

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::session_layer::CurrentSession;

/// Multipart field holding the image.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    /// Position of the new record in the session history.
    pub index: usize,
    #[serde(flatten)]
    pub record: OcrRecord,
}

pub async fn upload_and_ocr(
    State(state): State<GatewayState>,
    CurrentSession(session): CurrentSession,
    multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let image = read_file_field(multipart).await?;
    let stored = state.uploads.save(&image).await?;
    let session_id = session.id.to_string();
    EventLogger::log_event(
        &session_id,
        SessionEvent::ImageUploaded {
            filename: stored.filename.clone(),
            size_bytes: stored.size_bytes,
        },
    );

    let started = Instant::now();
    let text = match state.ocr.extract_text(&stored.path, session.inflight()).await {
        Ok(text) => text,
        Err(e) => {
            EventLogger::log_event(
                &session_id,
                SessionEvent::OcrFailed {
                    filename: stored.filename.clone(),
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                },
            );
            return Err(ApiError::ocr_failed(&e));
        }
    };

    EventLogger::log_event(
        &session_id,
        SessionEvent::OcrCompleted {
            filename: stored.filename.clone(),
            text_len: text.len(),
            latency_ms: started.elapsed().as_millis() as u64,
        },
    );

    let record = OcrRecord::new(stored.filename.clone(), text, stored.url());
    let index = session.context().lock().await.record_ocr(record.clone());
    session.touch();
    info!(session = %session_id, index, "OCR result recorded");

    Ok(Json(OcrResponse { index, record }))
}

/// Pull the `file` field out of the form; other fields are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), "bad_multipart", e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("invalid_filename", "Upload has no filename"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), "bad_multipart", e.body_text()))?;
        return Ok(UploadedImage::new(filename, data));
    }
    Err(ApiError::bad_request(
        "missing_file",
        format!("Form has no '{FILE_FIELD}' field"),
    ))
}

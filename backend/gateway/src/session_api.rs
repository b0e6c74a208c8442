//! Session snapshot, teardown and history browsing.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use llamaocr_core::{HistoryEntry, OcrRecord};
use llamaocr_logging::{EventLogger, SessionEndReason, SessionEvent};
use llamaocr_session::SessionSnapshot;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::session_layer::{expired_session_cookie, CurrentSession};

#[derive(Debug, Serialize)]
pub struct EndResponse {
    pub ended: bool,
}

/// `GET /api/session`
pub async fn snapshot(CurrentSession(session): CurrentSession) -> Json<SessionSnapshot> {
    Json(session.context().lock().await.snapshot())
}

/// `DELETE /api/session` — cancel in-flight work, discard state, clear the cookie.
pub async fn end_session(
    State(state): State<GatewayState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    let ended = state.sessions.end(session.id).await;
    if ended {
        EventLogger::log_event(
            session.id.to_string(),
            SessionEvent::SessionEnded {
                reason: SessionEndReason::Explicit,
            },
        );
    }

    let mut response = Json(EndResponse { ended }).into_response();
    if let Ok(value) = HeaderValue::from_str(&expired_session_cookie()) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

/// `GET /api/history` — filenames and timestamps, oldest first.
pub async fn list_history(CurrentSession(session): CurrentSession) -> Json<Vec<HistoryEntry>> {
    Json(session.context().lock().await.history_entries())
}

/// `GET /api/history/:index` — one stored transcription.
pub async fn get_history_entry(
    CurrentSession(session): CurrentSession,
    Path(index): Path<usize>,
) -> Result<Json<OcrRecord>, ApiError> {
    let ctx = session.context().lock().await;
    Ok(Json(ctx.history_entry(index)?.clone()))
}

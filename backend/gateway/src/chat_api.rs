//! Follow-up questions and cancellation.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use llamaocr_core::ChatTurn;
use llamaocr_logging::{EventLogger, SessionEvent};

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::session_layer::CurrentSession;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub chat: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// `POST /api/ask` — answer a question about the current transcription.
pub async fn ask(
    State(state): State<GatewayState>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    // The state lock is released before the model call.
    let ocr_text = session.context().lock().await.begin_question(&body.question)?;
    let session_id = session.id.to_string();
    EventLogger::log_event(
        &session_id,
        SessionEvent::QuestionAsked {
            question_len: body.question.len(),
        },
    );

    let started = Instant::now();
    let result = state
        .follow_up
        .answer(&ocr_text, &body.question, session.inflight())
        .await;
    session.touch();

    let mut ctx = session.context().lock().await;
    match result {
        Ok(answer) => {
            ctx.record_answer(answer.clone());
            EventLogger::log_event(
                &session_id,
                SessionEvent::AnswerReceived {
                    answer_len: answer.len(),
                    latency_ms: started.elapsed().as_millis() as u64,
                },
            );
            Ok(Json(AskResponse {
                answer,
                chat: ctx.chat().to_vec(),
            }))
        }
        Err(e) => {
            EventLogger::log_event(
                &session_id,
                SessionEvent::AnswerFailed {
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                },
            );
            Err(ApiError::answer_failed(&e, ctx.chat().to_vec()))
        }
    }
}

/// `POST /api/cancel` — abort the session's in-flight model call, if any.
pub async fn cancel(CurrentSession(session): CurrentSession) -> Json<CancelResponse> {
    let cancelled = session.inflight().cancel();
    debug!(session = %session.id, cancelled, "Cancel requested");
    Json(CancelResponse { cancelled })
}

//! Session Event Logger
//!
//! One structured record per user-visible step of a session, emitted under
//! the `session_events` target. Transcribed text and question bodies are
//! never logged; only their lengths are.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "session_events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// `DELETE /api/session`
    Explicit,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ImageUploaded {
        filename: String,
        size_bytes: usize,
    },
    OcrCompleted {
        filename: String,
        text_len: usize,
        latency_ms: u64,
    },
    OcrFailed {
        filename: String,
        kind: String,
        error: String,
    },
    QuestionAsked {
        question_len: usize,
    },
    AnswerReceived {
        answer_len: usize,
        latency_ms: u64,
    },
    AnswerFailed {
        kind: String,
        error: String,
    },
    SessionEnded {
        reason: SessionEndReason,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageUploaded { .. } => "image_uploaded",
            Self::OcrCompleted { .. } => "ocr_completed",
            Self::OcrFailed { .. } => "ocr_failed",
            Self::QuestionAsked { .. } => "question_asked",
            Self::AnswerReceived { .. } => "answer_received",
            Self::AnswerFailed { .. } => "answer_failed",
            Self::SessionEnded { .. } => "session_ended",
        }
    }

    /// Scrub secrets out of any free-form error text.
    pub fn redacted(mut self) -> Self {
        match &mut self {
            Self::OcrFailed { error, .. } | Self::AnswerFailed { error, .. } => {
                *error = redact_sensitive_data(error);
            }
            _ => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

impl EventLogEntry {
    pub fn new(session_id: impl Into<String>, event: SessionEvent) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Log a session event, redacted, as one structured tracing record.
    pub fn log_event(session_id: impl Into<String>, event: SessionEvent) {
        let entry = EventLogEntry::new(session_id, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(
                target: EVENT_TARGET,
                session = %entry.session_id,
                event_type = entry.event.name(),
                event = %json,
                "Session event"
            ),
            Err(_) => info!(
                target: EVENT_TARGET,
                session = %entry.session_id,
                event_type = entry.event.name(),
                event = ?entry,
                "Session event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_errors_are_redacted() {
        let entry = EventLogEntry::new(
            "s1",
            SessionEvent::AnswerFailed {
                kind: "status".into(),
                error: "HTTP 401: Bearer abcdefghijklmnop".into(),
            },
        );
        let SessionEvent::AnswerFailed { error, .. } = &entry.event else {
            panic!("unexpected event {:?}", entry.event);
        };
        assert!(!error.contains("abcdefghijklmnop"));
        assert!(error.contains("HTTP 401"));
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = EventLogEntry::new(
            "s1",
            SessionEvent::OcrCompleted {
                filename: "receipt.jpg".into(),
                text_len: 42,
                latency_ms: 1200,
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["event"]["type"], "ocr_completed");
        assert_eq!(json["event"]["text_len"], 42);
    }

    #[test]
    fn session_end_reason_is_snake_case() {
        let event = SessionEvent::SessionEnded {
            reason: SessionEndReason::Idle,
        };
        assert_eq!(event.name(), "session_ended");
        assert_eq!(serde_json::to_value(&event).unwrap()["reason"], "idle");
    }

    #[test]
    fn log_event_without_subscriber_is_noop() {
        EventLogger::log_event("s1", SessionEvent::QuestionAsked { question_len: 5 });
    }
}

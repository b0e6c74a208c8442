//! Structured logging for LlamaOCR.
//!
//! Handles subscriber setup (console + rolling JSON files), session event
//! logging and redaction of secrets in logged error strings.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, SessionEndReason, SessionEvent};
pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;

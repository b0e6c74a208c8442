//! LlamaOCR Gateway HTTP Server
//!
//! Serves the single page, the session-scoped JSON API (OCR, follow-up
//! questions, history) and the stored uploads.

pub mod attachments;
pub mod chat_api;
pub mod control_ui;
pub mod error;
pub mod health_api;
pub mod server;
pub mod session_api;
pub mod session_layer;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
pub use session_layer::SESSION_COOKIE;

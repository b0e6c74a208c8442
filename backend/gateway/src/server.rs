//! Main HTTP Gateway Server.
//!
//! Serves the single page, the JSON API behind it and the stored uploads.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use llamaocr_media::{media_router, UploadStore, UPLOADS_URL_PREFIX};
use llamaocr_session::SessionRegistry;
use llamaocr_understanding::{FollowUpService, OcrService};

use crate::{attachments, chat_api, control_ui, health_api, session_api, session_layer};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: SessionRegistry,
    pub uploads: UploadStore,
    pub ocr: Arc<OcrService>,
    pub follow_up: Arc<FollowUpService>,
    /// Request body cap for `POST /api/ocr`.
    pub max_upload_bytes: usize,
}

impl GatewayState {
    pub fn model_name(&self) -> &str {
        &self.ocr.settings().model
    }
}

/// Build the full router.
pub fn build_router(state: GatewayState) -> Router {
    let media = media_router(state.uploads.dir().to_path_buf());

    Router::new()
        .route("/", get(control_ui::index))
        .route("/api/ocr", post(attachments::upload_and_ocr))
        .route("/api/ask", post(chat_api::ask))
        .route("/api/cancel", post(chat_api::cancel))
        .route(
            "/api/session",
            get(session_api::snapshot).delete(session_api::end_session),
        )
        .route("/api/history", get(session_api::list_history))
        .route("/api/history/:index", get(session_api::get_history_entry))
        // Everything above runs inside a session.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_layer::attach_session,
        ))
        .route("/api/health", get(health_api::get_health))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
        .nest(UPLOADS_URL_PREFIX, media)
        .layer(TraceLayer::new_for_http())
}

/// Starts the HTTP server and runs until Ctrl-C.
#[instrument(skip(listener, state))]
pub async fn start_server(listener: TcpListener, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    info!("Gateway HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}

//! `llamaocr serve`

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use llamaocr_config::LlamaOcrConfig;
use llamaocr_gateway::{start_server, GatewayState};
use llamaocr_logging::{EventLogger, SessionEndReason, SessionEvent};
use llamaocr_media::{UploadReaper, UploadStore};
use llamaocr_session::{SessionLimits, SessionRegistry};
use llamaocr_understanding::{FollowUpService, OcrService};

use crate::app::{build_provider, model_settings};

pub async fn run(config: LlamaOcrConfig) -> Result<()> {
    let uploads = UploadStore::open(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to open upload dir: {}", config.uploads.dir.display()))?;

    let provider = build_provider(&config.model);
    let settings = model_settings(&config.model);
    let sessions = SessionRegistry::new(SessionLimits {
        max_chat_turns: config.session.max_chat_turns(),
    });

    let state = GatewayState {
        sessions: sessions.clone(),
        uploads,
        ocr: Arc::new(OcrService::new(Arc::clone(&provider), settings.clone())),
        follow_up: Arc::new(FollowUpService::new(provider, settings)),
        max_upload_bytes: config.uploads.max_upload_bytes,
    };

    let mut background = Vec::new();
    if let Some(interval) = config.uploads.sweep_interval() {
        let reaper = UploadReaper::new(
            &config.uploads.dir,
            config.uploads.max_age(),
            config.uploads.max_files(),
        );
        background.push(reaper.spawn(interval));
    }
    if let (Some(max_idle), Some(interval)) =
        (config.session.idle_timeout(), config.session.reap_interval())
    {
        background.push(sessions.spawn_reaper(interval, max_idle, |id| {
            EventLogger::log_event(
                id.to_string(),
                SessionEvent::SessionEnded {
                    reason: SessionEndReason::Idle,
                },
            );
        }));
    }

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %addr,
        model = %config.model.name,
        uploads = %config.uploads.dir.display(),
        "Starting LlamaOCR"
    );

    let result = start_server(listener, state).await;
    for task in background {
        task.abort();
    }
    result
}

//! Gateway Health API

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "llamaocr",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model_name().to_string(),
    })
}

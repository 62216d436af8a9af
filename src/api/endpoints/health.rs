use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::AppContext;
use crate::config::BackendKind;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub version: &'static str,
}

/// `GET /health` — liveness probe. Does not call the backend.
pub async fn check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let backend = match ctx.config.backend {
        BackendKind::Appwrite => "appwrite",
        BackendKind::Memory => "memory",
    };
    Json(HealthResponse {
        status: "ok",
        backend,
        version: crate::config::APP_VERSION,
    })
}

//! The two endpoints this core ships a reference surface for (§4.9): nothing
//! in this module scores, crawls, or parses — it only translates HTTP to and
//! from `seo_report::audit`.

use crate::errors::ApiError;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use seo_config::AuditConfig;
use seo_types::AuditReport;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuditConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub url: String,
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub respect_robots: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/audit", post(audit_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[instrument(skip(state), fields(url = %request.url))]
async fn audit_handler(
    State(state): State<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditReport>, ApiError> {
    let report = seo_report::audit(&request.url, request.max_pages, request.respect_robots, &state.config).await?;
    Ok(Json(report))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

//! Health check endpoint

use axum::{Json, extract::State};
use serde::Serialize;

use crate::api::state::ApiState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Whether at least one sample has been collected
    pub ready: bool,
}

/// GET /health
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ready: state.store.is_populated().await,
    })
}

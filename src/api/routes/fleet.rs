//! Aggregated fleet stats endpoint

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::trace;

use crate::aggregate::AggregatedView;
use crate::api::{error::ApiResult, state::ApiState};

/// GET /
///
/// Sums the latest sample of every known endpoint. Answers 400 until the
/// first sample has been collected.
pub async fn get_aggregated_stats(State(state): State<ApiState>) -> ApiResult<Response> {
    // The read lock is released as soon as the copy is taken
    let snapshot = state.store.snapshot().await;
    trace!("aggregating {} endpoints", snapshot.len());

    let view = AggregatedView::from_snapshot(snapshot)?;
    let body = serde_json::to_string_pretty(&view)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

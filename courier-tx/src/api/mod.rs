//! HTTP surface
//!
//! Thin routing layer: one transform endpoint and a health check. All
//! pipeline logic lives in [`crate::pipeline`]; handlers only translate
//! between HTTP and the processor.

use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/transform/:sequence_no", post(transform))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TransformParams {
    batch_number: Option<u32>,
}

/// POST /transform/{sequence_no} - submission JSON in, zip archive out.
async fn transform(
    State(state): State<AppState>,
    Path(sequence_no): Path<u32>,
    Query(params): Query<TransformParams>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let package = state
        .processor
        .process(&body, sequence_no, params.batch_number)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", package.name),
        ),
    ];
    Ok((headers, package.bytes))
}

/// GET /health - liveness plus build identification.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let uptime = (chrono::Utc::now() - state.startup_time).num_seconds();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
    }))
}

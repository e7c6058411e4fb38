//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod dashboard;
pub mod datasets;

use std::sync::Arc;

use axum::Json;
use spendscope_core::Dataset;

use crate::{AppError, AppState};

// Re-export all handlers for use in router
pub use dashboard::*;
pub use datasets::*;

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Look up a cached dataset or fail with 404
pub(crate) fn cached_dataset(state: &AppState, id: &str) -> Result<Arc<Dataset>, AppError> {
    state
        .cache()?
        .get(id)
        .ok_or_else(|| AppError::not_found("Dataset not found; upload it again"))
}

//! Dataset upload, options and invalidation handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use spendscope_core::{content_hash, CacheStatus, Dataset, FileFormat, FilterOptions};

use super::cached_dataset;
use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Content hash, used in all later dataset URLs
    pub id: String,
    pub rows: usize,
    pub dropped_rows: usize,
    pub missing_recommended: Vec<String>,
    pub options: FilterOptions,
    /// True when identical content was already loaded
    pub cached: bool,
}

/// POST /api/datasets - Upload and normalize an expense file (CSV or XLSX)
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        file_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        // Check file size limit
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        file_data = Some(bytes.to_vec());
    }

    let data = file_data.ok_or_else(|| AppError::bad_request("No file provided"))?;

    let format = match &file_name {
        Some(name) => FileFormat::from_name(name).map_err(AppError::from_load_error)?,
        None => FileFormat::Csv,
    };

    let id = content_hash(&data);
    let cached = state.cache()?.get(&id);
    let (dataset, status) = match cached {
        Some(dataset) => (dataset, CacheStatus::Hit),
        None => {
            // Parse without holding the cache lock
            let analysis = state.analysis.clone();
            let loaded =
                tokio::task::spawn_blocking(move || Dataset::from_bytes(&data, format, &analysis))
                    .await?
                    .map_err(AppError::from_load_error)?;
            let dataset = state.cache()?.insert(loaded);
            (dataset, CacheStatus::Miss)
        }
    };

    info!(
        id = %dataset.id,
        rows = dataset.normalized.records.len(),
        dropped = dataset.normalized.dropped_rows,
        cached = status == CacheStatus::Hit,
        "Dataset uploaded"
    );

    let code = match status {
        CacheStatus::Hit => StatusCode::OK,
        CacheStatus::Miss => StatusCode::CREATED,
    };

    Ok((
        code,
        Json(UploadResponse {
            id: dataset.id.clone(),
            rows: dataset.normalized.records.len(),
            dropped_rows: dataset.normalized.dropped_rows,
            missing_recommended: dataset.normalized.missing_recommended.clone(),
            options: dataset.options.clone(),
            cached: status == CacheStatus::Hit,
        }),
    ))
}

/// GET /api/datasets/:id/options - Filter control values
pub async fn get_options(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilterOptions>, AppError> {
    let dataset = cached_dataset(&state, &id)?;
    Ok(Json(dataset.options.clone()))
}

/// DELETE /api/datasets/:id - Drop a dataset from the cache
pub async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.cache()?.invalidate(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Dataset not found"))
    }
}

//! Dashboard and filtered export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use spendscope_core::filter::{filter, CategoryFilter, DateRange, FilterSpec, UserFilter};
use spendscope_core::{analyze, export_csv, Analysis, EXPORT_FILE_NAME};

use super::cached_dataset;
use crate::{AppError, AppState};

/// Filter controls shared by dashboard and export
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// Start date (YYYY-MM-DD); alone, selects that single day
    pub from: Option<String>,
    /// End date (YYYY-MM-DD); alone, covers everything up to that day
    pub to: Option<String>,
    /// Categories (comma-separated; empty means all)
    pub categories: Option<String>,
    /// Single user ("all" or empty means everyone)
    pub user: Option<String>,
}

impl FilterQuery {
    pub fn to_spec(&self) -> FilterSpec {
        let categories = self
            .categories
            .as_deref()
            .map(|s| s.split(',').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        FilterSpec::all()
            .with_date_range(DateRange::from_bounds(
                non_blank(self.from.as_deref()),
                non_blank(self.to.as_deref()),
            ))
            .with_categories(CategoryFilter::from_selection(categories))
            .with_user(UserFilter::from_selection(self.user.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// GET /api/datasets/:id/dashboard - Run the full pipeline with filters
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Analysis>, AppError> {
    let dataset = cached_dataset(&state, &id)?;
    let analysis = analyze(&dataset.normalized.records, &params.to_spec(), &state.analysis);
    Ok(Json(analysis))
}

/// GET /api/datasets/:id/export - Download the filtered records as CSV
pub async fn export_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<FilterQuery>,
) -> Result<Response<Body>, AppError> {
    let dataset = cached_dataset(&state, &id)?;
    let filtered = filter(&dataset.normalized.records, &params.to_spec());
    let csv = export_csv(&filtered.records)?;

    info!(
        id = %id,
        rows = filtered.applied.matched_records,
        "Exported filtered records"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        )
        .body(Body::from(csv))
        .map_err(|_| AppError::internal("Failed to build response"))
}

//! Spendscope Web Server
//!
//! Axum-based REST API for the Spendscope expense dashboard.
//!
//! Datasets are uploaded once, normalized, and kept in a content-addressed
//! cache; dashboard and export requests then re-run the pipeline against
//! the cached records with the filters given in the query string.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Upload size limit
//! - Sanitized error responses

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use spendscope_core::{AnalysisConfig, DatasetCache};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Environment variable holding comma-separated allowed CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "SPENDSCOPE_ALLOWED_ORIGINS";

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Self {
        Self {
            allowed_origins: parse_origins(
                &std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default(),
            ),
        }
    }
}

/// Split a comma-separated origin list, ignoring blanks
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub cache: Mutex<DatasetCache>,
    pub analysis: AnalysisConfig,
}

impl AppState {
    pub fn new(analysis: AnalysisConfig) -> Self {
        Self {
            cache: Mutex::new(DatasetCache::new(analysis.cache_capacity)),
            analysis,
        }
    }

    pub(crate) fn cache(&self) -> Result<MutexGuard<'_, DatasetCache>, AppError> {
        self.cache
            .lock()
            .map_err(|_| AppError::internal("Dataset cache unavailable"))
    }
}

pub fn create_router(analysis: AnalysisConfig, config: ServerConfig) -> Router {
    let state = Arc::new(AppState::new(analysis));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Datasets
        .route(
            "/datasets",
            post(handlers::upload_dataset)
                // leave room for multipart framing around the file itself
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/datasets/:id", delete(handlers::delete_dataset))
        .route("/datasets/:id/options", get(handlers::get_options))
        // Dashboard
        .route("/datasets/:id/dashboard", get(handlers::get_dashboard))
        .route("/datasets/:id/export", get(handlers::export_dataset));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    analysis: AnalysisConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        window = analysis.rolling_window,
        threshold = analysis.outlier_threshold,
        cache_capacity = analysis.cache_capacity,
        "Analysis settings"
    );

    let app = create_router(analysis, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error with a client-safe message
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a dataset load failure to a response the uploader can act on
    pub fn from_load_error(err: spendscope_core::Error) -> Self {
        use spendscope_core::Error;
        match err {
            Error::Schema { .. } => Self::unprocessable(&err.to_string()),
            Error::Csv(_) | Error::Spreadsheet(_) | Error::InvalidData(_) => {
                Self::bad_request(&err.to_string())
            }
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;

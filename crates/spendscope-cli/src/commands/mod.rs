//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Full dashboard report (text tables or JSON)
//! - `export` - Filtered CSV export
//! - `options` - Available filter values
//! - `serve` - Web server command

pub mod analyze;
pub mod export;
pub mod options;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use spendscope_core::filter::{CategoryFilter, DateRange, FilterSpec, UserFilter};
use spendscope_core::import::load_path;
use spendscope_core::normalize::{normalize, NormalizedSet};
use spendscope_core::AnalysisConfig;
use tracing::debug;

use crate::cli::FilterArgs;

// Re-export command functions for main.rs
pub use analyze::*;
pub use export::*;
pub use options::*;
pub use serve::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read and normalize an expense file
pub fn load_file(config: &AnalysisConfig, file: &Path) -> Result<NormalizedSet> {
    let table =
        load_path(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let normalized = normalize(&table, config)
        .with_context(|| format!("Failed to load expenses from {}", file.display()))?;
    debug!(
        file = %file.display(),
        records = normalized.records.len(),
        "Loaded expense file"
    );
    Ok(normalized)
}

/// Build a filter spec from command-line flags
pub fn filter_spec(filters: &FilterArgs) -> FilterSpec {
    FilterSpec::all()
        .with_date_range(DateRange::from_bounds(
            filters.from.as_deref(),
            filters.to.as_deref(),
        ))
        .with_categories(CategoryFilter::from_selection(filters.categories.iter().cloned()))
        .with_user(UserFilter::from_selection(filters.user.as_deref()))
}

/// Apply --window / --threshold on top of the loaded config
pub fn apply_overrides(
    config: AnalysisConfig,
    window: Option<usize>,
    threshold: Option<f64>,
) -> Result<AnalysisConfig> {
    let config = match window {
        Some(window) => config
            .with_rolling_window(window)
            .context("Invalid --window")?,
        None => config,
    };
    let config = match threshold {
        Some(threshold) => config
            .with_outlier_threshold(threshold)
            .context("Invalid --threshold")?,
        None => config,
    };
    Ok(config)
}

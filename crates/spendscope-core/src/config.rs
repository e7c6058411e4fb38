//! Analysis configuration
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config`), when given
//! 2. Override in data dir (~/.local/share/spendscope/config/analysis.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

/// Tunables for a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Trailing window for the rolling mean
    pub rolling_window: usize,
    /// One-sided z-score threshold for outlier days
    pub outlier_threshold: f64,
    /// Bucket count for the amount histogram
    pub histogram_bins: usize,
    pub required_fields: Vec<String>,
    pub recommended_fields: Vec<String>,
    /// chrono format strings tried in order when coercing dates
    pub date_formats: Vec<String>,
    /// Maximum number of datasets held by the load cache
    pub cache_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: 7,
            outlier_threshold: 2.0,
            histogram_bins: 30,
            required_fields: vec!["date".to_string(), "amount".to_string()],
            recommended_fields: ["date", "user_id", "expense_type", "vendor", "amount"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_formats: ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y", "%d/%m/%Y"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_capacity: 16,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration (explicit path, then data dir override, then default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path)
                        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(Error::Config("rolling_window must be at least 1".into()));
        }
        if self.histogram_bins == 0 {
            return Err(Error::Config("histogram_bins must be at least 1".into()));
        }
        if !self.outlier_threshold.is_finite() {
            return Err(Error::Config("z_threshold must be a finite number".into()));
        }
        if self.cache_capacity == 0 {
            return Err(Error::Config("cache capacity must be at least 1".into()));
        }
        if self.date_formats.is_empty() {
            return Err(Error::Config("at least one date format is required".into()));
        }
        Ok(())
    }

    /// Override the rolling window, rejecting zero
    pub fn with_rolling_window(mut self, window: usize) -> Result<Self> {
        self.rolling_window = window;
        self.validate()?;
        Ok(self)
    }

    /// Override the outlier threshold, rejecting non-finite values
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Result<Self> {
        self.outlier_threshold = threshold;
        self.validate()?;
        Ok(self)
    }
}

/// Get the default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendscope").join("config").join("analysis.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    schema: Option<RawSchema>,
    trend: Option<RawTrend>,
    outliers: Option<RawOutliers>,
    distribution: Option<RawDistribution>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    required: Option<Vec<String>>,
    recommended: Option<Vec<String>>,
    date_formats: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    rolling_window: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawOutliers {
    z_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDistribution {
    histogram_bins: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    capacity: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(schema) = raw.schema {
        if let Some(required) = schema.required {
            config.required_fields = required;
        }
        if let Some(recommended) = schema.recommended {
            config.recommended_fields = recommended;
        }
        if let Some(formats) = schema.date_formats {
            config.date_formats = formats;
        }
    }
    if let Some(window) = raw.trend.and_then(|t| t.rolling_window) {
        config.rolling_window = window;
    }
    if let Some(threshold) = raw.outliers.and_then(|o| o.z_threshold) {
        config.outlier_threshold = threshold;
    }
    if let Some(bins) = raw.distribution.and_then(|d| d.histogram_bins) {
        config.histogram_bins = bins;
    }
    if let Some(capacity) = raw.cache.and_then(|c| c.capacity) {
        config.cache_capacity = capacity;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
[outliers]
z_threshold = 3.0
"#,
        )
        .unwrap();
        assert_eq!(config.outlier_threshold, 3.0);
        assert_eq!(config.rolling_window, 7);
        assert_eq!(config.histogram_bins, 30);
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = parse_config("[trend]\nrolling_window = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_toml() {
        assert!(parse_config("this is = = not toml").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[distribution]\nhistogram_bins = 10").unwrap();

        let config = AnalysisConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.histogram_bins, 10);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = AnalysisConfig::load(Some(Path::new("/nonexistent/analysis.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_with_overrides() {
        let config = AnalysisConfig::default()
            .with_rolling_window(3)
            .unwrap()
            .with_outlier_threshold(1.5)
            .unwrap();
        assert_eq!(config.rolling_window, 3);
        assert_eq!(config.outlier_threshold, 1.5);
        assert!(AnalysisConfig::default().with_rolling_window(0).is_err());
        assert!(AnalysisConfig::default()
            .with_outlier_threshold(f64::NAN)
            .is_err());
    }
}

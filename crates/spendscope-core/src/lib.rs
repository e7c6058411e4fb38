//! Spendscope Core Library
//!
//! Shared functionality for the Spendscope expense dashboard:
//! - CSV loading and schema normalization
//! - Date range, category and user filtering
//! - Daily, per-category and per-user aggregation
//! - Rolling-mean trend and z-score outlier detection
//! - Weekday x month cross-tab and amount distribution
//! - Filtered CSV export
//! - Content-addressed dataset cache

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod crosstab;
pub mod distribution;
pub mod error;
pub mod export;
pub mod filter;
pub mod import;
pub mod models;
pub mod normalize;
pub mod outliers;
pub mod pipeline;
pub mod trend;

pub use aggregate::GroupKey;
pub use cache::{content_hash, CacheStatus, Dataset, DatasetCache};
pub use config::AnalysisConfig;
pub use crosstab::CrossTab;
pub use distribution::{BoxplotStats, DistributionSummary, Histogram, HistogramBin};
pub use error::{Error, Result};
pub use export::{export_csv, write_csv, EXPORT_FILE_NAME};
pub use filter::{
    AppliedFilter, CategoryFilter, DateRange, FilterSpec, RangeRecovery, ResolvedRange,
    UserFilter,
};
pub use import::{FileFormat, RawTable};
pub use models::{
    AmountSummary, DailyPoint, DayName, FilterOptions, Kpis, MonthName, OutlierDay, OutlierFlag,
    Record, RecordSet, TrendPoint,
};
pub use normalize::NormalizedSet;
pub use pipeline::{analyze, Analysis, Dashboard};

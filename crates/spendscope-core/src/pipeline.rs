//! End-to-end analysis pass
//!
//! Filter -> {aggregate, cross-tab, distribution} -> {trend, outliers}.
//! Every pass recomputes from the full record set; nothing is carried
//! between filter changes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{
    aggregate_by_date, aggregate_by_date_and_key, aggregate_by_key, compute_kpis, GroupKey,
};
use crate::config::AnalysisConfig;
use crate::crosstab::{build_crosstab, CrossTab};
use crate::distribution::{summarize_distribution, DistributionSummary};
use crate::filter::{filter, AppliedFilter, FilterSpec};
use crate::models::{
    CategorySummary, DailyPoint, KeyedDailyPoint, Kpis, OutlierDay, OutlierFlag, RecordSet,
    TrendPoint, UserSummary,
};
use crate::outliers::{detect_outliers, outlier_days};
use crate::trend::rolling_mean;

/// All derived views for one filter combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub applied: AppliedFilter,
    pub kpis: Kpis,
    /// Daily totals with their rolling mean
    pub trend: Vec<TrendPoint>,
    /// Index-aligned with `trend`
    pub outliers: Vec<OutlierFlag>,
    pub category_trend: Vec<KeyedDailyPoint>,
    /// None when no weekday/month cell has data
    pub crosstab: Option<CrossTab>,
    pub categories: CategorySummary,
    pub users: UserSummary,
    pub distribution: DistributionSummary,
    /// The filtered records, pre-aggregation
    pub records: RecordSet,
}

impl Dashboard {
    /// Only the flagged days, with their z-scores
    pub fn outlier_days(&self) -> Vec<OutlierDay> {
        let daily: Vec<_> = self
            .trend
            .iter()
            .map(|t| DailyPoint {
                date: t.date,
                amount: t.amount,
            })
            .collect();
        outlier_days(&daily, &self.outliers)
    }
}

/// Outcome of a pass: either the empty-result state or a full dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis {
    /// No records matched the filter
    Empty { applied: AppliedFilter },
    #[serde(rename = "ok")]
    Report(Box<Dashboard>),
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn applied(&self) -> &AppliedFilter {
        match self {
            Self::Empty { applied } => applied,
            Self::Report(dashboard) => &dashboard.applied,
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            Self::Empty { .. } => None,
            Self::Report(dashboard) => Some(dashboard),
        }
    }
}

/// Run the whole pipeline over a normalized record set
pub fn analyze(records: &RecordSet, spec: &FilterSpec, config: &AnalysisConfig) -> Analysis {
    let filtered = filter(records, spec);
    if filtered.is_empty() {
        info!(
            input = filtered.applied.input_records,
            "No data after applying filters"
        );
        return Analysis::Empty {
            applied: filtered.applied,
        };
    }

    let view = &filtered.records;
    let daily = aggregate_by_date(view);
    let kpis = compute_kpis(view, &daily);
    let trend = rolling_mean(&daily, config.rolling_window);
    let outliers = detect_outliers(&daily, config.outlier_threshold);

    debug!(
        records = view.len(),
        days = daily.len(),
        flagged = outliers.iter().filter(|f| f.is_outlier).count(),
        "Computed dashboard"
    );

    Analysis::Report(Box::new(Dashboard {
        kpis,
        trend,
        outliers,
        category_trend: aggregate_by_date_and_key(view, GroupKey::Category),
        crosstab: build_crosstab(view),
        categories: aggregate_by_key(view, GroupKey::Category),
        users: aggregate_by_key(view, GroupKey::User),
        distribution: summarize_distribution(view, config.histogram_bins),
        applied: filtered.applied,
        records: filtered.records,
    }))
}

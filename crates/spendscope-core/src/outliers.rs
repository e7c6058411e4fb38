//! Z-score outlier detection over the daily series
//!
//! Uses the population standard deviation (divide by N). The rule is
//! one-sided: only points at or above `threshold` standard deviations
//! over the mean are flagged, so dips are never reported.

use tracing::debug;

use crate::models::{DailyPoint, OutlierDay, OutlierFlag};

pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Population mean and standard deviation, or None for an empty slice
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Flag each point, index-aligned with `series`
pub fn detect_outliers(series: &[DailyPoint], threshold: f64) -> Vec<OutlierFlag> {
    let amounts: Vec<f64> = series.iter().map(|p| p.amount).collect();

    let (mean, std) = match mean_std(&amounts) {
        Some(stats) => stats,
        None => return Vec::new(),
    };

    // rounding leaves a tiny non-zero std for constant non-binary amounts
    let constant = amounts.iter().all(|a| *a == amounts[0]);
    if constant || std <= f64::EPSILON * mean.abs().max(1.0) {
        debug!(points = series.len(), "Degenerate series; no z-scores defined");
        return vec![
            OutlierFlag {
                z_score: None,
                is_outlier: false,
            };
            series.len()
        ];
    }

    amounts
        .iter()
        .map(|amount| {
            let z = (amount - mean) / std;
            OutlierFlag {
                z_score: Some(z),
                is_outlier: z >= threshold,
            }
        })
        .collect()
}

/// The flagged points only, in series order
pub fn outlier_days(series: &[DailyPoint], flags: &[OutlierFlag]) -> Vec<OutlierDay> {
    series
        .iter()
        .zip(flags)
        .filter(|(_, flag)| flag.is_outlier)
        .filter_map(|(point, flag)| {
            flag.z_score.map(|z_score| OutlierDay {
                date: point.date,
                amount: point.amount,
                z_score,
            })
        })
        .collect()
}

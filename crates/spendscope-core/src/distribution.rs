//! Histogram and boxplot statistics over raw (per-record) amounts
//!
//! Quartiles use linear interpolation between ranked values: for
//! probability `p` over `n` sorted values, the rank is `h = (n - 1) * p`
//! and the result is `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.

use serde::{Deserialize, Serialize};

use crate::models::RecordSet;

pub const DEFAULT_BINS: usize = 30;

/// Whisker reach as a multiple of the interquartile range
const WHISKER_IQR: f64 = 1.5;

/// One equal-width histogram bucket, `[lower, upper)` except the last
/// which also includes `upper`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Five-number summary plus whiskers and point overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Most extreme values still inside the fences
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Values outside the fences, in input order
    pub outliers: Vec<f64>,
    /// Every value, in input order, for the point overlay
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub histogram: Histogram,
    /// None when there are no amounts
    pub boxplot: Option<BoxplotStats>,
}

/// Equal-width histogram with exactly `bins` buckets spanning min..max.
///
/// A degenerate range (all values equal) is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    if values.is_empty() {
        return Histogram::default();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bins {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count,
            })
            .collect(),
    }
}

/// Linear-interpolation quantile of pre-sorted values
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    Some(sorted[lower] + (h - lower as f64) * (sorted[upper] - sorted[lower]))
}

pub fn boxplot_stats(values: &[f64]) -> Option<BoxplotStats> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;

    let iqr = q3 - q1;
    let lower_fence = q1 - WHISKER_IQR * iqr;
    let upper_fence = q3 + WHISKER_IQR * iqr;

    let inside = |v: &&f64| **v >= lower_fence && **v <= upper_fence;
    // q1 and q3 always lie inside the fences, so these are never empty
    let whisker_low = sorted.iter().find(inside).copied().unwrap_or(min);
    let whisker_high = sorted.iter().rev().find(inside).copied().unwrap_or(max);

    Some(BoxplotStats {
        min,
        q1,
        median,
        q3,
        max,
        lower_fence,
        upper_fence,
        whisker_low,
        whisker_high,
        outliers: values
            .iter()
            .copied()
            .filter(|v| *v < lower_fence || *v > upper_fence)
            .collect(),
        points: values.to_vec(),
    })
}

/// Histogram and boxplot for the amount column of a filtered set
pub fn summarize_distribution(records: &RecordSet, bins: usize) -> DistributionSummary {
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    DistributionSummary {
        histogram: histogram(&amounts, bins),
        boxplot: boxplot_stats(&amounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&sorted, 0.25).unwrap(), 1.75));
        assert!(close(quantile(&sorted, 0.5).unwrap(), 2.5));
        assert!(close(quantile(&sorted, 0.75).unwrap(), 3.25));
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[7.0], 0.3), Some(7.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_boxplot_stats() {
        let values = [5.0, 1.0, 3.0, 2.0, 4.0, 100.0];
        let stats = boxplot_stats(&values).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        // sorted: 1 2 3 4 5 100
        assert!(close(stats.q1, 2.25));
        assert!(close(stats.median, 3.5));
        assert!(close(stats.q3, 4.75));
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.points, values.to_vec());
    }

    #[test]
    fn test_boxplot_empty() {
        assert!(boxplot_stats(&[]).is_none());
    }

    #[test]
    fn test_histogram_fixed_bucket_count() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let hist = histogram(&values, DEFAULT_BINS);
        assert_eq!(hist.bins.len(), 30);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.bins[0].lower, 0.0);
        assert_eq!(hist.bins[29].upper, 100.0);
        // the maximum lands in the last bucket
        assert!(hist.bins[29].count >= 1);
    }

    #[test]
    fn test_histogram_constant_values() {
        let hist = histogram(&[4.0, 4.0, 4.0], 30);
        assert_eq!(hist.bins.len(), 30);
        assert_eq!(hist.total(), 3);
        assert!(close(hist.bins[0].lower, 3.5));
        assert!(close(hist.bins[29].upper, 4.5));
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 30).bins.is_empty());
    }
}

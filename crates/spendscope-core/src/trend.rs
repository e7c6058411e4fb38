//! Trailing rolling mean over the daily series

use crate::models::{DailyPoint, TrendPoint};

/// Default window, in points
pub const DEFAULT_WINDOW: usize = 7;

/// Mean of `series[max(0, i - window + 1)..=i]` for every point.
///
/// The window is trailing, not centered; the first `window - 1` points
/// average over what is available. A window of 0 is treated as 1.
pub fn rolling_mean(series: &[DailyPoint], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &series[start..=i];
            let sum: f64 = slice.iter().map(|p| p.amount).sum();

            TrendPoint {
                date: point.date,
                amount: point.amount,
                rolling_mean: sum / slice.len() as f64,
            }
        })
        .collect()
}

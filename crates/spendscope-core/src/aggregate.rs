//! Aggregation of filtered records
//!
//! Groups are built with ordered maps in a single pass, so a group exists
//! only when at least one record maps to it and output order is stable.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    AmountSummary, DailyPoint, DailySeries, KeyedDailyPoint, Kpis, Record, RecordSet,
};

/// Categorical attribute to group by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Category,
    User,
}

impl GroupKey {
    /// The key's value for a record; records without one join no group
    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self {
            Self::Category => record.expense_type.as_deref(),
            Self::User => record.user_id.as_deref(),
        }
    }
}

/// Sum amounts per distinct date, ascending
pub fn aggregate_by_date(records: &RecordSet) -> DailySeries {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *by_date.entry(record.date).or_insert(0.0) += record.amount;
    }

    by_date
        .into_iter()
        .map(|(date, amount)| DailyPoint { date, amount })
        .collect()
}

/// Sum amounts per category or user identity
pub fn aggregate_by_key(records: &RecordSet, key: GroupKey) -> AmountSummary {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if let Some(value) = key.value(record) {
            *totals.entry(value.to_string()).or_insert(0.0) += record.amount;
        }
    }
    AmountSummary(totals)
}

/// Sum amounts per (date, key), ordered by date then key
pub fn aggregate_by_date_and_key(records: &RecordSet, key: GroupKey) -> Vec<KeyedDailyPoint> {
    let mut totals: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for record in records {
        if let Some(value) = key.value(record) {
            *totals.entry((record.date, value)).or_insert(0.0) += record.amount;
        }
    }

    totals
        .into_iter()
        .map(|((date, key), amount)| KeyedDailyPoint {
            date,
            key: key.to_string(),
            amount,
        })
        .collect()
}

/// Headline numbers: total, mean daily total, and the largest day
pub fn compute_kpis(records: &RecordSet, daily: &[DailyPoint]) -> Kpis {
    let total_spend: f64 = records.iter().map(|r| r.amount).sum();

    let average_daily = if daily.is_empty() {
        0.0
    } else {
        daily.iter().map(|p| p.amount).sum::<f64>() / daily.len() as f64
    };

    // first occurrence wins on ties
    let max_day = daily.iter().fold(None::<DailyPoint>, |best, p| match best {
        Some(b) if b.amount >= p.amount => Some(b),
        _ => Some(*p),
    });

    Kpis {
        total_spend,
        average_daily,
        max_day,
        record_count: records.len(),
        day_count: daily.len(),
    }
}

//! Domain models for Spendscope

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of the week, serialized by full English name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    /// Canonical Monday-first order used for heatmap rows
    pub const ALL: [DayName; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }

    /// Position in the canonical order (Monday = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl std::fmt::Display for DayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Calendar month, serialized by full English name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthName {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl MonthName {
    pub const ALL: [MonthName; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        Self::ALL[date.month0() as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }
}

impl std::fmt::Display for MonthName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single expense transaction after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    /// Signed amount (expenses are usually positive in these files)
    pub amount: f64,
    pub expense_type: Option<String>,
    pub user_id: Option<String>,
    pub vendor: Option<String>,
    /// Optional count column, coerced best-effort
    pub orders: Option<f64>,
    pub weekday: DayName,
    /// ISO week number (1-53)
    pub week: u32,
    pub month: MonthName,
}

impl Record {
    /// Build a record and derive its calendar attributes from `date`
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            expense_type: None,
            user_id: None,
            vendor: None,
            orders: None,
            weekday: DayName::from_date(date),
            week: date.iso_week().week(),
            month: MonthName::from_date(date),
        }
    }

    pub fn with_expense_type(mut self, expense_type: impl Into<String>) -> Self {
        self.expense_type = Some(expense_type.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
}

/// Records ordered by date ascending.
///
/// Construction sorts stably, so rows sharing a date keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest dates, or None for an empty set
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// One day of summed spending
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Date-ordered daily totals, one entry per distinct date
pub type DailySeries = Vec<DailyPoint>;

/// Daily total plus its trailing rolling mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: f64,
    pub rolling_mean: f64,
}

/// Outlier verdict for one daily point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierFlag {
    /// None when the series has zero standard deviation
    pub z_score: Option<f64>,
    pub is_outlier: bool,
}

/// A flagged outlier day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierDay {
    pub date: NaiveDate,
    pub amount: f64,
    pub z_score: f64,
}

/// Daily total for a single category or user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedDailyPoint {
    pub date: NaiveDate,
    pub key: String,
    pub amount: f64,
}

/// Summed amount per category or user identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountSummary(pub BTreeMap<String, f64>);

pub type CategorySummary = AmountSummary;
pub type UserSummary = AmountSummary;

impl AmountSummary {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Entries by amount descending, ties by key ascending
    pub fn sorted_desc(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.0.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

/// Headline numbers for the filtered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_spend: f64,
    pub average_daily: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_day: Option<DailyPoint>,
    pub record_count: usize,
    pub day_count: usize,
}

/// Values available to the presentation layer's filter controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Distinct categories in first-appearance order
    pub categories: Vec<String>,
    /// Distinct user identities in first-appearance order
    pub users: Vec<String>,
}

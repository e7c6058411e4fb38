//! Filter engine
//!
//! Applies, in order, an inclusive date range, an optional category
//! inclusion set, and an optional single user identity. A malformed or
//! inverted date range never empties the view: it is replaced by the full
//! observed span of the input and the substitution is reported.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{FilterOptions, Record, RecordSet};
use crate::normalize::parse_date;

/// Date formats accepted from filter controls
const RANGE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Date-range control as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRange {
    /// No bound: the full observed span
    #[default]
    All,
    /// A single selected day
    Single { date: NaiveDate },
    /// Inclusive bounds
    Between { start: NaiveDate, end: NaiveDate },
    /// Everything up to and including `end`
    Until { end: NaiveDate },
    /// Input that could not be parsed as dates
    Unparseable { input: String },
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Between { start, end }
    }

    /// Build a range from raw control values.
    ///
    /// Two or more values give start and end, one value selects that day,
    /// none selects everything. Any unparseable value makes the whole
    /// range unparseable.
    pub fn from_inputs<S: AsRef<str>>(inputs: &[S]) -> Self {
        let values: Vec<&str> = inputs
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();

        let mut dates = Vec::with_capacity(2);
        for value in values.iter().take(2) {
            match parse_date(value, &RANGE_FORMATS[..]) {
                Some(date) => dates.push(date),
                None => {
                    return Self::Unparseable {
                        input: values.join(", "),
                    }
                }
            }
        }

        match dates.as_slice() {
            [] => Self::All,
            [date] => Self::Single { date: *date },
            [start, end, ..] => Self::Between {
                start: *start,
                end: *end,
            },
        }
    }

    /// Build from optional `from`/`to` strings (CLI flags, query params).
    ///
    /// `from` alone selects that day; `to` alone starts at the earliest
    /// observed date.
    pub fn from_bounds(from: Option<&str>, to: Option<&str>) -> Self {
        match (from, to) {
            (Some(from), Some(to)) => Self::from_inputs(&[from, to]),
            (Some(from), None) => Self::from_inputs(&[from]),
            (None, Some(to)) => match Self::from_inputs(&[to]) {
                Self::Single { date } => Self::Until { end: date },
                other => other,
            },
            (None, None) => Self::All,
        }
    }

    /// Resolve against the observed span of the data
    pub fn resolve(&self, observed: (NaiveDate, NaiveDate)) -> ResolvedRange {
        let full = |recovered| ResolvedRange {
            start: observed.0,
            end: observed.1,
            recovered,
        };

        match self {
            Self::All => full(None),
            Self::Single { date } => ResolvedRange {
                start: *date,
                end: *date,
                recovered: None,
            },
            Self::Between { start, end } if start <= end => ResolvedRange {
                start: *start,
                end: *end,
                recovered: None,
            },
            Self::Between { start, end } => {
                warn!(%start, %end, "Inverted date range; using full span");
                full(Some(RangeRecovery::Inverted))
            }
            Self::Until { end } if *end >= observed.0 => ResolvedRange {
                start: observed.0,
                end: *end,
                recovered: None,
            },
            Self::Until { end } => {
                warn!(%end, start = %observed.0, "End date before all data; using full span");
                full(Some(RangeRecovery::Inverted))
            }
            Self::Unparseable { input } => {
                warn!(input = %input, "Unparseable date range; using full span");
                full(Some(RangeRecovery::Unparseable))
            }
        }
    }
}

/// Why a requested range was replaced by the full span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeRecovery {
    Inverted,
    Unparseable,
}

/// Concrete inclusive bounds after recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<RangeRecovery>,
}

/// Category inclusion control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl CategoryFilter {
    /// An empty selection means no category filtering
    pub fn from_selection<I, S>(selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = selection
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if set.is_empty() {
            Self::All
        } else {
            Self::Only(set)
        }
    }

    fn admits(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => record
                .expense_type
                .as_ref()
                .is_some_and(|t| set.contains(t)),
        }
    }
}

/// Single user identity control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFilter {
    #[default]
    All,
    Only(String),
}

impl UserFilter {
    /// `None`, blank, or "All" (any case) select every user
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(s) => Self::Only(s.to_string()),
        }
    }

    fn admits(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Only(user) => record.user_id.as_deref() == Some(user.as_str()),
        }
    }
}

/// All filter controls for one pipeline pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_range: DateRange,
    pub categories: CategoryFilter,
    pub user: UserFilter,
}

impl FilterSpec {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_categories(mut self, categories: CategoryFilter) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_user(mut self, user: UserFilter) -> Self {
        self.user = user;
        self
    }
}

/// The filter as actually applied, for display alongside results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFilter {
    /// None when the input had no records at all
    pub range: Option<ResolvedRange>,
    pub categories: CategoryFilter,
    pub user: UserFilter,
    pub input_records: usize,
    pub matched_records: usize,
}

/// Filtered view plus what was applied
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub records: RecordSet,
    pub applied: AppliedFilter,
}

impl Filtered {
    /// True when nothing matched (the "no data" condition)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply a filter spec to a normalized record set
pub fn filter(records: &RecordSet, spec: &FilterSpec) -> Filtered {
    let range = records.date_span().map(|span| spec.date_range.resolve(span));

    let matched: Vec<Record> = records
        .iter()
        .filter(|r| range.map_or(true, |rg| r.date >= rg.start && r.date <= rg.end))
        .filter(|r| spec.categories.admits(r))
        .filter(|r| spec.user.admits(r))
        .cloned()
        .collect();

    debug!(
        input = records.len(),
        matched = matched.len(),
        "Applied filter"
    );

    let applied = AppliedFilter {
        range,
        categories: spec.categories.clone(),
        user: spec.user.clone(),
        input_records: records.len(),
        matched_records: matched.len(),
    };

    Filtered {
        records: RecordSet::new(matched),
        applied,
    }
}

/// Distinct control values and date span for building filter widgets
pub fn filter_options(records: &RecordSet) -> FilterOptions {
    let mut categories: Vec<String> = Vec::new();
    let mut users: Vec<String> = Vec::new();

    for record in records {
        if let Some(category) = &record.expense_type {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        if let Some(user) = &record.user_id {
            if !users.contains(user) {
                users.push(user.clone());
            }
        }
    }

    let span = records.date_span();
    FilterOptions {
        min_date: span.map(|s| s.0),
        max_date: span.map(|s| s.1),
        categories,
        users,
    }
}

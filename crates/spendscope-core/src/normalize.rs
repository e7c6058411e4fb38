//! Schema validation and type coercion
//!
//! Turns a [`RawTable`] into a date-ordered [`RecordSet`]:
//! - required columns must exist, otherwise [`Error::Schema`]
//! - rows whose date or amount cannot be coerced are dropped and counted
//! - optional numeric columns are coerced best-effort and never drop a row
//! - weekday, ISO week and month are derived from the coerced date

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::import::RawTable;
use crate::models::{Record, RecordSet};

pub const DATE_COLUMN: &str = "date";
pub const AMOUNT_COLUMN: &str = "amount";
pub const EXPENSE_TYPE_COLUMN: &str = "expense_type";
pub const USER_COLUMN: &str = "user_id";
pub const VENDOR_COLUMN: &str = "vendor";
pub const ORDERS_COLUMN: &str = "orders";

/// Datetime layouts accepted in addition to the configured date formats.
/// The time part is discarded.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Result of normalizing a raw table
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSet {
    pub records: RecordSet,
    /// Rows excluded because the date or amount failed coercion
    pub dropped_rows: usize,
    /// Recommended columns absent from the input
    pub missing_recommended: Vec<String>,
}

/// Normalize a raw table using the configured schema and date formats
pub fn normalize(table: &RawTable, config: &AnalysisConfig) -> Result<NormalizedSet> {
    // date and amount are structurally required even if the config omits them
    for field in config
        .required_fields
        .iter()
        .map(|s| s.as_str())
        .chain([DATE_COLUMN, AMOUNT_COLUMN])
    {
        if !table.has_column(field) {
            return Err(Error::schema(field));
        }
    }

    let missing_recommended: Vec<String> = config
        .recommended_fields
        .iter()
        .filter(|f| !table.has_column(f))
        .cloned()
        .collect();
    if !missing_recommended.is_empty() {
        warn!(
            missing = %missing_recommended.join(", "),
            "Recommended columns missing; some summaries will be empty"
        );
    }

    let date_col = table.column_index(DATE_COLUMN).ok_or_else(|| Error::schema(DATE_COLUMN))?;
    let amount_col = table
        .column_index(AMOUNT_COLUMN)
        .ok_or_else(|| Error::schema(AMOUNT_COLUMN))?;
    let expense_type_col = table.column_index(EXPENSE_TYPE_COLUMN);
    let user_col = table.column_index(USER_COLUMN);
    let vendor_col = table.column_index(VENDOR_COLUMN);
    let orders_col = table.column_index(ORDERS_COLUMN);

    let text = |row: usize, col: Option<usize>| -> Option<String> {
        col.map(|c| table.cell(row, c).trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let mut records = Vec::with_capacity(table.row_count());
    let mut dropped_rows = 0;

    for row in 0..table.row_count() {
        let date = parse_date(table.cell(row, date_col), &config.date_formats);
        let amount = parse_amount(table.cell(row, amount_col));

        let (date, amount) = match (date, amount) {
            (Some(date), Some(amount)) => (date, amount),
            _ => {
                dropped_rows += 1;
                continue;
            }
        };

        let mut record = Record::new(date, amount);
        record.expense_type = text(row, expense_type_col);
        record.user_id = text(row, user_col);
        record.vendor = text(row, vendor_col);
        record.orders = orders_col.and_then(|c| parse_amount(table.cell(row, c)));
        records.push(record);
    }

    if dropped_rows > 0 {
        warn!(dropped_rows, "Dropped rows with unparseable date or amount");
    }
    debug!(kept = records.len(), dropped_rows, "Normalized records");

    Ok(NormalizedSet {
        records: RecordSet::new(records),
        dropped_rows,
        missing_recommended,
    })
}

/// Parse a date using the given formats, falling back to datetime layouts
pub fn parse_date<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt.as_ref()) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse an amount string, handling currency symbols, commas and
/// accounting-style parentheses. Non-finite values are rejected.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₹', '€', '£', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::load_csv;
    use crate::models::{DayName, MonthName};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn normalize_str(csv: &str) -> Result<NormalizedSet> {
        let table = load_csv(csv.as_bytes()).unwrap();
        normalize(&table, &AnalysisConfig::default())
    }

    #[test]
    fn test_parse_date() {
        let formats = AnalysisConfig::default().date_formats;
        assert_eq!(parse_date("2024-01-15", &formats), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024", &formats), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("2024/01/15", &formats), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 13:45:00", &formats), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T13:45:00Z", &formats), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("not a date", &formats), None);
        assert_eq!(parse_date("", &formats), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("₹ 500"), Some(500.0));
        assert_eq!(parse_amount("-123.45"), Some(-123.45));
        assert_eq!(parse_amount("(100.00)"), Some(-100.00));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("  "), None);
    }

    #[test]
    fn test_missing_required_field() {
        let err = normalize_str("date,vendor\n2024-01-01,shop\n").unwrap_err();
        match err {
            Error::Schema { field } => assert_eq!(field, "amount"),
            other => panic!("unexpected error: {other}"),
        }

        let err = normalize_str("amount\n5\n").unwrap_err();
        assert!(matches!(err, Error::Schema { field } if field == "date"));
    }

    #[test]
    fn test_bad_rows_are_dropped_not_kept() {
        let set = normalize_str(
            "date,amount\n2024-01-02,10\nbogus,5\n2024-01-01,abc\n2024-01-01,7\n,3\n",
        )
        .unwrap();
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.dropped_rows, 3);
        assert!(set.records.iter().all(|r| r.amount.is_finite()));
        // sorted by date
        assert_eq!(set.records.records()[0].date, d(2024, 1, 1));
    }

    #[test]
    fn test_optional_fields_and_derived_columns() {
        let set = normalize_str(
            "date,user_id,expense_type,vendor,amount,orders\n\
             2024-03-06,u1,food,Cafe,12.5,two\n\
             2024-03-07,,  ,Shop,3,4\n",
        )
        .unwrap();
        let records = set.records.records();
        assert!(set.missing_recommended.is_empty());

        assert_eq!(records[0].user_id.as_deref(), Some("u1"));
        assert_eq!(records[0].expense_type.as_deref(), Some("food"));
        // orders failure does not drop the row
        assert_eq!(records[0].orders, None);
        assert_eq!(records[0].weekday, DayName::Wednesday);
        assert_eq!(records[0].month, MonthName::March);
        assert_eq!(records[0].week, 10);

        assert_eq!(records[1].user_id, None);
        assert_eq!(records[1].expense_type, None);
        assert_eq!(records[1].orders, Some(4.0));
    }

    #[test]
    fn test_reports_missing_recommended() {
        let set = normalize_str("date,amount\n2024-01-01,1\n").unwrap();
        assert_eq!(
            set.missing_recommended,
            vec!["user_id", "expense_type", "vendor"]
        );
    }
}

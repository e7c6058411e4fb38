//! Export of the filtered record set back to delimited text
//!
//! The column set mirrors the input schema so an exported file can be
//! loaded and normalized again.

use std::io::Write;

use csv::WriterBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RecordSet;

/// Suggested file name for downloads
pub const EXPORT_FILE_NAME: &str = "filtered_expenses.csv";

const BASE_COLUMNS: [&str; 5] = ["date", "user_id", "expense_type", "vendor", "amount"];

/// Write records as CSV. An `orders` column is added when any record has one.
pub fn write_csv<W: Write>(records: &RecordSet, writer: W) -> Result<()> {
    let with_orders = records.iter().any(|r| r.orders.is_some());

    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_orders {
        header.push("orders");
    }
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.date.format("%Y-%m-%d").to_string(),
            record.user_id.clone().unwrap_or_default(),
            record.expense_type.clone().unwrap_or_default(),
            record.vendor.clone().unwrap_or_default(),
            record.amount.to_string(),
        ];
        if with_orders {
            row.push(record.orders.map(|o| o.to_string()).unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    debug!(rows = records.len(), "Exported records");
    Ok(())
}

/// Export records to a CSV string
pub fn export_csv(records: &RecordSet) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("Export is not UTF-8: {}", e)))
}

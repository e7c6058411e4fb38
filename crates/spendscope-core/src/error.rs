//! Error types for Spendscope

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required column is missing from the input file
    #[error("Missing required field: {field}")]
    Schema { field: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub fn schema(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

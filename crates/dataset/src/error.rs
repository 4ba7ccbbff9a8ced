use core_types::CoreError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Column '{column}' is invalid: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("Invalid row: {0}")]
    InvalidRow(#[from] CoreError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub(crate) fn invalid_column(column: &str, reason: impl Into<String>) -> Self {
        DatasetError::InvalidColumn {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

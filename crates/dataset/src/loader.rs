//! Data loader for the BearCart transaction export.
//!
//! Reads a CSV or Parquet file into a `polars` frame, converts it into typed
//! events and derives the order view. The result is a `Dataset` that is never
//! modified afterwards.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Instant;

use polars::prelude::*;

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::format::DataFormat;
use crate::schema::events_from_frame;

/// Rows scanned when inferring CSV column types.
const DEFAULT_INFER_SCHEMA_ROWS: usize = 10_000;

/// File and stream loader for transaction data.
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_rows: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self {
            infer_schema_rows: DEFAULT_INFER_SCHEMA_ROWS,
        }
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leading CSV rows used to infer column types.
    pub fn with_infer_schema_rows(mut self, rows: usize) -> Self {
        self.infer_schema_rows = rows.max(1);
        self
    }

    /// Loads a dataset from a `.csv` or `.parquet` file.
    ///
    /// # Errors
    /// - `UnsupportedFormat` for any other extension, checked before the file is touched
    /// - `FileNotFound` if the path does not exist
    /// - `MissingColumn` / `InvalidColumn` / `InvalidRow` for schema violations
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DatasetError> {
        let path = path.as_ref();
        let format = DataFormat::from_path(path)?;
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.display().to_string()));
        }

        let started = Instant::now();
        let df = self.load_frame(path, format)?;
        let dataset = Dataset::from_events(events_from_frame(&df)?)?;

        tracing::info!(
            path = %path.display(),
            %format,
            events = dataset.events().len(),
            orders = dataset.orders().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dataset loaded."
        );

        Ok(dataset)
    }

    /// Loads a dataset from content that is already in memory, e.g. an uploaded file.
    ///
    /// `file_name` only selects the format; nothing is read from disk.
    pub fn load_reader<R: Read>(
        &self,
        file_name: &str,
        mut reader: R,
    ) -> Result<Dataset, DatasetError> {
        let format = DataFormat::from_path(Path::new(file_name))?;

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let df = match format {
            DataFormat::Csv => self
                .csv_options()
                .into_reader_with_file_handle(Cursor::new(bytes))
                .finish()?,
            DataFormat::Parquet => ParquetReader::new(Cursor::new(bytes)).finish()?,
        };

        tracing::debug!(file_name, %format, rows = df.height(), "Read upload from memory.");
        Dataset::from_events(events_from_frame(&df)?)
    }

    /// Reads the raw frame for a file whose format has already been decided.
    pub fn load_frame(&self, path: &Path, format: DataFormat) -> Result<DataFrame, DatasetError> {
        let df = match format {
            DataFormat::Csv => self
                .csv_options()
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?,
            DataFormat::Parquet => {
                let file = File::open(path)?;
                ParquetReader::new(file).finish()?
            }
        };

        tracing::debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "Read raw frame."
        );

        Ok(df)
    }

    fn csv_options(&self) -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_rows))
    }
}

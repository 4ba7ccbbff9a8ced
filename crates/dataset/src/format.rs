use crate::error::DatasetError;
use std::fmt;
use std::path::Path;

/// The file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Parquet,
}

impl DataFormat {
    /// Picks the format from the file extension, ignoring case.
    ///
    /// Anything other than `.csv` or `.parquet` is rejected; the loader never
    /// guesses at contents.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Result<Self, DatasetError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "parquet" => Ok(DataFormat::Parquet),
            _ => Err(DatasetError::UnsupportedFormat(extension.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Csv => f.write_str("csv"),
            DataFormat::Parquet => f.write_str("parquet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_dispatch() {
        assert_eq!(
            DataFormat::from_path(Path::new("data/orders.csv")).unwrap(),
            DataFormat::Csv
        );
        assert_eq!(
            DataFormat::from_path(Path::new("orders.PARQUET")).unwrap(),
            DataFormat::Parquet
        );
    }

    #[test]
    fn unknown_or_missing_extension_is_rejected() {
        let err = DataFormat::from_path(Path::new("orders.xlsx")).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat(ext) if ext == "xlsx"));

        let err = DataFormat::from_path(Path::new("orders")).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat(ext) if ext.is_empty()));
    }
}

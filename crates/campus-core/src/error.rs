use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the campus usage pipeline.
#[derive(Error, Debug)]
pub enum CampusError {
    /// A required column is absent from an input table after header
    /// normalisation. Fatal for that load; never retried.
    #[error("Required column '{column}' missing from {table} table")]
    MissingColumn { table: String, column: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the campus crates.
pub type Result<T> = std::result::Result<T, CampusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_column() {
        let err = CampusError::MissingColumn {
            table: "readings".to_string(),
            column: "CommodityCode".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Required column 'CommodityCode' missing from readings table"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CampusError::FileRead {
            path: PathBuf::from("/some/readings.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/readings.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_config() {
        let err = CampusError::Config("unknown commodity 'steam'".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown commodity 'steam'");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CampusError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_csv() {
        // A CSV record with a mismatched field count surfaces as a csv::Error
        // when read strictly.
        let mut reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_reader("a,b\n1,2,3\n".as_bytes());
        let record_err = reader
            .records()
            .next()
            .expect("one record attempted")
            .unwrap_err();
        let err: CampusError = record_err.into();
        assert!(err.to_string().contains("Failed to parse CSV"));
    }
}

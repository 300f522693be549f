//! CSV file discovery and raw table loading.
//!
//! Parsing stops at strings here: a [`RawTable`] is the untyped header row
//! plus string cells, handed to the store for normalisation and typing.

use std::path::{Path, PathBuf};

use campus_core::error::{CampusError, Result};
use tracing::warn;

// ── File discovery ────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_dir`, sorted by path.
pub fn find_csv_files(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.exists() {
        warn!("Data path does not exist: {}", data_dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── RawTable ──────────────────────────────────────────────────────────────────

/// An untyped tabular file: the original header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Short table name used in error messages (the file stem when loaded
    /// from disk).
    pub name: String,
    /// Header names exactly as they appear in the file, including any
    /// embedded line-break noise.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from in-memory parts (used heavily by tests).
    pub fn new(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    /// Parse a CSV file into a raw table.
    ///
    /// The reader is flexible about per-row field counts; short rows are
    /// kept and resolved at typing time.
    pub fn from_csv_path(path: &Path) -> Result<RawTable> {
        let file = std::fs::File::open(path).map_err(|source| CampusError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "table".to_string());

        Ok(Self { name, columns, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

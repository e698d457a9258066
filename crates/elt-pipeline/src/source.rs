//! Source database collaborator.
//!
//! The bronze load only needs three things from the relational source: the
//! list of base tables, each table as a frame, and row counts for
//! diagnostics. [`CsvDirectorySource`] serves a directory of CSV exports,
//! one file per table.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Read access to a relational source.
pub trait SourceDatabase {
    /// Key/value rows describing the connection, for diagnostics.
    fn describe(&self) -> Vec<(String, String)>;

    /// Base table names, sorted.
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Reads a whole table.
    fn read_table(&self, table: &str) -> Result<DataFrame>;

    /// Number of rows in `table`.
    fn count_rows(&self, table: &str) -> Result<usize> {
        Ok(self.read_table(table)?.height())
    }
}

/// A directory of `<table>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    infer_schema_length: Option<usize>,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound { path: dir });
        }
        Ok(Self {
            dir,
            infer_schema_length: Some(100),
        })
    }

    /// Rows scanned for dtype inference (`None` scans the whole file).
    #[must_use]
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    fn table_path(&self, table: &str) -> Result<PathBuf> {
        list_csv_files(&self.dir)?
            .into_iter()
            .find(|path| table_name(path).as_deref() == Some(table))
            .ok_or_else(|| PipelineError::TableNotFound {
                table: table.to_string(),
            })
    }
}

impl SourceDatabase for CsvDirectorySource {
    fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("Source".to_string(), "csv directory".to_string()),
            ("Path".to_string(), self.dir.display().to_string()),
        ]
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables: Vec<String> = list_csv_files(&self.dir)?
            .iter()
            .filter_map(|path| table_name(path))
            .collect();
        tables.sort();
        Ok(tables)
    }

    fn read_table(&self, table: &str) -> Result<DataFrame> {
        let path = self.table_path(table)?;
        let df = read_csv_frame(&path, self.infer_schema_length)?;
        debug!(
            table,
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "read source table"
        );
        Ok(df)
    }
}

/// Reads a headed CSV file into a frame.
pub fn read_csv_frame(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    let parse_error = |e: PolarsError| PipelineError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)
}

/// Lists all CSV files in a directory, sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // Check for .csv extension (case-insensitive)
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn table_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

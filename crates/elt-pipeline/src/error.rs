//! Error types for the ELT pipelines.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by pipeline steps and their collaborators.
#[derive(Debug, Error)]
pub enum PipelineError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read or write a file or directory.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Data Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Identifier normalization rejected a table or its columns.
    #[error(transparent)]
    Naming(#[from] elt_naming::NamingError),

    /// Requested table is not present in the source.
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    /// Requested table is not present in the warehouse.
    #[error("warehouse table not found: {schema}.{table}")]
    WarehouseTableNotFound { schema: String, table: String },

    /// An append targets a table whose columns differ from the frame's.
    #[error("schema mismatch for {schema}.{table}: table has '{existing}', frame has '{frame}'")]
    SchemaMismatch {
        schema: String,
        table: String,
        existing: String,
        frame: String,
    },

    /// Two source tables normalize to the same destination table.
    #[error("tables '{first}' and '{second}' both load into '{canonical}'")]
    DuplicateTable {
        first: String,
        second: String,
        canonical: String,
    },

    /// Row count read back from the warehouse differs from what was written.
    #[error("verification failed for {table}: wrote {written} rows, found {found}")]
    VerificationFailed {
        table: String,
        written: usize,
        found: usize,
    },

    /// A table-level step failed during a multi-table load.
    #[error("failed to load table {table}")]
    Table {
        table: String,
        #[source]
        source: Box<PipelineError>,
    },

    // === Configuration Errors ===
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // === Transform Errors ===
    /// The transformation tool could not be started.
    #[error("failed to spawn '{program}' for step {step}: {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The transformation tool exited unsuccessfully.
    #[error("step {step} failed with {}", exit_description(.code))]
    StepFailed { step: String, code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

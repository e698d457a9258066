//! Source to bronze staging load.
//!
//! Stages, in order:
//! 1. list the source tables and resolve their destination names
//! 2. create the staging schema
//! 3. per table: extract, rename columns, stamp metadata columns, drop the
//!    destination table, bulk-write, verify the row count
//! 4. summarize
//!
//! Two source tables with the same destination name fail the run before
//! anything is written. The first failing table aborts the run.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use elt_naming::{ColumnRename, IdentifierNormalizer, NamingError, rename_frame_columns};
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, info_span};

use crate::error::{PipelineError, Result};
use crate::source::SourceDatabase;
use crate::warehouse::Warehouse;

/// Load timestamp column appended to every bronze table.
pub const LOADED_AT_COLUMN: &str = "_LOADED_AT";
/// Raw source table name column appended to every bronze table.
pub const SOURCE_TABLE_COLUMN: &str = "_SOURCE_TABLE";

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    /// Table name in the source.
    pub source_table: String,
    /// Canonical table name in the staging schema.
    pub table: String,
    pub rows_extracted: usize,
    /// Row count read back from the warehouse.
    pub rows_loaded: usize,
    /// Number of columns written, metadata columns included.
    pub columns: usize,
}

/// Result of a complete bronze load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub schema: String,
    pub tables: Vec<TableLoad>,
    pub tables_loaded: usize,
    pub total_rows: usize,
}

impl LoadSummary {
    pub fn new(schema: impl Into<String>, tables: Vec<TableLoad>) -> Self {
        let total_rows = tables.iter().map(|table| table.rows_loaded).sum();
        Self {
            schema: schema.into(),
            tables_loaded: tables.len(),
            tables,
            total_rows,
        }
    }
}

/// Renames the columns of an extracted table and appends the metadata
/// columns.
pub fn prepare_frame(
    df: &mut DataFrame,
    source_table: &str,
    normalizer: &IdentifierNormalizer,
    loaded_at: DateTime<Utc>,
) -> Result<Vec<ColumnRename>> {
    let renames = rename_frame_columns(df, normalizer)?;
    let height = df.height();
    let stamp = loaded_at.to_rfc3339_opts(SecondsFormat::Micros, true);
    df.with_column(Series::new(LOADED_AT_COLUMN.into(), vec![stamp; height]).into_column())?;
    df.with_column(
        Series::new(
            SOURCE_TABLE_COLUMN.into(),
            vec![source_table.to_string(); height],
        )
        .into_column(),
    )?;
    Ok(renames)
}

/// Canonical destination name for a source table.
pub fn destination_table(source_table: &str, normalizer: &IdentifierNormalizer) -> Result<String> {
    let canonical = normalizer.normalize(source_table);
    if canonical.is_empty() {
        return Err(NamingError::EmptyIdentifier {
            raw: source_table.to_string(),
        }
        .into());
    }
    Ok(canonical.into_string())
}

/// Resolves the destination of every source table, rejecting collisions.
pub fn plan_destinations(
    tables: &[String],
    normalizer: &IdentifierNormalizer,
) -> Result<Vec<(String, String)>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut planned = Vec::with_capacity(tables.len());
    for table in tables {
        let destination =
            destination_table(table, normalizer).map_err(|error| PipelineError::Table {
                table: table.clone(),
                source: Box::new(error),
            })?;
        if let Some(first) = seen.insert(destination.clone(), table) {
            return Err(PipelineError::DuplicateTable {
                first: first.to_string(),
                second: table.clone(),
                canonical: destination,
            });
        }
        planned.push((table.clone(), destination));
    }
    Ok(planned)
}

/// Loads one source table into `schema` as a full refresh.
pub fn load_table(
    source: &dyn SourceDatabase,
    warehouse: &mut dyn Warehouse,
    normalizer: &IdentifierNormalizer,
    schema: &str,
    source_table: &str,
) -> Result<TableLoad> {
    let span = info_span!("load_table", source_table);
    let _guard = span.enter();
    let start = Instant::now();

    let table = destination_table(source_table, normalizer)?;
    let mut df = source.read_table(source_table)?;
    let rows_extracted = df.height();
    info!(rows = rows_extracted, "extracted rows from source");

    prepare_frame(&mut df, source_table, normalizer, Utc::now())?;

    warehouse.drop_table(schema, &table)?;
    let written = warehouse.write_frame(&mut df, schema, &table)?;
    info!(schema, table = %table, rows = written, "loaded rows");

    let rows_loaded = warehouse.count_rows(schema, &table)?;
    if rows_loaded != written {
        return Err(PipelineError::VerificationFailed {
            table: format!("{schema}.{table}"),
            written,
            found: rows_loaded,
        });
    }
    info!(
        schema,
        table = %table,
        rows = rows_loaded,
        duration_ms = start.elapsed().as_millis(),
        "verified load"
    );

    Ok(TableLoad {
        source_table: source_table.to_string(),
        table,
        rows_extracted,
        rows_loaded,
        columns: df.width(),
    })
}

/// Loads every source table into `schema`.
pub fn run_bronze_load(
    source: &dyn SourceDatabase,
    warehouse: &mut dyn Warehouse,
    normalizer: &IdentifierNormalizer,
    schema: &str,
) -> Result<LoadSummary> {
    let start = Instant::now();
    let tables = source.list_tables()?;
    info!(table_count = tables.len(), "found source tables");
    let planned = plan_destinations(&tables, normalizer)?;
    for (table, destination) in &planned {
        info!(table = %table, destination = %destination, "source table");
    }

    warehouse.create_schema(schema)?;
    info!(schema, "staging schema ready");

    let mut loads = Vec::with_capacity(tables.len());
    for table in &tables {
        let load = load_table(source, warehouse, normalizer, schema, table).map_err(|error| {
            PipelineError::Table {
                table: table.clone(),
                source: Box::new(error),
            }
        })?;
        loads.push(load);
    }

    let summary = LoadSummary::new(schema, loads);
    info!(
        schema,
        tables_loaded = summary.tables_loaded,
        total_rows = summary.total_rows,
        duration_ms = start.elapsed().as_millis(),
        "bronze load complete"
    );
    Ok(summary)
}

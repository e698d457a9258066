//! Connectivity checks for the source and the warehouse.

use chrono::{SecondsFormat, Utc};
use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::polars_utils::{FramePreview, preview_rows};
use crate::source::SourceDatabase;
use crate::warehouse::Warehouse;

/// Table written by the warehouse check.
pub const TEST_TABLE: &str = "TEST_DATA";

const TEST_RECORDS: usize = 3;

#[derive(Debug, Clone)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct TableSample {
    pub table: String,
    pub preview: FramePreview,
}

/// What the source check saw.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub description: Vec<(String, String)>,
    pub tables: Vec<TableCount>,
    pub samples: Vec<TableSample>,
}

/// What the warehouse check saw.
#[derive(Debug, Clone)]
pub struct WarehouseReport {
    pub description: Vec<(String, String)>,
    pub schema: String,
    pub table: String,
    pub rows: usize,
}

/// Lists source tables with row counts and previews `sample_tables`.
///
/// A sampled table missing from the source fails the check.
pub fn check_source(
    source: &dyn SourceDatabase,
    sample_tables: &[String],
    sample_limit: usize,
) -> Result<SourceReport> {
    let description = source.describe();
    let names = source.list_tables()?;
    let mut tables = Vec::with_capacity(names.len());
    for table in &names {
        let rows = source.count_rows(table)?;
        info!(table = %table, rows, "source table count");
        tables.push(TableCount {
            table: table.clone(),
            rows,
        });
    }

    let mut samples = Vec::with_capacity(sample_tables.len());
    for table in sample_tables {
        if !names.contains(table) {
            return Err(PipelineError::TableNotFound {
                table: table.clone(),
            });
        }
        let df = source.read_table(table)?;
        samples.push(TableSample {
            table: table.clone(),
            preview: preview_rows(&df, sample_limit)?,
        });
    }

    info!(table_count = tables.len(), "source connection check passed");
    Ok(SourceReport {
        description,
        tables,
        samples,
    })
}

/// Creates `schema`, rewrites [`TEST_TABLE`] with three records and reads
/// its row count back.
pub fn check_warehouse(warehouse: &mut dyn Warehouse, schema: &str) -> Result<WarehouseReport> {
    let description = warehouse.describe();
    warehouse.create_schema(schema)?;
    info!(schema, "created test schema");

    let mut df = test_frame()?;
    warehouse.drop_table(schema, TEST_TABLE)?;
    let written = warehouse.write_frame(&mut df, schema, TEST_TABLE)?;
    info!(schema, table = TEST_TABLE, rows = written, "inserted test records");

    let rows = warehouse.count_rows(schema, TEST_TABLE)?;
    if rows != TEST_RECORDS {
        return Err(PipelineError::VerificationFailed {
            table: format!("{schema}.{TEST_TABLE}"),
            written,
            found: rows,
        });
    }
    info!(schema, table = TEST_TABLE, rows, "warehouse connection check passed");
    Ok(WarehouseReport {
        description,
        schema: schema.to_string(),
        table: TEST_TABLE.to_string(),
        rows,
    })
}

fn test_frame() -> PolarsResult<DataFrame> {
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let ids: Vec<i64> = (1..=TEST_RECORDS as i64).collect();
    let names: Vec<String> = ids.iter().map(|id| format!("Test Record {id}")).collect();
    DataFrame::new(vec![
        Series::new("ID".into(), ids).into_column(),
        Series::new("NAME".into(), names).into_column(),
        Series::new("CREATED_AT".into(), vec![created_at; TEST_RECORDS]).into_column(),
    ])
}

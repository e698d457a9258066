//! Warehouse collaborator.
//!
//! Loads need a schema-creation command, a table drop, a bulk write that
//! creates the table from the frame's columns, and a row count for
//! verification. [`DirectoryWarehouse`] stores each table as a CSV file
//! under `<root>/<DATABASE>/<SCHEMA>/<TABLE>.csv`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::source::read_csv_frame;

/// Write access to the destination warehouse.
pub trait Warehouse {
    /// Key/value rows describing the connection, for diagnostics.
    fn describe(&self) -> Vec<(String, String)>;

    /// Creates `schema` if it does not exist.
    fn create_schema(&mut self, schema: &str) -> Result<()>;

    /// Drops `schema.table` if it exists. Returns whether a table was dropped.
    fn drop_table(&mut self, schema: &str, table: &str) -> Result<bool>;

    /// Appends `df` to `schema.table`, creating the table from the frame's
    /// columns when it does not exist. Returns the number of rows written.
    fn write_frame(&mut self, df: &mut DataFrame, schema: &str, table: &str) -> Result<usize>;

    /// Number of rows in `schema.table`.
    fn count_rows(&self, schema: &str, table: &str) -> Result<usize>;
}

/// A local directory standing in for a warehouse database.
#[derive(Debug, Clone)]
pub struct DirectoryWarehouse {
    root: PathBuf,
    database: String,
}

impl DirectoryWarehouse {
    /// Opens `database` under `root`, creating the database directory.
    pub fn open(root: impl Into<PathBuf>, database: impl Into<String>) -> Result<Self> {
        let root = root.into();
        let database = database.into();
        let db_dir = root.join(&database);
        fs::create_dir_all(&db_dir).map_err(|e| PipelineError::io(&db_dir, e))?;
        Ok(Self { root, database })
    }

    pub fn schema_dir(&self, schema: &str) -> PathBuf {
        self.root.join(&self.database).join(schema)
    }

    pub fn table_path(&self, schema: &str, table: &str) -> PathBuf {
        self.schema_dir(schema).join(format!("{table}.csv"))
    }
}

impl Warehouse for DirectoryWarehouse {
    fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("Warehouse".to_string(), "directory".to_string()),
            ("Path".to_string(), self.root.display().to_string()),
            ("Database".to_string(), self.database.clone()),
        ]
    }

    fn create_schema(&mut self, schema: &str) -> Result<()> {
        let dir = self.schema_dir(schema);
        fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        debug!(database = %self.database, schema, "schema ready");
        Ok(())
    }

    fn drop_table(&mut self, schema: &str, table: &str) -> Result<bool> {
        let path = self.table_path(schema, table);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(schema, table, "dropped table");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PipelineError::io(&path, e)),
        }
    }

    fn write_frame(&mut self, df: &mut DataFrame, schema: &str, table: &str) -> Result<usize> {
        let dir = self.schema_dir(schema);
        if !dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound { path: dir });
        }
        let path = self.table_path(schema, table);
        let header = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let exists = path.is_file();
        if exists {
            let existing = read_header(&path)?;
            if existing != header {
                return Err(PipelineError::SchemaMismatch {
                    schema: schema.to_string(),
                    table: table.to_string(),
                    existing,
                    frame: header,
                });
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::io(&path, e))?;
        CsvWriter::new(&mut file)
            .include_header(!exists)
            .finish(df)?;
        debug!(schema, table, rows = df.height(), appended = exists, "wrote table");
        Ok(df.height())
    }

    fn count_rows(&self, schema: &str, table: &str) -> Result<usize> {
        let path = self.table_path(schema, table);
        if !path.is_file() {
            return Err(PipelineError::WarehouseTableNotFound {
                schema: schema.to_string(),
                table: table.to_string(),
            });
        }
        Ok(read_csv_frame(&path, Some(0))?.height())
    }
}

fn read_header(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| PipelineError::io(path, e))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Series::new("CUSTOMER_NUMBER".into(), vec![103i64, 112]).into_column(),
            Series::new("CITY".into(), vec!["Nantes", "Las Vegas"]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn lays_out_database_schema_table() {
        let dir = TempDir::new().unwrap();
        let mut warehouse = DirectoryWarehouse::open(dir.path(), "ANALYTICS").unwrap();
        warehouse.create_schema("BRONZE").unwrap();
        let rows = warehouse
            .write_frame(&mut sample(), "BRONZE", "CUSTOMERS")
            .unwrap();

        assert_eq!(rows, 2);
        assert!(dir.path().join("ANALYTICS/BRONZE/CUSTOMERS.csv").is_file());
        assert_eq!(warehouse.count_rows("BRONZE", "CUSTOMERS").unwrap(), 2);
    }

    #[test]
    fn write_requires_schema() {
        let dir = TempDir::new().unwrap();
        let mut warehouse = DirectoryWarehouse::open(dir.path(), "ANALYTICS").unwrap();
        let err = warehouse
            .write_frame(&mut sample(), "BRONZE", "CUSTOMERS")
            .unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryNotFound { .. }));
    }

    #[test]
    fn writes_append_and_drop_resets() {
        let dir = TempDir::new().unwrap();
        let mut warehouse = DirectoryWarehouse::open(dir.path(), "ANALYTICS").unwrap();
        warehouse.create_schema("BRONZE").unwrap();
        warehouse
            .write_frame(&mut sample(), "BRONZE", "CUSTOMERS")
            .unwrap();
        warehouse
            .write_frame(&mut sample(), "BRONZE", "CUSTOMERS")
            .unwrap();
        assert_eq!(warehouse.count_rows("BRONZE", "CUSTOMERS").unwrap(), 4);

        assert!(warehouse.drop_table("BRONZE", "CUSTOMERS").unwrap());
        assert!(!warehouse.drop_table("BRONZE", "CUSTOMERS").unwrap());
        assert!(matches!(
            warehouse.count_rows("BRONZE", "CUSTOMERS").unwrap_err(),
            PipelineError::WarehouseTableNotFound { .. }
        ));
    }

    #[test]
    fn append_rejects_different_columns() {
        let dir = TempDir::new().unwrap();
        let mut warehouse = DirectoryWarehouse::open(dir.path(), "ANALYTICS").unwrap();
        warehouse.create_schema("BRONZE").unwrap();
        warehouse
            .write_frame(&mut sample(), "BRONZE", "CUSTOMERS")
            .unwrap();
        let mut other =
            DataFrame::new(vec![Series::new("ID".into(), vec![1i64]).into_column()]).unwrap();
        let err = warehouse
            .write_frame(&mut other, "BRONZE", "CUSTOMERS")
            .unwrap_err();
        match err {
            PipelineError::SchemaMismatch {
                table,
                existing,
                frame,
                ..
            } => {
                assert_eq!(table, "CUSTOMERS");
                assert_eq!(existing, "CUSTOMER_NUMBER,CITY");
                assert_eq!(frame, "ID");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(warehouse.count_rows("BRONZE", "CUSTOMERS").unwrap(), 2);
    }
}

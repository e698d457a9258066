//! Pipeline glue around identifier normalization: source extraction, bronze
//! staging loads, connectivity checks and the transformation runner.

pub mod bronze;
pub mod check;
pub mod config;
pub mod error;
pub mod polars_utils;
pub mod source;
pub mod transform;
pub mod warehouse;

pub use bronze::{
    LOADED_AT_COLUMN, LoadSummary, SOURCE_TABLE_COLUMN, TableLoad, destination_table, load_table,
    plan_destinations, prepare_frame, run_bronze_load,
};
pub use check::{
    SourceReport, TEST_TABLE, TableCount, TableSample, WarehouseReport, check_source,
    check_warehouse,
};
pub use config::{
    CONFIG_ENV_VAR, NamingConfig, PipelineConfig, SourceConfig, TransformConfig, WarehouseConfig,
};
pub use error::{PipelineError, Result};
pub use polars_utils::{FramePreview, any_to_string, column_names, format_numeric, preview_rows};
pub use source::{CsvDirectorySource, SourceDatabase, list_csv_files, read_csv_frame};
pub use transform::{
    CommandRunner, DEFAULT_TOOL, ProcessRunner, StepOutcome, TransformPlan, TransformStep,
    run_transform,
};
pub use warehouse::{DirectoryWarehouse, Warehouse};

//! Pipeline configuration.
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! [source]
//! dir = "data/postgres"
//! sample_tables = ["customers", "employees"]
//! infer_schema_length = 100
//!
//! [warehouse]
//! dir = "data/snowflake"
//! database = "DATA_GOVERNANCE_PROJECT"
//! schema = "BRONZE"
//!
//! [transform]
//! project_dir = "/opt/airflow/dbt"
//!
//! [naming.exceptions]
//! orderdetails = "ORDER_DETAILS"
//! ```
//!
//! Every key is optional; missing keys fall back to [`PipelineConfig::default`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use elt_naming::{ExceptionMap, IdentifierNormalizer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::source::CsvDirectorySource;

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "ELT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub warehouse: WarehouseConfig,
    pub transform: TransformConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding one CSV export per source table.
    pub dir: PathBuf,
    /// Tables sampled by the source connectivity check.
    pub sample_tables: Vec<String>,
    /// Rows shown per sampled table.
    pub sample_limit: usize,
    /// Rows scanned for column type inference; unset scans whole files.
    pub infer_schema_length: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/source"),
            sample_tables: vec!["customers".to_string(), "employees".to_string()],
            sample_limit: 5,
            infer_schema_length: Some(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub dir: PathBuf,
    pub database: String,
    /// Staging schema for bronze loads.
    pub schema: String,
    /// Schema used by the warehouse connectivity check.
    pub test_schema: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/warehouse"),
            database: "DATA_GOVERNANCE_PROJECT".to_string(),
            schema: "BRONZE".to_string(),
            test_schema: "TEST".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Transformation tool executable.
    pub tool: String,
    pub project_dir: PathBuf,
    /// Defaults to `project_dir` when unset.
    pub profiles_dir: Option<PathBuf>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            tool: crate::transform::DEFAULT_TOOL.to_string(),
            project_dir: PathBuf::from("/opt/airflow/dbt"),
            profiles_dir: None,
        }
    }
}

impl SourceConfig {
    /// Opens `dir`, or the configured directory, as a CSV source.
    pub fn open(&self, dir: Option<&Path>) -> Result<CsvDirectorySource> {
        let source = CsvDirectorySource::new(dir.unwrap_or(self.dir.as_path()))?;
        Ok(source.with_infer_schema_length(self.infer_schema_length))
    }
}

impl TransformConfig {
    pub fn profiles_dir(&self) -> &Path {
        self.profiles_dir.as_deref().unwrap_or(&self.project_dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Extra identifier exceptions layered over the built-in table.
    pub exceptions: BTreeMap<String, String>,
}

impl PipelineConfig {
    /// Parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = toml::from_str(&content).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Loads `explicit`, else the file named by `ELT_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Built-in exceptions extended by `[naming.exceptions]`.
    pub fn exception_map(&self) -> Result<ExceptionMap> {
        Ok(ExceptionMap::builtin().with_overrides(&self.naming.exceptions)?)
    }

    pub fn normalizer(&self) -> Result<IdentifierNormalizer> {
        Ok(IdentifierNormalizer::new(self.exception_map()?))
    }
}

//! CLI argument definitions for the `elt` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "elt",
    version,
    about = "Warehouse ELT pipelines with canonical identifier naming",
    long_about = "Load source tables into a bronze staging schema under canonical \
                  UPPER_SNAKE_CASE names, probe source and warehouse connectivity, \
                  and run the silver/gold transformation steps.\n\n\
                  Settings are read from --config or the ELT_CONFIG environment \
                  variable; command-line flags override file values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline config file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical warehouse identifier for each raw name.
    Normalize(NormalizeArgs),

    /// Load every source table into the bronze staging schema.
    Load(LoadArgs),

    /// Probe the source or the warehouse.
    Check(CheckArgs),

    /// Run the silver, snapshot, gold and docs transformation steps.
    Transform(TransformArgs),
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw identifiers as they appear in the source system.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// TOML file whose `[exceptions]` table extends the configured exceptions.
    #[arg(long = "exceptions", value_name = "FILE")]
    pub exceptions: Option<PathBuf>,

    /// Print one canonical name per line instead of a table.
    #[arg(long = "plain")]
    pub plain: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Directory of source CSV exports (one file per table).
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Warehouse root directory.
    #[arg(long = "warehouse", value_name = "DIR")]
    pub warehouse: Option<PathBuf>,

    /// Warehouse database name.
    #[arg(long = "database", value_name = "DB")]
    pub database: Option<String>,

    /// Staging schema name.
    #[arg(long = "schema", value_name = "SCHEMA")]
    pub schema: Option<String>,

    /// Also write the load summary as JSON.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub target: CheckTarget,
}

#[derive(Subcommand)]
pub enum CheckTarget {
    /// List source tables with row counts and print sample rows.
    Source(CheckSourceArgs),

    /// Write and read back a small test table in the warehouse.
    Warehouse(CheckWarehouseArgs),
}

#[derive(Args)]
pub struct CheckSourceArgs {
    /// Directory of source CSV exports.
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Table to sample (repeatable; replaces the configured list).
    #[arg(long = "table", value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Sample rows per table.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct CheckWarehouseArgs {
    /// Warehouse root directory.
    #[arg(long = "warehouse", value_name = "DIR")]
    pub warehouse: Option<PathBuf>,

    /// Warehouse database name.
    #[arg(long = "database", value_name = "DB")]
    pub database: Option<String>,

    /// Schema for the test table.
    #[arg(long = "schema", value_name = "SCHEMA")]
    pub schema: Option<String>,
}

#[derive(Args)]
pub struct TransformArgs {
    /// Transformation project directory (working directory of each step).
    #[arg(long = "project-dir", value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Directory holding the tool's connection profiles.
    #[arg(long = "profiles-dir", value_name = "DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Transformation tool executable.
    #[arg(long = "tool", value_name = "BIN")]
    pub tool: Option<String>,

    /// Print the step command lines without running them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

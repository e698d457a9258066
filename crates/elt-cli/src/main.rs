//! `elt` command-line entry point.

use clap::{ColorChoice, Parser};
use elt_cli::cli::{CheckTarget, Cli, Command, LogFormatArg, LogLevelArg};
use elt_cli::commands::{
    run_check_source, run_check_warehouse, run_load, run_normalize, run_transform, transform_plan,
};
use elt_cli::logging::{LogConfig, LogFormat, init_logging};
use elt_cli::summary::{
    normalize_lines, normalize_table, print_load_summary, print_source_report,
    print_warehouse_report, transform_table,
};
use elt_pipeline::{PipelineConfig, ProcessRunner};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::resolve(cli.config.as_deref())?;
    match &cli.command {
        Command::Normalize(args) => {
            let pairs = run_normalize(&config, args)?;
            if args.plain {
                println!("{}", normalize_lines(&pairs));
            } else {
                println!("{}", normalize_table(&pairs));
            }
        }
        Command::Load(args) => {
            let summary = run_load(&config, args)?;
            print_load_summary(&summary);
        }
        Command::Check(args) => match &args.target {
            CheckTarget::Source(args) => {
                let report = run_check_source(&config, args)?;
                print_source_report(&report);
            }
            CheckTarget::Warehouse(args) => {
                let report = run_check_warehouse(&config, args)?;
                print_warehouse_report(&report);
            }
        },
        Command::Transform(args) => {
            let plan = transform_plan(&config, args);
            let outcomes = if args.dry_run {
                Vec::new()
            } else {
                run_transform(&plan, &mut ProcessRunner)?
            };
            println!("{}", transform_table(&plan, &outcomes));
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

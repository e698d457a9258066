use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info_span;

use elt_naming::{CanonicalIdentifier, IdentifierNormalizer};
use elt_pipeline::{
    CommandRunner, DirectoryWarehouse, LoadSummary, PipelineConfig,
    SourceReport, StepOutcome, TransformPlan, WarehouseReport, check_source, check_warehouse,
    run_bronze_load,
};

use crate::cli::{CheckSourceArgs, CheckWarehouseArgs, LoadArgs, NormalizeArgs, TransformArgs};

/// Configured exceptions, extended by `extra` when given.
pub fn build_normalizer(
    config: &PipelineConfig,
    extra: Option<&Path>,
) -> Result<IdentifierNormalizer> {
    let Some(path) = extra else {
        return config.normalizer().context("configured exceptions");
    };
    let exceptions = config
        .exception_map()
        .context("configured exceptions")?
        .extend_from_file(path)
        .with_context(|| format!("load exceptions {}", path.display()))?;
    Ok(IdentifierNormalizer::new(exceptions))
}

pub fn run_normalize(
    config: &PipelineConfig,
    args: &NormalizeArgs,
) -> Result<Vec<(String, CanonicalIdentifier)>> {
    let normalizer = build_normalizer(config, args.exceptions.as_deref())?;
    Ok(args
        .names
        .iter()
        .map(|raw| (raw.clone(), normalizer.normalize(raw)))
        .collect())
}

pub fn run_load(config: &PipelineConfig, args: &LoadArgs) -> Result<LoadSummary> {
    let mut config = config.clone();
    apply_load_overrides(&mut config, args);
    let span = info_span!(
        "bronze_load",
        database = %config.warehouse.database,
        schema = %config.warehouse.schema
    );
    let _guard = span.enter();

    let normalizer = build_normalizer(&config, None)?;
    let source = config
        .source
        .open(None)
        .with_context(|| format!("open source {}", config.source.dir.display()))?;
    let mut warehouse =
        DirectoryWarehouse::open(&config.warehouse.dir, &config.warehouse.database)
            .with_context(|| format!("open warehouse {}", config.warehouse.dir.display()))?;

    let summary = run_bronze_load(
        &source,
        &mut warehouse,
        &normalizer,
        &config.warehouse.schema,
    )
    .context("bronze load")?;

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary).context("serialize load summary")?;
        fs::write(path, json)
            .with_context(|| format!("write load summary {}", path.display()))?;
    }
    Ok(summary)
}

pub fn run_check_source(config: &PipelineConfig, args: &CheckSourceArgs) -> Result<SourceReport> {
    let dir = args.source.as_deref().unwrap_or(&config.source.dir);
    let tables = if args.tables.is_empty() {
        &config.source.sample_tables
    } else {
        &args.tables
    };
    let limit = args.limit.unwrap_or(config.source.sample_limit);

    let source = config
        .source
        .open(Some(dir))
        .with_context(|| format!("open source {}", dir.display()))?;
    check_source(&source, tables, limit).context("source connection check")
}

pub fn run_check_warehouse(
    config: &PipelineConfig,
    args: &CheckWarehouseArgs,
) -> Result<WarehouseReport> {
    let dir = args.warehouse.as_ref().unwrap_or(&config.warehouse.dir);
    let database = args
        .database
        .as_deref()
        .unwrap_or(&config.warehouse.database);
    let schema = args
        .schema
        .as_deref()
        .unwrap_or(&config.warehouse.test_schema);

    let mut warehouse = DirectoryWarehouse::open(dir, database)
        .with_context(|| format!("open warehouse {}", dir.display()))?;
    check_warehouse(&mut warehouse, schema).context("warehouse connection check")
}

/// Builds the transformation plan from config and flag overrides.
pub fn transform_plan(config: &PipelineConfig, args: &TransformArgs) -> TransformPlan {
    let mut transform = config.transform.clone();
    if let Some(dir) = &args.project_dir {
        transform.project_dir = dir.clone();
    }
    if let Some(dir) = &args.profiles_dir {
        transform.profiles_dir = Some(dir.clone());
    }
    if let Some(tool) = &args.tool {
        transform.tool = tool.clone();
    }
    let profiles_dir = transform.profiles_dir().to_path_buf();
    TransformPlan::standard(transform.tool, transform.project_dir, profiles_dir)
}

pub fn run_transform(plan: &TransformPlan, runner: &mut dyn CommandRunner) -> Result<Vec<StepOutcome>> {
    let span = info_span!("transform", project_dir = %plan.project_dir.display());
    let _guard = span.enter();
    elt_pipeline::run_transform(plan, runner).context("transform pipeline")
}

fn apply_load_overrides(config: &mut PipelineConfig, args: &LoadArgs) {
    if let Some(dir) = &args.source {
        config.source.dir = dir.clone();
    }
    if let Some(dir) = &args.warehouse {
        config.warehouse.dir = dir.clone();
    }
    if let Some(database) = &args.database {
        config.warehouse.database = database.clone();
    }
    if let Some(schema) = &args.schema {
        config.warehouse.schema = schema.clone();
    }
}

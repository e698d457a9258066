use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use elt_cli::cli::{
    CheckSourceArgs, CheckTarget, Cli, Command, LoadArgs, NormalizeArgs, TransformArgs,
};
use elt_cli::commands::{
    run_check_source, run_load, run_normalize, run_transform, transform_plan,
};
use elt_cli::summary::{load_summary_table, normalize_lines, normalize_table, transform_table};
use elt_pipeline::{CommandRunner, PipelineConfig};

fn normalize_args(names: &[&str]) -> NormalizeArgs {
    NormalizeArgs {
        names: names.iter().map(|name| (*name).to_string()).collect(),
        exceptions: None,
        plain: true,
    }
}

#[test]
fn parses_documented_surface() {
    let cli = Cli::try_parse_from(["elt", "normalize", "customerNumber", "orderdetails"]).unwrap();
    match cli.command {
        Command::Normalize(args) => assert_eq!(args.names, ["customerNumber", "orderdetails"]),
        _ => panic!("expected normalize"),
    }

    let cli = Cli::try_parse_from([
        "elt",
        "--config",
        "elt.toml",
        "load",
        "--source",
        "exports",
        "--schema",
        "RAW",
        "-v",
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some(Path::new("elt.toml")));
    match cli.command {
        Command::Load(args) => {
            assert_eq!(args.source.as_deref(), Some(Path::new("exports")));
            assert_eq!(args.schema.as_deref(), Some("RAW"));
            assert!(args.warehouse.is_none());
        }
        _ => panic!("expected load"),
    }

    let cli = Cli::try_parse_from(["elt", "check", "source", "--table", "offices"]).unwrap();
    match cli.command {
        Command::Check(args) => match args.target {
            CheckTarget::Source(args) => assert_eq!(args.tables, ["offices"]),
            CheckTarget::Warehouse(_) => panic!("expected source check"),
        },
        _ => panic!("expected check"),
    }

    let cli = Cli::try_parse_from([
        "elt",
        "transform",
        "--project-dir",
        "/srv/dbt",
        "--dry-run",
        "--log-format",
        "json",
    ])
    .unwrap();
    match cli.command {
        Command::Transform(args) => {
            assert!(args.dry_run);
            assert_eq!(args.project_dir, Some(PathBuf::from("/srv/dbt")));
        }
        _ => panic!("expected transform"),
    }
}

#[test]
fn rejects_incomplete_commands() {
    assert!(Cli::try_parse_from(["elt", "normalize"]).is_err());
    assert!(Cli::try_parse_from(["elt", "check"]).is_err());
    assert!(Cli::try_parse_from(["elt", "deploy"]).is_err());
}

#[test]
fn normalize_prints_canonical_names() {
    let pairs = run_normalize(
        &PipelineConfig::default(),
        &normalize_args(&[
            "customerNumber",
            "orderdetails",
            "productlines",
            "XMLParser",
            "addressLine1",
            "first-name",
            "col1a",
        ]),
    )
    .unwrap();

    insta::assert_snapshot!(normalize_lines(&pairs), @r"
    CUSTOMER_NUMBER
    ORDER_DETAILS
    PRODUCT_LINES
    XML_PARSER
    ADDRESS_LINE_1
    FIRST_NAME
    COL_1_A
    ");

    let rendered = normalize_table(&pairs).to_string();
    assert!(rendered.contains("customerNumber"));
    assert!(rendered.contains("CUSTOMER_NUMBER"));
}

#[test]
fn normalize_layers_exception_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exceptions.toml");
    fs::write(&path, "[exceptions]\npaymentterms = \"PAYMENT_TERMS\"\n").unwrap();

    let mut args = normalize_args(&["PaymentTerms", "orderdetails"]);
    args.exceptions = Some(path);
    let pairs = run_normalize(&PipelineConfig::default(), &args).unwrap();

    assert_eq!(pairs[0].1.as_str(), "PAYMENT_TERMS");
    assert_eq!(pairs[1].1.as_str(), "ORDER_DETAILS");
}

#[test]
fn exception_file_keeps_configured_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exceptions.toml");
    fs::write(&path, "[exceptions]\npaymentterms = \"PAYMENT_TERMS\"\n").unwrap();

    let mut config = PipelineConfig::default();
    config
        .naming
        .exceptions
        .insert("orderdetails".to_string(), "ORDER_LINE_ITEMS".to_string());
    let mut args = normalize_args(&["orderdetails", "paymentterms", "productlines"]);
    args.exceptions = Some(path);
    let pairs = run_normalize(&config, &args).unwrap();

    let names: Vec<_> = pairs.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(names, ["ORDER_LINE_ITEMS", "PAYMENT_TERMS", "PRODUCT_LINES"]);
}

#[test]
fn normalize_reports_bad_exception_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exceptions.toml");
    fs::write(&path, "[exceptions]\npaymentterms = \"payment terms\"\n").unwrap();

    let mut args = normalize_args(&["paymentterms"]);
    args.exceptions = Some(path);
    let error = run_normalize(&PipelineConfig::default(), &args).unwrap_err();
    assert!(format!("{error:#}").contains("exceptions.toml"));
}

#[test]
fn load_writes_tables_and_json_summary() {
    let source = TempDir::new().unwrap();
    let warehouse = TempDir::new().unwrap();
    fs::write(
        source.path().join("customers.csv"),
        "customerNumber,customerName\n103,Atelier graphique\n112,Signal Gift Stores\n",
    )
    .unwrap();
    fs::write(
        source.path().join("orderdetails.csv"),
        "orderNumber,productCode\n10100,S18_1749\n",
    )
    .unwrap();
    let summary_path = warehouse.path().join("summary.json");

    let args = LoadArgs {
        source: Some(source.path().to_path_buf()),
        warehouse: Some(warehouse.path().to_path_buf()),
        database: Some("ANALYTICS".to_string()),
        schema: None,
        summary_json: Some(summary_path.clone()),
    };
    let summary = run_load(&PipelineConfig::default(), &args).unwrap();

    assert_eq!(summary.schema, "BRONZE");
    assert_eq!(summary.total_rows, 3);
    assert!(
        warehouse
            .path()
            .join("ANALYTICS/BRONZE/ORDER_DETAILS.csv")
            .is_file()
    );

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["tables_loaded"], 2);
    assert_eq!(json["tables"][0]["table"], "CUSTOMERS");

    let rendered = load_summary_table(&summary).to_string();
    assert!(rendered.contains("ORDER_DETAILS"));
    assert!(rendered.contains("2 tables"));
}

#[test]
fn load_names_missing_source() {
    let warehouse = TempDir::new().unwrap();
    let args = LoadArgs {
        source: Some(warehouse.path().join("missing")),
        warehouse: Some(warehouse.path().to_path_buf()),
        database: None,
        schema: None,
        summary_json: None,
    };
    let error = run_load(&PipelineConfig::default(), &args).unwrap_err();
    assert!(format!("{error:#}").contains("open source"));
}

#[test]
fn check_source_uses_configured_inference() {
    let source = TempDir::new().unwrap();
    fs::write(
        source.path().join("offices.csv"),
        "officeCode,city\n1,San Francisco\n2,Boston\n",
    )
    .unwrap();
    let mut config = PipelineConfig::default();
    config.source.infer_schema_length = Some(0);
    let args = CheckSourceArgs {
        source: Some(source.path().to_path_buf()),
        tables: vec!["offices".to_string()],
        limit: Some(1),
    };

    let report = run_check_source(&config, &args).unwrap();
    assert_eq!(report.tables.len(), 1);
}

struct ScriptedRunner {
    calls: Vec<String>,
    exit_codes: Vec<Option<i32>>,
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, program: &str, args: &[String], _cwd: &Path) -> io::Result<Option<i32>> {
        self.calls.push(format!("{program} {}", args.join(" ")));
        Ok(self.exit_codes.get(self.calls.len() - 1).copied().flatten().or(Some(0)))
    }
}

fn transform_args() -> TransformArgs {
    TransformArgs {
        project_dir: None,
        profiles_dir: None,
        tool: None,
        dry_run: false,
    }
}

#[test]
fn transform_plan_prefers_flags_over_config() {
    let mut config = PipelineConfig::default();
    config.transform.profiles_dir = Some(PathBuf::from("/etc/dbt"));

    let plan = transform_plan(&config, &transform_args());
    assert_eq!(plan.project_dir, Path::new("/opt/airflow/dbt"));
    assert_eq!(plan.profiles_dir, Path::new("/etc/dbt"));

    let mut args = transform_args();
    args.project_dir = Some(PathBuf::from("/srv/dbt"));
    args.tool = Some("dbt-1.8".to_string());
    config.transform.profiles_dir = None;
    let plan = transform_plan(&config, &args);
    assert_eq!(plan.tool, "dbt-1.8");
    assert_eq!(plan.profiles_dir, Path::new("/srv/dbt"));

    args.profiles_dir = Some(PathBuf::from("/home/airflow/.dbt"));
    let plan = transform_plan(&config, &args);
    assert_eq!(plan.project_dir, Path::new("/srv/dbt"));
    assert_eq!(plan.profiles_dir, Path::new("/home/airflow/.dbt"));
}

#[test]
fn transform_runs_steps_and_stops_on_failure() {
    let plan = transform_plan(&PipelineConfig::default(), &transform_args());

    let mut runner = ScriptedRunner {
        calls: Vec::new(),
        exit_codes: Vec::new(),
    };
    let outcomes = run_transform(&plan, &mut runner).unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(
        runner.calls[0],
        "dbt build --select silver --profiles-dir /opt/airflow/dbt"
    );
    let rendered = transform_table(&plan, &outcomes).to_string();
    assert!(rendered.contains("dbt_docs_generate"));

    let mut runner = ScriptedRunner {
        calls: Vec::new(),
        exit_codes: vec![Some(0), Some(0), Some(1)],
    };
    let error = run_transform(&plan, &mut runner).unwrap_err();
    assert_eq!(runner.calls.len(), 3);
    assert!(format!("{error:#}").contains("dbt_build_gold"));
}

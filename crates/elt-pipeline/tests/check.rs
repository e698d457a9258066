use std::fs;

use elt_pipeline::{
    CsvDirectorySource, DirectoryWarehouse, PipelineError, TEST_TABLE, Warehouse, check_source,
    check_warehouse,
};
use tempfile::TempDir;

fn source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("customers.csv"),
        "customerNumber,customerName\n103,Atelier graphique\n112,Signal Gift Stores\n\
         114,Australian Collectors\n119,La Rochelle Gifts\n121,Baane Mini Imports\n\
         124,Mini Gifts\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("employees.csv"),
        "employeeNumber,lastName,reportsTo\n1002,Murphy,\n1056,Patterson,1002\n",
    )
    .unwrap();
    dir
}

#[test]
fn source_check_counts_and_samples() {
    let dir = source_dir();
    let source = CsvDirectorySource::new(dir.path()).unwrap();
    let samples = vec!["customers".to_string(), "employees".to_string()];

    let report = check_source(&source, &samples, 5).unwrap();

    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.tables[0].table, "customers");
    assert_eq!(report.tables[0].rows, 6);
    assert_eq!(report.tables[1].rows, 2);

    let customers = &report.samples[0].preview;
    assert_eq!(customers.headers, ["customerNumber", "customerName"]);
    assert_eq!(customers.rows.len(), 5);
    assert_eq!(customers.rows[0], ["103", "Atelier graphique"]);

    let employees = &report.samples[1].preview;
    assert_eq!(employees.rows[0][2], "");
}

#[test]
fn source_check_requires_sample_tables() {
    let dir = source_dir();
    let source = CsvDirectorySource::new(dir.path()).unwrap();
    let err = check_source(&source, &["offices".to_string()], 5).unwrap_err();
    assert!(matches!(err, PipelineError::TableNotFound { table } if table == "offices"));
}

#[test]
fn warehouse_check_writes_three_records() {
    let dir = TempDir::new().unwrap();
    let mut warehouse = DirectoryWarehouse::open(dir.path(), "DATA_GOVERNANCE_PROJECT").unwrap();

    let report = check_warehouse(&mut warehouse, "TEST").unwrap();
    assert_eq!(report.schema, "TEST");
    assert_eq!(report.table, TEST_TABLE);
    assert_eq!(report.rows, 3);

    // Repeated checks replace the table rather than appending.
    check_warehouse(&mut warehouse, "TEST").unwrap();
    assert_eq!(warehouse.count_rows("TEST", TEST_TABLE).unwrap(), 3);
}

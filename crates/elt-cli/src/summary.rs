//! Terminal rendering of command results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use elt_naming::CanonicalIdentifier;
use elt_pipeline::{
    FramePreview, LoadSummary, SourceReport, StepOutcome, TransformPlan, WarehouseReport,
};

/// Raw names next to their canonical identifiers.
pub fn normalize_table(pairs: &[(String, CanonicalIdentifier)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Raw"), header_cell("Canonical")]);
    apply_table_style(&mut table);
    for (raw, canonical) in pairs {
        let canonical_cell = if canonical.is_empty() {
            dim_cell("(empty)")
        } else {
            Cell::new(canonical)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        table.add_row(vec![Cell::new(raw), canonical_cell]);
    }
    table
}

/// One canonical identifier per line, in input order.
pub fn normalize_lines(pairs: &[(String, CanonicalIdentifier)]) -> String {
    pairs
        .iter()
        .map(|(_, canonical)| canonical.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn load_summary_table(summary: &LoadSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source table"),
        header_cell("Table"),
        header_cell("Extracted"),
        header_cell("Loaded"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for load in &summary.tables {
        table.add_row(vec![
            Cell::new(&load.source_table),
            Cell::new(&load.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(load.rows_extracted),
            Cell::new(load.rows_loaded),
            Cell::new(load.columns),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} tables", summary.tables_loaded))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(summary.total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

pub fn print_load_summary(summary: &LoadSummary) {
    println!("Schema: {}", summary.schema);
    println!("{}", load_summary_table(summary));
}

pub fn print_source_report(report: &SourceReport) {
    println!("{}", description_table(&report.description));

    let mut counts = Table::new();
    counts.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut counts);
    align_column(&mut counts, 1, CellAlignment::Right);
    for table in &report.tables {
        counts.add_row(vec![Cell::new(&table.table), Cell::new(table.rows)]);
    }
    println!("{counts}");

    for sample in &report.samples {
        println!();
        println!("Sample rows from {}:", sample.table);
        println!("{}", preview_table(&sample.preview));
    }
}

pub fn print_warehouse_report(report: &WarehouseReport) {
    println!("{}", description_table(&report.description));
    println!(
        "{}.{}: {} rows verified",
        report.schema, report.table, report.rows
    );
}

/// Steps with their command lines; durations once they have run.
pub fn transform_table(plan: &TransformPlan, outcomes: &[StepOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Command"),
        header_cell("Duration"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for step in &plan.steps {
        let outcome = outcomes.iter().find(|o| o.task_id == step.task_id);
        let duration = match outcome {
            Some(outcome) => Cell::new(format!("{} ms", outcome.duration_ms)).fg(Color::Green),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&step.task_id).add_attribute(Attribute::Bold),
            Cell::new(plan.command_line(step)),
            duration,
        ]);
    }
    table
}

pub fn description_table(rows: &[(String, String)]) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    for (key, value) in rows {
        table.add_row(vec![
            Cell::new(key).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }
    table
}

pub fn preview_table(preview: &FramePreview) -> Table {
    let mut table = Table::new();
    table.set_header(
        preview
            .headers
            .iter()
            .map(|header| header_cell(header))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in &preview.rows {
        table.add_row(row.iter().map(|value| {
            if value.is_empty() {
                dim_cell("null")
            } else {
                Cell::new(value)
            }
        }));
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

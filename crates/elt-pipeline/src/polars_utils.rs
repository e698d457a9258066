//! Polars AnyValue utility functions.
//!
//! Diagnostics print sample rows as plain text; these helpers turn cells and
//! frame slices into strings.

use polars::prelude::*;

/// Converts a Polars `AnyValue` to a display string.
/// Returns an empty string for `Null` and formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Column names of `df` as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// A small text rendering of the first rows of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Renders at most `limit` rows of `df` as strings.
pub fn preview_rows(df: &DataFrame, limit: usize) -> PolarsResult<FramePreview> {
    let head = df.head(Some(limit));
    let mut rows = Vec::with_capacity(head.height());
    for idx in 0..head.height() {
        let mut row = Vec::with_capacity(head.width());
        for column in head.get_columns() {
            row.push(any_to_string(column.get(idx)?));
        }
        rows.push(row);
    }
    Ok(FramePreview {
        headers: column_names(df),
        rows,
    })
}

//! Renaming polars frame columns to canonical identifiers.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{NamingError, Result};
use crate::identifier::CanonicalIdentifier;
use crate::normalizer::IdentifierNormalizer;

/// One column rename applied to a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRename {
    pub source: String,
    pub canonical: CanonicalIdentifier,
}

/// Computes the canonical name of every column without touching the frame.
///
/// Fails when a column normalizes to nothing or when two columns collide,
/// since the warehouse would reject either table.
pub fn plan_column_renames(
    columns: &[String],
    normalizer: &IdentifierNormalizer,
) -> Result<Vec<ColumnRename>> {
    let mut seen: BTreeMap<CanonicalIdentifier, &str> = BTreeMap::new();
    let mut renames = Vec::with_capacity(columns.len());
    for column in columns {
        let canonical = normalizer.normalize(column);
        if canonical.is_empty() {
            return Err(NamingError::EmptyIdentifier {
                raw: column.clone(),
            });
        }
        if let Some(first) = seen.insert(canonical.clone(), column) {
            return Err(NamingError::DuplicateColumn {
                first: first.to_string(),
                second: column.clone(),
                canonical: canonical.into_string(),
            });
        }
        renames.push(ColumnRename {
            source: column.clone(),
            canonical,
        });
    }
    Ok(renames)
}

/// Renames every column of `df` in place and returns the applied renames.
pub fn rename_frame_columns(
    df: &mut DataFrame,
    normalizer: &IdentifierNormalizer,
) -> Result<Vec<ColumnRename>> {
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let renames = plan_column_renames(&columns, normalizer)?;
    df.set_column_names(renames.iter().map(|rename| rename.canonical.as_str()))?;
    for rename in &renames {
        if rename.source != rename.canonical.as_str() {
            debug!(
                source = %rename.source,
                canonical = %rename.canonical,
                "renamed column"
            );
        }
    }
    Ok(renames)
}

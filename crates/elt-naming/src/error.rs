//! Error types for identifier naming.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised around the normalizer.
///
/// Normalizing a single identifier never fails; these cover exception table
/// loading and renaming whole frames.
#[derive(Debug, Error)]
pub enum NamingError {
    /// An exception table value is not a usable canonical identifier.
    #[error("invalid exception for '{key}': '{value}' {reason}")]
    InvalidException {
        key: String,
        value: String,
        reason: &'static str,
    },

    /// A raw identifier normalized to nothing.
    #[error("identifier '{raw}' normalizes to an empty name")]
    EmptyIdentifier { raw: String },

    /// Two source columns collapse to the same canonical name.
    #[error("columns '{first}' and '{second}' both normalize to '{canonical}'")]
    DuplicateColumn {
        first: String,
        second: String,
        canonical: String,
    },

    #[error("failed to read exception table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse exception table {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, NamingError>;

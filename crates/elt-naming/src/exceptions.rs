//! Hand-maintained overrides for names whose word boundaries cannot be
//! detected.
//!
//! Concatenated lowercase names such as `orderdetails` carry no case change
//! and no delimiter, so no scan can recover `ORDER` + `DETAILS`. The
//! exception map is consulted before any automatic splitting.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{NamingError, Result};
use crate::identifier::CanonicalIdentifier;
use crate::passes::apply_boundary_passes;

/// Overrides shipped with the crate.
pub const DEFAULT_EXCEPTIONS: &[(&str, &str)] = &[
    ("orderdetails", "ORDER_DETAILS"),
    ("productlines", "PRODUCT_LINES"),
];

/// Immutable lookup from a lower-cased raw identifier to its canonical form.
///
/// Built once at startup and shared by reference afterwards; there is no
/// way to mutate a map in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionMap {
    entries: BTreeMap<String, CanonicalIdentifier>,
}

/// On-disk form of a standalone exception table.
#[derive(Debug, Default, Deserialize)]
struct ExceptionFile {
    #[serde(default)]
    exceptions: BTreeMap<String, String>,
}

impl ExceptionMap {
    /// A map with no overrides.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The overrides in [`DEFAULT_EXCEPTIONS`].
    pub fn builtin() -> Self {
        let entries = DEFAULT_EXCEPTIONS
            .iter()
            .filter_map(|(key, value)| {
                CanonicalIdentifier::parse(value).map(|id| (key.to_lowercase(), id))
            })
            .collect();
        Self { entries }
    }

    /// Builds a map from raw key/value pairs, validating every value.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::empty().with_overrides(entries)
    }

    /// Returns a new map with `entries` added on top of `self`.
    ///
    /// Later entries replace earlier ones for the same key.
    pub fn with_overrides<I, K, V>(self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut merged = self.entries;
        for (key, value) in entries {
            let key = key.as_ref().to_lowercase();
            let value = value.as_ref();
            let canonical = validate_entry(&key, value)?;
            merged.insert(key, canonical);
        }
        let map = Self { entries: merged };
        map.check_values_are_stable()?;
        Ok(map)
    }

    /// Loads the built-in overrides extended by the `[exceptions]` table of
    /// a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::builtin().extend_from_file(path)
    }

    /// Returns a new map with the `[exceptions]` table of a TOML file added
    /// on top of `self`. Entries of `self` not named in the file are kept.
    pub fn extend_from_file(self, path: &Path) -> Result<Self> {
        self.with_overrides(load_entries(path)?)
    }

    /// Looks up `raw` case-insensitively.
    pub fn get(&self, raw: &str) -> Option<&CanonicalIdentifier> {
        self.entries.get(&raw.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(lower-cased key, canonical value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalIdentifier)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    // A mapped value must normalize to itself; a value whose lower-cased form
    // is another key pointing elsewhere would not.
    fn check_values_are_stable(&self) -> Result<()> {
        for (key, value) in &self.entries {
            if let Some(other) = self.entries.get(&value.as_str().to_lowercase())
                && other != value
            {
                return Err(NamingError::InvalidException {
                    key: key.clone(),
                    value: value.to_string(),
                    reason: "is itself an exception key mapped to a different value",
                });
            }
        }
        Ok(())
    }
}

/// Reads the raw `[exceptions]` table of a TOML file without validating it.
pub fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|source| NamingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ExceptionFile = toml::from_str(&content).map_err(|source| NamingError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        count = file.exceptions.len(),
        "loaded identifier exceptions"
    );
    Ok(file.exceptions)
}

fn validate_entry(key: &str, value: &str) -> Result<CanonicalIdentifier> {
    let invalid = |reason| NamingError::InvalidException {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    };
    if key.is_empty() {
        return Err(invalid("has an empty key"));
    }
    let canonical =
        CanonicalIdentifier::parse(value).ok_or_else(|| invalid("is not a canonical identifier"))?;
    if apply_boundary_passes(value) != value {
        return Err(invalid("would be split further by normalization"));
    }
    Ok(canonical)
}

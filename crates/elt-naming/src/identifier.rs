#![deny(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier in the warehouse naming convention.
///
/// Holds only `[A-Z0-9_]`, with no leading, trailing or doubled
/// underscore. The empty identifier is representable: it is what a
/// separator-only name normalizes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
    /// Wraps a value already produced by the normalization passes.
    pub(crate) fn from_normalized(value: String) -> Self {
        debug_assert!(is_canonical(&value) || value.is_empty());
        Self(value)
    }

    /// Accepts `value` only if it already follows the canonical shape.
    pub fn parse(value: &str) -> Option<Self> {
        is_canonical(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalIdentifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// True for a non-empty `[A-Z0-9_]` string without edge or doubled
/// underscores.
pub fn is_canonical(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
        && !value.starts_with('_')
        && !value.ends_with('_')
        && !value.contains("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_shape() {
        assert!(is_canonical("ORDER_DETAILS"));
        assert!(is_canonical("COL_1"));
        assert!(!is_canonical(""));
        assert!(!is_canonical("_ORDER"));
        assert!(!is_canonical("ORDER_"));
        assert!(!is_canonical("ORDER__DETAILS"));
        assert!(!is_canonical("Order"));
        assert!(!is_canonical("ORDER-DETAILS"));
    }

    #[test]
    fn parse_rejects_non_canonical() {
        assert_eq!(
            CanonicalIdentifier::parse("PRODUCT_LINES").map(CanonicalIdentifier::into_string),
            Some("PRODUCT_LINES".to_string())
        );
        assert!(CanonicalIdentifier::parse("product_lines").is_none());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CanonicalIdentifier::parse("CUSTOMERS").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CUSTOMERS\"");
    }
}

//! Source identifier to warehouse identifier conversion.

use std::sync::LazyLock;

use crate::exceptions::ExceptionMap;
use crate::identifier::CanonicalIdentifier;
use crate::passes::apply_boundary_passes;

/// Converts table and column names into upper snake case.
///
/// Handles snake_case, camelCase, PascalCase, dotted and hyphenated names.
/// Concatenated lowercase words need an entry in the [`ExceptionMap`].
///
/// ```
/// use elt_naming::IdentifierNormalizer;
///
/// let normalizer = IdentifierNormalizer::default();
/// assert_eq!(normalizer.normalize("orderdetails").as_str(), "ORDER_DETAILS");
/// assert_eq!(normalizer.normalize("customerNumber").as_str(), "CUSTOMER_NUMBER");
/// assert_eq!(normalizer.normalize("XMLParser").as_str(), "XML_PARSER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierNormalizer {
    exceptions: ExceptionMap,
}

impl Default for IdentifierNormalizer {
    fn default() -> Self {
        Self::new(ExceptionMap::builtin())
    }
}

impl IdentifierNormalizer {
    pub fn new(exceptions: ExceptionMap) -> Self {
        Self { exceptions }
    }

    pub fn exceptions(&self) -> &ExceptionMap {
        &self.exceptions
    }

    /// Normalizes `raw`. Never fails; separator-only input yields an empty
    /// identifier.
    pub fn normalize(&self, raw: &str) -> CanonicalIdentifier {
        if let Some(mapped) = self.exceptions.get(raw) {
            return mapped.clone();
        }
        let stable = stabilize(raw);
        if let Some(mapped) = self.exceptions.get(&stable) {
            return mapped.clone();
        }
        CanonicalIdentifier::from_normalized(stable)
    }
}

// A digit followed by a lowercase letter only becomes a boundary once the
// first pass has uppercased it, so a second pass may still insert one.
fn stabilize(raw: &str) -> String {
    let mut current = apply_boundary_passes(raw);
    loop {
        let next = apply_boundary_passes(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

static BUILTIN_NORMALIZER: LazyLock<IdentifierNormalizer> =
    LazyLock::new(IdentifierNormalizer::default);

/// Normalizes with the built-in exception table.
pub fn normalize(raw: &str) -> CanonicalIdentifier {
    BUILTIN_NORMALIZER.normalize(raw)
}

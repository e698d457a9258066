//! Boundary passes used by the identifier normalizer.
//!
//! Each pass is one global substitution over the whole input and returns a
//! new string; the normalizer chains them in a fixed order. Matches never
//! overlap and never see an insertion made earlier in the same pass, which
//! keeps every rule auditable on its own.

use std::sync::LazyLock;

use regex::Regex;

/// Anything outside `[A-Za-z0-9_]`. Whitespace, hyphens and dots are the
/// delimiters seen in real source names; other characters are treated the
/// same way so the output alphabet stays within `[A-Z0-9_]`.
static DELIMITER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("Invalid delimiter regex"));

static LOWER_UPPER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("Invalid lower/upper regex"));

static LETTER_DIGIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])([0-9])").expect("Invalid letter/digit regex"));

static ACRONYM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("Invalid acronym regex"));

static UNDERSCORE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("Invalid underscore regex"));

/// Replaces every character that cannot appear in a canonical identifier
/// with an underscore.
pub fn replace_delimiters(raw: &str) -> String {
    DELIMITER_REGEX.replace_all(raw, "_").into_owned()
}

/// Inserts `_` between a lowercase letter or digit and a following
/// uppercase letter (`orderDetails` -> `order_Details`).
pub fn split_lower_upper(value: &str) -> String {
    LOWER_UPPER_REGEX.replace_all(value, "${1}_${2}").into_owned()
}

/// Inserts `_` between a letter and a following digit (`col1` -> `col_1`).
pub fn split_letter_digit(value: &str) -> String {
    LETTER_DIGIT_REGEX.replace_all(value, "${1}_${2}").into_owned()
}

/// Splits an uppercase run from a trailing capitalized word
/// (`XMLParser` -> `XML_Parser`).
///
/// The lowercase letter that closes one match can never start the next.
pub fn split_acronym(value: &str) -> String {
    ACRONYM_REGEX.replace_all(value, "${1}_${2}").into_owned()
}

/// Collapses underscore runs to a single underscore and uppercases the
/// result.
pub fn collapse_and_uppercase(value: &str) -> String {
    UNDERSCORE_RUN_REGEX
        .replace_all(value, "_")
        .to_ascii_uppercase()
}

/// Strips leading and trailing underscores.
pub fn trim_underscores(value: &str) -> &str {
    value.trim_matches('_')
}

/// Runs the automatic passes once, in rule order.
pub fn apply_boundary_passes(raw: &str) -> String {
    let delimited = replace_delimiters(raw);
    let camel = split_lower_upper(&delimited);
    let digits = split_letter_digit(&camel);
    let acronyms = split_acronym(&digits);
    let folded = collapse_and_uppercase(&acronyms);
    trim_underscores(&folded).to_string()
}

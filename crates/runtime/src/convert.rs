//! Lenient scalar parsing used by generated readers.
//!
//! Malformed query data degrades to a default instead of surfacing an error
//! to the caller; only *missing* required data is reported, and that happens
//! in the generated accessor, not here.

use std::str::FromStr;

/// Case-insensitive `"true"`, or the literal `"1"`.
pub fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

/// First code unit of the raw value, or `fallback` when empty.
pub fn parse_char_or(raw: &str, fallback: char) -> char {
    raw.chars().next().unwrap_or(fallback)
}

/// Numeric parse with a fallback value on failure.
pub fn parse_or<T: FromStr>(raw: &str, fallback: T) -> T {
    raw.parse().unwrap_or(fallback)
}

/// Numeric parse for nullable fields: failure becomes `None`.
pub fn parse_opt<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

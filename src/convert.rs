//! Locale-independent text-to-value conversions backing the typed
//! attribute/text accessor family, and the per-call error taxonomy those
//! accessors report through.
//!
//! This is deliberately a *separate* enum from [`crate::ErrorId`]: `ErrorId`
//! is latched once per parse and describes why a *parse* failed, while
//! `QueryError` is returned fresh from each typed-accessor call and
//! describes why *that one conversion* failed. Folding both into a single
//! enum would force one of them to carry a "no error" variant, which is a
//! poor fit for `Result`'s own `Ok` — see SPEC_FULL.md's ambient error
//! design note.

/// Why a typed attribute/text query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The element has no attribute of that name.
    #[error("no such attribute")]
    NoAttribute,
    /// The element has no text child to convert.
    #[error("element has no text node")]
    NoTextNode,
    /// The attribute exists but its text doesn't parse as the requested type.
    #[error("attribute value does not parse as the requested type")]
    WrongAttributeType,
    /// The text child exists but its text doesn't parse as the requested type.
    #[error("text does not parse as the requested type")]
    CanNotConvertText,
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a signed 32-bit integer: decimal, or `0x`/`0X`-prefixed hex.
pub fn to_int(s: &str) -> Option<i32> {
    to_int64(s).and_then(|v| i32::try_from(v).ok())
}

/// Parse an unsigned 32-bit integer: decimal, or `0x`/`0X`-prefixed hex.
pub fn to_unsigned(s: &str) -> Option<u32> {
    to_uint64(s).and_then(|v| u32::try_from(v).ok())
}

/// Parse a signed 64-bit integer: decimal, or `0x`/`0X`-prefixed hex.
pub fn to_int64(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Some(rest) = strip_hex_prefix(s) {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = s.strip_prefix('-').and_then(strip_hex_prefix) {
        return i64::from_str_radix(rest, 16).ok().map(|v: i64| -v);
    }
    s.parse::<i64>().ok()
}

/// Parse an unsigned 64-bit integer: decimal, or `0x`/`0X`-prefixed hex.
pub fn to_uint64(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(rest) = strip_hex_prefix(s) {
        return u64::from_str_radix(rest, 16).ok();
    }
    s.parse::<u64>().ok()
}

/// Parse a `bool`: an integer first (zero is `false`, any other value is
/// `true`), falling through to the literal strings `true`/`True`/`TRUE`/
/// `false`/`False`/`FALSE` when the text isn't a plain integer.
pub fn to_bool(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if let Some(n) = to_int64(trimmed) {
        return Some(n != 0);
    }
    match trimmed {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Parse an `f32`, locale-independent (always `.` as the decimal point).
pub fn to_float(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok()
}

/// Parse an `f64`, locale-independent (always `.` as the decimal point).
pub fn to_double(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_hex_integers() {
        assert_eq!(to_int64("42"), Some(42));
        assert_eq!(to_int64("-42"), Some(-42));
        assert_eq!(to_int64("0x2A"), Some(42));
        assert_eq!(to_int64("-0x2A"), Some(-42));
        assert_eq!(to_uint64("0xFF"), Some(255));
        assert_eq!(to_int64("not a number"), None);
    }

    #[test]
    fn int32_rejects_out_of_range() {
        assert_eq!(to_int("99999999999999"), None);
        assert_eq!(to_int("123"), Some(123));
    }

    #[test]
    fn bool_tries_integer_before_string() {
        assert_eq!(to_bool("0"), Some(false));
        assert_eq!(to_bool("1"), Some(true));
        assert_eq!(to_bool("7"), Some(true));
        assert_eq!(to_bool("true"), Some(true));
        assert_eq!(to_bool("False"), Some(false));
        assert_eq!(to_bool("TRUE"), Some(true));
        assert_eq!(to_bool("yes"), None);
    }

    #[test]
    fn float_and_double() {
        assert_eq!(to_float("3.5"), Some(3.5));
        assert_eq!(to_double("-2.25"), Some(-2.25));
        assert_eq!(to_double("abc"), None);
    }
}

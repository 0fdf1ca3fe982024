//! The five named XML entities, and numeric character reference decoding.

use crate::charclass::push_utf8;

/// One of the five canonical XML named entities.
struct Entity {
    pattern: &'static str,
    value: u8,
}

const ENTITIES: [Entity; 5] = [
    Entity { pattern: "quot", value: b'"' },
    Entity { pattern: "amp", value: b'&' },
    Entity { pattern: "apos", value: b'\'' },
    Entity { pattern: "lt", value: b'<' },
    Entity { pattern: "gt", value: b'>' },
];

/// Look up a named entity (the bytes between `&` and `;`, exclusive) and
/// return its single-byte ASCII replacement.
pub fn lookup_named(name: &[u8]) -> Option<u8> {
    ENTITIES
        .iter()
        .find(|e| e.pattern.as_bytes() == name)
        .map(|e| e.value)
}

/// Byte value for a named entity, for the printer's reverse lookup.
pub fn pattern_for(value: u8) -> Option<&'static str> {
    ENTITIES.iter().find(|e| e.value == value).map(|e| e.pattern)
}

/// Attempt to decode a numeric character reference starting at `input[0] ==
/// b'#'` (i.e. just after the `&`). Returns the UTF-8 encoding of the
/// referenced code point and the number of input bytes consumed (including
/// the trailing `;`), or `None` if the bytes don't form a well-formed
/// reference (missing `;`, empty digit run, bad digit).
///
/// Overflow of the accumulator saturates at `u32::MAX` rather than wrapping;
/// [`crate::charclass::push_utf8`] then maps any out-of-range value to the
/// replacement character instead of emitting invalid UTF-8.
pub fn decode_numeric_ref(input: &[u8]) -> Option<(Vec<u8>, usize)> {
    debug_assert_eq!(input.first(), Some(&b'#'));
    let rest = &input[1..];

    let (hex, digits_start) = if rest.first() == Some(&b'x') || rest.first() == Some(&b'X') {
        (true, 1)
    } else {
        (false, 0)
    };

    let semi = rest[digits_start..].iter().position(|&b| b == b';')?;
    let digits = &rest[digits_start..digits_start + semi];
    if digits.is_empty() {
        return None;
    }

    let mut acc: u32 = 0;
    let radix: u32 = if hex { 16 } else { 10 };
    for &b in digits {
        let digit = (b as char).to_digit(radix)?;
        acc = acc.saturating_mul(radix).saturating_add(digit);
    }

    let mut out = Vec::with_capacity(4);
    push_utf8(&mut out, acc);
    // consumed: '#' + (x?) + digits + ';'
    let consumed = 1 + digits_start + digits.len() + 1;
    Some((out, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entities_round_trip() {
        for (name, value) in [("amp", b'&'), ("lt", b'<'), ("gt", b'>'), ("quot", b'"'), ("apos", b'\'')] {
            assert_eq!(lookup_named(name.as_bytes()), Some(value));
            assert_eq!(pattern_for(value), Some(name));
        }
        assert_eq!(lookup_named(b"foo"), None);
    }

    #[test]
    fn decimal_reference() {
        let (bytes, consumed) = decode_numeric_ref(b"#65;rest").unwrap();
        assert_eq!(bytes, b"A");
        assert_eq!(consumed, 4); // "#65;"
    }

    #[test]
    fn hex_reference_lower_and_upper() {
        let (bytes, _) = decode_numeric_ref(b"#x42;").unwrap();
        assert_eq!(bytes, b"B");
        let (bytes, _) = decode_numeric_ref(b"#X42;").unwrap();
        assert_eq!(bytes, b"B");
    }

    #[test]
    fn malformed_reference_returns_none() {
        assert!(decode_numeric_ref(b"#;").is_none());
        assert!(decode_numeric_ref(b"#xyz;").is_none());
        assert!(decode_numeric_ref(b"#12").is_none());
    }

    #[test]
    fn overflow_saturates_instead_of_panicking() {
        let (bytes, _) = decode_numeric_ref(b"#999999999999999999999;").unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "\u{FFFD}");
    }
}

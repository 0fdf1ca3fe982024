//! Byte-level character classification for the parser's reduced XML 1.0
//! name grammar, and UTF-8/UTF-32 plumbing used by entity decoding.
//!
//! This engine doesn't implement the full XML `NameStartChar`/`NameChar`
//! productions (which require table lookups over the entire Unicode range).
//! Per the engine's scope, a name starts with an ASCII letter, `_`, `:`, or
//! any byte `>= 0x80`, and continues with those plus ASCII digits, `-`, `.`.

/// Is `b` a valid first byte of an element/attribute name?
#[inline]
pub fn is_name_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

/// Is `b` a valid non-first byte of an element/attribute name?
#[inline]
pub fn is_name_byte(b: u8) -> bool {
    is_name_start_byte(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

/// Is `b` whitespace under this engine's rules: space, tab, CR, LF?
#[inline]
pub fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Encode a Unicode scalar value as UTF-8 bytes, appending to `out`.
///
/// Values above `0x10FFFF` (outside any valid Unicode scalar value, which is
/// the practical overflow case for a malformed numeric character reference)
/// are encoded as the Unicode replacement character instead of producing
/// invalid UTF-8.
pub fn push_utf8(out: &mut Vec<u8>, code_point: u32) {
    match char::from_u32(code_point) {
        Some(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        None => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(char::REPLACEMENT_CHARACTER.encode_utf8(&mut buf).as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_chars() {
        assert!(is_name_start_byte(b'a'));
        assert!(is_name_start_byte(b'_'));
        assert!(is_name_start_byte(b':'));
        assert!(!is_name_start_byte(b'1'));
        assert!(!is_name_start_byte(b'-'));
        assert!(is_name_byte(b'1'));
        assert!(is_name_byte(b'-'));
        assert!(is_name_byte(b'.'));
    }

    #[test]
    fn whitespace() {
        for b in [b' ', b'\t', b'\r', b'\n'] {
            assert!(is_whitespace_byte(b));
        }
        assert!(!is_whitespace_byte(b'x'));
    }

    #[test]
    fn utf8_encode_ascii_and_multibyte() {
        let mut out = Vec::new();
        push_utf8(&mut out, 'A' as u32);
        push_utf8(&mut out, 0x4e2d); // 中
        assert_eq!(String::from_utf8(out).unwrap(), "A\u{4e2d}");
    }

    #[test]
    fn utf8_encode_overflow_saturates() {
        let mut out = Vec::new();
        push_utf8(&mut out, 0x00FF_FFFF);
        assert_eq!(String::from_utf8(out).unwrap(), "\u{FFFD}");
    }
}

//! Character classification used by both the parser and the printer.

/// `0`–`9`.
pub(crate) fn is_decimal_char(c: char) -> bool {
    c.is_ascii_digit()
}

/// `0`–`9`, `a`–`f`, `A`–`F`.
pub(crate) fn is_hex_char(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// `0`–`7`.
pub(crate) fn is_octal_char(c: char) -> bool {
    matches!(c, '0'..='7')
}

/// `0` or `1`.
pub(crate) fn is_binary_char(c: char) -> bool {
    matches!(c, '0' | '1')
}

/// A character that can begin a number: a decimal digit or a sign.
pub(crate) fn is_numeric_start(c: char) -> bool {
    is_decimal_char(c) || c == '+' || c == '-'
}

/// Vertical whitespace: anything that terminates a line.
pub(crate) fn is_unicode_linespace(c: char) -> bool {
    matches!(
        c,
        '\r' | '\n' | '\u{0085}' | '\u{000C}' | '\u{2028}' | '\u{2029}'
    )
}

/// Horizontal whitespace. The BOM is included so that a stray `U+FEFF`
/// anywhere in a document is skipped like a space.
pub(crate) fn is_unicode_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// A character legal anywhere inside a bare identifier.
pub(crate) fn is_bare_id_char(c: char) -> bool {
    (c as u32) > 0x20
        && (c as u32) <= 0x10FFFF
        && !is_unicode_linespace(c)
        && !is_unicode_whitespace(c)
        && !matches!(
            c,
            '\\' | '/' | '(' | ')' | '{' | '}' | '<' | '>' | ';' | '[' | ']' | '=' | ',' | '"'
        )
}

/// A character legal at the start of a bare identifier. Signs are legal
/// starts; they only become numbers when a decimal digit follows.
pub(crate) fn is_bare_id_start(c: char) -> bool {
    is_bare_id_char(c) && !is_decimal_char(c)
}

/// Any character appearing in `true`, `false`, or `null`.
pub(crate) fn is_keyword_char(c: char) -> bool {
    matches!(c, 't' | 'r' | 'u' | 'e' | 'n' | 'l' | 'f' | 'a' | 's')
}

/// The characters with a dedicated short escape form.
pub(crate) fn is_common_escape(c: char) -> bool {
    matches!(
        c,
        '\\' | '\u{0008}' | '\n' | '\u{000C}' | '\t' | '\r' | '"'
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digits() {
        assert!(is_decimal_char('0') && is_decimal_char('9'));
        assert!(!is_decimal_char('a'));
        assert!(is_hex_char('F') && is_hex_char('f') && is_hex_char('0'));
        assert!(!is_hex_char('g'));
        assert!(is_octal_char('7') && !is_octal_char('8'));
        assert!(is_binary_char('1') && !is_binary_char('2'));
        assert!(is_numeric_start('-') && is_numeric_start('+') && is_numeric_start('5'));
        assert!(!is_numeric_start('.'));
    }

    #[test]
    fn whitespace() {
        for c in ['\n', '\r', '\u{0085}', '\u{000C}', '\u{2028}', '\u{2029}'] {
            assert!(is_unicode_linespace(c), "{c:?}");
            assert!(!is_unicode_whitespace(c), "{c:?}");
        }
        for c in [' ', '\t', '\u{00A0}', '\u{2003}', '\u{3000}', '\u{FEFF}'] {
            assert!(is_unicode_whitespace(c), "{c:?}");
        }
    }

    #[test]
    fn identifiers() {
        assert!(is_bare_id_start('n') && is_bare_id_start('-') && is_bare_id_start('+'));
        assert!(is_bare_id_start('🎉'));
        assert!(!is_bare_id_start('5') && is_bare_id_char('5'));
        for c in ['\\', '/', '(', ')', '{', '}', '<', '>', ';', '[', ']', '=', ',', '"', ' '] {
            assert!(!is_bare_id_char(c), "{c:?}");
        }
    }

    #[test]
    fn keyword_and_escape_sets() {
        assert!("truefalsenull".chars().all(is_keyword_char));
        assert!(!is_keyword_char('x'));
        assert!(is_common_escape('\\') && is_common_escape('\u{000C}') && is_common_escape('"'));
        assert!(!is_common_escape('/'));
    }
}

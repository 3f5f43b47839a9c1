//! Serialization: [`PrintConfig`] and the document printer.
//!
//! The printer emits a canonical form: one node per line, properties in
//! lexicographic key order, strings in their minimal quoting form, numbers
//! in their original radix.

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use num_bigint::BigInt;

use crate::chars::{
    is_bare_id_char, is_bare_id_start, is_common_escape, is_decimal_char, is_unicode_linespace,
    is_unicode_whitespace,
};
use crate::error::PrintConfigError;
use crate::value::{KdlNumber, KdlValue, KdlValueKind};
use crate::{KdlDocument, KdlNode};

/// Options controlling how documents are rendered back to text.
///
/// The default configuration (also [`PrintConfig::pretty_default`]) indents
/// children by four spaces, preserves radixes, and escapes line-space,
/// non-printable ASCII, and the common escape characters. Build a custom
/// configuration through [`PrintConfig::builder`]:
///
/// ```rust
/// use kdlv1::PrintConfig;
///
/// let config = PrintConfig::builder()
///     .require_semicolons(true)
///     .indent(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintConfig {
    pub(crate) escapes: BTreeSet<char>,
    pub(crate) escape_non_printable_ascii: bool,
    pub(crate) escape_linespace: bool,
    pub(crate) escape_non_ascii: bool,
    pub(crate) escape_common: bool,
    pub(crate) require_semicolons: bool,
    pub(crate) respect_radix: bool,
    pub(crate) newline: String,
    pub(crate) indent: usize,
    pub(crate) indent_char: char,
    pub(crate) exponent_char: char,
    pub(crate) print_empty_children: bool,
    pub(crate) print_null_args: bool,
    pub(crate) print_null_props: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig {
            escapes: BTreeSet::new(),
            escape_non_printable_ascii: true,
            escape_linespace: true,
            escape_non_ascii: false,
            escape_common: true,
            require_semicolons: false,
            respect_radix: true,
            newline: "\n".to_string(),
            indent: 4,
            indent_char: ' ',
            exponent_char: 'E',
            print_empty_children: true,
            print_null_args: true,
            print_null_props: true,
        }
    }
}

impl PrintConfig {
    /// Starts building a configuration from the defaults.
    pub fn builder() -> PrintConfigBuilder {
        PrintConfigBuilder {
            config: PrintConfig::default(),
        }
    }

    /// The default human-oriented configuration.
    pub fn pretty_default() -> Self {
        PrintConfig::default()
    }

    /// A compact configuration: no indentation, empty children blocks
    /// omitted.
    pub fn raw_default() -> Self {
        PrintConfig {
            indent: 0,
            print_empty_children: false,
            ..Default::default()
        }
    }

    /// Whether `c` must be escaped inside a quoted string under this
    /// configuration.
    pub(crate) fn requires_escape(&self, c: char) -> bool {
        self.escapes.contains(&c)
            || c == '\\'
            || c == '"'
            || (self.escape_linespace && is_unicode_linespace(c))
            || (self.escape_non_printable_ascii
                && c.is_ascii()
                && !(c.is_ascii_graphic() || c == ' ')
                && !is_unicode_whitespace(c)
                && !is_unicode_linespace(c))
            || (self.escape_non_ascii && (c as u32) > 127)
            || (self.escape_common && is_common_escape(c))
    }
}

/// Builder for [`PrintConfig`]. Every option has a setter; [`build`]
/// validates the combination.
///
/// [`build`]: PrintConfigBuilder::build
#[derive(Debug, Clone)]
pub struct PrintConfigBuilder {
    config: PrintConfig,
}

impl PrintConfigBuilder {
    /// Forces `c` to always be escaped inside strings.
    pub fn escape(mut self, c: char) -> Self {
        self.config.escapes.insert(c);
        self
    }

    /// Forces every character in `chars` to always be escaped inside
    /// strings.
    pub fn escapes(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.config.escapes.extend(chars);
        self
    }

    /// Escape ASCII control characters that are not whitespace. Default
    /// `true`.
    pub fn escape_non_printable_ascii(mut self, yes: bool) -> Self {
        self.config.escape_non_printable_ascii = yes;
        self
    }

    /// Escape line-space characters inside strings. Default `true`.
    pub fn escape_linespace(mut self, yes: bool) -> Self {
        self.config.escape_linespace = yes;
        self
    }

    /// Escape every code point above 127. Default `false`.
    pub fn escape_non_ascii(mut self, yes: bool) -> Self {
        self.config.escape_non_ascii = yes;
        self
    }

    /// Escape the characters with short escape forms. Default `true`.
    pub fn escape_common(mut self, yes: bool) -> Self {
        self.config.escape_common = yes;
        self
    }

    /// Terminate every node with `;`. Default `false`.
    pub fn require_semicolons(mut self, yes: bool) -> Self {
        self.config.require_semicolons = yes;
        self
    }

    /// Print binary/octal/hex numbers with their radix prefix rather than
    /// in base 10. Default `true`.
    pub fn respect_radix(mut self, yes: bool) -> Self {
        self.config.respect_radix = yes;
        self
    }

    /// The newline string. Must consist of line-space characters.
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.config.newline = newline.into();
        self
    }

    /// Indent width per nesting level, in characters. Default `4`.
    pub fn indent(mut self, width: usize) -> Self {
        self.config.indent = width;
        self
    }

    /// The indent character. Must be Unicode whitespace. Default space.
    pub fn indent_char(mut self, c: char) -> Self {
        self.config.indent_char = c;
        self
    }

    /// The exponent marker for base-10 numbers, `'e'` or `'E'`. Default
    /// `'E'`.
    pub fn exponent_char(mut self, c: char) -> Self {
        self.config.exponent_char = c;
        self
    }

    /// Print `{` `}` blocks for empty children documents. Default `true`.
    pub fn print_empty_children(mut self, yes: bool) -> Self {
        self.config.print_empty_children = yes;
        self
    }

    /// Print null-valued arguments. Default `true`.
    pub fn print_null_args(mut self, yes: bool) -> Self {
        self.config.print_null_args = yes;
        self
    }

    /// Print null-valued properties. Default `true`.
    pub fn print_null_props(mut self, yes: bool) -> Self {
        self.config.print_null_props = yes;
        self
    }

    /// Validates the options and produces the configuration.
    pub fn build(self) -> Result<PrintConfig, PrintConfigError> {
        let config = self.config;
        if !config.newline.chars().all(is_unicode_linespace) {
            return Err(PrintConfigError::InvalidNewline(config.newline));
        }
        if !is_unicode_whitespace(config.indent_char) {
            return Err(PrintConfigError::InvalidIndentChar(config.indent_char));
        }
        if !matches!(config.exponent_char, 'e' | 'E') {
            return Err(PrintConfigError::InvalidExponentChar(config.exponent_char));
        }
        Ok(config)
    }
}

pub(crate) fn write_document<W: Write>(
    w: &mut W,
    doc: &KdlDocument,
    depth: usize,
    config: &PrintConfig,
) -> fmt::Result {
    for node in doc.nodes() {
        write_node(w, node, depth, config)?;
    }
    Ok(())
}

pub(crate) fn write_node<W: Write>(
    w: &mut W,
    node: &KdlNode,
    depth: usize,
    config: &PrintConfig,
) -> fmt::Result {
    write_indent(w, depth, config)?;
    if let Some(ty) = node.ty() {
        w.write_char('(')?;
        write_string(w, ty, true, config)?;
        w.write_char(')')?;
    }
    write_string(w, node.name(), true, config)?;
    for arg in node.args() {
        if arg.is_null() && !config.print_null_args {
            continue;
        }
        w.write_char(' ')?;
        write_value(w, arg, config)?;
    }
    for (key, value) in node.props() {
        if value.is_null() && !config.print_null_props {
            continue;
        }
        w.write_char(' ')?;
        write_string(w, key, true, config)?;
        w.write_char('=')?;
        write_value(w, value, config)?;
    }
    if let Some(children) = node.children() {
        if !children.is_empty() || config.print_empty_children {
            w.write_str(" {")?;
            w.write_str(&config.newline)?;
            write_document(w, children, depth + 1, config)?;
            write_indent(w, depth, config)?;
            w.write_char('}')?;
        }
    }
    if config.require_semicolons {
        w.write_char(';')?;
    }
    w.write_str(&config.newline)
}

fn write_indent<W: Write>(w: &mut W, depth: usize, config: &PrintConfig) -> fmt::Result {
    for _ in 0..depth * config.indent {
        w.write_char(config.indent_char)?;
    }
    Ok(())
}

pub(crate) fn write_value<W: Write>(
    w: &mut W,
    value: &KdlValue,
    config: &PrintConfig,
) -> fmt::Result {
    if let Some(ty) = value.ty() {
        w.write_char('(')?;
        write_string(w, ty, true, config)?;
        w.write_char(')')?;
    }
    match value.kind() {
        KdlValueKind::String(s) => write_string(w, s, false, config),
        KdlValueKind::Number(n) => write_number(w, n, config),
        KdlValueKind::Bool(b) => w.write_str(if *b { "true" } else { "false" }),
        KdlValueKind::Null => w.write_str("null"),
    }
}

pub(crate) fn write_number<W: Write>(
    w: &mut W,
    number: &KdlNumber,
    config: &PrintConfig,
) -> fmt::Result {
    match number {
        KdlNumber::Base10(text) => {
            if config.exponent_char == 'e' {
                w.write_str(&text.replace('E', "e"))
            } else {
                w.write_str(text)
            }
        }
        KdlNumber::Base2(v) => write_radix(w, v, 2, "0b", config),
        KdlNumber::Base8(v) => write_radix(w, v, 8, "0o", config),
        KdlNumber::Base16(v) => write_radix(w, v, 16, "0x", config),
    }
}

fn write_radix<W: Write>(
    w: &mut W,
    value: &BigInt,
    radix: u32,
    prefix: &str,
    config: &PrintConfig,
) -> fmt::Result {
    if !config.respect_radix {
        return w.write_str(&value.to_str_radix(10));
    }
    let digits = value.to_str_radix(radix);
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    if radix == 16 {
        write!(w, "{sign}{prefix}{}", magnitude.to_ascii_uppercase())
    } else {
        write!(w, "{sign}{prefix}{magnitude}")
    }
}

/// Writes `s` in its minimal form: verbatim when it is a printable bare
/// identifier and the position allows one, quoted with escapes otherwise.
pub(crate) fn write_string<W: Write>(
    w: &mut W,
    s: &str,
    bare_allowed: bool,
    config: &PrintConfig,
) -> fmt::Result {
    if bare_allowed && is_bare_printable(s) {
        return w.write_str(s);
    }
    w.write_char('"')?;
    for c in s.chars() {
        if config.requires_escape(c) {
            write_escaped(w, c)?;
        } else {
            w.write_char(c)?;
        }
    }
    w.write_char('"')
}

/// Whether `s` can be printed bare and re-read as the same identifier.
/// Sign-digit and `r#` prefixes re-lex as numbers and raw strings, so they
/// force quoting.
fn is_bare_printable(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !is_bare_id_start(first) {
        return false;
    }
    let second = s.chars().nth(1);
    if matches!(first, '+' | '-') && matches!(second, Some(d) if is_decimal_char(d)) {
        return false;
    }
    if first == 'r' && second == Some('#') {
        return false;
    }
    chars.all(is_bare_id_char)
}

fn write_escaped<W: Write>(w: &mut W, c: char) -> fmt::Result {
    match c {
        '\\' => w.write_str("\\\\"),
        '"' => w.write_str("\\\""),
        '\n' => w.write_str("\\n"),
        '\r' => w.write_str("\\r"),
        '\t' => w.write_str("\\t"),
        '\u{0008}' => w.write_str("\\b"),
        '/' => w.write_str("\\/"),
        c if (c as u32) <= 0xFFFF => write!(w, "\\u{:04x}", c as u32),
        c => write!(w, "\\u{{{:x}}}", c as u32),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_validation() {
        assert!(PrintConfig::builder().newline("\r\n").build().is_ok());
        assert!(matches!(
            PrintConfig::builder().newline("\n ").build(),
            Err(PrintConfigError::InvalidNewline(..))
        ));
        assert!(matches!(
            PrintConfig::builder().indent_char('x').build(),
            Err(PrintConfigError::InvalidIndentChar('x'))
        ));
        assert!(matches!(
            PrintConfig::builder().exponent_char('f').build(),
            Err(PrintConfigError::InvalidExponentChar('f'))
        ));
        assert!(PrintConfig::builder().exponent_char('e').build().is_ok());
    }

    #[test]
    fn presets() {
        let pretty = PrintConfig::pretty_default();
        assert_eq!(pretty.indent, 4);
        assert!(pretty.print_empty_children);

        let raw = PrintConfig::raw_default();
        assert_eq!(raw.indent, 0);
        assert!(!raw.print_empty_children);
    }

    #[test]
    fn bare_printability() {
        assert!(is_bare_printable("node"));
        assert!(is_bare_printable("-"));
        assert!(is_bare_printable("+foo"));
        assert!(is_bare_printable("r"));
        assert!(is_bare_printable("true"));
        assert!(!is_bare_printable(""));
        assert!(!is_bare_printable("1abc"));
        assert!(!is_bare_printable("+1"));
        assert!(!is_bare_printable("-2x"));
        assert!(!is_bare_printable("r#raw"));
        assert!(!is_bare_printable("has space"));
        assert!(!is_bare_printable("quo\"te"));
    }

    #[test]
    fn string_escaping() {
        let config = PrintConfig::default();
        let mut out = String::new();
        write_string(&mut out, "a\"b\\c\nd\u{000C}e", false, &config).unwrap();
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u000ce\"");
    }

    #[test]
    fn forced_and_non_ascii_escapes() {
        let config = PrintConfig::builder()
            .escape('/')
            .escape_non_ascii(true)
            .build()
            .unwrap();
        let mut out = String::new();
        write_string(&mut out, "a/b\u{2020}c\u{1F389}", false, &config).unwrap();
        assert_eq!(out, "\"a\\/b\\u2020c\\u{1f389}\"");
    }

    #[test]
    fn number_rendering() {
        let config = PrintConfig::default();
        let mut out = String::new();
        write_number(&mut out, &KdlNumber::Base16(BigInt::from(255)), &config).unwrap();
        assert_eq!(out, "0xFF");

        let mut out = String::new();
        write_number(&mut out, &KdlNumber::Base16(BigInt::from(-255)), &config).unwrap();
        assert_eq!(out, "-0xFF");

        let decimal_only = PrintConfig::builder().respect_radix(false).build().unwrap();
        let mut out = String::new();
        write_number(&mut out, &KdlNumber::Base2(BigInt::from(10)), &decimal_only).unwrap();
        assert_eq!(out, "10");

        let lower_e = PrintConfig::builder().exponent_char('e').build().unwrap();
        let mut out = String::new();
        write_number(&mut out, &KdlNumber::Base10("3.14E2".into()), &lower_e).unwrap();
        assert_eq!(out, "3.14e2");
    }
}

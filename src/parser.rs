//! The recursive-descent KDL parser.
//!
//! Every sub-parser takes the shared [`ParseContext`] and returns on
//! failure with a [`KdlErrorKind`]; the toplevel entry point in
//! [`KdlDocument::parse_from`](crate::KdlDocument::parse_from) attaches the
//! context's location snapshot exactly once. `Parse` errors mean bad input,
//! `Internal` errors mean a sub-parser was entered in a state its caller
//! should have ruled out.

use num_bigint::BigInt;

use crate::chars::{
    is_bare_id_char, is_bare_id_start, is_binary_char, is_decimal_char, is_hex_char,
    is_keyword_char, is_numeric_start, is_octal_char, is_unicode_linespace, is_unicode_whitespace,
};
use crate::error::{KdlError, KdlErrorKind};
use crate::reader::{CharSource, ParseContext, StrSource};
use crate::value::{KdlNumber, KdlValue, KdlValueKind};
use crate::{KdlDocument, KdlNode};

type ParseResult<T> = Result<T, KdlErrorKind>;

/// What one run of a whitespace absorption machine found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpaceResult {
    /// Nothing was absorbed.
    Nothing,
    /// Horizontal whitespace or comments only.
    NodeSpace,
    /// A line break, `;`, line comment, or EOF: the current node is over.
    EndOfNode,
    /// A `/-` marker: the next item must be parsed and discarded.
    SkipNext,
}

/// Parses a document: the node sequence at the root (`root == true`) or
/// inside a children block (`root == false`, returning with the closing
/// `}` still unconsumed).
pub(crate) fn document<S: CharSource>(
    ctx: &mut ParseContext<S>,
    root: bool,
) -> ParseResult<KdlDocument> {
    let mut doc = KdlDocument::new();
    let mut skipping = false;
    loop {
        if linespace(ctx)? == SpaceResult::SkipNext {
            skipping = true;
        }
        match ctx.peek()? {
            None => {
                if skipping {
                    return Err(KdlErrorKind::parse("Unexpected skip marker before EOF"));
                }
                if root {
                    return Ok(doc);
                }
                return Err(KdlErrorKind::parse("Got EOF, expected a node or '}'"));
            }
            Some('}') => {
                if skipping {
                    return Err(KdlErrorKind::parse("Unexpected '}' after skip marker"));
                }
                if root {
                    return Err(KdlErrorKind::parse("Unexpected '}' in root document"));
                }
                return Ok(doc);
            }
            Some(_) => {
                if let Some(node) = node(ctx)? {
                    if skipping {
                        skipping = false;
                    } else {
                        doc.nodes.push(node);
                    }
                }
            }
        }
    }
}

/// Parses one node: optional type annotation, identifier, then entries and
/// an optional children block. Returns `None` when the next character is
/// the parent's closing `}`.
fn node<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<Option<KdlNode>> {
    if ctx.peek()? == Some('}') {
        return Ok(None);
    }
    let ty = type_annotation(ctx)?;
    let name = identifier(ctx)?;
    if name.is_empty() {
        return Err(KdlErrorKind::parse("Node identifiers may not be empty"));
    }
    let mut node = KdlNode::new(name);
    node.ty = ty;
    loop {
        match node_space(ctx)? {
            SpaceResult::EndOfNode => return Ok(Some(node)),
            SpaceResult::SkipNext => skip_next_item(ctx)?,
            SpaceResult::Nothing | SpaceResult::NodeSpace => match ctx.peek()? {
                None => return Ok(Some(node)),
                Some('{') => {
                    node.children = Some(children(ctx)?);
                    return Ok(Some(node));
                }
                Some('}') => return Ok(Some(node)),
                Some(_) => {
                    let (key, value) = argument_or_property(ctx)?;
                    match key {
                        Some(key) => {
                            // Duplicate keys: the rightmost wins.
                            node.props.insert(key, value);
                        }
                        None => node.args.push(value),
                    }
                }
            },
        }
    }
}

/// Parses a braced children block, consuming both braces.
fn children<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<KdlDocument> {
    expect(ctx, '{')?;
    let doc = document(ctx, false)?;
    expect(ctx, '}')?;
    Ok(doc)
}

/// Parses and discards the single argument, property, or children block
/// following a `/-` marker inside a node.
fn skip_next_item<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<()> {
    loop {
        match ctx.peek()? {
            None => return Err(KdlErrorKind::parse("Unexpected skip marker before EOF")),
            Some(c) if is_unicode_whitespace(c) => {
                ctx.read()?;
            }
            Some(c) if is_unicode_linespace(c) => {
                return Err(KdlErrorKind::parse("Unexpected skip marker before newline"));
            }
            Some(';') => {
                return Err(KdlErrorKind::parse("Unexpected skip marker before newline"));
            }
            Some('\\') => {
                ctx.read()?;
                line_escape(ctx)?;
            }
            Some('/') => {
                ctx.read()?;
                match ctx.peek()? {
                    Some('*') => {
                        ctx.read()?;
                        block_comment(ctx)?;
                    }
                    // A repeated marker still skips just one item.
                    Some('-') => {
                        ctx.read()?;
                    }
                    Some('/') => {
                        return Err(KdlErrorKind::parse("Unexpected skip marker before newline"));
                    }
                    _ => return Err(KdlErrorKind::parse("Unexpected character '/'")),
                }
            }
            Some('{') => {
                children(ctx)?;
                return Ok(());
            }
            Some('}') => {
                return Err(KdlErrorKind::parse("Unexpected '}' after skip marker"));
            }
            Some(_) => {
                argument_or_property(ctx)?;
                return Ok(());
            }
        }
    }
}

/// Parses one argument or property.
///
/// Returns `(Some(key), value)` for a property and `(None, value)` for an
/// argument. Bare tokens are only legal here as property keys or as the
/// keywords `true`/`false`/`null`.
fn argument_or_property<S: CharSource>(
    ctx: &mut ParseContext<S>,
) -> ParseResult<(Option<String>, KdlValue)> {
    let ty = type_annotation(ctx)?;
    let mut bare = false;
    let string = match ctx.peek()? {
        None => {
            return Err(KdlErrorKind::parse(
                "Got EOF, expected an argument or property",
            ))
        }
        Some('"') => escaped_string(ctx)?,
        Some(c @ ('+' | '-')) => {
            ctx.read()?;
            let next = ctx.peek()?;
            ctx.unread(c)?;
            if matches!(next, Some(d) if is_decimal_char(d)) {
                return Ok((None, number_value(ctx, ty)?));
            }
            bare = true;
            bare_identifier(ctx)?
        }
        Some(c) if is_decimal_char(c) => return Ok((None, number_value(ctx, ty)?)),
        Some('r') => {
            ctx.read()?;
            let next = ctx.peek()?;
            ctx.unread('r')?;
            if matches!(next, Some('"') | Some('#')) {
                raw_string(ctx)?
            } else {
                bare = true;
                bare_identifier(ctx)?
            }
        }
        Some(c) if is_bare_id_start(c) => {
            bare = true;
            bare_identifier(ctx)?
        }
        Some(c) => {
            return Err(KdlErrorKind::parse(format!(
                "Unexpected character {c:?} when expecting an argument or property"
            )))
        }
    };
    if ctx.peek()? == Some('=') {
        if ty.is_some() {
            return Err(KdlErrorKind::parse(
                "Type annotations are not allowed before property keys",
            ));
        }
        ctx.read()?;
        let value = value(ctx)?;
        return Ok((Some(string), value));
    }
    if !bare {
        return Ok((
            None,
            KdlValue {
                kind: KdlValueKind::String(string),
                ty,
            },
        ));
    }
    let kind = match string.as_str() {
        "true" => KdlValueKind::Bool(true),
        "false" => KdlValueKind::Bool(false),
        "null" => KdlValueKind::Null,
        _ => return Err(KdlErrorKind::parse("Arguments may not be bare")),
    };
    Ok((None, KdlValue { kind, ty }))
}

/// Parses a value on the right-hand side of `=`.
fn value<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<KdlValue> {
    let ty = type_annotation(ctx)?;
    match ctx.peek()? {
        None => Err(KdlErrorKind::parse("Got EOF, expected a value")),
        Some('"') => Ok(KdlValue {
            kind: KdlValueKind::String(escaped_string(ctx)?),
            ty,
        }),
        Some('r') => {
            ctx.read()?;
            let next = ctx.peek()?;
            ctx.unread('r')?;
            if matches!(next, Some('"') | Some('#')) {
                Ok(KdlValue {
                    kind: KdlValueKind::String(raw_string(ctx)?),
                    ty,
                })
            } else {
                keyword(ctx, ty)
            }
        }
        Some(c) if is_numeric_start(c) => number_value(ctx, ty),
        Some(c) if is_keyword_char(c) => keyword(ctx, ty),
        Some(c) => Err(KdlErrorKind::parse(format!(
            "Unexpected character {c:?} when expecting a value"
        ))),
    }
}

/// Collects keyword characters and matches them against `true`, `false`,
/// and `null`.
fn keyword<S: CharSource>(
    ctx: &mut ParseContext<S>,
    ty: Option<String>,
) -> ParseResult<KdlValue> {
    let mut word = String::new();
    while let Some(c) = ctx.peek()? {
        if !is_keyword_char(c) {
            break;
        }
        ctx.read()?;
        word.push(c);
    }
    let kind = match word.as_str() {
        "true" => KdlValueKind::Bool(true),
        "false" => KdlValueKind::Bool(false),
        "null" => KdlValueKind::Null,
        _ => return Err(KdlErrorKind::parse(format!("Unknown literal {word:?}"))),
    };
    Ok(KdlValue { kind, ty })
}

fn number_value<S: CharSource>(
    ctx: &mut ParseContext<S>,
    ty: Option<String>,
) -> ParseResult<KdlValue> {
    Ok(KdlValue {
        kind: KdlValueKind::Number(number(ctx)?),
        ty,
    })
}

/// Parses a number in any radix, sign included.
fn number<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<KdlNumber> {
    let mut negative = false;
    let mut signed = false;
    match ctx.peek()? {
        Some('+') => {
            ctx.read()?;
            signed = true;
        }
        Some('-') => {
            ctx.read()?;
            negative = true;
            signed = true;
        }
        _ => {}
    }
    match ctx.peek()? {
        Some('0') => {
            ctx.read()?;
            match ctx.peek()? {
                Some('x') => {
                    ctx.read()?;
                    radix_number(ctx, 16, negative)
                }
                Some('o') => {
                    ctx.read()?;
                    radix_number(ctx, 8, negative)
                }
                Some('b') => {
                    ctx.read()?;
                    radix_number(ctx, 2, negative)
                }
                _ => {
                    ctx.unread('0')?;
                    decimal_number(ctx, negative)
                }
            }
        }
        Some(c) if is_decimal_char(c) => decimal_number(ctx, negative),
        Some(c) if signed => Err(KdlErrorKind::parse(format!(
            "Expected a digit after sign, but found {c:?}"
        ))),
        None if signed => Err(KdlErrorKind::parse("Got EOF, expected a digit after sign")),
        other => Err(KdlErrorKind::internal(format!(
            "Number parser called at {other:?}"
        ))),
    }
}

/// Parses a base-10 number into its canonical text form: separators
/// dropped, exponent marker normalized to `E`.
fn decimal_number<S: CharSource>(
    ctx: &mut ParseContext<S>,
    negative: bool,
) -> ParseResult<KdlNumber> {
    let mut text = String::new();
    if negative {
        text.push('-');
    }
    let mut in_fraction = false;
    let mut in_exponent = false;
    let mut sign_legal = false;
    let mut exponent_digits = 0usize;
    while let Some(c) = ctx.peek()? {
        match c {
            '0'..='9' => {
                ctx.read()?;
                text.push(c);
                sign_legal = false;
                if in_exponent {
                    exponent_digits += 1;
                    if exponent_digits > 10 {
                        return Err(KdlErrorKind::internal("Exponent too long to represent"));
                    }
                }
            }
            '.' => {
                ctx.read()?;
                if in_exponent {
                    return Err(KdlErrorKind::parse(
                        "Decimal points are not allowed in exponents",
                    ));
                }
                if in_fraction {
                    return Err(KdlErrorKind::parse(
                        "Numbers may contain only one decimal point",
                    ));
                }
                match ctx.peek()? {
                    Some(d) if is_decimal_char(d) => {}
                    _ => {
                        return Err(KdlErrorKind::parse(
                            "A decimal point must be followed by a digit",
                        ))
                    }
                }
                in_fraction = true;
                text.push('.');
                sign_legal = false;
            }
            'e' | 'E' => {
                ctx.read()?;
                if in_exponent {
                    return Err(KdlErrorKind::parse(
                        "Numbers may contain only one exponent marker",
                    ));
                }
                if ctx.peek()? == Some('_') {
                    return Err(KdlErrorKind::parse(
                        "A digit separator may not follow an exponent marker",
                    ));
                }
                in_exponent = true;
                text.push('E');
                sign_legal = true;
            }
            '_' => {
                ctx.read()?;
                sign_legal = false;
            }
            '+' | '-' => {
                ctx.read()?;
                if !sign_legal {
                    return Err(KdlErrorKind::parse("Unexpected sign in number"));
                }
                text.push(c);
                sign_legal = false;
            }
            _ => break,
        }
    }
    if !is_valid_decimal(&text) {
        return Err(KdlErrorKind::parse(format!("Couldn't parse number {text:?}")));
    }
    Ok(KdlNumber::Base10(text))
}

/// Structural check on the accumulated decimal text: every present part
/// must have at least one digit.
fn is_valid_decimal(text: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let t = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match t.split_once('E') {
        Some((m, e)) => (m, Some(e)),
        None => (t, None),
    };
    let (int_part, fraction) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    digits(int_part)
        && fraction.map_or(true, digits)
        && exponent.map_or(true, |e| {
            let e = match e.strip_prefix('+') {
                Some(rest) => rest,
                None => e.strip_prefix('-').unwrap_or(e),
            };
            digits(e)
        })
}

/// Parses the digits of a radix-prefixed integer, the prefix already
/// consumed.
fn radix_number<S: CharSource>(
    ctx: &mut ParseContext<S>,
    radix: u32,
    negative: bool,
) -> ParseResult<KdlNumber> {
    let (digit_ok, prefix): (fn(char) -> bool, &str) = match radix {
        2 => (is_binary_char, "0b"),
        8 => (is_octal_char, "0o"),
        16 => (is_hex_char, "0x"),
        _ => {
            return Err(KdlErrorKind::internal(format!(
                "Unsupported radix {radix}"
            )))
        }
    };
    if ctx.peek()? == Some('_') {
        return Err(KdlErrorKind::parse(
            "A digit separator may not follow a radix prefix",
        ));
    }
    let mut digits = String::new();
    while let Some(c) = ctx.peek()? {
        if digit_ok(c) {
            ctx.read()?;
            digits.push(c);
        } else if c == '_' {
            ctx.read()?;
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return Err(KdlErrorKind::parse(format!(
            "Expected at least one digit after '{prefix}'"
        )));
    }
    digits.make_ascii_lowercase();
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| {
        KdlErrorKind::internal(format!(
            "Pre-vetted digits {digits:?} failed to parse in radix {radix}"
        ))
    })?;
    let value = if negative { -magnitude } else { magnitude };
    match radix {
        2 => Ok(KdlNumber::Base2(value)),
        8 => Ok(KdlNumber::Base8(value)),
        16 => Ok(KdlNumber::Base16(value)),
        _ => Err(KdlErrorKind::internal(format!(
            "Unsupported radix {radix}"
        ))),
    }
}

/// Parses an identifier in any of its three spellings: bare, quoted, or
/// raw-quoted.
fn identifier<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<String> {
    match ctx.peek()? {
        None => Err(KdlErrorKind::parse("Got EOF, expected an identifier")),
        Some('"') => escaped_string(ctx),
        Some('r') => {
            ctx.read()?;
            let next = ctx.peek()?;
            ctx.unread('r')?;
            if matches!(next, Some('"') | Some('#')) {
                raw_string(ctx)
            } else {
                bare_identifier(ctx)
            }
        }
        Some(c) if is_bare_id_start(c) => bare_identifier(ctx),
        Some(c) => Err(KdlErrorKind::parse(format!(
            "Expected an identifier, but found {c:?}"
        ))),
    }
}

fn bare_identifier<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<String> {
    let mut id = String::new();
    match ctx.read()? {
        Some(c) if is_bare_id_start(c) => id.push(c),
        other => {
            return Err(KdlErrorKind::internal(format!(
                "Bare identifier starting at {other:?}"
            )))
        }
    }
    while let Some(c) = ctx.peek()? {
        if !is_bare_id_char(c) {
            break;
        }
        ctx.read()?;
        id.push(c);
    }
    Ok(id)
}

/// Parses a parenthesized type annotation if one is present.
fn type_annotation<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<Option<String>> {
    if ctx.peek()? != Some('(') {
        return Ok(None);
    }
    ctx.read()?;
    let ty = identifier(ctx)?;
    match ctx.read()? {
        Some(')') => Ok(Some(ty)),
        Some(c) => Err(KdlErrorKind::parse(format!(
            "Expected ')' to close a type annotation, but found {c:?}"
        ))),
        None => Err(KdlErrorKind::parse(
            "Got EOF, expected ')' to close a type annotation",
        )),
    }
}

/// Parses a `"`-delimited string, processing escapes.
fn escaped_string<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<String> {
    match ctx.read()? {
        Some('"') => {}
        other => {
            return Err(KdlErrorKind::internal(format!(
                "Escaped string starting at {other:?}"
            )))
        }
    }
    let mut string = String::new();
    loop {
        match ctx.read()? {
            None => return Err(KdlErrorKind::parse("Got EOF, expected '\"'")),
            Some('"') => return Ok(string),
            Some('\\') => string.push(escape(ctx)?),
            Some(c) => string.push(c),
        }
    }
}

fn escape<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<char> {
    match ctx.read()? {
        None => Err(KdlErrorKind::parse("Got EOF, expected an escape sequence")),
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('\\') => Ok('\\'),
        Some('/') => Ok('/'),
        Some('"') => Ok('"'),
        Some('b') => Ok('\u{0008}'),
        Some('f') => Ok('\u{000C}'),
        Some('u') => unicode_escape(ctx),
        Some(_) => Err(KdlErrorKind::parse("Illegal escape sequence")),
    }
}

/// Parses the code point of a `\u` escape: `{1-6 hex digits}`, or exactly
/// four bare hex digits as printed for code points the short escapes don't
/// cover.
fn unicode_escape<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<char> {
    let mut hex = String::new();
    if ctx.peek()? == Some('{') {
        ctx.read()?;
        loop {
            match ctx.read()? {
                None => return Err(KdlErrorKind::parse("Got EOF, expected '}'")),
                Some('}') => break,
                Some(c) if is_hex_char(c) && hex.len() < 6 => hex.push(c),
                Some(_) => return Err(KdlErrorKind::parse("Illegal escape sequence")),
            }
        }
        if hex.is_empty() {
            return Err(KdlErrorKind::parse("Illegal escape sequence"));
        }
    } else {
        for _ in 0..4 {
            match ctx.read()? {
                Some(c) if is_hex_char(c) => hex.push(c),
                _ => return Err(KdlErrorKind::parse("Illegal escape sequence")),
            }
        }
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| {
        KdlErrorKind::internal(format!("Pre-vetted hex {hex:?} failed to parse"))
    })?;
    char::from_u32(code)
        .ok_or_else(|| KdlErrorKind::parse(format!("No unicode code point U+{code:X}")))
}

/// Parses an `r`-prefixed raw string. The closing quote must be followed
/// by exactly as many `#` as the opening fence.
fn raw_string<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<String> {
    match ctx.read()? {
        Some('r') => {}
        other => {
            return Err(KdlErrorKind::internal(format!(
                "Raw string starting at {other:?}"
            )))
        }
    }
    let mut fence = 0usize;
    while ctx.peek()? == Some('#') {
        ctx.read()?;
        fence += 1;
    }
    match ctx.read()? {
        Some('"') => {}
        Some(c) => {
            return Err(KdlErrorKind::parse(format!(
                "Expected '\"' to begin a raw string, but found {c:?}"
            )))
        }
        None => return Err(KdlErrorKind::parse("Got EOF, expected '\"'")),
    }
    let mut string = String::new();
    loop {
        match ctx.read()? {
            None => return Err(KdlErrorKind::parse("Got EOF, expected '\"'")),
            Some('"') => {
                let mut hashes = 0usize;
                while ctx.peek()? == Some('#') {
                    ctx.read()?;
                    hashes += 1;
                    if hashes > fence {
                        return Err(KdlErrorKind::parse(
                            "Too many # characters when closing raw string",
                        ));
                    }
                }
                if hashes == fence {
                    return Ok(string);
                }
                string.push('"');
                for _ in 0..hashes {
                    string.push('#');
                }
            }
            Some(c) => string.push(c),
        }
    }
}

/// The line-crossing absorption machine, used between nodes: eats
/// horizontal whitespace, line breaks, line and block comments, line
/// escapes, and `/-` markers.
fn linespace<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<SpaceResult> {
    let mut saw_space = false;
    let mut saw_break = false;
    let mut skip_next = false;
    loop {
        match ctx.peek()? {
            None => break,
            Some(c) if is_unicode_whitespace(c) => {
                ctx.read()?;
                saw_space = true;
            }
            Some(c) if is_unicode_linespace(c) => {
                ctx.read()?;
                saw_break = true;
            }
            Some('\\') => {
                ctx.read()?;
                line_escape(ctx)?;
                saw_space = true;
            }
            Some('/') => {
                ctx.read()?;
                match ctx.peek()? {
                    Some('/') => {
                        ctx.read()?;
                        line_comment(ctx)?;
                        saw_break = true;
                    }
                    Some('*') => {
                        ctx.read()?;
                        block_comment(ctx)?;
                        saw_space = true;
                    }
                    Some('-') => {
                        ctx.read()?;
                        skip_next = true;
                        match ctx.peek()? {
                            None => {
                                return Err(KdlErrorKind::parse(
                                    "Unexpected skip marker before EOF",
                                ))
                            }
                            Some(c) if is_unicode_linespace(c) => {
                                return Err(KdlErrorKind::parse(
                                    "Unexpected skip marker before newline",
                                ))
                            }
                            _ => {}
                        }
                    }
                    _ => return Err(KdlErrorKind::parse("Unexpected character '/'")),
                }
            }
            _ => break,
        }
    }
    Ok(if skip_next {
        SpaceResult::SkipNext
    } else if saw_break {
        SpaceResult::EndOfNode
    } else if saw_space {
        SpaceResult::NodeSpace
    } else {
        SpaceResult::Nothing
    })
}

/// The non-line-crossing absorption machine, used inside a node body. An
/// unescaped line break, `;`, bare line comment, or EOF terminates the
/// node; a line escape absorbs the following break (or line comment) and
/// keeps going.
fn node_space<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<SpaceResult> {
    let mut saw_space = false;
    loop {
        match ctx.peek()? {
            None => return Ok(SpaceResult::EndOfNode),
            Some(c) if is_unicode_whitespace(c) => {
                ctx.read()?;
                saw_space = true;
            }
            Some('\r') => {
                ctx.read()?;
                if ctx.peek()? == Some('\n') {
                    ctx.read()?;
                }
                return Ok(SpaceResult::EndOfNode);
            }
            Some(c) if is_unicode_linespace(c) => {
                ctx.read()?;
                return Ok(SpaceResult::EndOfNode);
            }
            Some(';') => {
                ctx.read()?;
                return Ok(SpaceResult::EndOfNode);
            }
            Some('\\') => {
                ctx.read()?;
                line_escape(ctx)?;
                saw_space = true;
            }
            Some('/') => {
                ctx.read()?;
                match ctx.peek()? {
                    Some('/') => {
                        ctx.read()?;
                        line_comment(ctx)?;
                        return Ok(SpaceResult::EndOfNode);
                    }
                    Some('*') => {
                        ctx.read()?;
                        block_comment(ctx)?;
                        saw_space = true;
                    }
                    Some('-') => {
                        ctx.read()?;
                        return Ok(SpaceResult::SkipNext);
                    }
                    _ => return Err(KdlErrorKind::parse("Unexpected character '/'")),
                }
            }
            _ => {
                return Ok(if saw_space {
                    SpaceResult::NodeSpace
                } else {
                    SpaceResult::Nothing
                })
            }
        }
    }
}

/// Consumes the body of a `//` comment through its terminating line break
/// or EOF.
fn line_comment<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<()> {
    loop {
        match ctx.read()? {
            None => return Ok(()),
            Some('\r') => {
                if ctx.peek()? == Some('\n') {
                    ctx.read()?;
                }
                return Ok(());
            }
            Some(c) if is_unicode_linespace(c) => return Ok(()),
            Some(_) => {}
        }
    }
}

/// Consumes the body of a `/*` comment. Block comments nest; EOF before
/// the final `*/` is fatal.
fn block_comment<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<()> {
    let mut depth = 1usize;
    while depth > 0 {
        match ctx.read()? {
            None => return Err(KdlErrorKind::parse("Got EOF, expected '*/'")),
            Some('/') => {
                if ctx.peek()? == Some('*') {
                    ctx.read()?;
                    depth += 1;
                }
            }
            Some('*') => {
                if ctx.peek()? == Some('/') {
                    ctx.read()?;
                    depth -= 1;
                }
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Consumes what follows a `\` line escape: optional whitespace and block
/// comments, then a single line break or a line comment.
fn line_escape<S: CharSource>(ctx: &mut ParseContext<S>) -> ParseResult<()> {
    loop {
        match ctx.peek()? {
            Some(c) if is_unicode_whitespace(c) => {
                ctx.read()?;
            }
            Some('\r') => {
                ctx.read()?;
                if ctx.peek()? == Some('\n') {
                    ctx.read()?;
                }
                return Ok(());
            }
            Some(c) if is_unicode_linespace(c) => {
                ctx.read()?;
                return Ok(());
            }
            Some('/') => {
                ctx.read()?;
                match ctx.peek()? {
                    Some('/') => {
                        ctx.read()?;
                        line_comment(ctx)?;
                        return Ok(());
                    }
                    Some('*') => {
                        ctx.read()?;
                        block_comment(ctx)?;
                    }
                    _ => return Err(KdlErrorKind::parse("Unexpected character '/'")),
                }
            }
            _ => return Err(KdlErrorKind::parse("Expected newline after line escape")),
        }
    }
}

fn expect<S: CharSource>(ctx: &mut ParseContext<S>, expected: char) -> ParseResult<()> {
    match ctx.read()? {
        Some(c) if c == expected => Ok(()),
        other => Err(KdlErrorKind::internal(format!(
            "Expected {expected:?} but found {other:?}"
        ))),
    }
}

/// Parses a standalone number, used by [`KdlNumber::parse`].
pub(crate) fn parse_number_str(input: &str) -> Result<KdlNumber, KdlError> {
    let mut ctx = ParseContext::new(StrSource::new(input));
    let result = (|| {
        match ctx.peek()? {
            Some(c) if is_numeric_start(c) => {}
            Some(c) => {
                return Err(KdlErrorKind::parse(format!(
                    "Expected a number, but found {c:?}"
                )))
            }
            None => return Err(KdlErrorKind::parse("Got EOF, expected a number")),
        }
        let number = number(&mut ctx)?;
        match ctx.peek()? {
            None => Ok(number),
            Some(c) => Err(KdlErrorKind::parse(format!(
                "Unexpected character {c:?} after a number"
            ))),
        }
    })();
    result.map_err(|kind| {
        let location = ctx.error_location().unwrap_or_default();
        KdlError { kind, location }
    })
}


#[cfg(test)]
mod number_tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn decimal() {
        assert_eq!(
            parse_number_str("123").unwrap(),
            KdlNumber::Base10("123".into())
        );
        assert_eq!(
            parse_number_str("-1_000").unwrap(),
            KdlNumber::Base10("-1000".into())
        );
        assert_eq!(
            parse_number_str("+7").unwrap(),
            KdlNumber::Base10("7".into())
        );
        assert_eq!(
            parse_number_str("3.14").unwrap(),
            KdlNumber::Base10("3.14".into())
        );
        assert_eq!(
            parse_number_str("3.14e2").unwrap(),
            KdlNumber::Base10("3.14E2".into())
        );
        assert_eq!(
            parse_number_str("1e-10").unwrap(),
            KdlNumber::Base10("1E-10".into())
        );
        // A trailing separator is dropped.
        assert_eq!(
            parse_number_str("1_").unwrap(),
            KdlNumber::Base10("1".into())
        );
    }

    #[test]
    fn radixes() {
        assert_eq!(
            parse_number_str("0x1F").unwrap(),
            KdlNumber::Base16(BigInt::from(31))
        );
        assert_eq!(
            parse_number_str("0o17").unwrap(),
            KdlNumber::Base8(BigInt::from(15))
        );
        assert_eq!(
            parse_number_str("0b1010").unwrap(),
            KdlNumber::Base2(BigInt::from(10))
        );
        assert_eq!(
            parse_number_str("-0x10").unwrap(),
            KdlNumber::Base16(BigInt::from(-16))
        );
        assert_eq!(
            parse_number_str("0xdead_beef").unwrap(),
            KdlNumber::Base16(BigInt::from(0xdead_beefu32))
        );
    }

    #[test]
    fn arbitrary_precision() {
        let big = "0xFFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF";
        let parsed = parse_number_str(big).unwrap();
        assert_eq!(
            parsed,
            KdlNumber::Base16(BigInt::parse_bytes(&[b'f'; 32], 16).unwrap())
        );
        assert_eq!(parsed.as_i128(), None);
    }

    #[test]
    fn malformed_decimals() {
        assert!(parse_number_str("1.").is_err());
        assert!(parse_number_str("1.2.3").is_err());
        assert!(parse_number_str("1e2e3").is_err());
        assert!(parse_number_str("1e_2").is_err());
        assert!(parse_number_str("1e").is_err());
        assert!(parse_number_str("+-1").is_err());
        assert!(parse_number_str("1-2").is_err());
        assert!(parse_number_str("1.2e3.4").is_err());
    }

    #[test]
    fn malformed_radix_numbers() {
        assert!(parse_number_str("0x").is_err());
        assert!(parse_number_str("0x_1").is_err());
        assert!(parse_number_str("0b2").is_err());
        assert!(parse_number_str("0o8").is_err());
    }

    #[test]
    fn oversized_exponent_is_internal() {
        let result = parse_number_str("1e12345678901");
        assert!(matches!(
            result,
            Err(KdlError {
                kind: KdlErrorKind::Internal(..),
                ..
            })
        ));
    }
}

#[cfg(test)]
mod space_tests {
    use super::*;

    fn ctx(input: &str) -> ParseContext<StrSource<'_>> {
        ParseContext::new(StrSource::new(input))
    }

    #[test]
    fn node_space_outcomes() {
        assert_eq!(node_space(&mut ctx("x")).unwrap(), SpaceResult::Nothing);
        assert_eq!(node_space(&mut ctx("  x")).unwrap(), SpaceResult::NodeSpace);
        assert_eq!(node_space(&mut ctx("\nx")).unwrap(), SpaceResult::EndOfNode);
        assert_eq!(node_space(&mut ctx("; x")).unwrap(), SpaceResult::EndOfNode);
        assert_eq!(node_space(&mut ctx("")).unwrap(), SpaceResult::EndOfNode);
        assert_eq!(
            node_space(&mut ctx("// done\nx")).unwrap(),
            SpaceResult::EndOfNode
        );
        assert_eq!(
            node_space(&mut ctx("/* c */ x")).unwrap(),
            SpaceResult::NodeSpace
        );
        assert_eq!(node_space(&mut ctx("/- 1")).unwrap(), SpaceResult::SkipNext);
    }

    #[test]
    fn line_escape_continues_node() {
        let mut ctx = ctx("\\\n  x");
        assert_eq!(node_space(&mut ctx).unwrap(), SpaceResult::NodeSpace);
        assert_eq!(ctx.peek().unwrap(), Some('x'));
    }

    #[test]
    fn line_escape_with_comment() {
        let mut ctx = ctx("\\ // rest of line\nx");
        assert_eq!(node_space(&mut ctx).unwrap(), SpaceResult::NodeSpace);
        assert_eq!(ctx.peek().unwrap(), Some('x'));
    }

    #[test]
    fn nested_block_comments() {
        let mut ctx = ctx("/* outer /* inner */ still outer */x");
        assert_eq!(linespace(&mut ctx).unwrap(), SpaceResult::NodeSpace);
        assert_eq!(ctx.peek().unwrap(), Some('x'));
    }

    #[test]
    fn unterminated_block_comment() {
        assert!(linespace(&mut ctx("/* never closed")).is_err());
        assert!(linespace(&mut ctx("/* outer /* inner */")).is_err());
    }

    #[test]
    fn slashdash_against_line_end() {
        assert!(linespace(&mut ctx("/-\nnode")).is_err());
        assert!(linespace(&mut ctx("/-")).is_err());
    }
}

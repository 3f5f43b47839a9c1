//! Character input for the parser: pluggable sources plus the parse
//! context that layers pushback and line tracking on top of them.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::str::Chars;

use crate::chars::is_unicode_linespace;
use crate::error::KdlErrorKind;

/// Abstract character input. The parser consumes one Unicode scalar at a
/// time and never looks at bytes, so anything that can produce a stream of
/// `char`s can back a parse.
pub trait CharSource {
    /// Pulls the next character, or `None` at end of input.
    fn next_char(&mut self) -> io::Result<Option<char>>;
}

/// A [`CharSource`] over an in-memory string. Never fails.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Wraps a string slice.
    pub fn new(input: &'a str) -> Self {
        StrSource {
            chars: input.chars(),
        }
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(input: &'a str) -> Self {
        StrSource::new(input)
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// A [`CharSource`] that incrementally decodes UTF-8 from any [`Read`].
///
/// Reads one character per call, so wrap slow inputs in a
/// [`std::io::BufReader`]. Invalid or truncated UTF-8 surfaces as
/// [`io::ErrorKind::InvalidData`].
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    /// Wraps a byte reader.
    pub fn new(inner: R) -> Self {
        ReadSource { inner }
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let mut buf = [0u8; 4];
        if self.inner.read(&mut buf[..1])? == 0 {
            return Ok(None);
        }
        let len = match buf[0] {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid UTF-8 leading byte",
                ))
            }
        };
        if len > 1 {
            self.inner.read_exact(&mut buf[1..len])?;
        }
        let s = std::str::from_utf8(&buf[..len])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(s.chars().next())
    }
}

/// How many characters [`ParseContext::unread`] can hold.
const PUSHBACK_DEPTH: usize = 2;

/// How many prior line buffers are retained so that unreading through a
/// line terminator can restore them.
const PRIOR_LINES: usize = 2;

/// Bookkeeping for one delivered character, so that `unread` can reverse
/// its effect exactly.
#[derive(Debug, Clone)]
struct ReadRecord {
    ch: char,
    started_line: bool,
}

/// Owns the character source for the duration of one parse.
///
/// Supports single-character `read`/`peek` and up to two characters of
/// `unread`, tracks the current line and column, and retains the last three
/// line buffers so an error report can show the offending line. Once
/// [`ParseContext::error_location`] has been called the context is
/// invalidated and every further operation is an internal error.
#[derive(Debug)]
pub(crate) struct ParseContext<S: CharSource> {
    source: S,
    /// Characters available for re-reading, most recently pushed last.
    /// These have had their bookkeeping reversed (or never applied, for
    /// peeked characters).
    pushback: Vec<char>,
    /// Effects of the most recent reads, newest last.
    history: VecDeque<ReadRecord>,
    line: usize,
    column: usize,
    current_line: String,
    prior_lines: VecDeque<String>,
    invalidated: bool,
}

impl<S: CharSource> ParseContext<S> {
    pub(crate) fn new(source: S) -> Self {
        ParseContext {
            source,
            pushback: Vec::with_capacity(PUSHBACK_DEPTH),
            history: VecDeque::with_capacity(4),
            line: 1,
            column: 0,
            current_line: String::new(),
            prior_lines: VecDeque::with_capacity(PRIOR_LINES),
            invalidated: false,
        }
    }

    fn check_valid(&self) -> Result<(), KdlErrorKind> {
        if self.invalidated {
            Err(KdlErrorKind::internal(
                "parse context used after an error was reported",
            ))
        } else {
            Ok(())
        }
    }

    fn pull(&mut self) -> Result<Option<char>, KdlErrorKind> {
        if let Some(c) = self.pushback.pop() {
            return Ok(Some(c));
        }
        Ok(self.source.next_char()?)
    }

    /// Consumes and returns the next character, or `None` at end of input.
    pub(crate) fn read(&mut self) -> Result<Option<char>, KdlErrorKind> {
        self.check_valid()?;
        let c = match self.pull()? {
            Some(c) => c,
            None => return Ok(None),
        };
        // CRLF counts as a single terminator for line numbering.
        let after_cr = matches!(self.history.back(), Some(r) if r.ch == '\r');
        let started_line = is_unicode_linespace(c) && !(c == '\n' && after_cr);
        if started_line {
            self.prior_lines
                .push_front(std::mem::take(&mut self.current_line));
            self.prior_lines.truncate(PRIOR_LINES);
            self.line += 1;
            self.column = 0;
        } else if !is_unicode_linespace(c) {
            self.current_line.push(c);
            self.column += 1;
        }
        self.history.push_back(ReadRecord { ch: c, started_line });
        if self.history.len() > PUSHBACK_DEPTH + 2 {
            self.history.pop_front();
        }
        Ok(Some(c))
    }

    /// Returns the next character without consuming it.
    pub(crate) fn peek(&mut self) -> Result<Option<char>, KdlErrorKind> {
        self.check_valid()?;
        if let Some(&c) = self.pushback.last() {
            return Ok(Some(c));
        }
        match self.source.next_char()? {
            Some(c) => {
                self.pushback.push(c);
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }

    /// Pushes a previously read character back onto the input.
    ///
    /// Only characters actually delivered by [`read`](Self::read) may be
    /// pushed back, at most two at a time.
    pub(crate) fn unread(&mut self, c: char) -> Result<(), KdlErrorKind> {
        self.check_valid()?;
        if self.pushback.len() >= PUSHBACK_DEPTH {
            return Err(KdlErrorKind::internal(format!(
                "cannot push back more than {PUSHBACK_DEPTH} characters"
            )));
        }
        let record = self.history.pop_back().ok_or_else(|| {
            KdlErrorKind::internal("cannot push back a character that was never read")
        })?;
        if record.ch != c {
            return Err(KdlErrorKind::internal(format!(
                "pushed back {c:?} but last read was {:?}",
                record.ch
            )));
        }
        if record.started_line {
            self.line -= 1;
            self.current_line = self.prior_lines.pop_front().unwrap_or_default();
            self.column = self.current_line.chars().count();
        } else if !is_unicode_linespace(c) {
            self.current_line.pop();
            self.column -= 1;
        }
        self.pushback.push(c);
        Ok(())
    }

    /// Reads the remainder of the current line, invalidates the context,
    /// and returns a snapshot pointing at the current column:
    ///
    /// ```text
    /// Line 3:
    /// node bad"arg"
    /// --------^
    /// ```
    pub(crate) fn error_location(&mut self) -> Result<String, KdlErrorKind> {
        self.check_valid()?;
        let mut line_ended = false;
        while let Some(c) = self.pushback.pop() {
            if is_unicode_linespace(c) {
                self.pushback.clear();
                line_ended = true;
                break;
            }
            self.current_line.push(c);
        }
        if !line_ended {
            // Best effort: a failing source shouldn't mask the parse error.
            while let Ok(Some(c)) = self.source.next_char() {
                if is_unicode_linespace(c) {
                    break;
                }
                self.current_line.push(c);
            }
        }
        self.invalidated = true;
        Ok(format!(
            "Line {}:\n{}\n{}^",
            self.line,
            self.current_line,
            "-".repeat(self.column)
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctx(input: &str) -> ParseContext<StrSource<'_>> {
        ParseContext::new(StrSource::new(input))
    }

    #[test]
    fn read_and_peek() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("ab");
        assert_eq!(ctx.peek()?, Some('a'));
        assert_eq!(ctx.read()?, Some('a'));
        assert_eq!(ctx.read()?, Some('b'));
        assert_eq!(ctx.peek()?, None);
        assert_eq!(ctx.read()?, None);
        Ok(())
    }

    #[test]
    fn unread_round_trips() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("xyz");
        assert_eq!(ctx.read()?, Some('x'));
        assert_eq!(ctx.read()?, Some('y'));
        ctx.unread('y')?;
        ctx.unread('x')?;
        assert_eq!(ctx.read()?, Some('x'));
        assert_eq!(ctx.read()?, Some('y'));
        assert_eq!(ctx.read()?, Some('z'));
        Ok(())
    }

    #[test]
    fn pushback_depth_is_bounded() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("abc");
        ctx.read()?;
        ctx.read()?;
        ctx.read()?;
        ctx.unread('c')?;
        ctx.unread('b')?;
        assert!(ctx.unread('a').is_err());
        Ok(())
    }

    #[test]
    fn line_tracking_across_newlines() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("ab\ncd");
        for _ in 0..3 {
            ctx.read()?;
        }
        assert_eq!(ctx.line, 2);
        assert_eq!(ctx.column, 0);
        ctx.read()?;
        assert_eq!(ctx.column, 1);
        Ok(())
    }

    #[test]
    fn crlf_is_one_terminator() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("a\r\nb");
        for _ in 0..3 {
            ctx.read()?;
        }
        assert_eq!(ctx.line, 2);
        ctx.read()?;
        assert_eq!(ctx.line, 2);
        assert_eq!(ctx.column, 1);
        Ok(())
    }

    #[test]
    fn unread_through_newline_restores_line() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("ab\ncd");
        for _ in 0..3 {
            ctx.read()?;
        }
        ctx.unread('\n')?;
        assert_eq!(ctx.line, 1);
        assert_eq!(ctx.column, 2);
        assert_eq!(ctx.read()?, Some('\n'));
        assert_eq!(ctx.line, 2);
        Ok(())
    }

    #[test]
    fn error_location_snapshot() -> Result<(), KdlErrorKind> {
        let mut ctx = ctx("node bad rest\nnext");
        for _ in 0..5 {
            ctx.read()?;
        }
        let loc = ctx.error_location()?;
        assert_eq!(loc, "Line 1:\nnode bad rest\n-----^");
        assert!(ctx.read().is_err());
        assert!(ctx.peek().is_err());
        assert!(ctx.error_location().is_err());
        Ok(())
    }

    #[test]
    fn read_source_decodes_utf8() -> io::Result<()> {
        let bytes: &[u8] = "a√🎉".as_bytes();
        let mut src = ReadSource::new(bytes);
        assert_eq!(src.next_char()?, Some('a'));
        assert_eq!(src.next_char()?, Some('√'));
        assert_eq!(src.next_char()?, Some('🎉'));
        assert_eq!(src.next_char()?, None);
        Ok(())
    }

    #[test]
    fn read_source_rejects_bad_utf8() {
        let bytes: &[u8] = &[0xFF, 0x00];
        let mut src = ReadSource::new(bytes);
        assert!(src.next_char().is_err());
    }
}

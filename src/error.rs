use miette::Diagnostic;
use thiserror::Error;

/// The toplevel error type for this crate: returned when a KDL document
/// failed to parse.
///
/// The `location` field holds a snapshot of the offending line produced by
/// the parse context, in the form:
///
/// ```text
/// Line 2:
/// node "unterminated
/// -----^
/// ```
///
/// This diagnostic implements [`miette::Diagnostic`] and can be used to
/// display pretty-printed messages when using [`miette::Result`] and the
/// `"fancy"` feature flag for `miette`.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("{kind}\n{location}")]
pub struct KdlError {
    /// Specific error kind for this failure.
    pub kind: KdlErrorKind,

    /// Snapshot of the line the parse context was on when the error was
    /// reported, with a caret marking the column.
    pub location: String,
}

/// A type representing the specific class of failure being returned.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum KdlErrorKind {
    /// The input text violates the KDL grammar.
    #[error("{0}")]
    #[diagnostic(code(kdlv1::parse))]
    Parse(String),

    /// The parser observed a state its invariants rule out. Seeing this
    /// means a bug in the parser, not in the input.
    #[error("Internal parser error: {0}")]
    #[diagnostic(code(kdlv1::internal))]
    Internal(String),

    /// The underlying character source failed.
    #[error("Error reading from input: {0}")]
    #[diagnostic(code(kdlv1::io))]
    Io(String),
}

impl KdlErrorKind {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        KdlErrorKind::Parse(message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        KdlErrorKind::Internal(message.into())
    }

    /// Returns `true` for grammar violations, as opposed to parser bugs and
    /// I/O failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, KdlErrorKind::Parse(..))
    }
}

impl From<std::io::Error> for KdlErrorKind {
    fn from(e: std::io::Error) -> Self {
        KdlErrorKind::Io(e.to_string())
    }
}

/// Returned when converting a float that KDL cannot represent.
#[derive(Debug, Diagnostic, Clone, Copy, PartialEq, Error)]
#[error("Non-finite floats have no KDL representation: {0}")]
#[diagnostic(code(kdlv1::non_finite_float))]
pub struct NonFiniteFloatError(
    /// The offending value.
    pub f64,
);

/// Returned when a [`PrintConfigBuilder`](crate::PrintConfigBuilder) is
/// given an option value that can never produce valid KDL.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum PrintConfigError {
    /// The configured newline contains a character that is not line-space.
    #[error("Newline may only contain line-space characters, got {0:?}")]
    #[diagnostic(code(kdlv1::config::newline))]
    InvalidNewline(String),

    /// The configured indent character is not Unicode whitespace.
    #[error("Indent character must be Unicode whitespace, got {0:?}")]
    #[diagnostic(code(kdlv1::config::indent))]
    InvalidIndentChar(char),

    /// The configured exponent character is something other than `e`/`E`.
    #[error("Exponent character must be 'e' or 'E', got {0:?}")]
    #[diagnostic(code(kdlv1::config::exponent))]
    InvalidExponentChar(char),
}

use std::fmt::Display;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{KdlError, NonFiniteFloatError, PrintConfig};

/// A KDL number: an arbitrary-precision magnitude plus the radix it was
/// written in.
///
/// Binary, octal, and hexadecimal numbers are always integers. Base-10
/// numbers may carry a fraction and an exponent and are kept in a canonical
/// text form: digit separators stripped, a leading `+` dropped, and the
/// exponent marker normalized to `E`. Numerically equal values written in
/// different radixes compare unequal, and the printer reproduces each in
/// its original radix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KdlNumber {
    /// A base-10 number in canonical text form, e.g. `-12`, `3.14`,
    /// `3.14E2`.
    Base10(String),
    /// A binary integer, written with a `0b` prefix.
    Base2(BigInt),
    /// An octal integer, written with a `0o` prefix.
    Base8(BigInt),
    /// A hexadecimal integer, written with a `0x` prefix.
    Base16(BigInt),
}

impl KdlNumber {
    /// Parses the full KDL number syntax, including signs, radix prefixes,
    /// digit separators, fractions, and exponents.
    pub fn parse(input: &str) -> Result<KdlNumber, KdlError> {
        crate::parser::parse_number_str(input)
    }

    /// The radix this number was written in.
    pub fn radix(&self) -> u32 {
        match self {
            KdlNumber::Base10(_) => 10,
            KdlNumber::Base2(_) => 2,
            KdlNumber::Base8(_) => 8,
            KdlNumber::Base16(_) => 16,
        }
    }

    /// This number as an `i128`, if it is an integer that fits.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            KdlNumber::Base10(s) => s.parse::<i128>().ok(),
            KdlNumber::Base2(v) | KdlNumber::Base8(v) | KdlNumber::Base16(v) => v.to_i128(),
        }
    }

    /// This number as an `f64`, possibly losing precision.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KdlNumber::Base10(s) => s.parse::<f64>().ok(),
            KdlNumber::Base2(v) | KdlNumber::Base8(v) | KdlNumber::Base16(v) => v.to_f64(),
        }
    }

    /// Converts a float to a base-10 number. Returns `None` for NaN and
    /// infinities, which KDL cannot represent.
    pub fn from_f64(value: f64) -> Option<KdlNumber> {
        if value.is_finite() {
            Some(KdlNumber::Base10(format!("{value:?}").replace('e', "E")))
        } else {
            None
        }
    }
}

macro_rules! impl_number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KdlNumber {
                fn from(value: $ty) -> Self {
                    KdlNumber::Base10(value.to_string())
                }
            }
        )*
    };
}

impl_number_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl TryFrom<f64> for KdlNumber {
    type Error = NonFiniteFloatError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        KdlNumber::from_f64(value).ok_or(NonFiniteFloatError(value))
    }
}

impl Display for KdlNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::fmt::write_number(f, self, &PrintConfig::default())
    }
}

/// A KDL value: a string, number, boolean, or null, optionally carrying a
/// type annotation.
///
/// Type annotations are opaque: they are parsed, carried, and printed, but
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KdlValue {
    pub(crate) kind: KdlValueKind,
    pub(crate) ty: Option<String>,
}

/// The four value variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KdlValueKind {
    /// A Unicode string.
    String(String),
    /// A number in one of four radixes.
    Number(KdlNumber),
    /// `true` or `false`.
    Bool(bool),
    /// The absence of a value.
    Null,
}

impl KdlValue {
    /// Creates an untyped value.
    pub fn new(kind: KdlValueKind) -> Self {
        KdlValue { kind, ty: None }
    }

    /// Creates the null value.
    pub fn null() -> Self {
        KdlValue::new(KdlValueKind::Null)
    }

    /// Attaches a type annotation.
    pub fn with_ty(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// This value's variant.
    pub fn kind(&self) -> &KdlValueKind {
        &self.kind
    }

    /// This value's type annotation, if any.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Sets the type annotation.
    pub fn set_ty(&mut self, ty: impl Into<String>) {
        self.ty = Some(ty.into());
    }

    /// Returns `true` if the value is a string.
    pub fn is_string(&self) -> bool {
        matches!(self.kind, KdlValueKind::String(..))
    }

    /// Returns `true` if the value is a number.
    pub fn is_number(&self) -> bool {
        matches!(self.kind, KdlValueKind::Number(..))
    }

    /// Returns `true` if the value is a boolean.
    pub fn is_bool(&self) -> bool {
        matches!(self.kind, KdlValueKind::Bool(..))
    }

    /// Returns `true` if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self.kind, KdlValueKind::Null)
    }

    /// The lexical rendering of this value, defined for every variant:
    /// strings yield their contents, numbers their canonical text, booleans
    /// `"true"`/`"false"`, and null `"null"`.
    pub fn as_string(&self) -> String {
        match &self.kind {
            KdlValueKind::String(s) => s.clone(),
            KdlValueKind::Number(n) => n.to_string(),
            KdlValueKind::Bool(b) => b.to_string(),
            KdlValueKind::Null => "null".to_string(),
        }
    }

    /// This value as a number. Defined for numbers, and attempted on
    /// strings by re-parsing their contents.
    pub fn as_number(&self) -> Option<KdlNumber> {
        match &self.kind {
            KdlValueKind::Number(n) => Some(n.clone()),
            KdlValueKind::String(s) => KdlNumber::parse(s).ok(),
            _ => None,
        }
    }

    /// Like [`as_number`](Self::as_number), with a caller default.
    pub fn as_number_or(&self, default: impl Into<KdlNumber>) -> KdlNumber {
        self.as_number().unwrap_or_else(|| default.into())
    }

    /// This value as a boolean. Defined for booleans, and attempted on
    /// strings by matching `"true"`/`"false"`.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            KdlValueKind::Bool(b) => Some(*b),
            KdlValueKind::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Like [`as_bool`](Self::as_bool), with a caller default.
    pub fn as_bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }
}

impl Display for KdlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::fmt::write_value(f, self, &PrintConfig::default())
    }
}

impl From<KdlNumber> for KdlValue {
    fn from(value: KdlNumber) -> Self {
        KdlValue::new(KdlValueKind::Number(value))
    }
}

impl From<&str> for KdlValue {
    fn from(value: &str) -> Self {
        KdlValue::new(KdlValueKind::String(value.to_string()))
    }
}

impl From<String> for KdlValue {
    fn from(value: String) -> Self {
        KdlValue::new(KdlValueKind::String(value))
    }
}

impl From<bool> for KdlValue {
    fn from(value: bool) -> Self {
        KdlValue::new(KdlValueKind::Bool(value))
    }
}

macro_rules! impl_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KdlValue {
                fn from(value: $ty) -> Self {
                    KdlValue::new(KdlValueKind::Number(value.into()))
                }
            }
        )*
    };
}

impl_value_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl<T> From<Option<T>> for KdlValue
where
    T: Into<KdlValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => KdlValue::null(),
        }
    }
}

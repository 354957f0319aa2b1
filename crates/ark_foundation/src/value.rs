//! Literal values stored in the constant pool.

use std::fmt;

use crate::number::Number;

/// A literal value referenced by `LOAD_CONST`.
///
/// Equality is structural: same kind and same canonical representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Arbitrary-precision integer.
    Number(Number),
    /// Raw string bytes (compared byte-exactly).
    String(Vec<u8>),
}

/// The kind of a [`Constant`], used for type tags in the binary format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    /// A number constant.
    Number,
    /// A string constant.
    String,
}

impl Constant {
    /// Creates a string constant from text.
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into().into_bytes())
    }

    /// Creates a number constant.
    #[must_use]
    pub fn number(n: impl Into<Number>) -> Self {
        Self::Number(n.into())
    }

    /// Returns the kind of this constant.
    #[must_use]
    pub const fn kind(&self) -> ConstantKind {
        match self {
            Self::Number(_) => ConstantKind::Number,
            Self::String(_) => ConstantKind::String,
        }
    }

    /// Returns the payload bytes as written into the constant table.
    ///
    /// Numbers use their canonical radix-16 text.
    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Number(n) => n.to_canonical().into_bytes(),
            Self::String(bytes) => bytes.clone(),
        }
    }

    /// Returns the number, or None if this is not a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            Self::String(_) => None,
        }
    }

    /// Returns the string bytes, or None if this is not a string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(bytes) => Some(bytes),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

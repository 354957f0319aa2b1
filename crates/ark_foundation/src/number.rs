//! Arbitrary-precision numeric literals.
//!
//! Numbers are stored as big integers and compared by value. Their canonical
//! text form is lowercase radix-16, which is what the bytecode image carries.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Num;

/// An arbitrary-precision integer literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Number(BigInt);

impl Number {
    /// Radix of the canonical text form.
    pub const CANONICAL_RADIX: u32 = 16;

    /// Parses a numeric literal as written in source.
    ///
    /// Accepts an optional `+`/`-` sign followed by decimal digits, or by
    /// `0x`/`0X` hex digits, or by `0b`/`0B` binary digits. Returns `None` for
    /// anything else.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = if let Some(rest) = text.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = text.strip_prefix('+') {
            (false, rest)
        } else {
            (false, text)
        };

        let (radix, digits) = if let Some(d) = rest
            .strip_prefix("0x")
            .or_else(|| rest.strip_prefix("0X"))
        {
            (16, d)
        } else if let Some(d) = rest
            .strip_prefix("0b")
            .or_else(|| rest.strip_prefix("0B"))
        {
            (2, d)
        } else {
            (10, rest)
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }

        let magnitude = BigInt::from_str_radix(digits, radix).ok()?;
        Some(Self(if negative { -magnitude } else { magnitude }))
    }

    /// Returns the canonical radix-16 text of this number.
    ///
    /// Lowercase digits, no prefix, a leading `-` for negative values.
    #[must_use]
    pub fn to_canonical(&self) -> String {
        self.0.to_str_radix(Self::CANONICAL_RADIX)
    }

    /// Parses canonical radix-16 text back into a number.
    ///
    /// Only exact canonical text is accepted: `"0A"` or `"A"` are rejected
    /// because they would serialize differently.
    #[must_use]
    pub fn from_canonical(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty()
            || !digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return None;
        }
        let value = BigInt::from_str_radix(text, Self::CANONICAL_RADIX).ok()?;
        let number = Self(value);
        (number.to_canonical() == text).then_some(number)
    }

    /// Returns the underlying big integer.
    #[must_use]
    pub const fn as_bigint(&self) -> &BigInt {
        &self.0
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self(BigInt::from(n))
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Self(BigInt::from(n))
    }
}

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Self {
        Self(n)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Abstract Syntax Tree for Ark.
//!
//! The AST is the read-only input of the code generator. A list whose head is
//! a [`Keyword`] is a special form; any other list is a call.

use std::fmt;

use ark_foundation::Number;

use crate::span::Span;

/// Reserved words that introduce special forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `(if cond then else)`
    If,
    /// `(set name expr)` - assign to an existing binding
    Set,
    /// `(def name expr)` - bind a new name in the current scope
    Def,
    /// `(fun (params...) body)` - closure
    Fun,
    /// `(begin e1 ... en)` - sequence
    Begin,
    /// `(while cond body)` - loop
    While,
}

impl Keyword {
    /// All keywords, in a fixed order.
    pub const ALL: [Keyword; 6] = [
        Self::If,
        Self::Set,
        Self::Def,
        Self::Fun,
        Self::Begin,
        Self::While,
    ];

    /// Looks up a keyword by its source spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Returns the source spelling of this keyword.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Set => "set",
            Self::Def => "def",
            Self::Fun => "fun",
            Self::Begin => "begin",
            Self::While => "while",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// Symbol like `foo` or `+`
    Symbol(String, Span),
    /// Integer literal like `42` or `0xff`
    Number(Number, Span),
    /// String literal like `"hello"`
    String(String, Span),
    /// Reserved keyword like `if`
    Keyword(Keyword, Span),
    /// List form like `(f 1 2)`
    List(Vec<Ast>, Span),
}

impl Ast {
    /// Returns the source span of this AST node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Symbol(_, s)
            | Self::Number(_, s)
            | Self::String(_, s)
            | Self::Keyword(_, s)
            | Self::List(_, s) => *s,
        }
    }

    /// Returns the elements of a list, or None if not a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Ast]> {
        match self {
            Self::List(elements, _) => Some(elements),
            _ => None,
        }
    }

    /// Returns the symbol name, or None if not a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns the keyword, or None if not a keyword.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Self::Keyword(k, _) => Some(*k),
            _ => None,
        }
    }

    /// Returns the number, or None if not a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n, _) => Some(n),
            _ => None,
        }
    }

    /// Returns the string value, or None if not a string.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s, _) => Some(s),
            _ => None,
        }
    }

    /// A human-readable type name for this AST node.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Symbol(_, _) => "symbol",
            Self::Number(_, _) => "number",
            Self::String(_, _) => "string",
            Self::Keyword(_, _) => "keyword",
            Self::List(_, _) => "list",
        }
    }
}

/// Helper constructors with default spans, for building trees by hand.
impl Ast {
    /// Creates a symbol node.
    pub fn symbol(s: impl Into<String>) -> Self {
        Self::Symbol(s.into(), Span::default())
    }

    /// Creates a number node.
    pub fn number(n: impl Into<Number>) -> Self {
        Self::Number(n.into(), Span::default())
    }

    /// Creates a string node.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into(), Span::default())
    }

    /// Creates a keyword node.
    #[must_use]
    pub fn keyword(k: Keyword) -> Self {
        Self::Keyword(k, Span::default())
    }

    /// Creates a list node.
    #[must_use]
    pub fn list(elements: Vec<Ast>) -> Self {
        Self::List(elements, Span::default())
    }
}

//! Error types for the Ark toolchain.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the Ark crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Ark operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records a source position unless the error already has one.
    ///
    /// Errors raised deep inside a nested form keep the innermost position.
    #[must_use]
    pub fn located(mut self, line: u32, column: u32) -> Self {
        let context = self.context.get_or_insert_with(ErrorContext::new);
        if context.line.is_none() {
            context.line = Some(line);
            context.column = Some(column);
        }
        self
    }

    /// Creates a malformed expression error at a source position.
    #[must_use]
    pub fn malformed(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::MalformedExpression {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates an unresolved branch target error.
    #[must_use]
    pub fn unresolved_branch(page: u16, instruction: usize) -> Self {
        Self::new(ErrorKind::UnresolvedBranchTarget { page, instruction })
    }

    /// Creates a compile limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: CompileLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an error for a pool entry the binary format cannot encode.
    #[must_use]
    pub fn unencodable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unencodable {
            message: message.into(),
        })
    }

    /// Creates an invalid bytecode error at a byte offset.
    #[must_use]
    pub fn invalid_bytecode(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidBytecode {
            offset,
            message: message.into(),
        })
    }

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ParseError { .. })
    }

    /// Returns true if this is a malformed expression error.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedExpression { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed source text, detected while feeding the compiler.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// An AST shape the code generator cannot lower.
    #[error("malformed expression at {line}:{column}: {message}")]
    MalformedExpression {
        /// What was wrong with the expression.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Branch patching could not locate its placeholder.
    ///
    /// This indicates a code generator bug and never comes from user input.
    #[error("unresolved branch target: instruction {instruction} in page {page}")]
    UnresolvedBranchTarget {
        /// The code page being patched.
        page: u16,
        /// Index of the instruction that should have been a branch.
        instruction: usize,
    },

    /// A format or resource limit was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(CompileLimit),

    /// A pool entry cannot be represented in the binary format.
    #[error("unencodable entry: {message}")]
    Unencodable {
        /// Description of the offending entry.
        message: String,
    },

    /// A bytecode image failed validation while being read.
    #[error("invalid bytecode at offset {offset}: {message}")]
    InvalidBytecode {
        /// Byte offset where decoding failed.
        offset: usize,
        /// Description of the problem.
        message: String,
    },
}

/// Limits imposed by the bytecode format or by compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileLimit {
    /// Expression nesting exceeded the configured depth.
    MaxDepth {
        /// The configured limit.
        limit: usize,
    },
    /// A pool has no room for another distinct entry.
    PoolFull {
        /// Which pool overflowed.
        pool: &'static str,
        /// Maximum number of entries.
        limit: usize,
    },
    /// Too many code pages for a 16-bit page index.
    TooManyPages {
        /// Maximum number of pages.
        limit: usize,
    },
    /// A single page holds more instructions than its count field allows.
    TooManyInstructions {
        /// The overflowing page.
        page: u16,
        /// Maximum number of instructions.
        limit: usize,
    },
    /// A call or closure has more arguments than an operand can encode.
    TooManyArguments {
        /// The actual count.
        count: usize,
        /// Maximum count.
        limit: usize,
    },
    /// A branch offset does not fit in a signed 16-bit operand.
    BranchTooFar {
        /// The byte distance that was required.
        distance: isize,
    },
}

impl fmt::Display for CompileLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxDepth { limit } => write!(f, "max nesting depth ({limit}) exceeded"),
            Self::PoolFull { pool, limit } => {
                write!(f, "{pool} pool is full ({limit} entries)")
            }
            Self::TooManyPages { limit } => write!(f, "more than {limit} code pages"),
            Self::TooManyInstructions { page, limit } => {
                write!(f, "page {page} has more than {limit} instructions")
            }
            Self::TooManyArguments { count, limit } => {
                write!(f, "{count} arguments (maximum {limit})")
            }
            Self::BranchTooFar { distance } => {
                write!(f, "branch distance {distance} does not fit in 16 bits")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<u32>,
    /// Column number in source.
    pub column: Option<u32>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        Ok(())
    }
}

//! Errors surfaced by the command-line tools.

use std::path::PathBuf;

use ark_foundation::ErrorKind;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Convenience alias for CLI results.
pub type Result<T> = std::result::Result<T, CliError>;

/// Everything that can go wrong in `arkc`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Compilation or image decoding failed.
    #[error("{}", describe(.0))]
    Compile(#[from] ark_foundation::Error),

    /// The line editor failed.
    #[error("line editor: {0}")]
    Editor(#[from] ReadlineError),

    /// Input ended in the middle of an unfinished form.
    #[error("unexpected end of input in multi-line form")]
    UnexpectedEof,
}

impl CliError {
    /// Creates an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Renders a compile error with its location and, for parse errors, the
/// offending source line with a caret under the column.
fn describe(error: &ark_foundation::Error) -> String {
    let mut text = match &error.context {
        Some(context) if context.source.is_some() => format!("{error} ({context})"),
        _ => error.to_string(),
    };
    if let ErrorKind::ParseError {
        column, context, ..
    } = &error.kind
    {
        let pad = " ".repeat(usize::try_from(*column).unwrap_or(1).saturating_sub(1));
        text.push_str(&format!("\n  {context}\n  {pad}^"));
    }
    text
}

//! Syntax highlighting for the REPL.
//!
//! Colors come straight from the language lexer, so the highlighter agrees
//! with the compiler about what is a keyword, a number, or a bad token.

use std::borrow::Cow;

use ark_language::{Lexer, TokenKind};

const RESET: &str = "\x1b[0m";

/// Highlighter for Ark source.
#[derive(Default)]
pub struct ArkHighlighter;

impl ArkHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut result = String::with_capacity(line.len() * 2);
        let mut lexer = Lexer::new(line);
        let mut copied = 0;

        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            let span = token.span;
            // Whitespace between tokens
            result.push_str(&line[copied..span.start]);

            let text = span.text(line);
            match color(&token.kind) {
                Some(color) => {
                    result.push_str(color);
                    result.push_str(text);
                    result.push_str(RESET);
                }
                None => result.push_str(text),
            }
            copied = span.end;
        }
        result.push_str(&line[copied..]);

        Cow::Owned(result)
    }
}

fn color(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::LParen | TokenKind::RParen => Some("\x1b[1m"), // bold
        TokenKind::Keyword(_) => Some("\x1b[32m"),                // green
        TokenKind::Number(_) => Some("\x1b[35m"),                 // magenta
        TokenKind::String(_) => Some("\x1b[33m"),                 // yellow
        TokenKind::Comment(_) => Some("\x1b[2;3m"),               // dim italic
        TokenKind::Error(_) => Some("\x1b[31m"),                  // red
        TokenKind::Symbol(name) if name == "true" || name == "false" => Some("\x1b[34m"),
        TokenKind::Symbol(_) | TokenKind::Eof => None,
    }
}

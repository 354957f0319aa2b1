//! Parser for Ark source.
//!
//! The parser converts a stream of tokens into an abstract syntax tree.
//! A program is the sequence of top-level forms in the source.

use ark_foundation::{CompileLimit, Error, ErrorKind, Result};

use crate::ast::Ast;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Default bound on list nesting, shared with the code generator.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser for Ark source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error messages).
    source: &'src str,
    /// Current list nesting depth.
    depth: usize,
    /// Maximum list nesting depth.
    max_depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Creates a parser with a custom nesting bound.
    #[must_use]
    pub fn with_max_depth(source: &'src str, max_depth: usize) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
            depth: 0,
            max_depth,
        }
    }

    /// Parses a single expression from the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse(&mut self) -> Result<Ast> {
        self.skip_trivia();
        self.parse_form()
    }

    /// Parses all expressions from the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse_all(&mut self) -> Result<Vec<Ast>> {
        let mut forms = Vec::new();
        self.skip_trivia();

        while self.current.kind != TokenKind::Eof {
            forms.push(self.parse_form()?);
            self.skip_trivia();
        }

        Ok(forms)
    }

    /// Parses a form (expression).
    fn parse_form(&mut self) -> Result<Ast> {
        self.skip_trivia();

        let span = self.current.span;
        let ast = match &self.current.kind {
            TokenKind::Number(n) => Ast::Number(n.clone(), span),
            TokenKind::String(s) => Ast::String(s.clone(), span),
            TokenKind::Symbol(name) => Ast::Symbol(name.clone(), span),
            TokenKind::Keyword(k) => Ast::Keyword(*k, span),
            TokenKind::LParen => return self.parse_list(),
            TokenKind::Eof => return Err(self.error("unexpected end of input")),
            TokenKind::Error(msg) => return Err(self.error(msg)),
            TokenKind::RParen => {
                return Err(self.error(&format!("unexpected {}", self.current.kind.name())));
            }
            TokenKind::Comment(_) => {
                self.advance();
                return self.parse_form();
            }
        };
        self.advance();
        Ok(ast)
    }

    /// Parses a list: `(...)`.
    fn parse_list(&mut self) -> Result<Ast> {
        let start_span = self.current.span;
        if self.depth >= self.max_depth {
            return Err(Error::limit_exceeded(CompileLimit::MaxDepth {
                limit: self.max_depth,
            })
            .located(start_span.line, start_span.column));
        }
        self.expect(&TokenKind::LParen)?;
        self.depth += 1;

        let mut elements = Vec::new();
        self.skip_trivia();

        while self.current.kind != TokenKind::RParen {
            if self.current.kind == TokenKind::Eof {
                return Err(self.error_at(start_span, "unterminated list"));
            }
            elements.push(self.parse_form()?);
            self.skip_trivia();
        }

        let end_span = self.current.span;
        self.expect(&TokenKind::RParen)?;
        self.depth -= 1;

        Ok(Ast::List(elements, start_span.to(end_span)))
    }

    /// Skips comment tokens.
    fn skip_trivia(&mut self) {
        while self.current.kind.is_trivia() {
            self.advance();
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        let matches =
            std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected);

        if matches {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current.kind.name()
            )))
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Gets the source line containing a span.
    fn context_at(&self, span: Span) -> String {
        let line_start = self.source[..span.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[span.start..]
            .find('\n')
            .map_or(self.source.len(), |i| span.start + i);

        self.source[line_start..line_end].to_string()
    }
}

/// Parses source code into the program's top-level forms.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse(source: &str) -> Result<Vec<Ast>> {
    Parser::new(source).parse_all()
}

/// Parses a single expression from source.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse_one(source: &str) -> Result<Ast> {
    Parser::new(source).parse()
}

//! Lexer for Ark source.
//!
//! The lexer converts source text into a stream of tokens.

use ark_foundation::Number;

use crate::ast::Keyword;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for Ark source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            ';' => self.scan_comment(),
            '#' => self.scan_hash(),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            '-' | '+' => {
                // Could be number or symbol
                if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.scan_symbol()
                }
            }
            c if is_symbol_start(c) => self.scan_symbol(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {}", c.escape_debug()))
            }
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scans a comment starting with `;`.
    fn scan_comment(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        TokenKind::Comment(text)
    }

    /// Scans `#t` / `#f`, which read as the symbols `true` and `false`.
    fn scan_hash(&mut self) -> TokenKind {
        self.advance(); // consume '#'
        let name = self.scan_symbol_text();
        match name.as_str() {
            "t" => TokenKind::Symbol("true".into()),
            "f" => TokenKind::Symbol("false".into()),
            "" => match self.peek_char() {
                Some(c) => {
                    TokenKind::Error(format!("unexpected character after #: {}", c.escape_debug()))
                }
                None => TokenKind::Error("unexpected end of input after #".into()),
            },
            other => TokenKind::Error(format!("unknown reader literal: #{other}")),
        }
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => {
                            return TokenKind::Error(format!(
                                "invalid escape sequence: \\{}",
                                c.escape_debug()
                            ));
                        }
                        None => {
                            return TokenKind::Error(
                                "unexpected end of input in string escape".into(),
                            );
                        }
                    };
                    self.advance();
                    text.push(escaped);
                }
                Some('\0') => {
                    // NUL terminates table entries in the bytecode image
                    return TokenKind::Error("NUL character in string literal".into());
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    /// Scans a number literal.
    ///
    /// The whole run of symbol characters is consumed so that `12abc` is one
    /// bad literal rather than a number followed by a symbol.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        if matches!(self.peek_char(), Some('-' | '+')) {
            self.advance();
        }
        while self.peek_char().is_some_and(is_symbol_char) {
            self.advance();
        }

        let text = &self.source[start..self.position];
        match Number::parse(text) {
            Some(n) => TokenKind::Number(n),
            None => TokenKind::Error(format!("invalid number literal: {text}")),
        }
    }

    /// Scans a symbol or reserved keyword.
    fn scan_symbol(&mut self) -> TokenKind {
        let name = self.scan_symbol_text();
        match Keyword::from_name(&name) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Symbol(name),
        }
    }

    /// Scans a run of symbol characters.
    fn scan_symbol_text(&mut self) -> String {
        let start = self.position;
        while self.peek_char().is_some_and(is_symbol_char) {
            self.advance();
        }
        self.source[start..self.position].to_string()
    }
}

/// Returns true if `c` can start a symbol.
fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(
            c,
            '_' | '+' | '-' | '*' | '/' | '!' | '?' | '<' | '>' | '=' | '&' | '%' | '$' | '^'
        )
}

/// Returns true if `c` can appear in a symbol (not at start).
fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == '.' || c == ':'
}

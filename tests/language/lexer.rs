//! Integration tests for the lexer
//!
//! Tests tokenization of Ark source code.

use ark_foundation::Number;
use ark_language::{Keyword, Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// =============================================================================
// Basic Tokens
// =============================================================================

#[test]
fn tokenize_numbers() {
    let tokens = kinds("0 42 -17 0x1F 0b11 123456789012345678901234567890");
    assert_eq!(tokens[0], TokenKind::Number(Number::from(0)));
    assert_eq!(tokens[1], TokenKind::Number(Number::from(42)));
    assert_eq!(tokens[2], TokenKind::Number(Number::from(-17)));
    assert_eq!(tokens[3], TokenKind::Number(Number::from(31)));
    assert_eq!(tokens[4], TokenKind::Number(Number::from(3)));
    assert!(matches!(tokens[5], TokenKind::Number(_)));
}

#[test]
fn tokenize_signs_alone_are_symbols() {
    assert_eq!(kinds("-")[0], TokenKind::Symbol("-".into()));
    assert_eq!(kinds("+x")[0], TokenKind::Symbol("+x".into()));
}

#[test]
fn tokenize_strings() {
    let tokens = kinds(r#""hello" "tab\there" "quote\"d""#);
    assert_eq!(tokens[0], TokenKind::String("hello".into()));
    assert_eq!(tokens[1], TokenKind::String("tab\there".into()));
    assert_eq!(tokens[2], TokenKind::String("quote\"d".into()));
}

#[test]
fn tokenize_keywords_and_symbols() {
    let tokens = kinds("(fun (x) (begin x))");
    assert_eq!(tokens[1], TokenKind::Keyword(Keyword::Fun));
    assert_eq!(tokens[3], TokenKind::Symbol("x".into()));
    assert_eq!(tokens[6], TokenKind::Keyword(Keyword::Begin));
}

#[test]
fn tokenize_booleans_as_symbols() {
    let tokens = kinds("#t #f");
    assert_eq!(tokens[0], TokenKind::Symbol("true".into()));
    assert_eq!(tokens[1], TokenKind::Symbol("false".into()));
}

#[test]
fn tokenize_comments() {
    let tokens = kinds("; leading\n(a) ; trailing");
    assert!(matches!(tokens[0], TokenKind::Comment(_)));
    assert!(matches!(tokens.last(), Some(TokenKind::Eof)));
    assert!(tokens[0].is_trivia());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn tokenize_errors_do_not_stop_the_lexer() {
    let tokens = kinds("[ 1 ]");
    assert!(matches!(tokens[0], TokenKind::Error(_)));
    assert_eq!(tokens[1], TokenKind::Number(Number::from(1)));
    assert!(matches!(tokens[2], TokenKind::Error(_)));
    assert_eq!(tokens[3], TokenKind::Eof);
}

#[test]
fn tokenize_bad_literals() {
    assert!(matches!(&kinds("0x")[0], TokenKind::Error(m) if m.contains("0x")));
    assert!(matches!(&kinds("#true")[0], TokenKind::Error(_)));
    assert!(matches!(&kinds("\"unterminated")[0], TokenKind::Error(_)));
}

// =============================================================================
// Spans
// =============================================================================

#[test]
fn spans_track_lines_and_columns() {
    let tokens = Lexer::tokenize_all("(def x\n   10)");
    let ten = &tokens[3];
    assert_eq!(ten.kind, TokenKind::Number(Number::from(10)));
    assert_eq!((ten.span.line, ten.span.column), (2, 4));
    assert_eq!(ten.span.text("(def x\n   10)"), "10");
}

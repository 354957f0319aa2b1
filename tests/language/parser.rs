//! Integration tests for the parser
//!
//! Tests parsing Ark source into AST.

use ark_foundation::{CompileLimit, ErrorKind, Number};
use ark_language::{Ast, Keyword, Parser, parse, parse_one};

// =============================================================================
// Forms
// =============================================================================

#[test]
fn parse_program_of_forms() {
    let forms = parse("(def x 10)\n(set x 11)\nx").unwrap();
    assert_eq!(forms.len(), 3);
    assert_eq!(forms[0].as_list().unwrap()[0].as_keyword(), Some(Keyword::Def));
    assert_eq!(forms[1].as_list().unwrap()[0].as_keyword(), Some(Keyword::Set));
    assert_eq!(forms[2].as_symbol(), Some("x"));
}

#[test]
fn parse_fun() {
    let ast = parse_one("(fun (a b) (f a b))").unwrap();
    let elems = ast.as_list().unwrap();
    assert_eq!(elems[0].as_keyword(), Some(Keyword::Fun));
    let params: Vec<_> = elems[1]
        .as_list()
        .unwrap()
        .iter()
        .filter_map(Ast::as_symbol)
        .collect();
    assert_eq!(params, vec!["a", "b"]);
}

#[test]
fn parse_literals() {
    let ast = parse_one("(f 0x10 \"s\" #t)").unwrap();
    let elems = ast.as_list().unwrap();
    assert_eq!(elems[1].as_number(), Some(&Number::from(16)));
    assert_eq!(elems[2].as_string(), Some("s"));
    assert_eq!(elems[3].as_symbol(), Some("true"));
}

#[test]
fn parse_matches_hand_built_tree() {
    let parsed = parse_one("(if c 1 \"x\")").unwrap();
    let built = Ast::list(vec![
        Ast::keyword(Keyword::If),
        Ast::symbol("c"),
        Ast::number(1),
        Ast::string("x"),
    ]);
    // Spans differ; compare structure through the accessors
    let (a, b) = (parsed.as_list().unwrap(), built.as_list().unwrap());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_eq!(x.type_name(), y.type_name());
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn parse_errors() {
    for source in ["(", ")", "(a", "(a))", "\"open", "[1]", "(f 12abc)"] {
        let err = parse(source).unwrap_err();
        assert!(err.is_parse_error(), "{source}: {err}");
    }
}

#[test]
fn parse_error_position() {
    let err = parse("(a)\n(b\n  (c 0xz))").unwrap_err();
    match err.kind {
        ErrorKind::ParseError {
            line,
            column,
            context,
            ..
        } => {
            assert_eq!((line, column), (3, 6));
            assert_eq!(context, "  (c 0xz))");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn parse_depth_is_bounded() {
    let source = format!("{}{}", "(".repeat(300), ")".repeat(300));
    let err = parse(&source).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(CompileLimit::MaxDepth { limit: 256 })
    ));
    assert!(Parser::with_max_depth(&source, 300).parse_all().is_ok());
}

//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use ark_foundation::{CompileLimit, Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_malformed() {
    let err = Error::malformed("empty list cannot be evaluated", 3, 7);
    assert!(err.is_malformed());
    assert!(!err.is_parse_error());
    let msg = format!("{err}");
    assert!(msg.contains("3:7"));
    assert!(msg.contains("empty list"));
}

#[test]
fn error_parse() {
    let err = Error::new(ErrorKind::ParseError {
        message: "unterminated list".into(),
        line: 1,
        column: 1,
        context: "(a b".into(),
    });
    assert!(err.is_parse_error());
    assert!(format!("{err}").contains("unterminated list"));
}

#[test]
fn error_unresolved_branch() {
    let err = Error::unresolved_branch(2, 14);
    assert!(matches!(
        err.kind,
        ErrorKind::UnresolvedBranchTarget {
            page: 2,
            instruction: 14
        }
    ));
    let msg = format!("{err}");
    assert!(msg.contains("14") && msg.contains("page 2"));
}

#[test]
fn error_unencodable() {
    let err = Error::unencodable("symbol 3 contains a NUL byte");
    assert!(matches!(err.kind, ErrorKind::Unencodable { .. }));
    assert!(format!("{err}").contains("NUL"));
}

#[test]
fn error_invalid_bytecode() {
    let err = Error::invalid_bytecode(12, "unknown opcode 0x7f");
    let msg = format!("{err}");
    assert!(msg.contains("offset 12"));
    assert!(msg.contains("0x7f"));
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn limit_messages() {
    let cases = [
        (CompileLimit::MaxDepth { limit: 256 }, "256"),
        (
            CompileLimit::PoolFull {
                pool: "symbol",
                limit: 65535,
            },
            "symbol pool",
        ),
        (CompileLimit::TooManyPages { limit: 65536 }, "65536"),
        (
            CompileLimit::TooManyInstructions {
                page: 4,
                limit: 65535,
            },
            "page 4",
        ),
        (
            CompileLimit::TooManyArguments {
                count: 70000,
                limit: 65535,
            },
            "70000",
        ),
        (CompileLimit::BranchTooFar { distance: -40000 }, "-40000"),
    ];
    for (limit, needle) in cases {
        let err = Error::limit_exceeded(limit);
        let msg = format!("{err}");
        assert!(msg.contains("limit exceeded"), "{msg}");
        assert!(msg.contains(needle), "{msg}");
    }
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn error_with_context() {
    let err = Error::malformed("bad", 2, 4).with_context(
        ErrorContext::new()
            .with_source("prog.ark")
            .with_position(2, 4),
    );
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("prog.ark"));
    assert_eq!(context.to_string(), "at prog.ark:2:4");
}

#[test]
fn context_without_source_is_empty() {
    let context = ErrorContext::new().with_position(1, 1);
    assert_eq!(context.to_string(), "");
}

#[test]
fn error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&Error::malformed("x", 1, 1));
}

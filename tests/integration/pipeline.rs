//! Integration tests for the full compile pipeline
//!
//! Source text through the compiler, out as bytes, and back through the
//! reader and disassembler.

use ark::foundation::{Constant, ErrorKind};
use ark::language::{
    Ast, BytecodeReader, Compiler, CompilerConfig, Instruction, Keyword, compile, compile_ast,
    disassemble,
};

const PROGRAM: &str = r#"
; counts down from ten, printing each step
(def n 10)
(def step (fun (k) (begin (print "tick" k) (set n (- k 1)))))
(while (> n 0) (step n))
(if (= n 0) "done" "broken")
"#;

// =============================================================================
// Whole Programs
// =============================================================================

#[test]
fn compile_read_disassemble() {
    let bytes = compile(PROGRAM).unwrap();
    let image = BytecodeReader::read(&bytes).unwrap();

    assert_eq!(image.pages.len(), 2);
    assert!(image.symbols.iter().any(|s| s == "step"));
    assert!(image.constants.contains(&Constant::string("tick")));
    assert!(image.constants.contains(&Constant::number(10)));

    let text = disassemble(&image);
    assert!(text.contains("page 1"), "{text}");
    assert!(text.contains("MAKE_CLOSURE      page 1 (k)"), "{text}");
}

#[test]
fn compile_is_idempotent() {
    let mut compiler = Compiler::new();
    compiler.feed(PROGRAM).unwrap();
    let first = compiler.compile().unwrap();
    let second = compiler.compile().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, compile(PROGRAM).unwrap());
}

#[test]
fn refeeding_replaces_program() {
    let mut compiler = Compiler::new();
    compiler.feed(PROGRAM).unwrap();
    compiler.feed("(def x 10)").unwrap();
    assert_eq!(compiler.compile().unwrap(), compile("(def x 10)").unwrap());

    // A failed feed leaves nothing behind
    compiler.feed("(def x").unwrap_err();
    assert!(compiler.program().is_empty());
    assert_eq!(compiler.compile().unwrap(), compile("").unwrap());
}

#[test]
fn hand_built_ast_matches_source() {
    let forms = vec![Ast::list(vec![
        Ast::keyword(Keyword::Def),
        Ast::symbol("x"),
        Ast::number(10),
    ])];
    assert_eq!(compile_ast(&forms).unwrap(), compile("(def x 10)").unwrap());
}

#[test]
fn number_spelling_does_not_change_image() {
    let a = compile("(f 10 0xa 0b1010 +10)").unwrap();
    let image = BytecodeReader::read(&a).unwrap();
    assert_eq!(image.constants, [Constant::number(10)]);
    assert_eq!(a, compile("(f 10 10 10 10)").unwrap());
}

// =============================================================================
// Closures
// =============================================================================

#[test]
fn closure_body_is_isolated() {
    let image = BytecodeReader::read(&compile("(fun (x) (def y x))").unwrap()).unwrap();
    assert_eq!(
        image.pages[0].instructions(),
        [Instruction::MakeClosure {
            page: 1,
            params: vec![0],
        }]
    );
    // Nothing from the body leaks into the enclosing page
    assert_eq!(image.pages[0].len(), 1);
    assert_eq!(
        image.pages[1].instructions(),
        [
            Instruction::LoadSymbol(0),
            Instruction::Let(1),
            Instruction::Ret,
        ]
    );
}

#[test]
fn sibling_closures_do_not_share_pages() {
    let image =
        BytecodeReader::read(&compile("(f (fun () a) (fun () b))").unwrap()).unwrap();
    assert_eq!(image.pages.len(), 3);
    let targets: Vec<u16> = image.pages[0]
        .instructions()
        .iter()
        .filter_map(|i| match i {
            Instruction::MakeClosure { page, .. } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(targets, [1, 2]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn errors_carry_source_name_and_position() {
    let mut compiler =
        Compiler::with_config(CompilerConfig::default().with_source_name("main.ark"));
    compiler.feed("(def x 1)\n(if x)").unwrap();
    let err = compiler.compile().unwrap_err();
    assert!(err.is_malformed());
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("main.ark"));
    assert_eq!((context.line, context.column), (Some(2), Some(1)));
}

#[test]
fn configured_depth_applies_to_parse() {
    let mut compiler = Compiler::with_config(CompilerConfig::default().with_max_depth(2));
    let err = compiler.feed("(a (b (c)))").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LimitExceeded(_)));
    compiler.feed("(a (b c))").unwrap();
}

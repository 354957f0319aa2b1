//! Integration tests for code generation
//!
//! Tests lowering of special forms, calls, and closures into code pages.

use ark_foundation::{CompileLimit, Constant, ErrorKind};
use ark_language::{CodeGenerator, CompiledProgram, Instruction, generate, parse};

fn lower(source: &str) -> CompiledProgram {
    generate(&parse(source).unwrap()).unwrap()
}

fn main_page(program: &CompiledProgram) -> &[Instruction] {
    program.page(0).unwrap().instructions()
}

// =============================================================================
// Atoms and Bindings
// =============================================================================

#[test]
fn def_binds_with_let() {
    let program = lower("(def x 10)");
    assert_eq!(program.symbols.as_slice(), ["x".to_string()]);
    assert_eq!(program.constants.as_slice(), [Constant::number(10)]);
    assert_eq!(
        main_page(&program),
        [Instruction::LoadConst(0), Instruction::Let(0)]
    );
}

#[test]
fn set_stores() {
    let program = lower("(set y \"v\")");
    assert_eq!(
        main_page(&program),
        [Instruction::LoadConst(0), Instruction::Store(0)]
    );
    assert_eq!(program.constants.as_slice(), [Constant::string("v")]);
}

#[test]
fn value_is_interned_before_name() {
    let program = lower("(def x y)");
    assert_eq!(
        program.symbols.as_slice(),
        ["y".to_string(), "x".to_string()]
    );
}

#[test]
fn pools_deduplicate() {
    let program = lower("(f x x 1 1 0x1)");
    assert_eq!(program.symbols.len(), 2);
    assert_eq!(program.constants.len(), 1);
}

#[test]
fn top_level_forms_are_separated_by_pop() {
    let program = lower("a b c");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadSymbol(0),
            Instruction::Pop,
            Instruction::LoadSymbol(1),
            Instruction::Pop,
            Instruction::LoadSymbol(2),
        ]
    );
}

#[test]
fn empty_program_has_no_pages() {
    let program = lower("; nothing here\n");
    assert!(program.pages.is_empty());
    assert_eq!(program.instruction_count(), 0);
}

// =============================================================================
// Control Flow
// =============================================================================

#[test]
fn if_branches_land_on_else_and_end() {
    let program = lower("(if #t 1 2)");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadSymbol(0),
            Instruction::PopJumpIfFalse(6),
            Instruction::LoadConst(0),
            Instruction::Jump(3),
            Instruction::LoadConst(1),
        ]
    );
}

#[test]
fn while_loops_back_and_yields_nil() {
    let program = lower("(while c b)");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadSymbol(0),
            Instruction::PopJumpIfFalse(7),
            Instruction::LoadSymbol(1),
            Instruction::Pop,
            Instruction::Jump(-13),
            Instruction::PushNil,
        ]
    );
}

#[test]
fn begin_pops_between_expressions() {
    let program = lower("(begin 1 2)");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadConst(0),
            Instruction::Pop,
            Instruction::LoadConst(1),
        ]
    );
}

#[test]
fn nested_if_offsets_span_inner_code() {
    let program = lower("(if a (if b 1 2) 3)");
    let code = main_page(&program);
    // Outer false branch skips the inner if and the outer jump
    assert_eq!(code[1], Instruction::PopJumpIfFalse(15 + 3));
    assert_eq!(code.last(), Some(&Instruction::LoadConst(2)));
}

// =============================================================================
// Calls and Closures
// =============================================================================

#[test]
fn call_evaluates_callee_then_arguments() {
    let program = lower("(f 1 \"s\")");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadSymbol(0),
            Instruction::LoadConst(0),
            Instruction::LoadConst(1),
            Instruction::Call(2),
        ]
    );
}

#[test]
fn call_of_call_result() {
    let program = lower("((f) x)");
    assert_eq!(
        main_page(&program),
        [
            Instruction::LoadSymbol(0),
            Instruction::Call(0),
            Instruction::LoadSymbol(1),
            Instruction::Call(1),
        ]
    );
}

#[test]
fn fun_body_goes_to_its_own_page() {
    let program = lower("(fun (x) (def y x))");
    assert_eq!(program.pages.len(), 2);
    assert_eq!(
        main_page(&program),
        [Instruction::MakeClosure {
            page: 1,
            params: vec![0],
        }]
    );
    assert_eq!(
        program.page(1).unwrap().instructions(),
        [
            Instruction::LoadSymbol(0),
            Instruction::Let(1),
            Instruction::Ret,
        ]
    );
}

#[test]
fn nested_closures_get_distinct_pages() {
    let program = lower("(def f (fun () (fun (a b) a)))\n(fun () 1)");
    assert_eq!(program.pages.len(), 4);
    let inner = program.page(2).unwrap().instructions();
    assert_eq!(inner, [Instruction::LoadSymbol(0), Instruction::Ret]);
    assert!(matches!(
        program.page(1).unwrap().instructions()[0],
        Instruction::MakeClosure { page: 2, .. }
    ));
}

// =============================================================================
// Malformed Input
// =============================================================================

fn malformed(source: &str) -> (u32, u32) {
    let err = generate(&parse(source).unwrap()).unwrap_err();
    match err.kind {
        ErrorKind::MalformedExpression { line, column, .. } => (line, column),
        other => panic!("{source}: expected malformed expression, got {other:?}"),
    }
}

#[test]
fn malformed_forms_are_rejected() {
    for source in [
        "()",
        "(if a b)",
        "(def 1 2)",
        "(set x)",
        "(fun x y)",
        "(fun (1) y)",
        "(fun (x))",
        "(fun (x) a b)",
        "(fun (a b a) b)",
        "(begin)",
        "(while c)",
        "(1 2)",
        "(\"f\")",
        "if",
        "(f while)",
    ] {
        malformed(source);
    }
}

#[test]
fn malformed_reports_position() {
    assert_eq!(malformed("x\n  (def)"), (2, 3));
    assert_eq!(malformed("(f (1 2))"), (1, 5));
}

#[test]
fn codegen_depth_is_bounded() {
    let forms = parse("(f (g (h 1)))").unwrap();
    assert!(CodeGenerator::with_max_depth(3).generate(&forms).is_ok());
    let err = CodeGenerator::with_max_depth(2)
        .generate(&forms)
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(CompileLimit::MaxDepth { limit: 2 })
    ));
}

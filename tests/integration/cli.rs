//! Integration tests for the `arkc` commands
//!
//! Drives the file-level operations the binary exposes.

use std::fs;
use std::path::PathBuf;

use ark::cli::CliError;
use ark::cli::commands::{check_file, compile_file, config_for, default_output, disasm_file};
use ark::language::compile;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ark-it-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn compile_writes_image_next_to_source() {
    let dir = scratch_dir("compile");
    let input = dir.join("prog.ark");
    fs::write(&input, "(def x 10)\n").unwrap();

    let written = compile_file(&input, None, config_for(&input, None)).unwrap();
    assert_eq!(written, default_output(&input));
    assert_eq!(written.extension().unwrap(), "arkc");
    assert_eq!(fs::read(&written).unwrap(), compile("(def x 10)").unwrap());

    let listing = disasm_file(&written).unwrap();
    assert!(listing.contains("LET"), "{listing}");

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn compile_to_explicit_output() {
    let dir = scratch_dir("output");
    let input = dir.join("prog.ark");
    let output = dir.join("out.bin");
    fs::write(&input, "(fun (a) a)").unwrap();

    let written = compile_file(&input, Some(&output), config_for(&input, None)).unwrap();
    assert_eq!(written, output);
    assert!(!default_output(&input).exists());

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn check_counts_without_writing() {
    let dir = scratch_dir("check");
    let input = dir.join("prog.ark");
    fs::write(&input, "(def f (fun (a) a))\n(f 1)").unwrap();

    let program = check_file(&input, config_for(&input, None)).unwrap();
    assert_eq!(program.pages.len(), 2);
    assert_eq!(program.symbols.len(), 2);
    assert!(!default_output(&input).exists());

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn compile_errors_name_the_file() {
    let dir = scratch_dir("error");
    let input = dir.join("bad.ark");
    fs::write(&input, "(def x 1)\n(def x").unwrap();

    let err = check_file(&input, config_for(&input, None)).unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, CliError::Compile(_)));
    assert!(text.contains("bad.ark:2:1"), "{text}");
    assert!(text.contains("\n  (def x\n  ^"), "{text}");

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn depth_flag_is_honored() {
    let dir = scratch_dir("depth");
    let input = dir.join("deep.ark");
    fs::write(&input, "(a (b (c)))").unwrap();

    assert!(check_file(&input, config_for(&input, Some(2))).is_err());
    assert!(check_file(&input, config_for(&input, Some(3))).is_ok());

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_and_garbage_files() {
    let dir = scratch_dir("missing");
    let missing = dir.join("nope.ark");
    assert!(matches!(
        check_file(&missing, config_for(&missing, None)),
        Err(CliError::Io { .. })
    ));

    let garbage = dir.join("garbage.arkc");
    fs::write(&garbage, b"not an image").unwrap();
    assert!(matches!(disasm_file(&garbage), Err(CliError::Compile(_))));

    fs::remove_dir_all(dir).unwrap();
}

//! Ark - Bytecode compiler for a small Lisp dialect
//!
//! This crate re-exports all layers of the Ark toolchain for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: ark_cli        - `arkc` binary: compile, disasm, check, REPL
//! Layer 1: ark_language   - Lexer, parser, code generator, serializer, reader
//! Layer 0: ark_foundation - Core types (Error, Number, Constant, Pool)
//! ```

pub use ark_cli as cli;
pub use ark_foundation as foundation;
pub use ark_language as language;

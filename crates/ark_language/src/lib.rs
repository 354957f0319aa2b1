//! Lexer, parser, code generator, and bytecode image format for Ark.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of Ark source
//! - [`Parser`] - Parsing tokens into AST
//! - [`CodeGenerator`] - Lowering AST into pools and code pages
//! - [`Serializer`] / [`BytecodeReader`] - Writing and reading bytecode images
//! - [`Compiler`] - The source-to-image pipeline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod disasm;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod reader;
pub mod serialize;
pub mod span;
pub mod token;


pub use ast::{Ast, Keyword};
pub use codegen::{CodeGenerator, CompiledProgram, generate};
pub use compiler::{Compiler, CompilerConfig, compile, compile_ast};
pub use disasm::{Listing, disassemble};
pub use lexer::Lexer;
pub use opcode::{CodePage, Instruction, Opcode};
pub use parser::{DEFAULT_MAX_DEPTH, Parser, parse, parse_one};
pub use reader::{BytecodeReader, Image};
pub use serialize::{Serializer, serialize};
pub use span::Span;
pub use token::{Token, TokenKind};

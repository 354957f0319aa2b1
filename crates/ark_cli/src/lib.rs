//! The `arkc` command-line compiler and REPL for Ark.
//!
//! This crate provides:
//! - [`commands`] - The `compile`, `disasm`, and `check` operations on files
//! - [`Repl`] - Interactive loop that compiles input and shows its bytecode
//! - [`CliError`] - Errors surfaced to the user, including I/O

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod repl;

pub use error::{CliError, Result};
pub use repl::Repl;

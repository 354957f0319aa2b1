//! Core types, errors, numbers, and index-stable pools for Ark.
//!
//! This crate provides:
//! - [`Number`] - Arbitrary-precision integers with a canonical radix-16 form
//! - [`Constant`] - Literal values stored in the constant pool
//! - [`Pool`] - Ordered, deduplicated, index-stable collections
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod number;
pub mod pool;
pub mod value;

pub use error::{CompileLimit, Error, ErrorContext, ErrorKind, Result};
pub use number::Number;
pub use pool::Pool;
pub use value::{Constant, ConstantKind};

//! Cross-layer integration tests for Ark
//!
//! Tests that verify correct interaction between multiple crates.

mod cli;
mod pipeline;
mod properties;

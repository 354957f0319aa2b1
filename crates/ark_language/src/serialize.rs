//! Bytecode image serialization.
//!
//! Image layout, all integers big-endian u16:
//!
//! ```text
//! 'a' 'r' 'k' NOP
//! SYM_TABLE_START count (symbol-bytes NOP)*
//! VAL_TABLE_START count (tag payload NOP)*
//! (CODE_SEGMENT_START count instruction*)+
//! ```
//!
//! An image with no pages carries a single code segment with a zero count.

use ark_foundation::{Constant, ConstantKind, Error, Pool, Result};
use tracing::debug;

use crate::codegen::CompiledProgram;
use crate::opcode::{
    CODE_SEGMENT_START, CodePage, MAGIC, NOP, NUMBER_TYPE, STRING_TYPE, SYM_TABLE_START,
    VAL_TABLE_START,
};

/// Writes a [`CompiledProgram`] as a bytecode image.
#[derive(Debug, Default)]
pub struct Serializer {
    out: Vec<u8>,
}

impl Serializer {
    /// Creates a serializer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a program into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// Returns `Unencodable` if a symbol or string constant contains a NUL
    /// byte, or if a table count does not fit in 16 bits.
    pub fn serialize(program: &CompiledProgram) -> Result<Vec<u8>> {
        let mut serializer = Self::new();
        serializer.write_program(program)?;
        debug!(bytes = serializer.out.len(), "serialized image");
        Ok(serializer.finish())
    }

    /// Appends a whole program to the buffer.
    ///
    /// # Errors
    ///
    /// See [`Serializer::serialize`].
    pub fn write_program(&mut self, program: &CompiledProgram) -> Result<()> {
        self.out.extend_from_slice(&MAGIC);
        self.write_symbols(&program.symbols)?;
        self.write_constants(&program.constants)?;
        self.write_code(&program.pages)
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.out
    }

    fn write_symbols(&mut self, symbols: &Pool<String>) -> Result<()> {
        self.out.push(SYM_TABLE_START);
        self.write_count(symbols.len(), "symbol table")?;
        for (idx, symbol) in symbols.iter().enumerate() {
            self.write_entry(symbol.as_bytes(), || format!("symbol {idx} contains a NUL byte"))?;
        }
        Ok(())
    }

    fn write_constants(&mut self, constants: &Pool<Constant>) -> Result<()> {
        self.out.push(VAL_TABLE_START);
        self.write_count(constants.len(), "constant table")?;
        for (idx, constant) in constants.iter().enumerate() {
            self.out.push(match constant.kind() {
                ConstantKind::Number => NUMBER_TYPE,
                ConstantKind::String => STRING_TYPE,
            });
            self.write_entry(&constant.payload(), || {
                format!("constant {idx} contains a NUL byte")
            })?;
        }
        Ok(())
    }

    fn write_code(&mut self, pages: &[CodePage]) -> Result<()> {
        if pages.is_empty() {
            self.out.push(CODE_SEGMENT_START);
            self.out.extend_from_slice(&0u16.to_be_bytes());
            return Ok(());
        }
        for (idx, page) in pages.iter().enumerate() {
            self.out.push(CODE_SEGMENT_START);
            self.write_count(page.len(), &format!("code page {idx}"))?;
            page.encode(&mut self.out)?;
        }
        Ok(())
    }

    fn write_count(&mut self, count: usize, what: &str) -> Result<()> {
        let count = u16::try_from(count)
            .map_err(|_| Error::unencodable(format!("{what} has {count} entries")))?;
        self.out.extend_from_slice(&count.to_be_bytes());
        Ok(())
    }

    fn write_entry(&mut self, bytes: &[u8], describe: impl FnOnce() -> String) -> Result<()> {
        if bytes.contains(&NOP) {
            return Err(Error::unencodable(describe()));
        }
        self.out.extend_from_slice(bytes);
        self.out.push(NOP);
        Ok(())
    }
}

/// Serializes a program with a fresh [`Serializer`].
///
/// # Errors
///
/// See [`Serializer::serialize`].
pub fn serialize(program: &CompiledProgram) -> Result<Vec<u8>> {
    Serializer::serialize(program)
}

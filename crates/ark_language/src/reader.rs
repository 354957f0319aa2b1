//! Bytecode image reader.
//!
//! Decodes and validates an image produced by the serializer. Every index,
//! branch target and closure page is checked, so an [`Image`] that reads
//! back successfully is internally consistent.

use ark_foundation::{Constant, Error, Number, Result};

use crate::opcode::{
    CODE_SEGMENT_START, CodePage, Instruction, MAGIC, NOP, NUMBER_TYPE, Opcode, STRING_TYPE,
    SYM_TABLE_START, VAL_TABLE_START,
};

/// A decoded bytecode image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    /// Symbol table in index order.
    pub symbols: Vec<String>,
    /// Constant table in index order.
    pub constants: Vec<Constant>,
    /// Code pages in index order; empty for an empty program.
    pub pages: Vec<CodePage>,
}

/// A cursor over image bytes.
pub struct BytecodeReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BytecodeReader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Decodes and validates a whole image.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBytecode` with the offending byte offset if the image
    /// is truncated, malformed, or refers to entries that do not exist.
    pub fn read(bytes: &'a [u8]) -> Result<Image> {
        Self::new(bytes).read_image()
    }

    fn read_image(&mut self) -> Result<Image> {
        for expected in MAGIC {
            let at = self.pos;
            if self.byte()? != expected {
                return Err(Error::invalid_bytecode(at, "bad magic header"));
            }
        }

        let symbols = self.read_symbols()?;
        let constants = self.read_constants()?;
        let pages = self.read_pages()?;

        let image = Image {
            symbols,
            constants,
            pages,
        };
        validate(&image)?;
        Ok(image)
    }

    fn read_symbols(&mut self) -> Result<Vec<String>> {
        self.marker(SYM_TABLE_START, "symbol table")?;
        let count = self.u16()?;
        let mut symbols = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let at = self.pos;
            let bytes = self.entry()?;
            let symbol = String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::invalid_bytecode(at, "symbol is not valid UTF-8"))?;
            symbols.push(symbol);
        }
        Ok(symbols)
    }

    fn read_constants(&mut self) -> Result<Vec<Constant>> {
        self.marker(VAL_TABLE_START, "constant table")?;
        let count = self.u16()?;
        let mut constants = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let at = self.pos;
            let constant = match self.byte()? {
                NUMBER_TYPE => {
                    let payload = self.entry()?;
                    let number = std::str::from_utf8(payload)
                        .ok()
                        .and_then(Number::from_canonical)
                        .ok_or_else(|| {
                            Error::invalid_bytecode(at + 1, "number is not in canonical form")
                        })?;
                    Constant::Number(number)
                }
                STRING_TYPE => Constant::String(self.entry()?.to_vec()),
                tag => {
                    return Err(Error::invalid_bytecode(
                        at,
                        format!("unknown constant type tag {tag:#04x}"),
                    ));
                }
            };
            constants.push(constant);
        }
        Ok(constants)
    }

    fn read_pages(&mut self) -> Result<Vec<CodePage>> {
        let mut pages = Vec::new();
        loop {
            self.marker(CODE_SEGMENT_START, "code segment")?;
            let count = self.u16()?;
            let mut page = CodePage::new();
            for _ in 0..count {
                page.emit(self.instruction()?);
            }
            pages.push(page);
            if self.pos == self.bytes.len() {
                break;
            }
        }

        if pages.len() == 1 && pages[0].is_empty() {
            pages.clear();
        }
        Ok(pages)
    }

    fn instruction(&mut self) -> Result<Instruction> {
        let at = self.pos;
        let byte = self.byte()?;
        let Some(opcode) = Opcode::from_byte(byte) else {
            return Err(Error::invalid_bytecode(
                at,
                format!("unknown opcode {byte:#04x}"),
            ));
        };

        Ok(match opcode {
            Opcode::LoadSymbol => Instruction::LoadSymbol(self.u16()?),
            Opcode::LoadConst => Instruction::LoadConst(self.u16()?),
            Opcode::PopJumpIfFalse => Instruction::PopJumpIfFalse(self.i16()?),
            Opcode::Jump => Instruction::Jump(self.i16()?),
            Opcode::Store => Instruction::Store(self.u16()?),
            Opcode::Let => Instruction::Let(self.u16()?),
            Opcode::MakeClosure => {
                let page = self.u16()?;
                let count = self.u16()?;
                let params = (0..count)
                    .map(|_| self.u16())
                    .collect::<Result<Vec<_>>>()?;
                Instruction::MakeClosure { page, params }
            }
            Opcode::Call => Instruction::Call(self.u16()?),
            Opcode::Pop => Instruction::Pop,
            Opcode::PushNil => Instruction::PushNil,
            Opcode::Ret => Instruction::Ret,
        })
    }

    // === Primitives ===

    fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| Error::invalid_bytecode(self.pos, "unexpected end of image"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn u16(&mut self) -> Result<u16> {
        let hi = self.byte()?;
        let lo = self.byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn i16(&mut self) -> Result<i16> {
        let hi = self.byte()?;
        let lo = self.byte()?;
        Ok(i16::from_be_bytes([hi, lo]))
    }

    fn marker(&mut self, expected: u8, what: &str) -> Result<()> {
        let at = self.pos;
        let byte = self.byte()?;
        if byte == expected {
            Ok(())
        } else {
            Err(Error::invalid_bytecode(
                at,
                format!("expected {what} marker {expected:#04x}, found {byte:#04x}"),
            ))
        }
    }

    /// Reads bytes up to the next NOP and consumes the terminator.
    fn entry(&mut self) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        let rest = &bytes[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == NOP)
            .ok_or_else(|| Error::invalid_bytecode(self.bytes.len(), "unterminated table entry"))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }
}

/// Checks cross-references once every table and page is known.
fn validate(image: &Image) -> Result<()> {
    let symbol = |idx: u16| usize::from(idx) < image.symbols.len();
    let constant = |idx: u16| usize::from(idx) < image.constants.len();

    for (page_idx, page) in image.pages.iter().enumerate() {
        for (idx, instruction) in page.instructions().iter().enumerate() {
            let offset = page.byte_offset(idx).unwrap_or_default();
            let problem = match instruction {
                Instruction::LoadSymbol(i) | Instruction::Store(i) | Instruction::Let(i)
                    if !symbol(*i) =>
                {
                    Some(format!("symbol index {i} out of range"))
                }
                Instruction::LoadConst(i) if !constant(*i) => {
                    Some(format!("constant index {i} out of range"))
                }
                Instruction::MakeClosure { page: target, params } => {
                    if usize::from(*target) >= image.pages.len() || usize::from(*target) == 0 {
                        Some(format!("closure page {target} does not exist"))
                    } else {
                        params
                            .iter()
                            .find(|&&p| !symbol(p))
                            .map(|p| format!("parameter symbol {p} out of range"))
                    }
                }
                Instruction::PopJumpIfFalse(rel) | Instruction::Jump(rel) => {
                    let end = offset + instruction.encoded_len();
                    let target = end.checked_add_signed(isize::from(*rel));
                    let lands = target.is_some_and(|t| page.is_boundary(t));
                    (!lands).then(|| format!("branch offset {rel} misses an instruction boundary"))
                }
                _ => None,
            };
            if let Some(message) = problem {
                return Err(Error::invalid_bytecode(
                    offset,
                    format!("page {page_idx}: {message}"),
                ));
            }
        }
    }
    Ok(())
}

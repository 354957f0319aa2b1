//! Bytecode instruction set and code pages for the Ark VM.
//!
//! The VM is stack-based. Every expression leaves exactly one value on the
//! stack. Instructions are encoded as one opcode byte followed by zero or more
//! big-endian 16-bit operands.

#![allow(clippy::doc_markdown)]

use ark_foundation::{CompileLimit, Error, Result};

// === Image markers ===

/// Padding byte, header sentinel, and table entry terminator.
pub const NOP: u8 = 0x00;
/// Starts the symbol table.
pub const SYM_TABLE_START: u8 = 0x01;
/// Starts the constant (value) table.
pub const VAL_TABLE_START: u8 = 0x02;
/// Type tag for number constants.
pub const NUMBER_TYPE: u8 = 0x03;
/// Type tag for string constants.
pub const STRING_TYPE: u8 = 0x04;
/// Starts a code segment (one per page).
pub const CODE_SEGMENT_START: u8 = 0x05;

/// Magic bytes at the start of every image.
pub const MAGIC: [u8; 4] = [b'a', b'r', b'k', NOP];

/// Instruction opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Push the value bound to a symbol: `LOAD_SYMBOL sym`
    LoadSymbol = 0x10,
    /// Push a constant: `LOAD_CONST const`
    LoadConst = 0x11,
    /// Pop; branch by offset if the value is false: `POP_JUMP_IF_FALSE off`
    PopJumpIfFalse = 0x12,
    /// Branch by offset: `JUMP off`
    Jump = 0x13,
    /// Assign to an existing binding, keeping the value: `STORE sym`
    Store = 0x14,
    /// Bind a new name in the current scope, keeping the value: `LET sym`
    Let = 0x15,
    /// Push a closure over a page: `MAKE_CLOSURE page n sym*n`
    MakeClosure = 0x16,
    /// Call: `[f, a1..an] -> [result]`, `CALL n`
    Call = 0x17,
    /// Pop and discard the top of stack.
    Pop = 0x18,
    /// Push nil.
    PushNil = 0x19,
    /// Return from a closure page with the top of stack.
    Ret = 0x1A,
}

impl Opcode {
    /// Decodes an opcode byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x10 => Self::LoadSymbol,
            0x11 => Self::LoadConst,
            0x12 => Self::PopJumpIfFalse,
            0x13 => Self::Jump,
            0x14 => Self::Store,
            0x15 => Self::Let,
            0x16 => Self::MakeClosure,
            0x17 => Self::Call,
            0x18 => Self::Pop,
            0x19 => Self::PushNil,
            0x1A => Self::Ret,
            _ => return None,
        })
    }

    /// Returns the assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::LoadSymbol => "LOAD_SYMBOL",
            Self::LoadConst => "LOAD_CONST",
            Self::PopJumpIfFalse => "POP_JUMP_IF_FALSE",
            Self::Jump => "JUMP",
            Self::Store => "STORE",
            Self::Let => "LET",
            Self::MakeClosure => "MAKE_CLOSURE",
            Self::Call => "CALL",
            Self::Pop => "POP",
            Self::PushNil => "PUSH_NIL",
            Self::Ret => "RET",
        }
    }
}

/// A single decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Load a symbol's value by symbol pool index.
    LoadSymbol(u16),
    /// Load a constant by constant pool index.
    LoadConst(u16),
    /// Pop the condition; branch when false (byte offset from instruction end).
    PopJumpIfFalse(i16),
    /// Unconditional branch (byte offset from instruction end).
    Jump(i16),
    /// Store into an existing binding.
    Store(u16),
    /// Bind a new name in the current scope.
    Let(u16),
    /// Create a closure whose body lives in `page`, with parameter symbols.
    MakeClosure {
        /// Page index of the closure body (the page-jump operand).
        page: u16,
        /// Symbol pool indices of the parameters, in order.
        params: Vec<u16>,
    },
    /// Call with argument count.
    Call(u16),
    /// Discard the top of stack.
    Pop,
    /// Push nil.
    PushNil,
    /// Return from a closure page.
    Ret,
}

impl Instruction {
    /// Returns the opcode of this instruction.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::LoadSymbol(_) => Opcode::LoadSymbol,
            Self::LoadConst(_) => Opcode::LoadConst,
            Self::PopJumpIfFalse(_) => Opcode::PopJumpIfFalse,
            Self::Jump(_) => Opcode::Jump,
            Self::Store(_) => Opcode::Store,
            Self::Let(_) => Opcode::Let,
            Self::MakeClosure { .. } => Opcode::MakeClosure,
            Self::Call(_) => Opcode::Call,
            Self::Pop => Opcode::Pop,
            Self::PushNil => Opcode::PushNil,
            Self::Ret => Opcode::Ret,
        }
    }

    /// Returns the encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::LoadSymbol(_)
            | Self::LoadConst(_)
            | Self::PopJumpIfFalse(_)
            | Self::Jump(_)
            | Self::Store(_)
            | Self::Let(_)
            | Self::Call(_) => 3,
            Self::MakeClosure { params, .. } => 5 + 2 * params.len(),
            Self::Pop | Self::PushNil | Self::Ret => 1,
        }
    }

    /// Returns true for branch instructions.
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::PopJumpIfFalse(_) | Self::Jump(_))
    }

    /// Returns the branch offset, or None if not a branch.
    #[must_use]
    pub const fn branch_offset(&self) -> Option<i16> {
        match self {
            Self::PopJumpIfFalse(o) | Self::Jump(o) => Some(*o),
            _ => None,
        }
    }

    /// Appends the encoded bytes of this instruction.
    ///
    /// # Errors
    ///
    /// Returns `Unencodable` if a `MAKE_CLOSURE` has more parameters than its
    /// 16-bit count can hold.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.opcode() as u8);
        match self {
            Self::LoadSymbol(n)
            | Self::LoadConst(n)
            | Self::Store(n)
            | Self::Let(n)
            | Self::Call(n) => out.extend_from_slice(&n.to_be_bytes()),
            Self::PopJumpIfFalse(o) | Self::Jump(o) => out.extend_from_slice(&o.to_be_bytes()),
            Self::MakeClosure { page, params } => {
                let count = u16::try_from(params.len()).map_err(|_| {
                    Error::unencodable(format!(
                        "closure for page {page} has {} parameters",
                        params.len()
                    ))
                })?;
                out.extend_from_slice(&page.to_be_bytes());
                out.extend_from_slice(&count.to_be_bytes());
                for param in params {
                    out.extend_from_slice(&param.to_be_bytes());
                }
            }
            Self::Pop | Self::PushNil | Self::Ret => {}
        }
        Ok(())
    }
}

/// An append-only sequence of instructions with byte-offset bookkeeping.
///
/// Page 0 is the top-level program; every closure body gets its own page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodePage {
    /// The instructions.
    instructions: Vec<Instruction>,
    /// Byte offset of each instruction within the page.
    offsets: Vec<usize>,
    /// Total encoded length of the page.
    byte_len: usize,
}

impl CodePage {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let idx = self.instructions.len();
        self.offsets.push(self.byte_len);
        self.byte_len += instruction.encoded_len();
        self.instructions.push(instruction);
        idx
    }

    /// Returns the instruction count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the encoded length in bytes; also the offset of the next instruction.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Returns the byte offset of an instruction.
    #[must_use]
    pub fn byte_offset(&self, idx: usize) -> Option<usize> {
        self.offsets.get(idx).copied()
    }

    /// Returns the instructions.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the last instruction, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// Backfills the branch at `idx` so it lands on byte offset `target`.
    ///
    /// The stored offset is relative to the end of the branch instruction.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedBranchTarget` if `idx` is not a branch in this page,
    /// or `LimitExceeded(BranchTooFar)` if the distance does not fit in `i16`.
    pub fn patch_branch(&mut self, page: u16, idx: usize, target: usize) -> Result<()> {
        let (Some(start), Some(instruction)) =
            (self.offsets.get(idx).copied(), self.instructions.get_mut(idx))
        else {
            return Err(Error::unresolved_branch(page, idx));
        };
        if !instruction.is_branch() || target > self.byte_len {
            return Err(Error::unresolved_branch(page, idx));
        }

        let end = start + instruction.encoded_len();
        #[allow(clippy::cast_possible_wrap)]
        let distance = target as isize - end as isize;
        let offset = i16::try_from(distance)
            .map_err(|_| Error::limit_exceeded(CompileLimit::BranchTooFar { distance }))?;

        match instruction {
            Instruction::PopJumpIfFalse(o) | Instruction::Jump(o) => *o = offset,
            _ => return Err(Error::unresolved_branch(page, idx)),
        }
        Ok(())
    }

    /// Returns true if `offset` is the start of an instruction or the end
    /// of the page.
    #[must_use]
    pub fn is_boundary(&self, offset: usize) -> bool {
        offset == self.byte_len || self.offsets.binary_search(&offset).is_ok()
    }

    /// Encodes every instruction in order.
    ///
    /// # Errors
    ///
    /// See [`Instruction::encode`].
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        for instruction in &self.instructions {
            instruction.encode(out)?;
        }
        Ok(())
    }
}

impl From<Vec<Instruction>> for CodePage {
    fn from(instructions: Vec<Instruction>) -> Self {
        let mut page = Self::new();
        for instruction in instructions {
            page.emit(instruction);
        }
        page
    }
}

//! Human-readable listings of bytecode images.
//!
//! # Example
//!
//! ```
//! use ark_language::{compile, disassemble, BytecodeReader};
//!
//! let bytes = compile("(def x 10)").unwrap();
//! let image = BytecodeReader::read(&bytes).unwrap();
//! let listing = disassemble(&image);
//! assert!(listing.contains("LET"));
//! ```

use std::fmt;

use crate::opcode::Instruction;
use crate::reader::Image;

/// Width of the mnemonic column.
const MNEMONIC_WIDTH: usize = 18;

/// Renders an image as text: tables first, then each page.
///
/// Operand indices are followed by the entry they name, and branch offsets
/// by their absolute target within the page.
#[must_use]
pub fn disassemble(image: &Image) -> String {
    Listing(image).to_string()
}

/// Display adapter that writes the listing of an image.
pub struct Listing<'a>(pub &'a Image);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let image = self.0;

        writeln!(f, "symbols ({}):", image.symbols.len())?;
        for (idx, symbol) in image.symbols.iter().enumerate() {
            writeln!(f, "  {idx:>4}  {symbol}")?;
        }

        writeln!(f, "constants ({}):", image.constants.len())?;
        for (idx, constant) in image.constants.iter().enumerate() {
            let kind = if constant.as_number().is_some() {
                "number"
            } else {
                "string"
            };
            writeln!(f, "  {idx:>4}  {kind:<6}  {constant}")?;
        }

        if image.pages.is_empty() {
            writeln!(f, "no code")?;
        }
        for (page_idx, page) in image.pages.iter().enumerate() {
            writeln!(f, "page {page_idx} ({} instructions):", page.len())?;
            for (idx, instruction) in page.instructions().iter().enumerate() {
                let offset = page.byte_offset(idx).unwrap_or_default();
                let mnemonic = instruction.opcode().mnemonic();
                let operand = operand(image, instruction, offset);
                let line = format!("  {offset:04}  {mnemonic:<MNEMONIC_WIDTH$}{operand}");
                writeln!(f, "{}", line.trim_end())?;
            }
        }
        Ok(())
    }
}

fn operand(image: &Image, instruction: &Instruction, offset: usize) -> String {
    let symbol = |idx: u16| {
        image
            .symbols
            .get(usize::from(idx))
            .map_or("?", String::as_str)
    };

    match instruction {
        Instruction::LoadSymbol(i) | Instruction::Store(i) | Instruction::Let(i) => {
            format!("{i} ({})", symbol(*i))
        }
        Instruction::LoadConst(i) => match image.constants.get(usize::from(*i)) {
            Some(constant) => format!("{i} ({constant})"),
            None => format!("{i} (?)"),
        },
        Instruction::PopJumpIfFalse(rel) | Instruction::Jump(rel) => {
            let end = offset + instruction.encoded_len();
            match end.checked_add_signed(isize::from(*rel)) {
                Some(target) => format!("{rel:+} (-> {target:04})"),
                None => format!("{rel:+} (-> ?)"),
            }
        }
        Instruction::MakeClosure { page, params } => {
            let names: Vec<&str> = params.iter().map(|p| symbol(*p)).collect();
            format!("page {page} ({})", names.join(" "))
        }
        Instruction::Call(argc) => argc.to_string(),
        Instruction::Pop | Instruction::PushNil | Instruction::Ret => String::new(),
    }
}

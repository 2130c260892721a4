//! Chassis assembler: bidirectional text ↔ bytecode translation.
//!
//! The assembler is a mechanical 1:1 translation: one line, one instruction.
//! There are no labels or macros; jump targets are absolute byte offsets.
//!
//! # Usage
//!
//! ```
//! use chassis_assembler::{assemble, disassemble};
//!
//! let text = "MOVI r0, 0x0000002a\nHLT\n";
//! let code = assemble(text).unwrap();
//! assert_eq!(code, [0x02, 0x00, 0x2a, 0x00, 0x00, 0x00, 0x00]);
//! assert_eq!(disassemble(&code), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(code)) == code` holds for every byte blob. The
//! disassembler outputs canonical text; the assembler also accepts
//! non-canonical input (decimal numbers, lowercase, aliases, no commas).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use parser::parse_line;

/// Assemble text into bytecode.
///
/// Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Vec<u8>, AsmError> {
    let mut code = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        if let Some(bytes) = parse_line(&tokens, line_num)? {
            code.extend_from_slice(&bytes);
        }
    }

    Ok(code)
}

/// Disassemble bytecode into canonical assembly text.
pub fn disassemble(code: &[u8]) -> String {
    disassembler::disassemble(code)
}

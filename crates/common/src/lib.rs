//! Chassis common types and instruction encoding.
//!
//! This crate provides the foundational pieces of the Chassis instruction
//! set:
//!
//! - [`Opcode`]: all 90 opcodes, their mnemonics, aliases and shapes
//! - [`Instruction`]: structured operands with bounds-checked decode
//! - [`CodeSection`]: an embedder-bound bytecode blob plus declared size
//! - [`Fault`]: the closed set of fatal conditions and their descriptions
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod code;
pub mod error;
pub mod instruction;
pub mod opcode;

// Re-export commonly used types at the crate root.
pub use code::CodeSection;
pub use error::{strerr, Fault};
pub use instruction::{Instruction, Operands, PASSTHRU_END};
pub use opcode::{Opcode, Shape};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy that generates a random valid Opcode.
    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    proptest! {
        /// Decoding arbitrary bytes at any offset never panics, and whatever
        /// decodes re-encodes to the bytes it was read from (for
        /// pass-through, everything but the end marker).
        #[test]
        fn random_bytes_decode(
            bytes in prop::collection::vec(any::<u8>(), 0..32),
            pc in 0usize..40,
        ) {
            match Instruction::decode(&bytes, pc) {
                Ok(instr) => {
                    let encoded = instr.encode();
                    let width = instr.width();
                    let covered = match instr.operands {
                        Operands::Native(_) => width - 1,
                        _ => width,
                    };
                    prop_assert_eq!(&encoded[..covered], &bytes[pc..pc + covered]);
                }
                Err(e) => {
                    prop_assert!(matches!(e, Fault::OpcodeInvalid | Fault::CodeOutOfBounds));
                }
            }
        }

        /// Any opcode followed by enough zero bytes decodes with the
        /// opcode's fixed width.
        #[test]
        fn padded_opcode_decodes_to_fixed_width(op in arb_opcode()) {
            let mut bytes = vec![op as u8];
            bytes.extend_from_slice(&[0u8; 8]);
            let instr = Instruction::decode(&bytes, 0).unwrap();
            prop_assert_eq!(instr.opcode, op);
            prop_assert_eq!(instr.width(), op.width());
        }
    }
}

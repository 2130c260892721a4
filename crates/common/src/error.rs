//! Fatal conditions of the Chassis virtual CPU.
//!
//! The set is closed: every way a program can die maps onto exactly one of
//! these six codes, and the numeric code doubles as the process exit status.

use thiserror::Error;

/// A fatal, unrecoverable condition raised while executing bytecode.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// Opcode is part of the instruction set but has no handler.
    #[error("Unimplemented opcode")]
    OpcodeUnimplemented = 1,

    /// Byte does not name any opcode.
    #[error("Invalid opcode")]
    OpcodeInvalid = 2,

    /// Program counter or an operand read ran past the code section.
    #[error("Code section exceeded bounds")]
    CodeOutOfBounds = 3,

    /// Load, store or cipher access outside the data section.
    #[error("Data section exceeded bounds")]
    DataOutOfBounds = 4,

    /// Pop with a logical stack height of zero.
    #[error("Stack underflow")]
    StackUnderflow = 5,

    /// Logical stack height greater than the stack storage.
    #[error("Stack overflow")]
    StackOverflow = 6,
}

/// All faults in code order.
pub const ALL_FAULTS: [Fault; 6] = [
    Fault::OpcodeUnimplemented,
    Fault::OpcodeInvalid,
    Fault::CodeOutOfBounds,
    Fault::DataOutOfBounds,
    Fault::StackUnderflow,
    Fault::StackOverflow,
];

impl Fault {
    /// Numeric code, also used as the exit status.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Fault::OpcodeUnimplemented => "Unimplemented opcode",
            Fault::OpcodeInvalid => "Invalid opcode",
            Fault::CodeOutOfBounds => "Code section exceeded bounds",
            Fault::DataOutOfBounds => "Data section exceeded bounds",
            Fault::StackUnderflow => "Stack underflow",
            Fault::StackOverflow => "Stack overflow",
        }
    }

    /// Look a fault up by its numeric code.
    pub fn from_code(code: u32) -> Option<Fault> {
        ALL_FAULTS.iter().copied().find(|f| f.code() == code)
    }
}

/// Description for a numeric fault code, `None` for codes outside the set.
pub fn strerr(code: u32) -> Option<&'static str> {
    Fault::from_code(code).map(Fault::description)
}

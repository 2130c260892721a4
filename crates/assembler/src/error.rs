//! Error types for the Chassis assembler.

use thiserror::Error;

/// Errors produced during assembly of text to bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized mnemonic was encountered.
    #[error("line {line}: unknown mnemonic '{token}'")]
    UnknownMnemonic { line: usize, token: String },

    /// A mnemonic did not have enough operands.
    #[error("line {line}: {mnemonic} expects {expected} operand(s)")]
    MissingOperand {
        line: usize,
        mnemonic: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A register operand was required.
    #[error("line {line}: expected a register, found '{token}'")]
    ExpectedRegister { line: usize, token: String },

    /// A number does not fit its operand field.
    #[error("line {line}: value {value:#x} out of range (max {max:#x})")]
    ValueOutOfRange { line: usize, value: u64, max: u64 },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_mnemonic() {
        let e = AsmError::UnknownMnemonic {
            line: 3,
            token: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown mnemonic 'FOO'");
    }

    #[test]
    fn error_display_missing_operand() {
        let e = AsmError::MissingOperand {
            line: 7,
            mnemonic: "MOVI",
            expected: 2,
        };
        assert_eq!(e.to_string(), "line 7: MOVI expects 2 operand(s)");
    }

    #[test]
    fn error_display_expected_register() {
        let e = AsmError::ExpectedRegister {
            line: 2,
            token: "0x10".to_string(),
        };
        assert_eq!(e.to_string(), "line 2: expected a register, found '0x10'");
    }

    #[test]
    fn error_display_out_of_range() {
        let e = AsmError::ValueOutOfRange {
            line: 4,
            value: 0x100,
            max: 0xff,
        };
        assert_eq!(e.to_string(), "line 4: value 0x100 out of range (max 0xff)");
    }

    #[test]
    fn error_clone_and_eq() {
        let e1 = AsmError::UnexpectedToken {
            line: 1,
            token: "X".to_string(),
        };
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }
}

//! Parser for Chassis assembly tokens → bytecode.
//!
//! Dispatches on the opcode's operand shape. Two pseudo-instructions sit
//! beside the opcodes: `DB` emits raw bytes, and `PASSTHRU` takes its native
//! block as a byte list.

use crate::error::AsmError;
use crate::lexer::Token;
use chassis_common::{Instruction, Opcode, Operands, Shape};

/// Mnemonic of the raw-bytes pseudo-instruction.
pub(crate) const DB: &str = "DB";

/// Operand cursor over the tokens following a mnemonic.
struct Args<'t> {
    tokens: &'t [Token],
    pos: usize,
    line: usize,
    mnemonic: &'static str,
    expected: usize,
}

impl<'t> Args<'t> {
    fn new(tokens: &'t [Token], line: usize, mnemonic: &'static str, expected: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
            mnemonic,
            expected,
        }
    }

    fn next(&mut self) -> Result<&'t Token, AsmError> {
        let token = self.tokens.get(self.pos).ok_or(AsmError::MissingOperand {
            line: self.line,
            mnemonic: self.mnemonic,
            expected: self.expected,
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn in_range(&self, value: u64, max: u64) -> Result<u64, AsmError> {
        if value > max {
            return Err(AsmError::ValueOutOfRange {
                line: self.line,
                value,
                max,
            });
        }
        Ok(value)
    }

    fn reg(&mut self) -> Result<u8, AsmError> {
        match self.next()? {
            Token::Register(n) => Ok(self.in_range(*n, u8::MAX as u64)? as u8),
            other => Err(AsmError::ExpectedRegister {
                line: self.line,
                token: other.to_string(),
            }),
        }
    }

    fn number(&mut self, max: u64) -> Result<u64, AsmError> {
        match self.next()? {
            Token::Number(n) => self.in_range(*n, max),
            other => Err(AsmError::InvalidNumber {
                line: self.line,
                token: other.to_string(),
            }),
        }
    }

    fn byte(&mut self) -> Result<u8, AsmError> {
        Ok(self.number(u8::MAX as u64)? as u8)
    }

    fn word(&mut self) -> Result<u16, AsmError> {
        Ok(self.number(u16::MAX as u64)? as u16)
    }

    fn dword(&mut self) -> Result<u32, AsmError> {
        Ok(self.number(u32::MAX as u64)? as u32)
    }

    /// Every remaining token as a byte.
    fn bytes(&mut self) -> Result<Vec<u8>, AsmError> {
        let mut out = Vec::with_capacity(self.tokens.len() - self.pos);
        while self.pos < self.tokens.len() {
            out.push(self.byte()?);
        }
        Ok(out)
    }

    fn finish(&self) -> Result<(), AsmError> {
        match self.tokens.get(self.pos) {
            Some(extra) => Err(AsmError::UnexpectedToken {
                line: self.line,
                token: extra.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Number of operands written for a shape. Pass-through blocks are variable.
fn operand_count(shape: Shape) -> usize {
    match shape {
        Shape::None | Shape::Native => 0,
        Shape::Reg | Shape::Imm32 | Shape::Addr => 1,
        Shape::Cipher => 4,
        _ => 2,
    }
}

/// Parse one line's tokens into encoded bytes.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Vec<u8>>, AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let mnemonic = match first {
        Token::Ident(s) => s.as_str(),
        other => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: other.to_string(),
            })
        }
    };

    if mnemonic == DB {
        let mut args = Args::new(&tokens[1..], line_num, DB, 1);
        let bytes = args.bytes()?;
        if bytes.is_empty() {
            return Err(AsmError::MissingOperand {
                line: line_num,
                mnemonic: DB,
                expected: 1,
            });
        }
        return Ok(Some(bytes));
    }

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownMnemonic {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let shape = opcode.shape();
    let mut args = Args::new(&tokens[1..], line_num, opcode.mnemonic(), operand_count(shape));

    let operands = match shape {
        Shape::None => Operands::None,
        Shape::Reg => Operands::Reg(args.reg()?),
        Shape::RegReg => Operands::RegReg(args.reg()?, args.reg()?),
        Shape::RegImm32 => Operands::RegImm(args.reg()?, args.dword()?),
        Shape::Imm32 => Operands::Imm(args.dword()?),
        Shape::RegAddr => Operands::RegAddr(args.reg()?, args.byte()?),
        Shape::AddrReg => Operands::AddrReg(args.byte()?, args.reg()?),
        Shape::AddrImm8 => Operands::AddrImm8(args.byte()?, args.byte()?),
        Shape::AddrImm16 => Operands::AddrImm16(args.byte()?, args.word()?),
        Shape::AddrImm32 => Operands::AddrImm32(args.byte()?, args.dword()?),
        Shape::Key => Operands::Key {
            addr: args.byte()?,
            len: args.dword()?,
        },
        Shape::Cipher => Operands::Cipher {
            input: args.byte()?,
            output: args.byte()?,
            len: args.dword()?,
            keystream: args.byte()?,
        },
        Shape::Addr => Operands::Addr(args.byte()?),
        Shape::Native => Operands::Native(args.bytes()?),
    };
    args.finish()?;

    Ok(Some(Instruction::new(opcode, operands).encode()))
}

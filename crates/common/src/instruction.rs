//! Operand decoding and encoding for the Chassis instruction set.
//!
//! Instructions are variable width. The opcode byte comes first; operands
//! follow at fixed offsets determined by the opcode's [`Shape`]:
//! ```text
//! RegImm32:  [op] [reg] [imm32 le ...........]
//! AddrImm16: [op] [addr] [imm16 le ..]
//! Cipher:    [op] [in] [out] [len32 le .......] [keystream]
//! Native:    [op] [len32 le .......] [block: len bytes] [end marker]
//! ```
//! Decoding reads every operand through a bounds-checked slice access, so a
//! truncated instruction is reported as [`Fault::CodeOutOfBounds`] instead of
//! reading past the buffer.

use crate::error::Fault;
use crate::opcode::{Opcode, Shape};

/// Conventional byte closing a native pass-through block (x86 `ret`).
pub const PASSTHRU_END: u8 = 0xC3;

/// Structured operands of a decoded instruction.
///
/// Register operands are the raw index bytes from the code stream; they
/// are not range checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    None,
    Reg(u8),
    RegReg(u8, u8),
    RegImm(u8, u32),
    Imm(u32),
    /// Destination register and an 8-bit data address.
    RegAddr(u8, u8),
    /// 8-bit data address and a source register.
    AddrReg(u8, u8),
    AddrImm8(u8, u8),
    AddrImm16(u8, u16),
    AddrImm32(u8, u32),
    Key {
        addr: u8,
        len: u32,
    },
    Cipher {
        input: u8,
        output: u8,
        len: u32,
        keystream: u8,
    },
    Addr(u8),
    /// The native block carried by a pass-through instruction.
    Native(Vec<u8>),
}

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operands in the layout given by `opcode.shape()`.
    pub operands: Operands,
}

fn byte_at(code: &[u8], at: usize) -> Result<u8, Fault> {
    code.get(at).copied().ok_or(Fault::CodeOutOfBounds)
}

fn array_at<const N: usize>(code: &[u8], at: usize) -> Result<[u8; N], Fault> {
    let end = at.checked_add(N).ok_or(Fault::CodeOutOfBounds)?;
    code.get(at..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Fault::CodeOutOfBounds)
}

fn u16_at(code: &[u8], at: usize) -> Result<u16, Fault> {
    array_at::<2>(code, at).map(u16::from_le_bytes)
}

fn u32_at(code: &[u8], at: usize) -> Result<u32, Fault> {
    array_at::<4>(code, at).map(u32::from_le_bytes)
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operands: Operands) -> Self {
        Self { opcode, operands }
    }

    /// Decode the instruction starting at `pc`.
    ///
    /// # Errors
    ///
    /// [`Fault::OpcodeInvalid`] if the byte at `pc` is not an opcode,
    /// [`Fault::CodeOutOfBounds`] if `pc` or any operand lies past the end of
    /// `code`.
    pub fn decode(code: &[u8], pc: usize) -> Result<Self, Fault> {
        let opcode = Opcode::try_from(byte_at(code, pc)?)?;
        let operands = Self::decode_operands(opcode.shape(), code, pc)?;
        Ok(Self { opcode, operands })
    }

    /// Decode the operands of an instruction of the given shape at `pc`.
    pub fn decode_operands(shape: Shape, code: &[u8], pc: usize) -> Result<Operands, Fault> {
        let at = |offset: usize| pc.checked_add(offset).ok_or(Fault::CodeOutOfBounds);

        let operands = match shape {
            Shape::None => Operands::None,
            Shape::Reg => Operands::Reg(byte_at(code, at(1)?)?),
            Shape::RegReg => Operands::RegReg(byte_at(code, at(1)?)?, byte_at(code, at(2)?)?),
            Shape::RegImm32 => Operands::RegImm(byte_at(code, at(1)?)?, u32_at(code, at(2)?)?),
            Shape::Imm32 => Operands::Imm(u32_at(code, at(1)?)?),
            Shape::RegAddr => Operands::RegAddr(byte_at(code, at(1)?)?, byte_at(code, at(2)?)?),
            Shape::AddrReg => Operands::AddrReg(byte_at(code, at(1)?)?, byte_at(code, at(2)?)?),
            Shape::AddrImm8 => Operands::AddrImm8(byte_at(code, at(1)?)?, byte_at(code, at(2)?)?),
            Shape::AddrImm16 => Operands::AddrImm16(byte_at(code, at(1)?)?, u16_at(code, at(2)?)?),
            Shape::AddrImm32 => Operands::AddrImm32(byte_at(code, at(1)?)?, u32_at(code, at(2)?)?),
            Shape::Key => Operands::Key {
                addr: byte_at(code, at(1)?)?,
                len: u32_at(code, at(2)?)?,
            },
            Shape::Cipher => Operands::Cipher {
                input: byte_at(code, at(1)?)?,
                output: byte_at(code, at(2)?)?,
                len: u32_at(code, at(3)?)?,
                keystream: byte_at(code, at(7)?)?,
            },
            Shape::Addr => Operands::Addr(byte_at(code, at(1)?)?),
            Shape::Native => {
                let len = u32_at(code, at(1)?)? as usize;
                let start = at(5)?;
                let end = start.checked_add(len).ok_or(Fault::CodeOutOfBounds)?;
                let block = code.get(start..end).ok_or(Fault::CodeOutOfBounds)?;
                Operands::Native(block.to_vec())
            }
        };

        Ok(operands)
    }

    /// Encoded width in bytes, opcode and native end marker included.
    pub fn width(&self) -> usize {
        match &self.operands {
            Operands::Native(block) => Shape::Native.width() + block.len(),
            _ => self.opcode.width(),
        }
    }

    /// Encode to bytes.
    ///
    /// Operands that do not match the opcode's shape are encoded as they are;
    /// keeping the two consistent is the caller's business.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width());
        bytes.push(self.opcode as u8);

        match &self.operands {
            Operands::None => {}
            Operands::Reg(r) | Operands::Addr(r) => bytes.push(*r),
            Operands::RegReg(a, b)
            | Operands::RegAddr(a, b)
            | Operands::AddrReg(a, b)
            | Operands::AddrImm8(a, b) => bytes.extend_from_slice(&[*a, *b]),
            Operands::RegImm(r, imm) | Operands::AddrImm32(r, imm) => {
                bytes.push(*r);
                bytes.extend_from_slice(&imm.to_le_bytes());
            }
            Operands::Imm(imm) => bytes.extend_from_slice(&imm.to_le_bytes()),
            Operands::AddrImm16(addr, imm) => {
                bytes.push(*addr);
                bytes.extend_from_slice(&imm.to_le_bytes());
            }
            Operands::Key { addr, len } => {
                bytes.push(*addr);
                bytes.extend_from_slice(&len.to_le_bytes());
            }
            Operands::Cipher {
                input,
                output,
                len,
                keystream,
            } => {
                bytes.extend_from_slice(&[*input, *output]);
                bytes.extend_from_slice(&len.to_le_bytes());
                bytes.push(*keystream);
            }
            Operands::Native(block) => {
                bytes.extend_from_slice(&(block.len() as u32).to_le_bytes());
                bytes.extend_from_slice(block);
                bytes.push(PASSTHRU_END);
            }
        }

        bytes
    }
}

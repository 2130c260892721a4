//! Disassembler: bytecode → canonical assembly text.
//!
//! Output is flat text, one instruction per line, found by linear sweep
//! from offset 0. Bytes that do not decode (invalid opcodes, truncated
//! operands, pass-through blocks without the end marker) are emitted as
//! `DB` lines, so every blob reassembles to itself.

use crate::parser::DB;
use chassis_common::{CodeSection, Instruction, Operands, PASSTHRU_END};
use std::fmt::Write;

fn hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical text for one decoded instruction.
pub(crate) fn render(instr: &Instruction) -> String {
    let m = instr.opcode.mnemonic();
    match &instr.operands {
        Operands::None => m.to_string(),
        Operands::Reg(r) => format!("{m} r{r}"),
        Operands::RegReg(a, b) => format!("{m} r{a}, r{b}"),
        Operands::RegImm(r, imm) => format!("{m} r{r}, 0x{imm:08x}"),
        Operands::Imm(imm) => format!("{m} 0x{imm:08x}"),
        Operands::RegAddr(r, addr) => format!("{m} r{r}, 0x{addr:02x}"),
        Operands::AddrReg(addr, r) => format!("{m} 0x{addr:02x}, r{r}"),
        Operands::AddrImm8(addr, v) => format!("{m} 0x{addr:02x}, 0x{v:02x}"),
        Operands::AddrImm16(addr, v) => format!("{m} 0x{addr:02x}, 0x{v:04x}"),
        Operands::AddrImm32(addr, v) => format!("{m} 0x{addr:02x}, 0x{v:08x}"),
        Operands::Key { addr, len } => format!("{m} 0x{addr:02x}, {len}"),
        Operands::Cipher {
            input,
            output,
            len,
            keystream,
        } => format!("{m} 0x{input:02x}, 0x{output:02x}, {len}, 0x{keystream:02x}"),
        Operands::Addr(addr) => format!("{m} 0x{addr:02x}"),
        Operands::Native(block) if block.is_empty() => m.to_string(),
        Operands::Native(block) => format!("{m} {}", hex_list(block)),
    }
}

/// Disassemble a code blob into canonical assembly text.
///
/// The output is guaranteed to reassemble to identical bytes.
pub fn disassemble(code: &[u8]) -> String {
    let mut out = String::new();
    let mut raw: Vec<u8> = Vec::new();

    let flush = |out: &mut String, raw: &mut Vec<u8>| {
        if !raw.is_empty() {
            let _ = writeln!(out, "{DB} {}", hex_list(raw));
            raw.clear();
        }
    };

    for (pc, decoded) in CodeSection::new(code).sweep() {
        let instr = match decoded {
            Ok(instr) => instr,
            Err(_) => {
                raw.push(code[pc]);
                continue;
            }
        };

        let end = pc + instr.width();
        if matches!(instr.operands, Operands::Native(_))
            && code.get(end - 1) != Some(&PASSTHRU_END)
        {
            raw.extend_from_slice(&code[pc..end.min(code.len())]);
            continue;
        }

        flush(&mut out, &mut raw);
        let _ = writeln!(out, "{}", render(&instr));
    }
    flush(&mut out, &mut raw);

    out
}

//! Opcode definitions for the Chassis instruction set.
//!
//! The opcode space is split by convention into three blocks:
//! `0x00..=0x48` ALU and control flow, `0x80..=0x8B` data section access and
//! `0xFB..=0xFF` engine specials. Every other byte is invalid.

use crate::error::Fault;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute pins each variant to its encoded byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ALU and control flow
    /// Stop emulation; r0 is the exit value.
    Hlt = 0x00,
    /// `mov reg, reg`
    Mov = 0x01,
    /// `movi reg, imm32`
    Movi = 0x02,
    /// `add reg, reg`
    Add = 0x03,
    /// `addi reg, imm32`
    Addi = 0x04,
    /// `sub reg, reg`, updates sign and zero.
    Sub = 0x05,
    /// `subi reg, imm32`, updates sign and zero.
    Subi = 0x06,
    /// `adc reg, reg`
    Adc = 0x07,
    /// `sbb reg, reg`
    Sbb = 0x08,
    /// `inc reg`
    Inc = 0x09,
    /// `dec reg`
    Dec = 0x0A,
    /// `cmp reg, imm32`, updates zero and sign.
    Cmp = 0x0B,
    /// `lea reg, reg`
    Lea = 0x0C,
    /// `neg reg`
    Neg = 0x0D,
    /// `or reg, reg`
    Or = 0x0E,
    /// `and reg, reg`
    And = 0x0F,
    /// `not reg`
    Not = 0x10,
    /// `nor reg, reg`
    Nor = 0x11,
    /// `xor reg, reg`
    Xor = 0x12,
    /// `xori reg, imm32`
    Xori = 0x13,
    /// `test reg, reg`, updates zero.
    Test = 0x14,
    /// `shr reg, reg`
    Shr = 0x15,
    /// `shl reg, reg`
    Shl = 0x16,
    /// `sar reg, reg`
    Sar = 0x17,
    /// `sal reg, reg`
    Sal = 0x18,
    /// `push reg`
    Push = 0x19,
    /// `pushi imm32`
    Pushi = 0x1A,
    /// `pop reg`
    Pop = 0x1B,
    /// `pushad`
    Pushad = 0x1C,
    /// `popad`
    Popad = 0x1D,
    /// `jmp reg` (absolute)
    Jmp = 0x1E,
    /// `jmpi imm32` (absolute)
    Jmpi = 0x1F,
    /// Jump if zero / equal, target in a register.
    Je = 0x20,
    /// Jump if zero / equal, immediate target.
    Jei = 0x21,
    /// Jump if not zero / not equal, target in a register.
    Jne = 0x22,
    /// Jump if not zero / not equal, immediate target.
    Jnei = 0x23,
    Jl = 0x24,
    Jli = 0x25,
    Jle = 0x26,
    Jlei = 0x27,
    Jnl = 0x28,
    Jnli = 0x29,
    Jnle = 0x2A,
    Jnlei = 0x2B,
    Jb = 0x2C,
    Jbi = 0x2D,
    Jbe = 0x2E,
    Jbei = 0x2F,
    Jnb = 0x30,
    Jnbi = 0x31,
    Jnbe = 0x32,
    Jnbei = 0x33,
    Jc = 0x34,
    Jci = 0x35,
    Jnc = 0x36,
    Jnci = 0x37,
    Js = 0x38,
    Jsi = 0x39,
    Jns = 0x3A,
    Jnsi = 0x3B,
    Jo = 0x3C,
    Joi = 0x3D,
    Jno = 0x3E,
    Jnoi = 0x3F,
    /// `div reg, reg`
    Div = 0x40,
    /// `idiv reg, reg` (signed)
    Idiv = 0x41,
    /// `mul reg, reg`
    Mul = 0x42,
    /// `imul reg, reg` (signed)
    Imul = 0x43,
    /// `mod reg, reg`
    Mod = 0x44,
    /// `call imm32` (absolute)
    Call = 0x45,
    /// `rcall imm32` (relative to the next instruction)
    Rcall = 0x46,
    /// `ret`
    Ret = 0x47,
    /// `xchg reg, reg`
    Xchg = 0x48,

    // Data section access
    /// `loadb reg, [reg]` (8 bits)
    Loadb = 0x80,
    /// `loadbi reg, mem` (8 bits)
    Loadbi = 0x81,
    /// `loadw reg, [reg]` (16 bits)
    Loadw = 0x82,
    /// `loadwi reg, mem` (16 bits)
    Loadwi = 0x83,
    /// `loadd reg, [reg]` (32 bits)
    Loadd = 0x84,
    /// `loaddi reg, mem` (32 bits)
    Loaddi = 0x85,
    /// `storb mem, reg` (8 bits)
    Storb = 0x86,
    /// `storbi mem, imm8`
    Storbi = 0x87,
    /// `storw mem, reg` (16 bits)
    Storw = 0x88,
    /// `storwi mem, imm16`
    Storwi = 0x89,
    /// `stord mem, reg` (32 bits)
    Stord = 0x8A,
    /// `stordi mem, imm32`
    Stordi = 0x8B,

    // Engine specials
    /// `rc4k mem, len` (key setup)
    Rc4k = 0xFB,
    /// `rc4c in, out, len, keystream`
    Rc4c = 0xFC,
    /// `conout mem`: write the NUL-terminated string at `mem`.
    Conout = 0xFD,
    /// No operation.
    Nop = 0xFE,
    /// Hand a native block to the embedder's pass-through handler.
    Passthru = 0xFF,
}

/// Operand layout following the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No operands.
    None,
    /// One register byte.
    Reg,
    /// Two register bytes.
    RegReg,
    /// Register byte then a 32-bit immediate.
    RegImm32,
    /// One 32-bit immediate.
    Imm32,
    /// Register byte then an 8-bit data address.
    RegAddr,
    /// 8-bit data address then a register byte.
    AddrReg,
    /// 8-bit data address then an 8-bit immediate.
    AddrImm8,
    /// 8-bit data address then a 16-bit immediate.
    AddrImm16,
    /// 8-bit data address then a 32-bit immediate.
    AddrImm32,
    /// Key address then a 32-bit key length.
    Key,
    /// Input address, output address, 32-bit length, keystream address.
    Cipher,
    /// One 8-bit data address.
    Addr,
    /// 32-bit block length, the native block, one end marker byte.
    Native,
}

impl Shape {
    /// Encoded width including the opcode byte.
    ///
    /// For [`Shape::Native`] this is the header alone; the block length is
    /// added on top.
    pub fn width(self) -> usize {
        match self {
            Shape::None => 1,
            Shape::Reg | Shape::Addr => 2,
            Shape::RegReg | Shape::RegAddr | Shape::AddrReg | Shape::AddrImm8 => 3,
            Shape::AddrImm16 => 4,
            Shape::Imm32 => 5,
            Shape::RegImm32 | Shape::AddrImm32 | Shape::Key | Shape::Native => 6,
            Shape::Cipher => 8,
        }
    }
}

/// All valid opcodes, in byte order.
pub const ALL_OPCODES: [Opcode; 90] = [
    Opcode::Hlt,
    Opcode::Mov,
    Opcode::Movi,
    Opcode::Add,
    Opcode::Addi,
    Opcode::Sub,
    Opcode::Subi,
    Opcode::Adc,
    Opcode::Sbb,
    Opcode::Inc,
    Opcode::Dec,
    Opcode::Cmp,
    Opcode::Lea,
    Opcode::Neg,
    Opcode::Or,
    Opcode::And,
    Opcode::Not,
    Opcode::Nor,
    Opcode::Xor,
    Opcode::Xori,
    Opcode::Test,
    Opcode::Shr,
    Opcode::Shl,
    Opcode::Sar,
    Opcode::Sal,
    Opcode::Push,
    Opcode::Pushi,
    Opcode::Pop,
    Opcode::Pushad,
    Opcode::Popad,
    Opcode::Jmp,
    Opcode::Jmpi,
    Opcode::Je,
    Opcode::Jei,
    Opcode::Jne,
    Opcode::Jnei,
    Opcode::Jl,
    Opcode::Jli,
    Opcode::Jle,
    Opcode::Jlei,
    Opcode::Jnl,
    Opcode::Jnli,
    Opcode::Jnle,
    Opcode::Jnlei,
    Opcode::Jb,
    Opcode::Jbi,
    Opcode::Jbe,
    Opcode::Jbei,
    Opcode::Jnb,
    Opcode::Jnbi,
    Opcode::Jnbe,
    Opcode::Jnbei,
    Opcode::Jc,
    Opcode::Jci,
    Opcode::Jnc,
    Opcode::Jnci,
    Opcode::Js,
    Opcode::Jsi,
    Opcode::Jns,
    Opcode::Jnsi,
    Opcode::Jo,
    Opcode::Joi,
    Opcode::Jno,
    Opcode::Jnoi,
    Opcode::Div,
    Opcode::Idiv,
    Opcode::Mul,
    Opcode::Imul,
    Opcode::Mod,
    Opcode::Call,
    Opcode::Rcall,
    Opcode::Ret,
    Opcode::Xchg,
    Opcode::Loadb,
    Opcode::Loadbi,
    Opcode::Loadw,
    Opcode::Loadwi,
    Opcode::Loadd,
    Opcode::Loaddi,
    Opcode::Storb,
    Opcode::Storbi,
    Opcode::Storw,
    Opcode::Storwi,
    Opcode::Stord,
    Opcode::Stordi,
    Opcode::Rc4k,
    Opcode::Rc4c,
    Opcode::Conout,
    Opcode::Nop,
    Opcode::Passthru,
];

/// Alternative mnemonics that encode to an existing opcode.
///
/// The table is part of the instruction set contract and is kept verbatim,
/// including `JGI` resolving to `JNLI` rather than `JNLEI`.
pub const ALIASES: [(&str, Opcode); 20] = [
    ("JZ", Opcode::Je),
    ("JZI", Opcode::Jei),
    ("JNZ", Opcode::Jne),
    ("JNZI", Opcode::Jnei),
    ("JG", Opcode::Jnle),
    ("JGI", Opcode::Jnli),
    ("JGE", Opcode::Jnl),
    ("JGEI", Opcode::Jnli),
    ("JNG", Opcode::Jle),
    ("JNGI", Opcode::Jlei),
    ("JNGE", Opcode::Jl),
    ("JNGEI", Opcode::Jli),
    ("JA", Opcode::Jnbe),
    ("JAI", Opcode::Jnbei),
    ("JAE", Opcode::Jnb),
    ("JAEI", Opcode::Jnbi),
    ("JNA", Opcode::Jbe),
    ("JNAI", Opcode::Jbei),
    ("JNAE", Opcode::Jb),
    ("JNAEI", Opcode::Jbi),
];

/// Index of the first memory opcode in [`ALL_OPCODES`].
const MEMORY_BASE: usize = 0x49;
/// Index of the first special opcode in [`ALL_OPCODES`].
const SPECIAL_BASE: usize = MEMORY_BASE + 12;

impl TryFrom<u8> for Opcode {
    type Error = Fault;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let index = match value {
            0x00..=0x48 => value as usize,
            0x80..=0x8B => MEMORY_BASE + (value - 0x80) as usize,
            0xFB..=0xFF => SPECIAL_BASE + (value - 0xFB) as usize,
            _ => return Err(Fault::OpcodeInvalid),
        };
        ALL_OPCODES.get(index).copied().ok_or(Fault::OpcodeInvalid)
    }
}

impl Opcode {
    /// Returns the canonical assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Mov => "MOV",
            Opcode::Movi => "MOVI",
            Opcode::Add => "ADD",
            Opcode::Addi => "ADDI",
            Opcode::Sub => "SUB",
            Opcode::Subi => "SUBI",
            Opcode::Adc => "ADC",
            Opcode::Sbb => "SBB",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Cmp => "CMP",
            Opcode::Lea => "LEA",
            Opcode::Neg => "NEG",
            Opcode::Or => "OR",
            Opcode::And => "AND",
            Opcode::Not => "NOT",
            Opcode::Nor => "NOR",
            Opcode::Xor => "XOR",
            Opcode::Xori => "XORI",
            Opcode::Test => "TEST",
            Opcode::Shr => "SHR",
            Opcode::Shl => "SHL",
            Opcode::Sar => "SAR",
            Opcode::Sal => "SAL",
            Opcode::Push => "PUSH",
            Opcode::Pushi => "PUSHI",
            Opcode::Pop => "POP",
            Opcode::Pushad => "PUSHAD",
            Opcode::Popad => "POPAD",
            Opcode::Jmp => "JMP",
            Opcode::Jmpi => "JMPI",
            Opcode::Je => "JE",
            Opcode::Jei => "JEI",
            Opcode::Jne => "JNE",
            Opcode::Jnei => "JNEI",
            Opcode::Jl => "JL",
            Opcode::Jli => "JLI",
            Opcode::Jle => "JLE",
            Opcode::Jlei => "JLEI",
            Opcode::Jnl => "JNL",
            Opcode::Jnli => "JNLI",
            Opcode::Jnle => "JNLE",
            Opcode::Jnlei => "JNLEI",
            Opcode::Jb => "JB",
            Opcode::Jbi => "JBI",
            Opcode::Jbe => "JBE",
            Opcode::Jbei => "JBEI",
            Opcode::Jnb => "JNB",
            Opcode::Jnbi => "JNBI",
            Opcode::Jnbe => "JNBE",
            Opcode::Jnbei => "JNBEI",
            Opcode::Jc => "JC",
            Opcode::Jci => "JCI",
            Opcode::Jnc => "JNC",
            Opcode::Jnci => "JNCI",
            Opcode::Js => "JS",
            Opcode::Jsi => "JSI",
            Opcode::Jns => "JNS",
            Opcode::Jnsi => "JNSI",
            Opcode::Jo => "JO",
            Opcode::Joi => "JOI",
            Opcode::Jno => "JNO",
            Opcode::Jnoi => "JNOI",
            Opcode::Div => "DIV",
            Opcode::Idiv => "IDIV",
            Opcode::Mul => "MUL",
            Opcode::Imul => "IMUL",
            Opcode::Mod => "MOD",
            Opcode::Call => "CALL",
            Opcode::Rcall => "RCALL",
            Opcode::Ret => "RET",
            Opcode::Xchg => "XCHG",
            Opcode::Loadb => "LOADB",
            Opcode::Loadbi => "LOADBI",
            Opcode::Loadw => "LOADW",
            Opcode::Loadwi => "LOADWI",
            Opcode::Loadd => "LOADD",
            Opcode::Loaddi => "LOADDI",
            Opcode::Storb => "STORB",
            Opcode::Storbi => "STORBI",
            Opcode::Storw => "STORW",
            Opcode::Storwi => "STORWI",
            Opcode::Stord => "STORD",
            Opcode::Stordi => "STORDI",
            Opcode::Rc4k => "RC4K",
            Opcode::Rc4c => "RC4C",
            Opcode::Conout => "CONOUT",
            Opcode::Nop => "NOP",
            Opcode::Passthru => "PASSTHRU",
        }
    }

    /// Resolve a mnemonic (canonical or alias, case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        let upper = name.to_ascii_uppercase();
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == upper)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == upper)
                    .map(|(_, op)| op)
            })
            .copied()
    }

    /// Operand layout of this opcode.
    pub fn shape(&self) -> Shape {
        use Opcode::*;
        match self {
            Hlt | Pushad | Popad | Ret | Nop => Shape::None,
            Inc | Dec | Neg | Not | Push | Pop => Shape::Reg,
            Mov | Add | Sub | Adc | Sbb | Lea | Or | And | Nor | Xor | Test | Shr | Shl | Sar
            | Sal | Div | Idiv | Mul | Imul | Mod | Xchg | Loadb | Loadw | Loadd => Shape::RegReg,
            Movi | Addi | Subi | Cmp | Xori => Shape::RegImm32,
            Pushi | Jmpi | Call | Rcall => Shape::Imm32,
            Loadbi | Loadwi | Loaddi => Shape::RegAddr,
            Storb | Storw | Stord => Shape::AddrReg,
            Storbi => Shape::AddrImm8,
            Storwi => Shape::AddrImm16,
            Stordi => Shape::AddrImm32,
            Rc4k => Shape::Key,
            Rc4c => Shape::Cipher,
            Conout => Shape::Addr,
            Passthru => Shape::Native,
            // Conditional jumps alternate register / immediate targets.
            Jmp | Je | Jne | Jl | Jle | Jnl | Jnle | Jb | Jbe | Jnb | Jnbe | Jc | Jnc | Js
            | Jns | Jo | Jno => Shape::Reg,
            Jei | Jnei | Jli | Jlei | Jnli | Jnlei | Jbi | Jbei | Jnbi | Jnbei | Jci | Jnci
            | Jsi | Jnsi | Joi | Jnoi => Shape::Imm32,
        }
    }

    /// Encoded width of the instruction, opcode byte included.
    pub fn width(&self) -> usize {
        self.shape().width()
    }

    /// Whether the engine has a handler for this opcode.
    ///
    /// Unimplemented opcodes are still recognised: executing one raises
    /// [`Fault::OpcodeUnimplemented`] rather than [`Fault::OpcodeInvalid`].
    pub fn is_implemented(&self) -> bool {
        let byte = *self as u8;
        !matches!(
            self,
            Opcode::Sbb
                | Opcode::Sar
                | Opcode::Sal
                | Opcode::Pushad
                | Opcode::Popad
                | Opcode::Mod
        ) && !(0x24..=0x3F).contains(&byte)
    }
}

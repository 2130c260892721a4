//! Chassis virtual machine: executes Chassis bytecode.
//!
//! The VM is a register machine with:
//! - 16 general purpose 32-bit registers (r0 is the exit value)
//! - A flags register, a value/return-address stack and a data section
//! - An RC4 stream cipher reachable through two special opcodes
//! - A pass-through hook for natively executed blocks
//!
//! # Usage
//!
//! ```
//! use chassis_common::{Instruction, Opcode, Operands};
//! use chassis_vm::run_default;
//!
//! let mut code = Vec::new();
//! code.extend(Instruction::new(Opcode::Movi, Operands::RegImm(0, 5)).encode());
//! code.extend(Instruction::new(Opcode::Movi, Operands::RegImm(1, 3)).encode());
//! code.extend(Instruction::new(Opcode::Add, Operands::RegReg(0, 1)).encode());
//! code.extend(Instruction::new(Opcode::Hlt, Operands::None).encode());
//!
//! assert_eq!(run_default(&code).unwrap(), 8);
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod execute;
pub mod flags;
pub mod machine;
pub mod memory;
pub mod passthru;
pub mod registers;
pub mod stack;

pub use cipher::{decipher, Rc4};
pub use config::VmConfig;
pub use error::VmError;
pub use execute::Step;
pub use flags::Flags;
pub use machine::{Context, HaltReason, State, Vm};
pub use passthru::Passthru;

use chassis_common::CodeSection;

/// Run `code` with `data` seeding the data section and return r0.
///
/// This is the primary entry point for the VM. It binds the code section,
/// initialises a default-configured VM, copies `data` into the data section
/// (ignoring anything beyond its capacity) and executes until `HLT`.
///
/// # Errors
///
/// Returns [`VmError`] if a fault terminates the program.
pub fn run(code: &[u8], data: &[u8]) -> Result<u32, VmError> {
    let mut vm = Vm::new(CodeSection::new(code));
    vm.start(data)
}

/// [`run`] with a single zero byte as seed data.
pub fn run_default(code: &[u8]) -> Result<u32, VmError> {
    run(code, &[0])
}

//! Runtime errors for the Chassis VM.
//!
//! Every fatal condition is reported with the program counter of the
//! instruction that raised it. The fault code is what an embedder uses as
//! the process exit status.

use chassis_common::Fault;
use thiserror::Error;

/// A fatal fault together with where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{fault} at pc {pc:#06x}")]
pub struct VmError {
    /// The fault that terminated the program.
    pub fault: Fault,
    /// Program counter of the faulting instruction.
    pub pc: u32,
}

impl VmError {
    /// Create a new error.
    pub fn new(fault: Fault, pc: u32) -> Self {
        Self { fault, pc }
    }

    /// Exit status for this error: the fault code.
    pub fn exit_code(&self) -> i32 {
        self.fault.code() as i32
    }
}

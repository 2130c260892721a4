//! The code section: an embedder-supplied bytecode blob and its size.
//!
//! Bytecode has no header, magic number or version. The blob is simply the
//! concatenation of encoded instructions. The embedder declares a size
//! alongside the bytes; the engine's fetch check is made against the
//! declared size, while operand reads are limited by the bytes themselves.

use crate::error::Fault;
use crate::instruction::Instruction;

/// A bound code section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSection<'a> {
    bytes: &'a [u8],
    size: u32,
}

impl<'a> CodeSection<'a> {
    /// Bind a blob whose declared size is its length.
    ///
    /// Blobs longer than `u32::MAX` bytes are declared as `u32::MAX`.
    pub fn new(bytes: &'a [u8]) -> Self {
        let size = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        Self { bytes, size }
    }

    /// Bind a blob with an explicitly declared size.
    pub fn with_size(bytes: &'a [u8], size: u32) -> Self {
        Self { bytes, size }
    }

    /// The raw bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The declared size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Iterate over the instructions by linear sweep from offset 0.
    ///
    /// Each item is the offset of the instruction and either the decoded
    /// instruction or the fault that stopped decoding at that offset. The
    /// sweep resumes one byte after a fault.
    pub fn sweep(&self) -> Sweep<'a> {
        Sweep {
            bytes: self.bytes,
            pc: 0,
        }
    }
}

/// Iterator returned by [`CodeSection::sweep`].
#[derive(Debug, Clone)]
pub struct Sweep<'a> {
    bytes: &'a [u8],
    pc: usize,
}

impl Iterator for Sweep<'_> {
    type Item = (usize, Result<Instruction, Fault>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pc >= self.bytes.len() {
            return None;
        }
        let pc = self.pc;
        let decoded = Instruction::decode(self.bytes, pc);
        self.pc += match &decoded {
            Ok(instr) => instr.width(),
            Err(_) => 1,
        };
        Some((pc, decoded))
    }
}

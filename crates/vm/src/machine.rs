//! VM state management: registers, flags, stack, data, code binding.

use crate::cipher::Rc4;
use crate::config::VmConfig;
use crate::error::VmError;
use crate::flags::Flags;
use crate::memory::DataSection;
use crate::passthru::Passthru;
use crate::registers::{RegisterFile, NUM_REGISTERS};
use crate::stack::Stack;
use chassis_common::{CodeSection, Fault};
use std::io::{self, Write};
use tracing::debug;

/// Snapshot of the architectural state.
///
/// No opcode reads or writes it; embedders use it through
/// [`Vm::save_context`] and [`Vm::restore_context`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub regs: [u32; NUM_REGISTERS],
    pub pc: u32,
    pub sp: u32,
    pub flags: Flags,
}

/// Why a VM stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// `HLT` executed.
    Halt,
    /// A fault ended the program.
    Panic(VmError),
}

/// Execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted(HaltReason),
}

/// The Chassis virtual CPU.
pub struct Vm<'a> {
    pub(crate) config: VmConfig,
    /// The bound program.
    pub(crate) code: CodeSection<'a>,
    pub(crate) regs: RegisterFile,
    /// Program counter (byte offset into the code section).
    pub(crate) pc: u32,
    pub(crate) stack: Stack,
    pub(crate) flags: Flags,
    pub(crate) data: DataSection,
    /// Stream cipher shared by every RC4 opcode of a run.
    pub(crate) cipher: Rc4,
    pub(crate) context: Context,
    pub(crate) state: State,
    pub(crate) passthru: Option<Box<dyn Passthru + 'a>>,
    /// Sink for `CONOUT`.
    pub(crate) console: Box<dyn Write + 'a>,
}

impl<'a> Vm<'a> {
    /// Create a VM bound to `code` with the default configuration.
    pub fn new(code: CodeSection<'a>) -> Self {
        Self::with_config(code, VmConfig::default())
    }

    /// Create a VM bound to `code`.
    pub fn with_config(code: CodeSection<'a>, config: VmConfig) -> Self {
        let data = DataSection::new(config.data_size);
        Self {
            config,
            code,
            regs: RegisterFile::default(),
            pc: 0,
            stack: Stack::default(),
            flags: Flags::default(),
            data,
            cipher: Rc4::default(),
            context: Context::default(),
            state: State::Running,
            passthru: None,
            console: Box::new(io::stdout()),
        }
    }

    /// Rebind the code section. Takes effect from the next fetch.
    pub fn bind_code(&mut self, code: CodeSection<'a>) {
        self.code = code;
    }

    /// Register the handler for `PASSTHRU` blocks.
    pub fn set_passthru(&mut self, handler: impl Passthru + 'a) {
        self.passthru = Some(Box::new(handler));
    }

    /// Redirect `CONOUT` output (stdout by default).
    pub fn set_console(&mut self, sink: impl Write + 'a) {
        self.console = Box::new(sink);
    }

    /// Reset all state for a fresh run.
    ///
    /// Zeroes registers, pc, sp, flags and the saved context, clears the
    /// stack, resizes and zeroes the data section and unkeys the cipher.
    pub fn initialise(&mut self) {
        self.regs.clear();
        self.pc = 0;
        self.stack.clear();
        self.flags = Flags::default();
        self.context = Context::default();
        self.data.reset(self.config.data_size);
        self.cipher = Rc4::default();
        self.state = State::Running;
        debug!(
            data_size = self.config.data_size,
            code_size = self.code.size(),
            "vm initialised"
        );
    }

    /// Fetch the opcode byte at the program counter.
    ///
    /// The check is `pc > size`: fetching at exactly the declared size is
    /// allowed, as long as the byte exists in the bound blob.
    pub(crate) fn fetch(&self) -> Result<u8, Fault> {
        if self.pc > self.code.size() {
            return Err(Fault::CodeOutOfBounds);
        }
        self.code
            .bytes()
            .get(self.pc as usize)
            .copied()
            .ok_or(Fault::CodeOutOfBounds)
    }

    /// Snapshot registers, pc, sp and flags into the saved context.
    pub fn save_context(&mut self) -> Context {
        self.context = Context {
            regs: self.regs.general(),
            pc: self.pc,
            sp: u32::try_from(self.stack.sp()).unwrap_or(u32::MAX),
            flags: self.flags,
        };
        self.context
    }

    /// Load registers, pc, sp and flags from `ctx`.
    ///
    /// Stack storage is left alone; a restored `sp` above the storage length
    /// makes the next pop fault with [`Fault::StackOverflow`].
    pub fn restore_context(&mut self, ctx: &Context) {
        self.regs.load_general(&ctx.regs);
        self.pc = ctx.pc;
        self.stack.set_sp(ctx.sp as usize);
        self.flags = ctx.flags;
        self.context = *ctx;
    }

    /// The last saved context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn code(&self) -> &CodeSection<'a> {
        &self.code
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// The architectural registers.
    pub fn registers(&self) -> [u32; NUM_REGISTERS] {
        self.regs.general()
    }

    /// Read a register slot by raw index.
    pub fn register(&self, index: u8) -> u32 {
        self.regs.get(index)
    }

    /// Write a register slot by raw index.
    pub fn set_register(&mut self, index: u8, value: u32) {
        self.regs.set(index, value);
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The data section.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// The data section, writable.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }

    pub fn state(&self) -> State {
        self.state
    }
}

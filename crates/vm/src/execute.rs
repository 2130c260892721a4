//! Fetch-decode-execute loop and opcode dispatch for the Chassis VM.

use crate::error::VmError;
use crate::machine::{HaltReason, State, Vm};
use crate::passthru::resume_pc;
use chassis_common::{Fault, Instruction, Opcode, Operands};
use tracing::{debug, trace, warn};

/// Outcome of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt,
}

/// Where the program counter goes after a handler.
enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Continue at an absolute offset.
    Jump(u32),
    /// Stop; pc stays on the `HLT`.
    Halt,
}

impl<'a> Vm<'a> {
    /// Initialise, seed the data section with `data` and run to completion.
    ///
    /// Seed bytes beyond the data section capacity are ignored. Returns r0.
    ///
    /// # Errors
    ///
    /// Returns the [`VmError`] that terminated the program.
    pub fn start(&mut self, data: &[u8]) -> Result<u32, VmError> {
        self.initialise();
        self.data.seed(data);
        debug!(seed_len = data.len(), "vm starting");
        self.run()
    }

    /// [`Vm::start`] with a single zero byte as seed.
    pub fn start_default(&mut self) -> Result<u32, VmError> {
        self.start(&[0])
    }

    /// Run from the current state until `HLT` or a fault. Returns r0.
    ///
    /// Unlike [`Vm::start`], nothing is reset first, so data written through
    /// [`Vm::data_mut`] after [`Vm::initialise`] is seen by the program.
    pub fn run(&mut self) -> Result<u32, VmError> {
        while self.step()? == Step::Continue {}
        Ok(self.regs.get(0))
    }

    /// Fetch and execute one instruction.
    ///
    /// Once halted, further calls repeat the terminal outcome without
    /// executing anything.
    pub fn step(&mut self) -> Result<Step, VmError> {
        match self.state {
            State::Running => {}
            State::Halted(HaltReason::Halt) => return Ok(Step::Halt),
            State::Halted(HaltReason::Panic(err)) => return Err(err),
        }

        let pc = self.pc;
        match self.fetch().and_then(|opcode| self.execute(opcode)) {
            Ok(Step::Continue) => Ok(Step::Continue),
            Ok(Step::Halt) => {
                debug!(pc, r0 = self.regs.get(0), "vm halted");
                self.state = State::Halted(HaltReason::Halt);
                Ok(Step::Halt)
            }
            Err(fault) => {
                let err = VmError::new(fault, pc);
                debug!(pc, code = fault.code(), "vm panic: {fault}");
                self.state = State::Halted(HaltReason::Panic(err));
                Err(err)
            }
        }
    }

    /// Execute the instruction whose opcode byte is `opcode`, located at the
    /// current program counter.
    ///
    /// Operands are decoded from the code section right after the opcode.
    /// Returns [`Step::Halt`] only for `HLT`.
    pub fn execute(&mut self, opcode: u8) -> Result<Step, Fault> {
        let opcode = Opcode::try_from(opcode)?;
        trace!(pc = self.pc, opcode = opcode.mnemonic(), "execute");

        if !opcode.is_implemented() {
            if opcode == Opcode::Popad {
                self.stack.check_pop()?;
            }
            return Err(Fault::OpcodeUnimplemented);
        }

        let operands =
            Instruction::decode_operands(opcode.shape(), self.code.bytes(), self.pc as usize)?;
        let instr = Instruction::new(opcode, operands);
        let next = self.pc.wrapping_add(instr.width() as u32);

        match self.dispatch(instr, next)? {
            Flow::Next => self.pc = next,
            Flow::Jump(target) => self.pc = target,
            Flow::Halt => return Ok(Step::Halt),
        }
        Ok(Step::Continue)
    }

    fn dispatch(&mut self, instr: Instruction, next: u32) -> Result<Flow, Fault> {
        let opcode = instr.opcode;
        match instr.operands {
            Operands::None => self.exec_bare(opcode),
            Operands::Reg(r) => self.exec_reg(opcode, r),
            Operands::RegReg(a, b) => self.exec_reg_reg(opcode, a, b),
            Operands::RegImm(r, imm) => self.exec_reg_imm(opcode, r, imm),
            Operands::Imm(imm) => self.exec_imm(opcode, imm, next),
            Operands::RegAddr(r, addr) => self.exec_load_direct(opcode, r, addr),
            Operands::AddrReg(addr, r) => self.exec_store_reg(opcode, addr, r),
            Operands::AddrImm8(addr, value) => {
                self.data.write_u8(addr as usize, value)?;
                Ok(Flow::Next)
            }
            Operands::AddrImm16(addr, value) => {
                self.data.write_u16(addr as usize, value)?;
                Ok(Flow::Next)
            }
            Operands::AddrImm32(addr, value) => {
                self.data.write_u32(addr as usize, value)?;
                Ok(Flow::Next)
            }
            Operands::Key { addr, len } => self.exec_rc4_key(addr, len),
            Operands::Cipher {
                input,
                output,
                len,
                keystream,
            } => self.exec_rc4_cipher(input, output, len, keystream),
            Operands::Addr(addr) => self.exec_conout(addr),
            Operands::Native(block) => self.exec_passthru(&block),
        }
    }

    // ---- Operand-less ----

    fn exec_bare(&mut self, opcode: Opcode) -> Result<Flow, Fault> {
        match opcode {
            Opcode::Hlt => Ok(Flow::Halt),
            Opcode::Nop => Ok(Flow::Next),
            Opcode::Ret => Ok(Flow::Jump(self.stack.pop()?)),
            // Decode never pairs other opcodes with this shape.
            _ => Err(Fault::OpcodeInvalid),
        }
    }

    // ---- Single register ----

    fn exec_reg(&mut self, opcode: Opcode, r: u8) -> Result<Flow, Fault> {
        let value = self.regs.get(r);
        match opcode {
            Opcode::Inc => self.regs.set(r, value.wrapping_add(1)),
            Opcode::Dec => self.regs.set(r, value.wrapping_sub(1)),
            // NEG is a bitwise complement, same as NOT.
            Opcode::Neg | Opcode::Not => self.regs.set(r, !value),
            Opcode::Push => self.stack.push(value),
            Opcode::Pop => {
                let popped = self.stack.pop()?;
                self.regs.set(r, popped);
            }
            Opcode::Jmp => return Ok(Flow::Jump(value)),
            Opcode::Je => return Ok(self.jump_if(self.flags.zero(), value)),
            Opcode::Jne => return Ok(self.jump_if(!self.flags.zero(), value)),
            _ => return Err(Fault::OpcodeInvalid),
        }
        Ok(Flow::Next)
    }

    // ---- Register, register ----

    fn exec_reg_reg(&mut self, opcode: Opcode, a: u8, b: u8) -> Result<Flow, Fault> {
        let x = self.regs.get(a);
        let y = self.regs.get(b);

        let result = match opcode {
            Opcode::Mov | Opcode::Lea => y,
            Opcode::Add => x.wrapping_add(y),
            Opcode::Sub => {
                let r = x.wrapping_sub(y);
                self.set_sign_zero(r);
                r
            }
            Opcode::Adc => x.wrapping_add(!((x & y).wrapping_add(x))),
            Opcode::Or => x | y,
            Opcode::And => x & y,
            Opcode::Nor => !(x | y),
            Opcode::Xor => x ^ y,
            Opcode::Test => {
                self.flags.set_zero(x & y == 0);
                return Ok(Flow::Next);
            }
            Opcode::Shr => x.wrapping_shr(y),
            Opcode::Shl => x.wrapping_shl(y),
            // IDIV divides the raw register values, unsigned, exactly like DIV.
            Opcode::Div | Opcode::Idiv => x.checked_div(y).unwrap_or(0),
            // The low 32 bits of a product are the same signed or unsigned.
            Opcode::Mul | Opcode::Imul => x.wrapping_mul(y),
            Opcode::Xchg => {
                self.xor_swap(a, b);
                return Ok(Flow::Next);
            }
            Opcode::Loadb => self.data.read_u8(y as usize)? as u32,
            Opcode::Loadw => self.data.read_u16(y as usize)? as u32,
            Opcode::Loadd => self.data.read_u32(y as usize)?,
            _ => return Err(Fault::OpcodeInvalid),
        };

        self.regs.set(a, result);
        Ok(Flow::Next)
    }

    // ---- Register, imm32 ----

    fn exec_reg_imm(&mut self, opcode: Opcode, r: u8, imm: u32) -> Result<Flow, Fault> {
        let x = self.regs.get(r);
        let result = match opcode {
            Opcode::Movi => imm,
            Opcode::Addi => x.wrapping_add(imm),
            Opcode::Subi => {
                let r = x.wrapping_sub(imm);
                self.set_sign_zero(r);
                r
            }
            Opcode::Xori => x ^ imm,
            Opcode::Cmp => {
                // Equality and an unsigned >= test; no subtraction flags.
                self.flags.set_zero(x == imm);
                self.flags.set_sign(x < imm);
                return Ok(Flow::Next);
            }
            _ => return Err(Fault::OpcodeInvalid),
        };
        self.regs.set(r, result);
        Ok(Flow::Next)
    }

    // ---- imm32 ----

    fn exec_imm(&mut self, opcode: Opcode, imm: u32, next: u32) -> Result<Flow, Fault> {
        match opcode {
            Opcode::Pushi => {
                self.stack.push(imm);
                Ok(Flow::Next)
            }
            Opcode::Jmpi => Ok(Flow::Jump(imm)),
            Opcode::Jei => Ok(self.jump_if(self.flags.zero(), imm)),
            Opcode::Jnei => Ok(self.jump_if(!self.flags.zero(), imm)),
            Opcode::Call => {
                self.stack.push(next);
                Ok(Flow::Jump(imm))
            }
            Opcode::Rcall => {
                self.stack.push(next);
                Ok(Flow::Jump(next.wrapping_add(imm)))
            }
            _ => Err(Fault::OpcodeInvalid),
        }
    }

    // ---- Data section ----

    fn exec_load_direct(&mut self, opcode: Opcode, r: u8, addr: u8) -> Result<Flow, Fault> {
        let addr = addr as usize;
        let value = match opcode {
            Opcode::Loadbi => self.data.read_u8(addr)? as u32,
            Opcode::Loadwi => self.data.read_u16(addr)? as u32,
            Opcode::Loaddi => self.data.read_u32(addr)?,
            _ => return Err(Fault::OpcodeInvalid),
        };
        self.regs.set(r, value);
        Ok(Flow::Next)
    }

    fn exec_store_reg(&mut self, opcode: Opcode, addr: u8, r: u8) -> Result<Flow, Fault> {
        let addr = addr as usize;
        let value = self.regs.get(r);
        match opcode {
            Opcode::Storb => self.data.write_u8(addr, value as u8)?,
            Opcode::Storw => self.data.write_u16(addr, value as u16)?,
            Opcode::Stord => self.data.write_u32(addr, value)?,
            _ => return Err(Fault::OpcodeInvalid),
        }
        Ok(Flow::Next)
    }

    // ---- Specials ----

    fn exec_rc4_key(&mut self, addr: u8, len: u32) -> Result<Flow, Fault> {
        if len == 0 {
            self.cipher.set_key(&[]);
        } else {
            let range = self.data.range(addr as usize, len as usize)?;
            self.cipher.set_key(&self.data.as_slice()[range]);
        }
        Ok(Flow::Next)
    }

    fn exec_rc4_cipher(
        &mut self,
        input: u8,
        output: u8,
        len: u32,
        keystream: u8,
    ) -> Result<Flow, Fault> {
        let len = len as usize;
        let input = self.data.range(input as usize, len)?.start;
        let output = self.data.range(output as usize, len)?.start;
        let keystream = self.data.range(keystream as usize, len)?.start;

        // Byte by byte inside the data section, so overlapping regions see
        // each other's writes in order.
        let bytes = self.data.as_mut_slice();
        for k in 0..len {
            bytes[keystream + k] = self.cipher.next_byte();
            bytes[output + k] = bytes[keystream + k] ^ bytes[input + k];
        }
        Ok(Flow::Next)
    }

    fn exec_conout(&mut self, addr: u8) -> Result<Flow, Fault> {
        let text = self.data.c_str(addr as usize);
        if let Err(e) = self
            .console
            .write_all(text)
            .and_then(|()| self.console.flush())
        {
            warn!("conout: console write failed: {e}");
        }
        Ok(Flow::Next)
    }

    fn exec_passthru(&mut self, block: &[u8]) -> Result<Flow, Fault> {
        let handler = self.passthru.as_mut().ok_or(Fault::OpcodeUnimplemented)?;
        debug!(pc = self.pc, len = block.len(), "passthru");
        handler.invoke(block);
        Ok(Flow::Jump(resume_pc(self.pc, block.len() as u32)))
    }

    // ---- Helpers ----

    fn jump_if(&self, taken: bool, target: u32) -> Flow {
        if taken {
            Flow::Jump(target)
        } else {
            Flow::Next
        }
    }

    /// Sign from bit 31 of the result, zero from equality with 0.
    fn set_sign_zero(&mut self, result: u32) {
        self.flags.set_sign((result as i32) < 0);
        self.flags.set_zero(result == 0);
    }

    /// Three-XOR exchange; a register exchanged with itself becomes 0.
    fn xor_swap(&mut self, a: u8, b: u8) {
        self.regs.set(a, self.regs.get(a) ^ self.regs.get(b));
        self.regs.set(b, self.regs.get(b) ^ self.regs.get(a));
        self.regs.set(a, self.regs.get(a) ^ self.regs.get(b));
    }
}

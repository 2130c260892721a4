//! The general purpose register file.
//!
//! Sixteen 32-bit registers are architectural; r0 carries the exit value.
//! Register operands are raw bytes taken from the code stream and are
//! trusted as-is, so the file is backed by one slot per possible index.
//! Slots 16..=255 are shadow slots: reachable through an out-of-range
//! index, zeroed with the rest, but never part of a saved context.

/// Number of architectural registers.
pub const NUM_REGISTERS: usize = 16;

/// 256 slots indexed directly by the operand byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    slots: [u32; 256],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self { slots: [0; 256] }
    }
}

impl RegisterFile {
    /// Read a register.
    pub fn get(&self, index: u8) -> u32 {
        self.slots[index as usize]
    }

    /// Write a register.
    pub fn set(&mut self, index: u8, value: u32) {
        self.slots[index as usize] = value;
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        self.slots = [0; 256];
    }

    /// Copy of the architectural registers.
    pub fn general(&self) -> [u32; NUM_REGISTERS] {
        let mut regs = [0; NUM_REGISTERS];
        regs.copy_from_slice(&self.slots[..NUM_REGISTERS]);
        regs
    }

    /// Overwrite the architectural registers.
    pub fn load_general(&mut self, regs: &[u32; NUM_REGISTERS]) {
        self.slots[..NUM_REGISTERS].copy_from_slice(regs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut regs = RegisterFile::default();
        regs.set(3, 0xDEAD_BEEF);
        assert_eq!(regs.get(3), 0xDEAD_BEEF);
        assert_eq!(regs.get(4), 0);
    }

    #[test]
    fn shadow_slots_are_outside_general() {
        let mut regs = RegisterFile::default();
        regs.set(200, 9);
        assert_eq!(regs.get(200), 9);
        assert_eq!(regs.general(), [0; NUM_REGISTERS]);
    }

    #[test]
    fn clear_zeroes_shadow_slots() {
        let mut regs = RegisterFile::default();
        regs.set(0, 1);
        regs.set(255, 2);
        regs.clear();
        assert_eq!(regs.get(0), 0);
        assert_eq!(regs.get(255), 0);
    }

    #[test]
    fn load_general_roundtrip() {
        let mut regs = RegisterFile::default();
        let mut values = [0u32; NUM_REGISTERS];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u32 * 10;
        }
        regs.load_general(&values);
        assert_eq!(regs.general(), values);
        assert_eq!(regs.get(15), 150);
    }
}

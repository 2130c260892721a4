//! The 8-bit flags register.
//!
//! ```text
//!   bit:  0   1   2   3   4   5   6   7
//!         Z   C   O   S   D   R   R   R
//! ```

/// Flags register. Bits 5–7 are reserved and never set by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const ZERO: u8 = 1 << 0;
    pub const CARRY: u8 = 1 << 1;
    pub const OVERFLOW: u8 = 1 << 2;
    pub const SIGN: u8 = 1 << 3;
    pub const DIRECTION: u8 = 1 << 4;

    /// Build from raw bits.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub fn bits(&self) -> u8 {
        self.0
    }

    fn get(&self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    fn put(&mut self, mask: u8, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn zero(&self) -> bool {
        self.get(Self::ZERO)
    }

    pub fn set_zero(&mut self, on: bool) {
        self.put(Self::ZERO, on);
    }

    pub fn carry(&self) -> bool {
        self.get(Self::CARRY)
    }

    pub fn set_carry(&mut self, on: bool) {
        self.put(Self::CARRY, on);
    }

    pub fn overflow(&self) -> bool {
        self.get(Self::OVERFLOW)
    }

    pub fn set_overflow(&mut self, on: bool) {
        self.put(Self::OVERFLOW, on);
    }

    pub fn sign(&self) -> bool {
        self.get(Self::SIGN)
    }

    pub fn set_sign(&mut self, on: bool) {
        self.put(Self::SIGN, on);
    }

    pub fn direction(&self) -> bool {
        self.get(Self::DIRECTION)
    }

    pub fn set_direction(&mut self, on: bool) {
        self.put(Self::DIRECTION, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clear() {
        assert_eq!(Flags::default().bits(), 0);
    }

    #[test]
    fn bit_layout() {
        let mut flags = Flags::default();
        flags.set_zero(true);
        assert_eq!(flags.bits(), 0b0000_0001);
        flags.set_sign(true);
        assert_eq!(flags.bits(), 0b0000_1001);
        flags.set_direction(true);
        assert_eq!(flags.bits(), 0b0001_1001);
        flags.set_zero(false);
        assert_eq!(flags.bits(), 0b0001_1000);
    }

    #[test]
    fn accessors_are_independent() {
        let mut flags = Flags::default();
        flags.set_carry(true);
        flags.set_overflow(true);
        assert!(flags.carry());
        assert!(flags.overflow());
        assert!(!flags.zero());
        assert!(!flags.sign());
        assert!(!flags.direction());
    }
}

//! The value/return-address stack.
//!
//! Logical height (`sp`) and physical storage are tracked separately. A pop
//! only lowers `sp`; a push always appends a new slot. After a pop, the next
//! push lands beyond the popped slot, so a later pop at the same height reads
//! the older value still sitting there. Storage is not reclaimed during a
//! run.

use chassis_common::Fault;

/// Stack storage plus logical height.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    slots: Vec<u32>,
    sp: usize,
}

impl Stack {
    /// Append a value and raise the logical height.
    pub fn push(&mut self, value: u32) {
        self.slots.push(value);
        self.sp += 1;
    }

    /// Check that a pop-style access is allowed at the current height.
    pub fn check_pop(&self) -> Result<(), Fault> {
        if self.sp == 0 || self.slots.is_empty() {
            return Err(Fault::StackUnderflow);
        }
        if self.sp > self.slots.len() {
            return Err(Fault::StackOverflow);
        }
        Ok(())
    }

    /// Read the slot below the logical height and lower the height.
    pub fn pop(&mut self) -> Result<u32, Fault> {
        self.check_pop()?;
        let value = self.slots[self.sp - 1];
        self.sp -= 1;
        Ok(value)
    }

    /// Logical height.
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Force the logical height, as when restoring a saved context.
    pub fn set_sp(&mut self, sp: usize) {
        self.sp = sp;
    }

    /// Physical storage length.
    pub fn storage_len(&self) -> usize {
        self.slots.len()
    }

    /// The physical storage.
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Drop all storage and reset the height.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.sp = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop() {
        let mut stack = Stack::default();
        stack.push(7);
        assert_eq!(stack.pop(), Ok(7));
        assert_eq!(stack.sp(), 0);
        assert_eq!(stack.storage_len(), 1);
    }

    #[test]
    fn pop_empty_underflows() {
        let mut stack = Stack::default();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
    }

    #[test]
    fn pop_at_zero_height_with_storage_underflows() {
        let mut stack = Stack::default();
        stack.push(1);
        stack.pop().unwrap();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
    }

    #[test]
    fn repush_appends_and_pop_reads_stale_slot() {
        let mut stack = Stack::default();
        stack.push(0xA);
        stack.pop().unwrap();
        stack.push(0xB);
        assert_eq!(stack.slots(), &[0xA, 0xB]);
        assert_eq!(stack.pop(), Ok(0xA));
    }

    #[test]
    fn height_beyond_storage_overflows() {
        let mut stack = Stack::default();
        stack.push(1);
        stack.set_sp(2);
        assert_eq!(stack.pop(), Err(Fault::StackOverflow));
    }

    #[test]
    fn clear_resets_everything() {
        let mut stack = Stack::default();
        stack.push(1);
        stack.push(2);
        stack.clear();
        assert_eq!(stack.sp(), 0);
        assert_eq!(stack.storage_len(), 0);
    }
}

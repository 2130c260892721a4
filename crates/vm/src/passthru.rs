//! The native pass-through boundary.
//!
//! `PASSTHRU` hands the block that follows it to a handler registered by
//! the embedder and resumes emulation once the handler returns. The engine
//! only does the hand-off and the program counter bookkeeping; what the
//! block means is entirely up to the handler.
//!
//! ```text
//! [0xFF] [len: u32 le] [block: len bytes] [end marker]
//!  pc     pc+1          pc+5               pc+5+len      -> resume at pc+6+len
//! ```

/// Handler invoked synchronously for every `PASSTHRU` instruction.
pub trait Passthru {
    /// Execute `block` to completion.
    fn invoke(&mut self, block: &[u8]);
}

impl<F> Passthru for F
where
    F: FnMut(&[u8]),
{
    fn invoke(&mut self, block: &[u8]) {
        self(block)
    }
}

/// Program counter after a pass-through at `pc` carrying `len` bytes.
pub fn resume_pc(pc: u32, len: u32) -> u32 {
    pc.wrapping_add(6).wrapping_add(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_handlers() {
        let mut seen = Vec::new();
        {
            let mut handler = |block: &[u8]| seen.extend_from_slice(block);
            handler.invoke(&[1, 2]);
            handler.invoke(&[3]);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn resume_skips_header_block_and_marker() {
        assert_eq!(resume_pc(10, 3), 19);
        assert_eq!(resume_pc(0, 0), 6);
    }
}

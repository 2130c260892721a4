//! The data section: the VM's addressable read/write memory.
//!
//! Multi-byte values are little-endian. Every access is checked against the
//! effective byte range `[addr, addr + width)`; anything reaching past the
//! capacity is [`Fault::DataOutOfBounds`].

use chassis_common::Fault;
use std::ops::Range;

/// Fixed-capacity, zero-initialised byte buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSection {
    bytes: Vec<u8>,
}

impl DataSection {
    /// A zeroed section of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Zero and resize to `capacity`.
    pub fn reset(&mut self, capacity: usize) {
        self.bytes.clear();
        self.bytes.resize(capacity, 0);
    }

    /// Copy `seed` to the start of the section; bytes beyond capacity are
    /// ignored.
    pub fn seed(&mut self, seed: &[u8]) {
        let n = seed.len().min(self.bytes.len());
        self.bytes[..n].copy_from_slice(&seed[..n]);
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Validate an access of `len` bytes at `addr`.
    pub fn range(&self, addr: usize, len: usize) -> Result<Range<usize>, Fault> {
        let end = addr.checked_add(len).ok_or(Fault::DataOutOfBounds)?;
        if addr >= self.bytes.len() || end > self.bytes.len() {
            return Err(Fault::DataOutOfBounds);
        }
        Ok(addr..end)
    }

    fn read<const N: usize>(&self, addr: usize) -> Result<[u8; N], Fault> {
        let range = self.range(addr, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[range]);
        Ok(out)
    }

    fn write(&mut self, addr: usize, value: &[u8]) -> Result<(), Fault> {
        let range = self.range(addr, value.len())?;
        self.bytes[range].copy_from_slice(value);
        Ok(())
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8, Fault> {
        self.read::<1>(addr).map(|[b]| b)
    }

    pub fn read_u16(&self, addr: usize) -> Result<u16, Fault> {
        self.read::<2>(addr).map(u16::from_le_bytes)
    }

    pub fn read_u32(&self, addr: usize) -> Result<u32, Fault> {
        self.read::<4>(addr).map(u32::from_le_bytes)
    }

    pub fn write_u8(&mut self, addr: usize, value: u8) -> Result<(), Fault> {
        self.write(addr, &[value])
    }

    pub fn write_u16(&mut self, addr: usize, value: u16) -> Result<(), Fault> {
        self.write(addr, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Fault> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Bytes from `addr` up to (not including) the first NUL.
    ///
    /// The scan is not a checked access: it stops at the end of the section
    /// when no NUL is found, and an `addr` past the end yields an empty slice.
    pub fn c_str(&self, addr: usize) -> &[u8] {
        let tail = self.bytes.get(addr..).unwrap_or(&[]);
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zeroed() {
        let data = DataSection::new(8);
        assert_eq!(data.as_slice(), &[0; 8]);
    }

    #[test]
    fn seed_truncates_to_capacity() {
        let mut data = DataSection::new(4);
        data.seed(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(data.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut data = DataSection::new(4);
        data.seed(&[9, 9]);
        data.reset(6);
        assert_eq!(data.as_slice(), &[0; 6]);
    }

    #[test]
    fn little_endian_round_trip() {
        let mut data = DataSection::new(8);
        data.write_u32(2, 0x1122_3344).unwrap();
        assert_eq!(&data.as_slice()[2..6], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(data.read_u32(2), Ok(0x1122_3344));
        assert_eq!(data.read_u16(2), Ok(0x3344));
        assert_eq!(data.read_u8(5), Ok(0x11));
    }

    #[test]
    fn last_byte_is_addressable() {
        let mut data = DataSection::new(8);
        data.write_u8(7, 0xAB).unwrap();
        assert_eq!(data.read_u8(7), Ok(0xAB));
    }

    #[test]
    fn access_at_capacity_faults() {
        let data = DataSection::new(8);
        assert_eq!(data.read_u8(8), Err(Fault::DataOutOfBounds));
    }

    #[test]
    fn wide_access_straddling_end_faults() {
        let mut data = DataSection::new(8);
        assert_eq!(data.read_u32(5), Err(Fault::DataOutOfBounds));
        assert_eq!(data.write_u16(7, 1), Err(Fault::DataOutOfBounds));
        assert_eq!(data.as_slice(), &[0; 8]);
    }

    #[test]
    fn range_overflow_faults() {
        let data = DataSection::new(8);
        assert_eq!(data.range(usize::MAX, 2), Err(Fault::DataOutOfBounds));
    }

    #[test]
    fn c_str_stops_at_nul() {
        let mut data = DataSection::new(8);
        data.seed(b"hi\0yo");
        assert_eq!(data.c_str(0), b"hi");
        assert_eq!(data.c_str(3), b"yo");
    }

    #[test]
    fn c_str_stops_at_end_without_nul() {
        let mut data = DataSection::new(3);
        data.seed(b"abc");
        assert_eq!(data.c_str(1), b"bc");
        assert_eq!(data.c_str(10), b"");
    }
}

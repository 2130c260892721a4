//! Engine configuration.

/// Default capacity of the data section in bytes.
pub const DATA_SECTION_SIZE: usize = 0x100;

/// Tunables fixed for the lifetime of a [`Vm`](crate::Vm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Capacity of the data section. The section is resized to this only
    /// during initialisation.
    pub data_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            data_size: DATA_SECTION_SIZE,
        }
    }
}

impl VmConfig {
    /// Set the data section capacity.
    pub fn data_size(mut self, size: usize) -> Self {
        self.data_size = size;
        self
    }
}

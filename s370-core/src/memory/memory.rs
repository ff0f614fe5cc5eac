use crate::constants;
use crate::memory::MemoryType;
use alloc::boxed::Box;
use alloc::vec;

/// Flat real storage, byte addressable, sized in whole 2K pages
pub struct MainStorage {
    bytes: Box<[u8]>,
}

impl MainStorage {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size].into_boxed_slice(),
        }
    }

    pub fn reset(&mut self) {
        self.bytes.fill(0);
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// True when the (already 24-bit reduced) address lies inside installed storage
    pub fn contains(&self, addr: u32) -> bool {
        ((addr & constants::ADDRESS_MASK) as usize) < self.bytes.len()
    }

    fn index(&self, addr: u32) -> usize {
        (addr & constants::ADDRESS_MASK) as usize % self.bytes.len()
    }
}

impl MemoryType for MainStorage {
    fn read(&self, addr: u32) -> u8 {
        self.bytes[self.index(addr)]
    }

    fn write(&mut self, addr: u32, value: u8) {
        let idx = self.index(addr);
        self.bytes[idx] = value;
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn test_wraps_at_24_bits() {
        let mut mem = MainStorage::new(constants::MAX_STORAGE_SIZE);
        mem.write(0x0100_0010, 0xAB);
        assert_eq!(mem.read(0x10), 0xAB);
        assert_eq!(mem.read(0xFF00_0010), 0xAB);
    }

    #[test]
    fn test_contains_respects_installed_size() {
        let mem = MainStorage::new(64 * 1024);
        assert!(mem.contains(0xFFFF));
        assert!(!mem.contains(0x10000));
        assert!(mem.contains(0x0100_0000));
    }
}

pub mod keys;
mod memory;
pub mod registers;

pub use keys::StorageKeys;
pub use registers::Registers;

use crate::constants;
use log::debug;

/// Byte access interface shared by storage components
pub trait MemoryType {
    fn read(&self, addr: u32) -> u8;
    fn write(&mut self, addr: u32, value: u8);
}

/// Real storage plus its protection keys.
///
/// Every address is reduced modulo 2^24 before use, and multi-byte values are
/// big-endian with each byte wrapping independently, so a fullword at
/// 0xFFFFFE spans 0xFFFFFE, 0xFFFFFF, 0x000000 and 0x000001.
pub struct MemoryMap {
    storage: memory::MainStorage,
    keys: StorageKeys,
}

impl MemoryMap {
    pub fn new(size: usize) -> MemoryMap {
        debug!("Installing {} KiB of real storage", size / 1024);
        MemoryMap {
            storage: memory::MainStorage::new(size),
            keys: StorageKeys::new(),
        }
    }

    pub fn reset(&mut self) {
        self.storage.reset();
        self.keys.reset();
    }

    pub fn size(&self) -> usize {
        self.storage.size()
    }

    /// Whether every byte of `[addr, addr + len)` is installed storage
    pub fn is_valid(&self, addr: u32, len: u32) -> bool {
        if self.storage.size() == constants::MAX_STORAGE_SIZE {
            return true;
        }
        (0..len).all(|i| self.storage.contains(addr.wrapping_add(i)))
    }

    pub fn read_u8(&self, addr: u32) -> u8 {
        self.storage.read(addr)
    }

    pub fn write_u8(&mut self, addr: u32, value: u8) {
        self.storage.write(addr, value)
    }

    pub fn read_u16(&self, addr: u32) -> u16 {
        (self.read_u8(addr) as u16) << 8 | self.read_u8(addr.wrapping_add(1)) as u16
    }

    pub fn write_u16(&mut self, addr: u32, value: u16) {
        self.write_u8(addr, (value >> 8) as u8);
        self.write_u8(addr.wrapping_add(1), value as u8);
    }

    pub fn read_u32(&self, addr: u32) -> u32 {
        (self.read_u16(addr) as u32) << 16 | self.read_u16(addr.wrapping_add(2)) as u32
    }

    pub fn write_u32(&mut self, addr: u32, value: u32) {
        self.write_u16(addr, (value >> 16) as u16);
        self.write_u16(addr.wrapping_add(2), value as u16);
    }

    pub fn read_u64(&self, addr: u32) -> u64 {
        (self.read_u32(addr) as u64) << 32 | self.read_u32(addr.wrapping_add(4)) as u64
    }

    pub fn write_u64(&mut self, addr: u32, value: u64) {
        self.write_u32(addr, (value >> 32) as u32);
        self.write_u32(addr.wrapping_add(4), value as u32);
    }

    pub fn read_bytes(&self, addr: u32, out: &mut [u8]) {
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.read_u8(addr.wrapping_add(i as u32));
        }
    }

    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u32), *b);
        }
    }

    pub fn read_key(&self, page: usize) -> u8 {
        self.keys.read(page)
    }

    pub fn write_key(&mut self, page: usize, key: u8) {
        self.keys.write(page, key)
    }
}

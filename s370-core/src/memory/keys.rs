use crate::constants;

/// Storage protection keys, one 4-bit key per 2K page
pub struct StorageKeys {
    keys: [u8; constants::STORAGE_KEY_PAGES],
}

impl StorageKeys {
    pub fn new() -> Self {
        Self {
            keys: [0; constants::STORAGE_KEY_PAGES],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [0; constants::STORAGE_KEY_PAGES];
    }

    /// Page index holding the given address
    pub fn page_of(addr: u32) -> usize {
        ((addr & constants::ADDRESS_MASK) >> constants::PAGE_SHIFT) as usize
    }

    pub fn read(&self, page: usize) -> u8 {
        self.keys[page % constants::STORAGE_KEY_PAGES]
    }

    pub fn write(&mut self, page: usize, key: u8) {
        self.keys[page % constants::STORAGE_KEY_PAGES] = key & 0xF;
    }
}

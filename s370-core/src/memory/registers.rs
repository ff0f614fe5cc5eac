use crate::constants;

/// General and floating-point register file
pub struct Registers {
    general: [u32; constants::GENERAL_REGISTERS], // GPR0-GPR15
    floating: [u64; constants::FLOAT_REGISTERS],  // FPR0, 2, 4, 6
}

impl Registers {
    pub fn new() -> Self {
        Self {
            general: [0; constants::GENERAL_REGISTERS],
            floating: [0; constants::FLOAT_REGISTERS],
        }
    }

    pub fn reset(&mut self) {
        self.general = [0; constants::GENERAL_REGISTERS];
        self.floating = [0; constants::FLOAT_REGISTERS];
    }

    /// Register numbers are taken modulo 16
    pub fn read(&self, r: usize) -> u32 {
        self.general[r & 0xF]
    }

    pub fn write(&mut self, r: usize, value: u32) {
        self.general[r & 0xF] = value;
    }

    /// Even/odd pair starting at `r` as one 64-bit value, `r` holding the high half
    pub fn read_pair(&self, r: usize) -> u64 {
        ((self.read(r) as u64) << 32) | self.read(r + 1) as u64
    }

    pub fn write_pair(&mut self, r: usize, value: u64) {
        self.write(r, (value >> 32) as u32);
        self.write(r + 1, value as u32);
    }

    /// Floating registers are addressed by their architected number (0, 2, 4, 6)
    pub fn read_long(&self, r: usize) -> u64 {
        self.floating[(r >> 1) & 0x3]
    }

    pub fn write_long(&mut self, r: usize, value: u64) {
        self.floating[(r >> 1) & 0x3] = value;
    }

    /// Short operands live in the high-order word; the low word is left alone
    pub fn read_short(&self, r: usize) -> u32 {
        (self.read_long(r) >> 32) as u32
    }

    pub fn write_short(&mut self, r: usize, value: u32) {
        let low = self.read_long(r) & 0xFFFF_FFFF;
        self.write_long(r, ((value as u64) << 32) | low);
    }
}

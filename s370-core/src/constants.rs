// Size of the real-storage address space and its page granularity
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;
pub const MAX_STORAGE_SIZE: usize = 1 << 24;
pub const PAGE_SIZE: usize = 2048;
pub const PAGE_SHIFT: u32 = 11;
pub const STORAGE_KEY_PAGES: usize = MAX_STORAGE_SIZE / PAGE_SIZE;

// Register file dimensions
pub const GENERAL_REGISTERS: usize = 16;
pub const FLOAT_REGISTERS: usize = 4;

pub mod vectors {
    // Fixed interrupt-vector slots in low storage, each holding an 8-byte BC-mode PSW
    pub const RESTART_NEW_PSW: u32 = 0;
    pub const RESTART_OLD_PSW: u32 = 8;
    pub const EXTERNAL_OLD_PSW: u32 = 24;
    pub const SVC_OLD_PSW: u32 = 32;
    pub const PROGRAM_OLD_PSW: u32 = 40;
    pub const MACHINE_CHECK_OLD_PSW: u32 = 48;
    pub const IO_OLD_PSW: u32 = 56;
    pub const EXTERNAL_NEW_PSW: u32 = 88;
    pub const SVC_NEW_PSW: u32 = 96;
    pub const PROGRAM_NEW_PSW: u32 = 104;
    pub const MACHINE_CHECK_NEW_PSW: u32 = 112;
    pub const IO_NEW_PSW: u32 = 120;
}

pub mod interrupts {
    // Program interruption codes
    pub const OPERATION: u16 = 0x0001;
    pub const PRIVILEGED_OPERATION: u16 = 0x0002;
    pub const EXECUTE: u16 = 0x0003;
    pub const PROTECTION: u16 = 0x0004;
    pub const ADDRESSING: u16 = 0x0005;
    pub const SPECIFICATION: u16 = 0x0006;
    pub const DATA: u16 = 0x0007;
    pub const FIXED_POINT_OVERFLOW: u16 = 0x0008;
    pub const FIXED_POINT_DIVIDE: u16 = 0x0009;
    pub const DECIMAL_OVERFLOW: u16 = 0x000A;
    pub const DECIMAL_DIVIDE: u16 = 0x000B;
    pub const EXPONENT_OVERFLOW: u16 = 0x000C;
    pub const EXPONENT_UNDERFLOW: u16 = 0x000D;
    pub const SIGNIFICANCE: u16 = 0x000E;
    pub const FLOATING_POINT_DIVIDE: u16 = 0x000F;
}

pub mod program_mask {
    // PSW bits 36-39, numbered here within the 4-bit field
    pub const FIXED_OVERFLOW: u8 = 0b1000;
    pub const DECIMAL_OVERFLOW: u8 = 0b0100;
    pub const EXPONENT_UNDERFLOW: u8 = 0b0010;
    pub const SIGNIFICANCE: u8 = 0b0001;
}

pub mod system_mask {
    // PSW bits 0-7: channel 0-5 masks, remaining-channels mask, external mask
    pub const CHANNEL_0: u8 = 0x80;
    pub const CHANNELS: u8 = 0xFC;
    pub const OTHER_CHANNELS: u8 = 0x02;
    pub const EXTERNAL: u8 = 0x01;
}

pub mod psw_bits {
    // Second PSW byte: key (4), EC mode, machine-check mask, wait, problem state
    pub const EC_MODE: u8 = 0x08;
    pub const MACHINE_CHECK: u8 = 0x04;
    pub const WAIT: u8 = 0x02;
    pub const PROBLEM_STATE: u8 = 0x01;
}

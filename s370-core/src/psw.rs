//! BC-mode Program Status Word and its 8-byte storage layout.
//!
//! ```text
//! byte 0     system mask: channels 0-5, other channels, external
//! byte 1     key (4) | EC | machine check | wait | problem state
//! bytes 2-3  interruption code
//! byte 4     ILC (2) | CC (2) | program mask (4)
//! bytes 5-7  instruction address
//! ```

use crate::constants::{program_mask, psw_bits, system_mask, ADDRESS_MASK};
use crate::error::PswError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Psw {
    pub system_mask: u8,
    pub key: u8,
    pub ec_mode: bool,
    pub machine_check: bool,
    pub wait: bool,
    pub problem_state: bool,
    pub interruption_code: u16,
    pub ilc: u8,
    pub cc: u8,
    pub program_mask: u8,
    pub ia: u32,
}

impl Psw {
    pub fn encode(&self) -> [u8; 8] {
        let mut flags = (self.key & 0xF) << 4;
        if self.ec_mode {
            flags |= psw_bits::EC_MODE;
        }
        if self.machine_check {
            flags |= psw_bits::MACHINE_CHECK;
        }
        if self.wait {
            flags |= psw_bits::WAIT;
        }
        if self.problem_state {
            flags |= psw_bits::PROBLEM_STATE;
        }
        let code = self.interruption_code.to_be_bytes();
        let ia = (self.ia & ADDRESS_MASK).to_be_bytes();
        [
            self.system_mask,
            flags,
            code[0],
            code[1],
            self.status_byte(),
            ia[1],
            ia[2],
            ia[3],
        ]
    }

    pub fn decode(raw: &[u8; 8]) -> Psw {
        Psw {
            system_mask: raw[0],
            key: raw[1] >> 4,
            ec_mode: raw[1] & psw_bits::EC_MODE != 0,
            machine_check: raw[1] & psw_bits::MACHINE_CHECK != 0,
            wait: raw[1] & psw_bits::WAIT != 0,
            problem_state: raw[1] & psw_bits::PROBLEM_STATE != 0,
            interruption_code: u16::from_be_bytes([raw[2], raw[3]]),
            ilc: raw[4] >> 6,
            cc: (raw[4] >> 4) & 0x3,
            program_mask: raw[4] & 0xF,
            ia: u32::from_be_bytes([0, raw[5], raw[6], raw[7]]),
        }
    }

    pub fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.encode())
    }

    pub fn from_u64(value: u64) -> Psw {
        Psw::decode(&value.to_be_bytes())
    }

    /// ILC, CC and program mask packed as PSW byte 4 (also the BAL/BALR link byte)
    pub fn status_byte(&self) -> u8 {
        (self.ilc & 0x3) << 6 | (self.cc & 0x3) << 4 | (self.program_mask & 0xF)
    }

    /// Checks a freshly loaded PSW against what this BC-mode engine can run
    pub fn validate(&self) -> Result<(), PswError> {
        if self.ec_mode {
            return Err(PswError::ExtendedControl);
        }
        if self.wait && self.system_mask & (system_mask::CHANNELS | system_mask::OTHER_CHANNELS | system_mask::EXTERNAL) == 0 {
            return Err(PswError::DisabledWait);
        }
        Ok(())
    }

    pub fn program_mask_bit(&self, bit: u8) -> bool {
        self.program_mask & bit != 0
    }

    pub fn set_program_mask_bit(&mut self, bit: u8, enabled: bool) {
        if enabled {
            self.program_mask |= bit;
        } else {
            self.program_mask &= !bit;
        }
    }

    pub fn fixed_overflow_enabled(&self) -> bool {
        self.program_mask_bit(program_mask::FIXED_OVERFLOW)
    }

    pub fn decimal_overflow_enabled(&self) -> bool {
        self.program_mask_bit(program_mask::DECIMAL_OVERFLOW)
    }

    pub fn exponent_underflow_enabled(&self) -> bool {
        self.program_mask_bit(program_mask::EXPONENT_UNDERFLOW)
    }

    pub fn significance_enabled(&self) -> bool {
        self.program_mask_bit(program_mask::SIGNIFICANCE)
    }

    /// Channel masks 0-5; anything higher shares the "other channels" bit
    pub fn channel_mask(&self, channel: u8) -> bool {
        self.system_mask & Self::channel_bit(channel) != 0
    }

    pub fn set_channel_mask(&mut self, channel: u8, enabled: bool) {
        let bit = Self::channel_bit(channel);
        if enabled {
            self.system_mask |= bit;
        } else {
            self.system_mask &= !bit;
        }
    }

    fn channel_bit(channel: u8) -> u8 {
        if channel < 6 {
            system_mask::CHANNEL_0 >> channel
        } else {
            system_mask::OTHER_CHANNELS
        }
    }

    pub fn external_mask(&self) -> bool {
        self.system_mask & system_mask::EXTERNAL != 0
    }

    pub fn set_external_mask(&mut self, enabled: bool) {
        if enabled {
            self.system_mask |= system_mask::EXTERNAL;
        } else {
            self.system_mask &= !system_mask::EXTERNAL;
        }
    }
}

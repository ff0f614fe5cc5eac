use super::Instruction;
use crate::constants::{ADDRESS_MASK, GENERAL_REGISTERS};
use crate::cpu::Cpu;
use crate::error::Step;

/// Register loads and stores, including the byte-masked forms
pub trait LoadStore {
    fn lr(&mut self, inst: &Instruction) -> Step; // Load register
    fn l(&mut self, inst: &Instruction) -> Step; // Load
    fn lh(&mut self, inst: &Instruction) -> Step; // Load halfword
    fn st(&mut self, inst: &Instruction) -> Step; // Store
    fn sth(&mut self, inst: &Instruction) -> Step; // Store halfword
    fn stc(&mut self, inst: &Instruction) -> Step; // Store character
    fn stm(&mut self, inst: &Instruction) -> Step; // Store multiple
    fn lm(&mut self, inst: &Instruction) -> Step; // Load multiple
    fn la(&mut self, inst: &Instruction) -> Step; // Load address
    fn ic(&mut self, inst: &Instruction) -> Step; // Insert character
    fn icm(&mut self, inst: &Instruction) -> Step; // Insert characters under mask
    fn stcm(&mut self, inst: &Instruction) -> Step; // Store characters under mask
}

/// Register numbers R1, R1+1, ..., R3 with wraparound from 15 to 0
fn register_range(r1: usize, r3: usize) -> impl Iterator<Item = usize> {
    let count = (r3 + GENERAL_REGISTERS - r1) % GENERAL_REGISTERS + 1;
    (0..count).map(move |i| (r1 + i) % GENERAL_REGISTERS)
}

/// Byte positions (0 = leftmost) selected by a 4-bit mask
pub(crate) fn masked_bytes(mask: u8) -> impl Iterator<Item = usize> {
    (0..4).filter(move |i| mask & (0x8 >> i) != 0)
}

impl LoadStore for Cpu {
    fn lr(&mut self, inst: &Instruction) -> Step {
        let value = self.reg(inst.r2());
        self.set_reg(inst.r1(), value);
        Ok(())
    }

    fn l(&mut self, inst: &Instruction) -> Step {
        let value = self.load_u32(self.rx_address(inst))?;
        self.set_reg(inst.r1(), value);
        Ok(())
    }

    fn lh(&mut self, inst: &Instruction) -> Step {
        let value = self.load_u16(self.rx_address(inst))? as i16 as i32;
        self.set_reg(inst.r1(), value as u32);
        Ok(())
    }

    fn st(&mut self, inst: &Instruction) -> Step {
        self.store_u32(self.rx_address(inst), self.reg(inst.r1()))
    }

    fn sth(&mut self, inst: &Instruction) -> Step {
        self.store_u16(self.rx_address(inst), self.reg(inst.r1()) as u16)
    }

    fn stc(&mut self, inst: &Instruction) -> Step {
        self.store_u8(self.rx_address(inst), self.reg(inst.r1()) as u8)
    }

    fn stm(&mut self, inst: &Instruction) -> Step {
        let mut addr = self.op2_address(inst);
        for r in register_range(inst.r1(), inst.r3()) {
            self.store_u32(addr, self.reg(r))?;
            addr = addr.wrapping_add(4) & ADDRESS_MASK;
        }
        Ok(())
    }

    fn lm(&mut self, inst: &Instruction) -> Step {
        // The base may be among the loaded registers, so fix the address first
        let mut addr = self.op2_address(inst);
        for r in register_range(inst.r1(), inst.r3()) {
            let value = self.load_u32(addr)?;
            self.set_reg(r, value);
            addr = addr.wrapping_add(4) & ADDRESS_MASK;
        }
        Ok(())
    }

    fn la(&mut self, inst: &Instruction) -> Step {
        let addr = self.rx_address(inst);
        self.set_reg(inst.r1(), addr);
        Ok(())
    }

    fn ic(&mut self, inst: &Instruction) -> Step {
        let byte = self.load_u8(self.rx_address(inst))?;
        let value = (self.reg(inst.r1()) & 0xFFFF_FF00) | byte as u32;
        self.set_reg(inst.r1(), value);
        Ok(())
    }

    fn icm(&mut self, inst: &Instruction) -> Step {
        let mask = inst.r3() as u8;
        let mut addr = self.op2_address(inst);
        let mut bytes = self.reg(inst.r1()).to_be_bytes();
        let mut first = None;
        let mut any = false;

        for i in masked_bytes(mask) {
            let byte = self.load_u8(addr)?;
            bytes[i] = byte;
            first.get_or_insert(byte);
            any |= byte != 0;
            addr = addr.wrapping_add(1) & ADDRESS_MASK;
        }

        self.set_reg(inst.r1(), u32::from_be_bytes(bytes));
        self.psw.cc = match first {
            _ if !any => 0,
            Some(b) if b & 0x80 != 0 => 1,
            _ => 2,
        };
        Ok(())
    }

    fn stcm(&mut self, inst: &Instruction) -> Step {
        let mask = inst.r3() as u8;
        let mut addr = self.op2_address(inst);
        let bytes = self.reg(inst.r1()).to_be_bytes();

        for i in masked_bytes(mask) {
            self.store_u8(addr, bytes[i])?;
            addr = addr.wrapping_add(1) & ADDRESS_MASK;
        }
        Ok(())
    }
}

#[cfg(test)]
mod load_store_tests {
    use super::*;
    use crate::instructions::tests::{init_cpu, run_one};

    #[test]
    fn test_register_range_wraps() {
        let regs: heapless::Vec<usize, 16> = register_range(14, 1).collect();
        assert_eq!(regs.as_slice(), &[14, 15, 0, 1]);
        assert_eq!(register_range(3, 3).count(), 1);
        assert_eq!(register_range(0, 15).count(), 16);
    }

    #[test]
    fn test_load_halfword_sign_extends() {
        let mut cpu = init_cpu();
        cpu.poke_u16(0x2000, 0x8001);
        cpu.set_gpr(5, 0x2000);
        run_one(&mut cpu, &[0x48, 0x30, 0x50, 0x00]); // LH 3,0(,5)
        assert_eq!(cpu.gpr(3), 0xFFFF_8001u32 as i32);
    }

    #[test]
    fn test_store_and_load_multiple() {
        let mut cpu = init_cpu();
        cpu.set_gpr(14, 0x0E);
        cpu.set_gpr(15, 0x0F);
        cpu.set_gpr(0, 0x10);
        cpu.set_gpr(1, 0x11);
        cpu.set_gpr(2, 0x3000);
        run_one(&mut cpu, &[0x90, 0xE1, 0x20, 0x00]); // STM 14,1,0(2)
        assert_eq!(cpu.peek_u32(0x3000), 0x0E);
        assert_eq!(cpu.peek_u32(0x300C), 0x11);

        for r in [14, 15, 0, 1] {
            cpu.set_gpr(r, 0);
        }
        run_one(&mut cpu, &[0x98, 0xE1, 0x20, 0x00]); // LM 14,1,0(2)
        assert_eq!((cpu.gpr(14), cpu.gpr(15), cpu.gpr(0), cpu.gpr(1)), (0x0E, 0x0F, 0x10, 0x11));
    }

    #[test]
    fn test_load_address_is_24_bits() {
        let mut cpu = init_cpu();
        cpu.set_gpr(4, -1);
        run_one(&mut cpu, &[0x41, 0x10, 0x40, 0x02]); // LA 1,2(,4)
        assert_eq!(cpu.gpr(1), 0x0000_0001);
    }

    #[test]
    fn test_icm_condition_codes() {
        let mut cpu = init_cpu();
        cpu.set_gpr(2, 0x2000);
        cpu.set_gpr(1, 0x1122_3344);
        cpu.poke_bytes(0x2000, &[0x80, 0x7F]);
        run_one(&mut cpu, &[0xBF, 0x15, 0x20, 0x00]); // ICM 1,B'0101',0(2)
        assert_eq!(cpu.gpr(1) as u32, 0x1180_337F);
        assert_eq!(cpu.cc(), 1);

        cpu.poke_bytes(0x2000, &[0x00, 0x00]);
        run_one(&mut cpu, &[0xBF, 0x13, 0x20, 0x00]); // ICM 1,B'0011',0(2)
        assert_eq!(cpu.gpr(1) as u32, 0x1180_0000);
        assert_eq!(cpu.cc(), 0);

        cpu.poke_bytes(0x2000, &[0x00, 0x01]);
        run_one(&mut cpu, &[0xBF, 0x13, 0x20, 0x00]);
        assert_eq!(cpu.cc(), 2);

        run_one(&mut cpu, &[0xBF, 0x10, 0x20, 0x00]); // mask 0
        assert_eq!(cpu.cc(), 0);
    }

    #[test]
    fn test_stcm_and_stc() {
        let mut cpu = init_cpu();
        cpu.set_gpr(1, 0xAABB_CCDDu32 as i32);
        cpu.set_gpr(2, 0x2000);
        run_one(&mut cpu, &[0xBE, 0x19, 0x20, 0x00]); // STCM 1,B'1001',0(2)
        assert_eq!(cpu.peek_u16(0x2000), 0xAADD);
        run_one(&mut cpu, &[0x42, 0x10, 0x20, 0x05]); // STC 1,5(,2)
        assert_eq!(cpu.peek_u8(0x2005), 0xDD);
    }

    #[test]
    fn test_insert_character_keeps_upper_bytes() {
        let mut cpu = init_cpu();
        cpu.set_gpr(1, 0x1234_5678);
        cpu.poke_u8(0x0800, 0x9A);
        run_one(&mut cpu, &[0x43, 0x10, 0x08, 0x00]); // IC 1,X'800'
        assert_eq!(cpu.gpr(1), 0x1234_569A);
    }
}

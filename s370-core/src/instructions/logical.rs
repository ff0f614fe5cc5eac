use super::load_store::masked_bytes;
use super::Instruction;
use crate::constants::{interrupts, ADDRESS_MASK};
use crate::cpu::Cpu;
use crate::error::{Step, Trap};
use crate::utils::cc_compare;
use core::cmp::Ordering;

/// Boolean operations, logical comparison and storage-to-storage moves
pub trait Logical {
    fn nr(&mut self, inst: &Instruction) -> Step; // And
    fn n(&mut self, inst: &Instruction) -> Step;
    fn ni(&mut self, inst: &Instruction) -> Step;
    fn nc(&mut self, inst: &Instruction) -> Step;
    fn or(&mut self, inst: &Instruction) -> Step; // Or
    fn o(&mut self, inst: &Instruction) -> Step;
    fn oi(&mut self, inst: &Instruction) -> Step;
    fn oc(&mut self, inst: &Instruction) -> Step;
    fn xr(&mut self, inst: &Instruction) -> Step; // Exclusive or
    fn x(&mut self, inst: &Instruction) -> Step;
    fn xi(&mut self, inst: &Instruction) -> Step;
    fn xc(&mut self, inst: &Instruction) -> Step;
    fn clr(&mut self, inst: &Instruction) -> Step; // Compare logical
    fn cl(&mut self, inst: &Instruction) -> Step;
    fn cli(&mut self, inst: &Instruction) -> Step;
    fn clc(&mut self, inst: &Instruction) -> Step;
    fn clm(&mut self, inst: &Instruction) -> Step; // Compare logical characters under mask
    fn tm(&mut self, inst: &Instruction) -> Step; // Test under mask
    fn ts(&mut self, inst: &Instruction) -> Step; // Test and set
    fn cs(&mut self, inst: &Instruction) -> Step; // Compare and swap
    fn cds(&mut self, inst: &Instruction) -> Step; // Compare double and swap
    fn mvi(&mut self, inst: &Instruction) -> Step; // Move immediate
    fn mvc(&mut self, inst: &Instruction) -> Step; // Move characters
    fn mvn(&mut self, inst: &Instruction) -> Step; // Move numerics
    fn mvz(&mut self, inst: &Instruction) -> Step; // Move zones
    fn mvcl(&mut self, inst: &Instruction) -> Step; // Move long
    fn clcl(&mut self, inst: &Instruction) -> Step; // Compare logical long
    fn tr(&mut self, inst: &Instruction) -> Step; // Translate
    fn trt(&mut self, inst: &Instruction) -> Step; // Translate and test
}

/// Operand description held in an even/odd register pair by MVCL and CLCL
struct LongOperand {
    addr: u32,
    len: u32,
}

impl Cpu {
    /// R1 <- R1 op operand; CC 0 when the result is zero, else 1
    fn bitwise_register(&mut self, r1: usize, operand: u32, op: fn(u32, u32) -> u32) -> Step {
        let result = op(self.reg(r1), operand);
        self.set_reg(r1, result);
        self.psw.cc = (result != 0) as u8;
        Ok(())
    }

    fn bitwise_immediate(&mut self, inst: &Instruction, op: fn(u32, u32) -> u32) -> Step {
        let addr = self.op1_address(inst);
        let result = op(self.load_u8(addr)? as u32, inst.i2() as u32) as u8;
        self.store_u8(addr, result)?;
        self.psw.cc = (result != 0) as u8;
        Ok(())
    }

    /// Byte-at-a-time storage to storage over L+1 bytes, left to right, so an
    /// overlapping destination sees bytes already stored. Returns whether any
    /// result byte was nonzero.
    fn storage_to_storage(&mut self, inst: &Instruction, op: fn(u8, u8) -> u8) -> Result<bool, Trap> {
        let len = inst.l() as u32 + 1;
        let dest = self.op1_address(inst);
        let src = self.op2_address(inst);
        self.check(dest, len)?;
        self.check(src, len)?;

        let mut nonzero = false;
        for i in 0..len {
            let d = dest.wrapping_add(i) & ADDRESS_MASK;
            let s = src.wrapping_add(i) & ADDRESS_MASK;
            let result = op(self.mem.read_u8(d), self.mem.read_u8(s));
            self.mem.write_u8(d, result);
            nonzero |= result != 0;
        }
        Ok(nonzero)
    }

    fn bitwise_storage(&mut self, inst: &Instruction, op: fn(u8, u8) -> u8) -> Step {
        let nonzero = self.storage_to_storage(inst, op)?;
        self.psw.cc = nonzero as u8;
        Ok(())
    }

    fn long_operand(&self, r: usize) -> LongOperand {
        LongOperand {
            addr: self.reg(r) & ADDRESS_MASK,
            len: self.reg(r + 1) & ADDRESS_MASK,
        }
    }

    /// Final register image of a long operand: the address gets a zero high
    /// byte, the length register keeps its own (the pad byte for operand 2)
    fn set_long_operand(&mut self, r: usize, addr: u32, len: u32) {
        self.set_reg(r, addr & ADDRESS_MASK);
        let high = self.reg(r + 1) & !ADDRESS_MASK;
        self.set_reg(r + 1, high | (len & ADDRESS_MASK));
    }
}

fn and(a: u32, b: u32) -> u32 {
    a & b
}

fn or(a: u32, b: u32) -> u32 {
    a | b
}

fn xor(a: u32, b: u32) -> u32 {
    a ^ b
}

fn and_byte(a: u8, b: u8) -> u8 {
    a & b
}

fn or_byte(a: u8, b: u8) -> u8 {
    a | b
}

fn xor_byte(a: u8, b: u8) -> u8 {
    a ^ b
}

impl Logical for Cpu {
    fn nr(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2());
        self.bitwise_register(inst.r1(), operand, and)
    }

    fn n(&mut self, inst: &Instruction) -> Step {
        let operand = self.load_u32(self.rx_address(inst))?;
        self.bitwise_register(inst.r1(), operand, and)
    }

    fn ni(&mut self, inst: &Instruction) -> Step {
        self.bitwise_immediate(inst, and)
    }

    fn nc(&mut self, inst: &Instruction) -> Step {
        self.bitwise_storage(inst, and_byte)
    }

    fn or(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2());
        self.bitwise_register(inst.r1(), operand, or)
    }

    fn o(&mut self, inst: &Instruction) -> Step {
        let operand = self.load_u32(self.rx_address(inst))?;
        self.bitwise_register(inst.r1(), operand, or)
    }

    fn oi(&mut self, inst: &Instruction) -> Step {
        self.bitwise_immediate(inst, or)
    }

    fn oc(&mut self, inst: &Instruction) -> Step {
        self.bitwise_storage(inst, or_byte)
    }

    fn xr(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2());
        self.bitwise_register(inst.r1(), operand, xor)
    }

    fn x(&mut self, inst: &Instruction) -> Step {
        let operand = self.load_u32(self.rx_address(inst))?;
        self.bitwise_register(inst.r1(), operand, xor)
    }

    fn xi(&mut self, inst: &Instruction) -> Step {
        self.bitwise_immediate(inst, xor)
    }

    fn xc(&mut self, inst: &Instruction) -> Step {
        self.bitwise_storage(inst, xor_byte)
    }

    fn clr(&mut self, inst: &Instruction) -> Step {
        self.psw.cc = cc_compare(self.reg(inst.r1()), self.reg(inst.r2()));
        Ok(())
    }

    fn cl(&mut self, inst: &Instruction) -> Step {
        let operand = self.load_u32(self.rx_address(inst))?;
        self.psw.cc = cc_compare(self.reg(inst.r1()), operand);
        Ok(())
    }

    fn cli(&mut self, inst: &Instruction) -> Step {
        let byte = self.load_u8(self.op1_address(inst))?;
        self.psw.cc = cc_compare(byte, inst.i2());
        Ok(())
    }

    fn clc(&mut self, inst: &Instruction) -> Step {
        let len = inst.l() as u32 + 1;
        let first = self.op1_address(inst);
        let second = self.op2_address(inst);
        self.check(first, len)?;
        self.check(second, len)?;

        self.psw.cc = (0..len)
            .map(|i| {
                let a = self.mem.read_u8(first.wrapping_add(i));
                let b = self.mem.read_u8(second.wrapping_add(i));
                a.cmp(&b)
            })
            .find(|order| *order != Ordering::Equal)
            .map_or(0, |order| cc_compare(order, Ordering::Equal));
        Ok(())
    }

    fn clm(&mut self, inst: &Instruction) -> Step {
        let bytes = self.reg(inst.r1()).to_be_bytes();
        let mut addr = self.op2_address(inst);
        let mut cc = 0;
        for i in masked_bytes(inst.r3() as u8) {
            let byte = self.load_u8(addr)?;
            if cc == 0 {
                cc = cc_compare(bytes[i], byte);
            }
            addr = addr.wrapping_add(1) & ADDRESS_MASK;
        }
        self.psw.cc = cc;
        Ok(())
    }

    fn tm(&mut self, inst: &Instruction) -> Step {
        let mask = inst.i2();
        let selected = self.load_u8(self.op1_address(inst))? & mask;
        self.psw.cc = if selected == 0 {
            0
        } else if selected == mask {
            3
        } else {
            1
        };
        Ok(())
    }

    fn ts(&mut self, inst: &Instruction) -> Step {
        let addr = self.op2_address(inst);
        let byte = self.load_u8(addr)?;
        self.store_u8(addr, 0xFF)?;
        self.psw.cc = byte >> 7;
        Ok(())
    }

    fn cs(&mut self, inst: &Instruction) -> Step {
        let addr = self.op2_address(inst);
        if addr & 0x3 != 0 {
            return Err(Trap::Program(interrupts::SPECIFICATION));
        }
        let current = self.load_u32(addr)?;
        if current == self.reg(inst.r1()) {
            self.store_u32(addr, self.reg(inst.r3()))?;
            self.psw.cc = 0;
        } else {
            self.set_reg(inst.r1(), current);
            self.psw.cc = 1;
        }
        Ok(())
    }

    fn cds(&mut self, inst: &Instruction) -> Step {
        self.even_register(inst.r1())?;
        self.even_register(inst.r3())?;
        let addr = self.op2_address(inst);
        if addr & 0x7 != 0 {
            return Err(Trap::Program(interrupts::SPECIFICATION));
        }
        let current = self.load_u64(addr)?;
        if current == self.regs.read_pair(inst.r1()) {
            self.store_u64(addr, self.regs.read_pair(inst.r3()))?;
            self.psw.cc = 0;
        } else {
            self.regs.write_pair(inst.r1(), current);
            self.psw.cc = 1;
        }
        Ok(())
    }

    fn mvi(&mut self, inst: &Instruction) -> Step {
        self.store_u8(self.op1_address(inst), inst.i2())
    }

    fn mvc(&mut self, inst: &Instruction) -> Step {
        self.storage_to_storage(inst, |_, src| src).map(|_| ())
    }

    fn mvn(&mut self, inst: &Instruction) -> Step {
        self.storage_to_storage(inst, |dest, src| (dest & 0xF0) | (src & 0x0F)).map(|_| ())
    }

    fn mvz(&mut self, inst: &Instruction) -> Step {
        self.storage_to_storage(inst, |dest, src| (dest & 0x0F) | (src & 0xF0)).map(|_| ())
    }

    fn mvcl(&mut self, inst: &Instruction) -> Step {
        let (r1, r2) = (inst.r1(), inst.r2());
        self.even_register(r1)?;
        self.even_register(r2)?;
        let dest = self.long_operand(r1);
        let src = self.long_operand(r2);
        let pad = (self.reg(r2 + 1) >> 24) as u8;
        let moved = dest.len.min(src.len);

        // Destination starts inside the part of the source still to be read
        let offset = dest.addr.wrapping_sub(src.addr) & ADDRESS_MASK;
        if offset != 0 && offset < moved {
            self.psw.cc = 3;
            return Ok(());
        }

        self.check(dest.addr, dest.len)?;
        self.check(src.addr, moved)?;
        for i in 0..dest.len {
            let byte = if i < src.len {
                self.mem.read_u8(src.addr.wrapping_add(i))
            } else {
                pad
            };
            self.mem.write_u8(dest.addr.wrapping_add(i), byte);
        }

        self.psw.cc = cc_compare(dest.len, src.len);
        self.set_long_operand(r1, dest.addr.wrapping_add(dest.len), 0);
        self.set_long_operand(r2, src.addr.wrapping_add(moved), src.len - moved);
        Ok(())
    }

    fn clcl(&mut self, inst: &Instruction) -> Step {
        let (r1, r2) = (inst.r1(), inst.r2());
        self.even_register(r1)?;
        self.even_register(r2)?;
        let first = self.long_operand(r1);
        let second = self.long_operand(r2);
        let pad = (self.reg(r2 + 1) >> 24) as u8;
        self.check(first.addr, first.len)?;
        self.check(second.addr, second.len)?;

        let byte_at = |cpu: &Cpu, op: &LongOperand, i: u32| {
            if i < op.len {
                cpu.mem.read_u8(op.addr.wrapping_add(i))
            } else {
                pad
            }
        };

        let total = first.len.max(second.len);
        let mut index = total;
        let mut cc = 0;
        for i in 0..total {
            let a = byte_at(&*self, &first, i);
            let b = byte_at(&*self, &second, i);
            if a != b {
                cc = cc_compare(a, b);
                index = i;
                break;
            }
        }

        let used1 = index.min(first.len);
        let used2 = index.min(second.len);
        self.psw.cc = cc;
        self.set_long_operand(r1, first.addr.wrapping_add(used1), first.len - used1);
        self.set_long_operand(r2, second.addr.wrapping_add(used2), second.len - used2);
        Ok(())
    }

    fn tr(&mut self, inst: &Instruction) -> Step {
        let len = inst.l() as u32 + 1;
        let first = self.op1_address(inst);
        let table = self.op2_address(inst);
        self.check(first, len)?;

        for i in 0..len {
            let addr = first.wrapping_add(i) & ADDRESS_MASK;
            let byte = self.mem.read_u8(addr);
            let translated = self.load_u8(table.wrapping_add(byte as u32) & ADDRESS_MASK)?;
            self.mem.write_u8(addr, translated);
        }
        Ok(())
    }

    fn trt(&mut self, inst: &Instruction) -> Step {
        let len = inst.l() as u32 + 1;
        let first = self.op1_address(inst);
        let table = self.op2_address(inst);
        self.check(first, len)?;

        for i in 0..len {
            let addr = first.wrapping_add(i) & ADDRESS_MASK;
            let byte = self.mem.read_u8(addr);
            let function = self.load_u8(table.wrapping_add(byte as u32) & ADDRESS_MASK)?;
            if function != 0 {
                let r1 = (self.reg(1) & !ADDRESS_MASK) | addr;
                self.set_reg(1, r1);
                let r2 = (self.reg(2) & 0xFFFF_FF00) | function as u32;
                self.set_reg(2, r2);
                self.psw.cc = if i == len - 1 { 2 } else { 1 };
                return Ok(());
            }
        }
        self.psw.cc = 0;
        Ok(())
    }
}

#[cfg(test)]
mod logical_tests {
    use crate::constants::{interrupts, vectors};
    use crate::instructions::tests::{init_cpu, run_one};
    use crate::psw::Psw;

    #[test]
    fn test_and_or_xor_cc() {
        let mut cpu = init_cpu();
        cpu.set_gpr(1, 0x0F0F);
        cpu.set_gpr(2, 0x00F0);
        run_one(&mut cpu, &[0x14, 0x12]); // NR 1,2
        assert_eq!((cpu.gpr(1), cpu.cc()), (0, 0));
        cpu.set_gpr(1, 0x0F0F);
        run_one(&mut cpu, &[0x16, 0x12]); // OR 1,2
        assert_eq!((cpu.gpr(1), cpu.cc()), (0x0FFF, 1));
        run_one(&mut cpu, &[0x17, 0x11]); // XR 1,1
        assert_eq!((cpu.gpr(1), cpu.cc()), (0, 0));
    }

    #[test]
    fn test_immediate_forms() {
        let mut cpu = init_cpu();
        cpu.poke_u8(0x2000, 0xF0);
        cpu.set_gpr(3, 0x2000);
        run_one(&mut cpu, &[0x96, 0x0F, 0x30, 0x00]); // OI 0(3),X'0F'
        assert_eq!(cpu.peek_u8(0x2000), 0xFF);
        run_one(&mut cpu, &[0x97, 0xFF, 0x30, 0x00]); // XI 0(3),X'FF'
        assert_eq!((cpu.peek_u8(0x2000), cpu.cc()), (0, 0));
        run_one(&mut cpu, &[0x92, 0x81, 0x30, 0x00]); // MVI 0(3),X'81'
        run_one(&mut cpu, &[0x95, 0x80, 0x30, 0x00]); // CLI 0(3),X'80'
        assert_eq!(cpu.cc(), 2);
    }

    #[test]
    fn test_under_mask() {
        let mut cpu = init_cpu();
        cpu.poke_u8(0x2000, 0b1010_0000);
        cpu.set_gpr(3, 0x2000);
        run_one(&mut cpu, &[0x91, 0xA0, 0x30, 0x00]); // TM 0(3),X'A0'
        assert_eq!(cpu.cc(), 3);
        run_one(&mut cpu, &[0x91, 0xF0, 0x30, 0x00]);
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0x91, 0x0F, 0x30, 0x00]);
        assert_eq!(cpu.cc(), 0);

        cpu.set_gpr(1, 0x00A0_0000);
        cpu.poke_bytes(0x2001, &[0x00, 0xA0]);
        cpu.set_gpr(4, 0x2001);
        run_one(&mut cpu, &[0xBD, 0x1C, 0x40, 0x00]); // CLM 1,B'1100',0(4)
        assert_eq!(cpu.cc(), 0);
    }

    #[test]
    fn test_mvc_propagates() {
        let mut cpu = init_cpu();
        cpu.poke_u8(0x2000, 0x40);
        cpu.set_gpr(5, 0x2000);
        run_one(&mut cpu, &[0xD2, 0x06, 0x50, 0x01, 0x50, 0x00]); // MVC 1(7,5),0(5)
        assert_eq!(cpu.peek_u64(0x2000), 0x4040_4040_4040_4040);
    }

    #[test]
    fn test_move_numerics_and_zones() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x2000, &[0xF1, 0xF2]);
        cpu.poke_bytes(0x2010, &[0x3C, 0x4D]);
        cpu.set_gpr(6, 0x2000);
        run_one(&mut cpu, &[0xD1, 0x01, 0x60, 0x00, 0x60, 0x10]); // MVN 0(2,6),16(6)
        assert_eq!(cpu.peek_u16(0x2000), 0xFCFD);
        run_one(&mut cpu, &[0xD3, 0x00, 0x60, 0x00, 0x60, 0x10]); // MVZ 0(1,6),16(6)
        assert_eq!(cpu.peek_u8(0x2000), 0x3C);
    }

    #[test]
    fn test_clc() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x2000, b"ABCD");
        cpu.poke_bytes(0x2100, b"ABCE");
        cpu.set_gpr(7, 0x2000);
        run_one(&mut cpu, &[0xD5, 0x03, 0x70, 0x00, 0x71, 0x00]); // CLC 0(4,7),256(7)
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0xD5, 0x02, 0x70, 0x00, 0x71, 0x00]); // CLC 0(3,7),256(7)
        assert_eq!(cpu.cc(), 0);
    }

    #[test]
    fn test_test_and_set() {
        let mut cpu = init_cpu();
        cpu.set_gpr(2, 0x2000);
        run_one(&mut cpu, &[0x93, 0x00, 0x20, 0x00]); // TS 0(2)
        assert_eq!((cpu.peek_u8(0x2000), cpu.cc()), (0xFF, 0));
        run_one(&mut cpu, &[0x93, 0x00, 0x20, 0x00]);
        assert_eq!(cpu.cc(), 1);
    }

    #[test]
    fn test_compare_and_swap() {
        let mut cpu = init_cpu();
        cpu.poke_u32(0x2000, 5);
        cpu.set_gpr(2, 0x2000);
        cpu.set_gpr(4, 5);
        cpu.set_gpr(6, 9);
        run_one(&mut cpu, &[0xBA, 0x46, 0x20, 0x00]); // CS 4,6,0(2)
        assert_eq!((cpu.peek_u32(0x2000), cpu.cc()), (9, 0));
        run_one(&mut cpu, &[0xBA, 0x46, 0x20, 0x00]);
        assert_eq!((cpu.gpr(4), cpu.cc()), (9, 1));

        run_one(&mut cpu, &[0xBA, 0x46, 0x20, 0x02]); // misaligned
        let old = Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW));
        assert_eq!(old.interruption_code, interrupts::SPECIFICATION);
    }

    #[test]
    fn test_mvcl_pads_and_updates_registers() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x3000, &[1, 2, 3]);
        cpu.set_gpr(2, 0x4000);
        cpu.set_gpr(3, 5);
        cpu.set_gpr(4, 0x3000);
        cpu.set_gpr(5, 0x4000_0003);
        run_one(&mut cpu, &[0x0E, 0x24]); // MVCL 2,4
        let mut out = [0u8; 5];
        cpu.peek_bytes(0x4000, &mut out);
        assert_eq!(out, [1, 2, 3, 0x40, 0x40]);
        assert_eq!(cpu.cc(), 2);
        assert_eq!((cpu.gpr(2), cpu.gpr(3)), (0x4005, 0));
        assert_eq!((cpu.gpr(4), cpu.gpr(5)), (0x3003, 0x4000_0000));
    }

    #[test]
    fn test_mvcl_destructive_overlap() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x3000, &[1, 2, 3, 4]);
        cpu.set_gpr(2, 0x3001);
        cpu.set_gpr(3, 3);
        cpu.set_gpr(4, 0x3000);
        cpu.set_gpr(5, 3);
        run_one(&mut cpu, &[0x0E, 0x24]);
        assert_eq!(cpu.cc(), 3);
        assert_eq!(cpu.peek_u32(0x3000), 0x0102_0304);
        assert_eq!(cpu.gpr(2), 0x3001);
    }

    #[test]
    fn test_clcl_with_padding() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x3000, &[b'A', b'B', 0x40, b'Z']);
        cpu.poke_bytes(0x4000, &[b'A', b'B']);
        cpu.set_gpr(2, 0x3000);
        cpu.set_gpr(3, 4);
        cpu.set_gpr(4, 0x4000);
        cpu.set_gpr(5, 0x4000_0002);
        run_one(&mut cpu, &[0x0F, 0x24]); // CLCL 2,4
        assert_eq!(cpu.cc(), 2);
        assert_eq!((cpu.gpr(2), cpu.gpr(3)), (0x3003, 1));
        assert_eq!((cpu.gpr(4), cpu.gpr(5)), (0x4002, 0x4000_0000));
    }

    #[test]
    fn test_translate() {
        let mut cpu = init_cpu();
        for i in 0..=255u32 {
            cpu.poke_u8(0x5000 + i, (i as u8).wrapping_add(1));
        }
        cpu.poke_bytes(0x2000, &[0x00, 0x10, 0xFF]);
        cpu.set_gpr(8, 0x2000);
        cpu.set_gpr(9, 0x5000);
        run_one(&mut cpu, &[0xDC, 0x02, 0x80, 0x00, 0x90, 0x00]); // TR 0(3,8),0(9)
        let mut out = [0u8; 3];
        cpu.peek_bytes(0x2000, &mut out);
        assert_eq!(out, [0x01, 0x11, 0x00]);
    }

    #[test]
    fn test_translate_and_test() {
        let mut cpu = init_cpu();
        cpu.poke_u8(0x5000 + b',' as u32, 0x04);
        cpu.poke_bytes(0x2000, b"AB,C");
        cpu.set_gpr(1, 0x7F00_0000);
        cpu.set_gpr(2, 0x1234_5600);
        cpu.set_gpr(8, 0x2000);
        cpu.set_gpr(9, 0x5000);
        run_one(&mut cpu, &[0xDD, 0x03, 0x80, 0x00, 0x90, 0x00]); // TRT 0(4,8),0(9)
        assert_eq!(cpu.cc(), 1);
        assert_eq!(cpu.gpr(1), 0x7F00_2002);
        assert_eq!(cpu.gpr(2), 0x1234_5604);

        run_one(&mut cpu, &[0xDD, 0x01, 0x80, 0x00, 0x90, 0x00]); // TRT 0(2,8),0(9)
        assert_eq!(cpu.cc(), 0);
    }
}

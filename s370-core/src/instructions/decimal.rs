use super::Instruction;
use crate::constants::interrupts;
use crate::cpu::Cpu;
use crate::error::{Step, Trap};
use crate::utils::{cc_compare, encode_packed, parse_packed};

// SS operands are at most 16 bytes
const FIELD_MAX: usize = 16;

type Field = [u8; FIELD_MAX];

/// Packed and zoned decimal conversion and arithmetic
pub trait Decimal {
    fn pack(&mut self, inst: &Instruction) -> Step;
    fn unpk(&mut self, inst: &Instruction) -> Step; // Unpack
    fn mvo(&mut self, inst: &Instruction) -> Step; // Move with offset
    fn cvb(&mut self, inst: &Instruction) -> Step; // Convert to binary
    fn cvd(&mut self, inst: &Instruction) -> Step; // Convert to decimal
    fn zap(&mut self, inst: &Instruction) -> Step; // Zero and add
    fn ap(&mut self, inst: &Instruction) -> Step; // Add decimal
    fn sp(&mut self, inst: &Instruction) -> Step; // Subtract decimal
    fn cp(&mut self, inst: &Instruction) -> Step; // Compare decimal
}

fn swap_nibbles(byte: u8) -> u8 {
    byte.rotate_left(4)
}

/// Both operands of an SS instruction with two length fields
struct Operands {
    dest: u32,
    dest_len: usize,
    src: Field,
    src_len: usize,
}

impl Cpu {
    fn read_field(&self, addr: u32, len: usize) -> Result<Field, Trap> {
        self.check(addr, len as u32)?;
        let mut field = [0; FIELD_MAX];
        self.mem.read_bytes(addr, &mut field[..len]);
        Ok(field)
    }

    fn decimal_operands(&self, inst: &Instruction) -> Result<Operands, Trap> {
        let dest = self.op1_address(inst);
        let dest_len = inst.l1() as usize + 1;
        let src_len = inst.l2() as usize + 1;
        self.check(dest, dest_len as u32)?;
        Ok(Operands {
            dest,
            dest_len,
            src: self.read_field(self.op2_address(inst), src_len)?,
            src_len,
        })
    }

    fn packed(&self, addr: u32, len: usize) -> Result<i128, Trap> {
        let field = self.read_field(addr, len)?;
        parse_packed(&field[..len]).ok_or(Trap::Program(interrupts::DATA))
    }

    /// Store a packed result and set CC, overflow being CC 3 plus a maskable
    /// decimal-overflow interruption
    fn decimal_result(&mut self, addr: u32, len: usize, value: i128) -> Step {
        let mut field = [0; FIELD_MAX];
        let overflow = encode_packed(value, &mut field[..len]);
        self.mem.write_bytes(addr, &field[..len]);
        if overflow {
            self.psw.cc = 3;
            self.maskable(self.psw.decimal_overflow_enabled(), interrupts::DECIMAL_OVERFLOW)
        } else {
            self.psw.cc = cc_compare(value, 0);
            Ok(())
        }
    }

    /// Both operands are validated before anything is stored
    fn decimal_arithmetic(&mut self, inst: &Instruction, subtract: bool) -> Step {
        let dest = self.op1_address(inst);
        let dest_len = inst.l1() as usize + 1;
        let first = self.packed(dest, dest_len)?;
        let second = self.packed(self.op2_address(inst), inst.l2() as usize + 1)?;
        let result = if subtract { first - second } else { first + second };
        self.decimal_result(dest, dest_len, result)
    }
}

impl Decimal for Cpu {
    fn pack(&mut self, inst: &Instruction) -> Step {
        let ops = self.decimal_operands(inst)?;
        let src = &ops.src[..ops.src_len];
        let mut out = [0; FIELD_MAX];

        out[ops.dest_len - 1] = swap_nibbles(src[ops.src_len - 1]);
        let mut digits = src[..ops.src_len - 1].iter().rev().map(|b| b & 0xF);
        for byte in out[..ops.dest_len - 1].iter_mut().rev() {
            let low = digits.next().unwrap_or(0);
            let high = digits.next().unwrap_or(0);
            *byte = high << 4 | low;
        }

        self.mem.write_bytes(ops.dest, &out[..ops.dest_len]);
        Ok(())
    }

    fn unpk(&mut self, inst: &Instruction) -> Step {
        let ops = self.decimal_operands(inst)?;
        let src = &ops.src[..ops.src_len];
        let mut out = [0; FIELD_MAX];

        out[ops.dest_len - 1] = swap_nibbles(src[ops.src_len - 1]);
        let mut digits = src[..ops.src_len - 1].iter().rev().flat_map(|b| [b & 0xF, b >> 4]);
        for byte in out[..ops.dest_len - 1].iter_mut().rev() {
            *byte = 0xF0 | digits.next().unwrap_or(0);
        }

        self.mem.write_bytes(ops.dest, &out[..ops.dest_len]);
        Ok(())
    }

    fn mvo(&mut self, inst: &Instruction) -> Step {
        let ops = self.decimal_operands(inst)?;
        let src = &ops.src[..ops.src_len];
        let sign = self.mem.read_u8(ops.dest.wrapping_add(ops.dest_len as u32 - 1)) & 0xF;
        let mut out = [0; FIELD_MAX];

        let mut digits = src.iter().rev().flat_map(|b| [b & 0xF, b >> 4]);
        out[ops.dest_len - 1] = digits.next().unwrap_or(0) << 4 | sign;
        for byte in out[..ops.dest_len - 1].iter_mut().rev() {
            let low = digits.next().unwrap_or(0);
            let high = digits.next().unwrap_or(0);
            *byte = high << 4 | low;
        }

        self.mem.write_bytes(ops.dest, &out[..ops.dest_len]);
        Ok(())
    }

    fn cvb(&mut self, inst: &Instruction) -> Step {
        let value = self.packed(self.rx_address(inst), 8)?;
        let value = i32::try_from(value).map_err(|_| Trap::Program(interrupts::FIXED_POINT_DIVIDE))?;
        self.set_reg(inst.r1(), value as u32);
        Ok(())
    }

    fn cvd(&mut self, inst: &Instruction) -> Step {
        let addr = self.rx_address(inst);
        self.check(addr, 8)?;
        let mut field = [0; 8];
        encode_packed(self.reg(inst.r1()) as i32 as i128, &mut field);
        self.mem.write_bytes(addr, &field);
        Ok(())
    }

    fn zap(&mut self, inst: &Instruction) -> Step {
        let dest = self.op1_address(inst);
        let dest_len = inst.l1() as usize + 1;
        self.check(dest, dest_len as u32)?;
        let value = self.packed(self.op2_address(inst), inst.l2() as usize + 1)?;
        self.decimal_result(dest, dest_len, value)
    }

    fn ap(&mut self, inst: &Instruction) -> Step {
        self.decimal_arithmetic(inst, false)
    }

    fn sp(&mut self, inst: &Instruction) -> Step {
        self.decimal_arithmetic(inst, true)
    }

    fn cp(&mut self, inst: &Instruction) -> Step {
        let first = self.packed(self.op1_address(inst), inst.l1() as usize + 1)?;
        let second = self.packed(self.op2_address(inst), inst.l2() as usize + 1)?;
        self.psw.cc = cc_compare(first, second);
        Ok(())
    }
}

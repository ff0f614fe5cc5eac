use super::Instruction;
use crate::constants::interrupts;
use crate::cpu::Cpu;
use crate::error::{Step, Trap};
use crate::utils::{add_logical, cc_compare, cc_signed, shift_left_double, shift_left_single, sub_logical};

/// Fixed-point (binary) arithmetic, comparison and shifts
pub trait FixedPoint {
    fn ltr(&mut self, inst: &Instruction) -> Step; // Load and test
    fn lcr(&mut self, inst: &Instruction) -> Step; // Load complement
    fn lpr(&mut self, inst: &Instruction) -> Step; // Load positive
    fn lnr(&mut self, inst: &Instruction) -> Step; // Load negative
    fn ar(&mut self, inst: &Instruction) -> Step;
    fn a(&mut self, inst: &Instruction) -> Step;
    fn ah(&mut self, inst: &Instruction) -> Step;
    fn sr(&mut self, inst: &Instruction) -> Step;
    fn s(&mut self, inst: &Instruction) -> Step;
    fn sh(&mut self, inst: &Instruction) -> Step;
    fn alr(&mut self, inst: &Instruction) -> Step; // Add logical
    fn al(&mut self, inst: &Instruction) -> Step;
    fn slr(&mut self, inst: &Instruction) -> Step; // Subtract logical
    fn sl(&mut self, inst: &Instruction) -> Step;
    fn mr(&mut self, inst: &Instruction) -> Step;
    fn m(&mut self, inst: &Instruction) -> Step;
    fn mh(&mut self, inst: &Instruction) -> Step;
    fn dr(&mut self, inst: &Instruction) -> Step;
    fn d(&mut self, inst: &Instruction) -> Step;
    fn cr(&mut self, inst: &Instruction) -> Step;
    fn c(&mut self, inst: &Instruction) -> Step;
    fn ch(&mut self, inst: &Instruction) -> Step;
    fn sla(&mut self, inst: &Instruction) -> Step;
    fn sra(&mut self, inst: &Instruction) -> Step;
    fn sll(&mut self, inst: &Instruction) -> Step;
    fn srl(&mut self, inst: &Instruction) -> Step;
    fn slda(&mut self, inst: &Instruction) -> Step;
    fn srda(&mut self, inst: &Instruction) -> Step;
    fn sldl(&mut self, inst: &Instruction) -> Step;
    fn srdl(&mut self, inst: &Instruction) -> Step;
    fn spm(&mut self, inst: &Instruction) -> Step; // Set program mask
}

impl Cpu {
    /// CC 0/1/2 from the result, or CC 3 plus a maskable interrupt on overflow.
    /// The result has already been stored.
    fn fixed_result(&mut self, result: i64, overflow: bool) -> Step {
        if overflow {
            self.psw.cc = 3;
            self.maskable(self.psw.fixed_overflow_enabled(), interrupts::FIXED_POINT_OVERFLOW)
        } else {
            self.psw.cc = cc_signed(result);
            Ok(())
        }
    }

    fn add_to(&mut self, r1: usize, operand: i32) -> Step {
        let (sum, overflow) = (self.reg(r1) as i32).overflowing_add(operand);
        self.set_reg(r1, sum as u32);
        self.fixed_result(sum as i64, overflow)
    }

    fn subtract_from(&mut self, r1: usize, operand: i32) -> Step {
        let (diff, overflow) = (self.reg(r1) as i32).overflowing_sub(operand);
        self.set_reg(r1, diff as u32);
        self.fixed_result(diff as i64, overflow)
    }

    fn multiply_pair(&mut self, r1: usize, operand: i32) -> Step {
        self.even_register(r1)?;
        let product = self.reg(r1 + 1) as i32 as i64 * operand as i64;
        self.regs.write_pair(r1, product as u64);
        Ok(())
    }

    /// Quotient to R1+1, remainder (sign of the dividend) to R1
    fn divide_pair(&mut self, r1: usize, divisor: i32) -> Step {
        self.even_register(r1)?;
        let dividend = self.regs.read_pair(r1) as i64;
        let quotient = dividend
            .checked_div(divisor as i64)
            .filter(|q| i32::try_from(*q).is_ok())
            .ok_or(Trap::Program(interrupts::FIXED_POINT_DIVIDE))?;
        let remainder = dividend % divisor as i64;
        self.set_reg(r1, remainder as u32);
        self.set_reg(r1 + 1, quotient as u32);
        Ok(())
    }

    fn shift_amount(&self, inst: &Instruction) -> u32 {
        self.op2_address(inst) & 0x3F
    }

    fn halfword_operand(&self, inst: &Instruction) -> Result<i32, Trap> {
        Ok(self.load_u16(self.rx_address(inst))? as i16 as i32)
    }

    fn fullword_operand(&self, inst: &Instruction) -> Result<u32, Trap> {
        self.load_u32(self.rx_address(inst))
    }
}

impl FixedPoint for Cpu {
    fn ltr(&mut self, inst: &Instruction) -> Step {
        let value = self.reg(inst.r2());
        self.set_reg(inst.r1(), value);
        self.psw.cc = cc_signed(value as i32 as i64);
        Ok(())
    }

    fn lcr(&mut self, inst: &Instruction) -> Step {
        // Complementing the maximum negative number overflows and leaves it unchanged
        let (result, overflow) = (self.reg(inst.r2()) as i32).overflowing_neg();
        self.set_reg(inst.r1(), result as u32);
        self.fixed_result(result as i64, overflow)
    }

    fn lpr(&mut self, inst: &Instruction) -> Step {
        let value = self.reg(inst.r2()) as i32;
        let (result, overflow) = if value < 0 { value.overflowing_neg() } else { (value, false) };
        self.set_reg(inst.r1(), result as u32);
        self.fixed_result(result as i64, overflow)
    }

    fn lnr(&mut self, inst: &Instruction) -> Step {
        let value = self.reg(inst.r2()) as i32;
        let result = if value > 0 { -value } else { value };
        self.set_reg(inst.r1(), result as u32);
        self.fixed_result(result as i64, false)
    }

    fn ar(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2()) as i32;
        self.add_to(inst.r1(), operand)
    }

    fn a(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)? as i32;
        self.add_to(inst.r1(), operand)
    }

    fn ah(&mut self, inst: &Instruction) -> Step {
        let operand = self.halfword_operand(inst)?;
        self.add_to(inst.r1(), operand)
    }

    fn sr(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2()) as i32;
        self.subtract_from(inst.r1(), operand)
    }

    fn s(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)? as i32;
        self.subtract_from(inst.r1(), operand)
    }

    fn sh(&mut self, inst: &Instruction) -> Step {
        let operand = self.halfword_operand(inst)?;
        self.subtract_from(inst.r1(), operand)
    }

    fn alr(&mut self, inst: &Instruction) -> Step {
        let (sum, cc) = add_logical(self.reg(inst.r1()), self.reg(inst.r2()));
        self.set_reg(inst.r1(), sum);
        self.psw.cc = cc;
        Ok(())
    }

    fn al(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)?;
        let (sum, cc) = add_logical(self.reg(inst.r1()), operand);
        self.set_reg(inst.r1(), sum);
        self.psw.cc = cc;
        Ok(())
    }

    fn slr(&mut self, inst: &Instruction) -> Step {
        let (diff, cc) = sub_logical(self.reg(inst.r1()), self.reg(inst.r2()));
        self.set_reg(inst.r1(), diff);
        self.psw.cc = cc;
        Ok(())
    }

    fn sl(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)?;
        let (diff, cc) = sub_logical(self.reg(inst.r1()), operand);
        self.set_reg(inst.r1(), diff);
        self.psw.cc = cc;
        Ok(())
    }

    fn mr(&mut self, inst: &Instruction) -> Step {
        let operand = self.reg(inst.r2()) as i32;
        self.multiply_pair(inst.r1(), operand)
    }

    fn m(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)? as i32;
        self.multiply_pair(inst.r1(), operand)
    }

    fn mh(&mut self, inst: &Instruction) -> Step {
        // Low-order 32 bits only, no overflow indication
        let operand = self.halfword_operand(inst)?;
        let product = (self.reg(inst.r1()) as i32).wrapping_mul(operand);
        self.set_reg(inst.r1(), product as u32);
        Ok(())
    }

    fn dr(&mut self, inst: &Instruction) -> Step {
        let divisor = self.reg(inst.r2()) as i32;
        self.divide_pair(inst.r1(), divisor)
    }

    fn d(&mut self, inst: &Instruction) -> Step {
        let divisor = self.fullword_operand(inst)? as i32;
        self.divide_pair(inst.r1(), divisor)
    }

    fn cr(&mut self, inst: &Instruction) -> Step {
        self.psw.cc = cc_compare(self.reg(inst.r1()) as i32, self.reg(inst.r2()) as i32);
        Ok(())
    }

    fn c(&mut self, inst: &Instruction) -> Step {
        let operand = self.fullword_operand(inst)? as i32;
        self.psw.cc = cc_compare(self.reg(inst.r1()) as i32, operand);
        Ok(())
    }

    fn ch(&mut self, inst: &Instruction) -> Step {
        let operand = self.halfword_operand(inst)?;
        self.psw.cc = cc_compare(self.reg(inst.r1()) as i32, operand);
        Ok(())
    }

    fn sla(&mut self, inst: &Instruction) -> Step {
        let (result, overflow) = shift_left_single(self.reg(inst.r1()), self.shift_amount(inst));
        self.set_reg(inst.r1(), result);
        self.fixed_result(result as i32 as i64, overflow)
    }

    fn sra(&mut self, inst: &Instruction) -> Step {
        let amount = self.shift_amount(inst).min(31);
        let result = (self.reg(inst.r1()) as i32) >> amount;
        self.set_reg(inst.r1(), result as u32);
        self.fixed_result(result as i64, false)
    }

    fn sll(&mut self, inst: &Instruction) -> Step {
        let result = ((self.reg(inst.r1()) as u64) << self.shift_amount(inst)) as u32;
        self.set_reg(inst.r1(), result);
        Ok(())
    }

    fn srl(&mut self, inst: &Instruction) -> Step {
        let result = ((self.reg(inst.r1()) as u64) >> self.shift_amount(inst)) as u32;
        self.set_reg(inst.r1(), result);
        Ok(())
    }

    fn slda(&mut self, inst: &Instruction) -> Step {
        self.even_register(inst.r1())?;
        let (result, overflow) = shift_left_double(self.regs.read_pair(inst.r1()), self.shift_amount(inst));
        self.regs.write_pair(inst.r1(), result);
        self.fixed_result(result as i64, overflow)
    }

    fn srda(&mut self, inst: &Instruction) -> Step {
        self.even_register(inst.r1())?;
        let amount = self.shift_amount(inst).min(63);
        let result = (self.regs.read_pair(inst.r1()) as i64) >> amount;
        self.regs.write_pair(inst.r1(), result as u64);
        self.fixed_result(result, false)
    }

    fn sldl(&mut self, inst: &Instruction) -> Step {
        self.even_register(inst.r1())?;
        let result = ((self.regs.read_pair(inst.r1()) as u128) << self.shift_amount(inst)) as u64;
        self.regs.write_pair(inst.r1(), result);
        Ok(())
    }

    fn srdl(&mut self, inst: &Instruction) -> Step {
        self.even_register(inst.r1())?;
        let result = self.regs.read_pair(inst.r1()) >> self.shift_amount(inst);
        self.regs.write_pair(inst.r1(), result);
        Ok(())
    }

    fn spm(&mut self, inst: &Instruction) -> Step {
        let value = self.reg(inst.r1());
        self.psw.cc = ((value >> 28) & 0x3) as u8;
        self.psw.program_mask = ((value >> 24) & 0xF) as u8;
        Ok(())
    }
}

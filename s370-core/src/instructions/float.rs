use super::Instruction;
use crate::constants::interrupts;
use crate::cpu::Cpu;
use crate::error::{Step, Trap};
use crate::hfp::{self, Hfp, Outcome, Precision};
use crate::utils::cc_compare;
use core::cmp::Ordering;

const SIGN_SHORT: u32 = 0x8000_0000;
const SIGN_LONG: u64 = 0x8000_0000_0000_0000;

/// Hexadecimal floating point, short (E) and long (D) formats
pub trait FloatingPoint {
    // Loads and stores
    fn ler(&mut self, inst: &Instruction) -> Step;
    fn le(&mut self, inst: &Instruction) -> Step;
    fn ldr(&mut self, inst: &Instruction) -> Step;
    fn ld(&mut self, inst: &Instruction) -> Step;
    fn ste(&mut self, inst: &Instruction) -> Step;
    fn std(&mut self, inst: &Instruction) -> Step;

    // Sign manipulation, CC from the result
    fn lter(&mut self, inst: &Instruction) -> Step; // Load and test
    fn ltdr(&mut self, inst: &Instruction) -> Step;
    fn lcer(&mut self, inst: &Instruction) -> Step; // Load complement
    fn lcdr(&mut self, inst: &Instruction) -> Step;
    fn lper(&mut self, inst: &Instruction) -> Step; // Load positive
    fn lpdr(&mut self, inst: &Instruction) -> Step;
    fn lner(&mut self, inst: &Instruction) -> Step; // Load negative
    fn lndr(&mut self, inst: &Instruction) -> Step;

    fn her(&mut self, inst: &Instruction) -> Step; // Halve
    fn hdr(&mut self, inst: &Instruction) -> Step;

    // Normalized add/subtract
    fn aer(&mut self, inst: &Instruction) -> Step;
    fn ae(&mut self, inst: &Instruction) -> Step;
    fn adr(&mut self, inst: &Instruction) -> Step;
    fn ad(&mut self, inst: &Instruction) -> Step;
    fn ser(&mut self, inst: &Instruction) -> Step;
    fn se(&mut self, inst: &Instruction) -> Step;
    fn sdr(&mut self, inst: &Instruction) -> Step;
    fn sd(&mut self, inst: &Instruction) -> Step;

    // Unnormalized add/subtract
    fn aur(&mut self, inst: &Instruction) -> Step;
    fn au(&mut self, inst: &Instruction) -> Step;
    fn awr(&mut self, inst: &Instruction) -> Step;
    fn aw(&mut self, inst: &Instruction) -> Step;
    fn sur(&mut self, inst: &Instruction) -> Step;
    fn su(&mut self, inst: &Instruction) -> Step;
    fn swr(&mut self, inst: &Instruction) -> Step;
    fn sw(&mut self, inst: &Instruction) -> Step;

    // Multiply and divide, CC unchanged
    fn mer(&mut self, inst: &Instruction) -> Step;
    fn me(&mut self, inst: &Instruction) -> Step;
    fn mdr(&mut self, inst: &Instruction) -> Step;
    fn md(&mut self, inst: &Instruction) -> Step;
    fn der(&mut self, inst: &Instruction) -> Step;
    fn de(&mut self, inst: &Instruction) -> Step;
    fn ddr(&mut self, inst: &Instruction) -> Step;
    fn dd(&mut self, inst: &Instruction) -> Step;

    fn cer(&mut self, inst: &Instruction) -> Step; // Compare
    fn ce(&mut self, inst: &Instruction) -> Step;
    fn cdr(&mut self, inst: &Instruction) -> Step;
    fn cd(&mut self, inst: &Instruction) -> Step;
}

/// Only registers 0, 2, 4 and 6 exist
fn fpr(r: usize) -> Result<usize, Trap> {
    if r & 1 == 0 && r <= 6 {
        Ok(r)
    } else {
        Err(Trap::Program(interrupts::SPECIFICATION))
    }
}

impl Cpu {
    fn read_fpr(&self, r: usize, p: Precision) -> Hfp {
        match p {
            Precision::Short => Hfp::from_short(self.regs.read_short(r)),
            Precision::Long => Hfp::from_long(self.regs.read_long(r)),
        }
    }

    fn write_fpr(&mut self, r: usize, value: &Hfp, p: Precision) {
        match p {
            Precision::Short => self.regs.write_short(r, value.to_short()),
            Precision::Long => self.regs.write_long(r, value.to_long()),
        }
    }

    /// (R1, second operand) of an RR floating instruction
    fn float_rr(&self, inst: &Instruction, p: Precision) -> Result<(usize, Hfp), Trap> {
        let r1 = fpr(inst.r1())?;
        let r2 = fpr(inst.r2())?;
        Ok((r1, self.read_fpr(r2, p)))
    }

    /// (R1, second operand) of an RX floating instruction
    fn float_rx(&self, inst: &Instruction, p: Precision) -> Result<(usize, Hfp), Trap> {
        let r1 = fpr(inst.r1())?;
        let addr = self.rx_address(inst);
        let operand = match p {
            Precision::Short => Hfp::from_short(self.load_u32(addr)?),
            Precision::Long => Hfp::from_long(self.load_u64(addr)?),
        };
        Ok((r1, operand))
    }

    /// Store what the program mask lets through, then raise whatever it doesn't
    fn deliver(&mut self, r1: usize, outcome: Outcome, p: Precision, set_cc: bool) -> Step {
        let (value, code) = outcome.resolve(
            self.psw.exponent_underflow_enabled(),
            self.psw.significance_enabled(),
        );
        if let Some(value) = value {
            self.write_fpr(r1, &value, p);
            if set_cc {
                self.psw.cc = value.cc();
            }
        }
        match code {
            Some(code) => Err(Trap::Program(code)),
            None => Ok(()),
        }
    }

    fn float_add(&mut self, r1: usize, operand: Hfp, p: Precision, normalize: bool) -> Step {
        let outcome = hfp::add(&self.read_fpr(r1, p), &operand, p, normalize);
        self.deliver(r1, outcome, p, true)
    }

    fn float_multiply(&mut self, r1: usize, operand: Hfp, p: Precision) -> Step {
        // Short operands give a long product
        let outcome = hfp::multiply(&self.read_fpr(r1, p), &operand, p, Precision::Long);
        self.deliver(r1, outcome, Precision::Long, false)
    }

    fn float_divide(&mut self, r1: usize, operand: Hfp, p: Precision) -> Step {
        let outcome = hfp::divide(&self.read_fpr(r1, p), &operand, p);
        self.deliver(r1, outcome, p, false)
    }

    fn float_compare(&mut self, r1: usize, operand: Hfp, p: Precision) -> Step {
        let order = hfp::compare(&self.read_fpr(r1, p), &operand, p);
        self.psw.cc = cc_compare(order, Ordering::Equal);
        Ok(())
    }

    /// RR sign operations on the raw short image
    fn sign_short(&mut self, inst: &Instruction, op: fn(u32) -> u32) -> Step {
        let r1 = fpr(inst.r1())?;
        let r2 = fpr(inst.r2())?;
        let result = op(self.regs.read_short(r2));
        self.regs.write_short(r1, result);
        self.psw.cc = Hfp::from_short(result).cc();
        Ok(())
    }

    fn sign_long(&mut self, inst: &Instruction, op: fn(u64) -> u64) -> Step {
        let r1 = fpr(inst.r1())?;
        let r2 = fpr(inst.r2())?;
        let result = op(self.regs.read_long(r2));
        self.regs.write_long(r1, result);
        self.psw.cc = Hfp::from_long(result).cc();
        Ok(())
    }

    fn float_halve(&mut self, inst: &Instruction, p: Precision) -> Step {
        let (r1, operand) = self.float_rr(inst, p)?;
        self.deliver(r1, hfp::halve(&operand, p), p, false)
    }
}

impl FloatingPoint for Cpu {
    fn ler(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.regs.write_short(r1, operand.to_short());
        Ok(())
    }

    fn le(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.regs.write_short(r1, operand.to_short());
        Ok(())
    }

    fn ldr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.regs.write_long(r1, operand.to_long());
        Ok(())
    }

    fn ld(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.regs.write_long(r1, operand.to_long());
        Ok(())
    }

    fn ste(&mut self, inst: &Instruction) -> Step {
        let r1 = fpr(inst.r1())?;
        self.store_u32(self.rx_address(inst), self.regs.read_short(r1))
    }

    fn std(&mut self, inst: &Instruction) -> Step {
        let r1 = fpr(inst.r1())?;
        self.store_u64(self.rx_address(inst), self.regs.read_long(r1))
    }

    fn lter(&mut self, inst: &Instruction) -> Step {
        self.sign_short(inst, |v| v)
    }

    fn ltdr(&mut self, inst: &Instruction) -> Step {
        self.sign_long(inst, |v| v)
    }

    fn lcer(&mut self, inst: &Instruction) -> Step {
        self.sign_short(inst, |v| v ^ SIGN_SHORT)
    }

    fn lcdr(&mut self, inst: &Instruction) -> Step {
        self.sign_long(inst, |v| v ^ SIGN_LONG)
    }

    fn lper(&mut self, inst: &Instruction) -> Step {
        self.sign_short(inst, |v| v & !SIGN_SHORT)
    }

    fn lpdr(&mut self, inst: &Instruction) -> Step {
        self.sign_long(inst, |v| v & !SIGN_LONG)
    }

    fn lner(&mut self, inst: &Instruction) -> Step {
        self.sign_short(inst, |v| v | SIGN_SHORT)
    }

    fn lndr(&mut self, inst: &Instruction) -> Step {
        self.sign_long(inst, |v| v | SIGN_LONG)
    }

    fn her(&mut self, inst: &Instruction) -> Step {
        self.float_halve(inst, Precision::Short)
    }

    fn hdr(&mut self, inst: &Instruction) -> Step {
        self.float_halve(inst, Precision::Long)
    }

    fn aer(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_add(r1, operand, Precision::Short, true)
    }

    fn ae(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_add(r1, operand, Precision::Short, true)
    }

    fn adr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_add(r1, operand, Precision::Long, true)
    }

    fn ad(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_add(r1, operand, Precision::Long, true)
    }

    fn ser(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_add(r1, operand.negate(), Precision::Short, true)
    }

    fn se(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_add(r1, operand.negate(), Precision::Short, true)
    }

    fn sdr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_add(r1, operand.negate(), Precision::Long, true)
    }

    fn sd(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_add(r1, operand.negate(), Precision::Long, true)
    }

    fn aur(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_add(r1, operand, Precision::Short, false)
    }

    fn au(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_add(r1, operand, Precision::Short, false)
    }

    fn awr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_add(r1, operand, Precision::Long, false)
    }

    fn aw(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_add(r1, operand, Precision::Long, false)
    }

    fn sur(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_add(r1, operand.negate(), Precision::Short, false)
    }

    fn su(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_add(r1, operand.negate(), Precision::Short, false)
    }

    fn swr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_add(r1, operand.negate(), Precision::Long, false)
    }

    fn sw(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_add(r1, operand.negate(), Precision::Long, false)
    }

    fn mer(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_multiply(r1, operand, Precision::Short)
    }

    fn me(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_multiply(r1, operand, Precision::Short)
    }

    fn mdr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_multiply(r1, operand, Precision::Long)
    }

    fn md(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_multiply(r1, operand, Precision::Long)
    }

    fn der(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_divide(r1, operand, Precision::Short)
    }

    fn de(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_divide(r1, operand, Precision::Short)
    }

    fn ddr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_divide(r1, operand, Precision::Long)
    }

    fn dd(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_divide(r1, operand, Precision::Long)
    }

    fn cer(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Short)?;
        self.float_compare(r1, operand, Precision::Short)
    }

    fn ce(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Short)?;
        self.float_compare(r1, operand, Precision::Short)
    }

    fn cdr(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rr(inst, Precision::Long)?;
        self.float_compare(r1, operand, Precision::Long)
    }

    fn cd(&mut self, inst: &Instruction) -> Step {
        let (r1, operand) = self.float_rx(inst, Precision::Long)?;
        self.float_compare(r1, operand, Precision::Long)
    }
}

#[cfg(test)]
mod float_tests {
    use crate::constants::{interrupts, program_mask, vectors};
    use crate::instructions::tests::{init_cpu, run_one};
    use crate::psw::Psw;

    fn program_code(cpu: &crate::cpu::Cpu) -> u16 {
        Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW)).interruption_code
    }

    #[test]
    fn test_odd_register_is_specification() {
        let mut cpu = init_cpu();
        run_one(&mut cpu, &[0x28, 0x13]); // LDR 1,3
        assert_eq!(program_code(&cpu), interrupts::SPECIFICATION);
    }

    #[test]
    fn test_short_load_keeps_low_word() {
        let mut cpu = init_cpu();
        cpu.set_fpr_long(0, 0x1111_1111_2222_2222);
        cpu.set_fpr_long(2, 0x4110_0000_3333_3333);
        run_one(&mut cpu, &[0x38, 0x02]); // LER 0,2
        assert_eq!(cpu.fpr_long(0), 0x4110_0000_2222_2222);
    }

    #[test]
    fn test_long_add_and_cc() {
        let mut cpu = init_cpu();
        cpu.set_fpr_long(0, 0x4110_0000_0000_0000);
        cpu.set_fpr_long(2, 0x4110_0000_0000_0000);
        run_one(&mut cpu, &[0x2A, 0x02]); // ADR 0,2
        assert_eq!(cpu.fpr_long(0), 0x4120_0000_0000_0000);
        assert_eq!(cpu.cc(), 2);
    }

    #[test]
    fn test_subtract_to_zero() {
        let mut cpu = init_cpu();
        cpu.set_fpr_short(4, 0x4210_0000);
        run_one(&mut cpu, &[0x3B, 0x44]); // SER 4,4
        assert_eq!((cpu.fpr_short(4), cpu.cc()), (0, 0));

        cpu.set_program_mask_bit(program_mask::SIGNIFICANCE, true);
        cpu.set_fpr_short(4, 0x4210_0000);
        run_one(&mut cpu, &[0x3B, 0x44]);
        assert_eq!(program_code(&cpu), interrupts::SIGNIFICANCE);
        assert_eq!(cpu.fpr_short(4), 0x4200_0000);
    }

    #[test]
    fn test_unnormalized_register_forms() {
        let mut cpu = init_cpu();
        cpu.set_fpr_short(0, 0x4110_0000);
        cpu.set_fpr_short(2, 0xC0F0_0000);
        run_one(&mut cpu, &[0x3E, 0x02]); // AUR 0,2
        assert_eq!((cpu.fpr_short(0), cpu.cc()), (0x4101_0000, 2));

        cpu.set_fpr_short(0, 0x4110_0000);
        cpu.set_fpr_short(2, 0x40F0_0000);
        run_one(&mut cpu, &[0x3F, 0x02]); // SUR 0,2
        assert_eq!((cpu.fpr_short(0), cpu.cc()), (0x4101_0000, 2));

        cpu.set_fpr_long(4, 0x4110_0000_0000_0000);
        cpu.set_fpr_long(6, 0xC0F0_0000_0000_0000);
        run_one(&mut cpu, &[0x2E, 0x46]); // AWR 4,6
        assert_eq!((cpu.fpr_long(4), cpu.cc()), (0x4101_0000_0000_0000, 2));

        cpu.set_fpr_long(4, 0x40F0_0000_0000_0000);
        cpu.set_fpr_long(6, 0x4110_0000_0000_0000);
        run_one(&mut cpu, &[0x2F, 0x46]); // SWR 4,6
        assert_eq!((cpu.fpr_long(4), cpu.cc()), (0xC101_0000_0000_0000, 1));
    }

    #[test]
    fn test_unnormalized_storage_forms() {
        let mut cpu = init_cpu();
        cpu.set_gpr(5, 0x3000);

        cpu.set_fpr_short(0, 0x4200_1000);
        cpu.poke_u32(0x3000, 0x4200_1000);
        run_one(&mut cpu, &[0x7E, 0x00, 0x50, 0x00]); // AU 0,0(,5)
        assert_eq!((cpu.fpr_short(0), cpu.cc()), (0x4200_2000, 2));

        cpu.set_fpr_short(0, 0x40F0_0000);
        cpu.poke_u32(0x3000, 0x4110_0000);
        run_one(&mut cpu, &[0x7F, 0x00, 0x50, 0x00]); // SU 0,0(,5)
        assert_eq!((cpu.fpr_short(0), cpu.cc()), (0xC101_0000, 1));

        cpu.set_fpr_long(2, 0x4200_1000_0000_0000);
        cpu.poke_u64(0x3000, 0x4200_1000_0000_0000);
        run_one(&mut cpu, &[0x6E, 0x20, 0x50, 0x00]); // AW 2,0(,5)
        assert_eq!((cpu.fpr_long(2), cpu.cc()), (0x4200_2000_0000_0000, 2));

        cpu.set_fpr_long(2, 0x4110_0000_0000_0000);
        cpu.poke_u64(0x3000, 0x40F0_0000_0000_0000);
        run_one(&mut cpu, &[0x6F, 0x20, 0x50, 0x00]); // SW 2,0(,5)
        assert_eq!((cpu.fpr_long(2), cpu.cc()), (0x4101_0000_0000_0000, 2));
    }

    #[test]
    fn test_compare_signed_zeros() {
        let mut cpu = init_cpu();
        cpu.set_fpr_short(0, 0x0000_0000);
        cpu.set_fpr_short(2, 0x8000_0000);
        cpu.set_fpr_short(4, 0x4110_0000);
        run_one(&mut cpu, &[0x39, 0x02]); // CER 0,2
        assert_eq!(cpu.cc(), 0);
        run_one(&mut cpu, &[0x39, 0x04]); // CER 0,4
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0x39, 0x24]); // CER 2,4
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0x39, 0x42]); // CER 4,2
        assert_eq!(cpu.cc(), 2);

        cpu.set_fpr_long(0, 0x0000_0000_0000_0000);
        cpu.set_fpr_long(2, 0x8000_0000_0000_0000);
        cpu.set_fpr_long(4, 0x4110_0000_0000_0000);
        run_one(&mut cpu, &[0x29, 0x20]); // CDR 2,0
        assert_eq!(cpu.cc(), 0);
        run_one(&mut cpu, &[0x29, 0x04]); // CDR 0,4
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0x29, 0x24]); // CDR 2,4
        assert_eq!(cpu.cc(), 1);
    }

    #[test]
    fn test_exponent_underflow() {
        // Masked: true zero, no interrupt
        let mut cpu = init_cpu();
        cpu.set_fpr_short(0, 0x0010_0000);
        cpu.set_fpr_short(2, 0x0010_0000);
        run_one(&mut cpu, &[0x3C, 0x02]); // MER 0,2
        assert_eq!(cpu.fpr_long(0), 0);
        assert_eq!(program_code(&cpu), 0);

        // Enabled: wrapped characteristic stored, interrupt raised
        let mut cpu = init_cpu();
        cpu.set_program_mask_bit(program_mask::EXPONENT_UNDERFLOW, true);
        cpu.set_fpr_short(0, 0x0010_0000);
        cpu.set_fpr_short(2, 0x0010_0000);
        run_one(&mut cpu, &[0x3C, 0x02]);
        assert_eq!(cpu.fpr_long(0), 0x3F10_0000_0000_0000);
        assert_eq!(program_code(&cpu), interrupts::EXPONENT_UNDERFLOW);
        let old = Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW));
        assert_eq!((old.ilc, old.ia), (1, crate::instructions::tests::CODE_BASE + 2));
    }

    #[test]
    fn test_short_multiply_is_long() {
        let mut cpu = init_cpu();
        cpu.set_fpr_long(2, 0x4210_0000_FFFF_FFFF);
        cpu.set_fpr_short(6, 0x4210_0000);
        cpu.set_cc(3);
        run_one(&mut cpu, &[0x3C, 0x26]); // MER 2,6
        assert_eq!(cpu.fpr_long(2), 0x4310_0000_0000_0000);
        assert_eq!(cpu.cc(), 3);
    }

    #[test]
    fn test_divide_by_zero_stores_nothing() {
        let mut cpu = init_cpu();
        cpu.set_fpr_long(0, 0x4110_0000_0000_0000);
        run_one(&mut cpu, &[0x2D, 0x02]); // DDR 0,2
        assert_eq!(program_code(&cpu), interrupts::FLOATING_POINT_DIVIDE);
        assert_eq!(cpu.fpr_long(0), 0x4110_0000_0000_0000);
    }

    #[test]
    fn test_sign_loads() {
        let mut cpu = init_cpu();
        cpu.set_fpr_short(2, 0x4110_0000);
        run_one(&mut cpu, &[0x33, 0x02]); // LCER 0,2
        assert_eq!((cpu.fpr_short(0), cpu.cc()), (0xC110_0000, 1));
        run_one(&mut cpu, &[0x30, 0x40]); // LPER 4,0
        assert_eq!((cpu.fpr_short(4), cpu.cc()), (0x4110_0000, 2));
        cpu.set_fpr_long(6, 0x0000_0000_0000_0000);
        run_one(&mut cpu, &[0x21, 0x66]); // LNDR 6,6
        assert_eq!((cpu.fpr_long(6), cpu.cc()), (0x8000_0000_0000_0000, 0));
    }

    #[test]
    fn test_compare_and_store() {
        let mut cpu = init_cpu();
        cpu.set_fpr_short(0, 0xC110_0000);
        cpu.poke_u32(0x2000, 0x4110_0000);
        cpu.set_gpr(5, 0x2000);
        run_one(&mut cpu, &[0x79, 0x00, 0x50, 0x00]); // CE 0,0(5)
        assert_eq!(cpu.cc(), 1);
        run_one(&mut cpu, &[0x70, 0x00, 0x50, 0x04]); // STE 0,4(5)
        assert_eq!(cpu.peek_u32(0x2004), 0xC110_0000);
    }

    #[test]
    fn test_halve() {
        let mut cpu = init_cpu();
        cpu.set_fpr_long(2, 0x4120_0000_0000_0000);
        run_one(&mut cpu, &[0x24, 0x02]); // HDR 0,2
        assert_eq!(cpu.fpr_long(0), 0x4110_0000_0000_0000);
    }
}

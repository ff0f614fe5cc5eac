use super::Instruction;
use crate::cpu::Cpu;
use crate::error::Step;

/// Branching and looping instructions
pub trait Branch {
    fn balr(&mut self, inst: &Instruction) -> Step; // Branch and link register
    fn bal(&mut self, inst: &Instruction) -> Step; // Branch and link
    fn bctr(&mut self, inst: &Instruction) -> Step; // Branch on count register
    fn bct(&mut self, inst: &Instruction) -> Step; // Branch on count
    fn bcr(&mut self, inst: &Instruction) -> Step; // Branch on condition register
    fn bc(&mut self, inst: &Instruction) -> Step; // Branch on condition
    fn bxh(&mut self, inst: &Instruction) -> Step; // Branch on index high
    fn bxle(&mut self, inst: &Instruction) -> Step; // Branch on index low or equal
}

impl Cpu {
    /// ILC, CC and program mask in the high byte, updated IA below
    fn link_word(&self) -> u32 {
        (self.psw.status_byte() as u32) << 24 | self.psw.ia
    }

    fn condition_met(&self, mask: u8) -> bool {
        mask & (0x8 >> self.psw.cc) != 0
    }

    /// R1 += R3, compared against the odd register of the R3 pair.
    /// Returns the signed ordering of sum against comparand.
    fn index_step(&mut self, inst: &Instruction) -> core::cmp::Ordering {
        let increment = self.reg(inst.r3()) as i32;
        let comparand = self.reg(inst.r3() | 1) as i32;
        let sum = (self.reg(inst.r1()) as i32).wrapping_add(increment);
        self.set_reg(inst.r1(), sum as u32);
        sum.cmp(&comparand)
    }
}

impl Branch for Cpu {
    fn balr(&mut self, inst: &Instruction) -> Step {
        let target = self.reg(inst.r2());
        let link = self.link_word();
        self.set_reg(inst.r1(), link);
        if inst.r2() != 0 {
            self.branch_to(target);
        }
        Ok(())
    }

    fn bal(&mut self, inst: &Instruction) -> Step {
        let target = self.rx_address(inst);
        let link = self.link_word();
        self.set_reg(inst.r1(), link);
        self.branch_to(target);
        Ok(())
    }

    fn bctr(&mut self, inst: &Instruction) -> Step {
        let target = self.reg(inst.r2());
        let count = self.reg(inst.r1()).wrapping_sub(1);
        self.set_reg(inst.r1(), count);
        if count != 0 && inst.r2() != 0 {
            self.branch_to(target);
        }
        Ok(())
    }

    fn bct(&mut self, inst: &Instruction) -> Step {
        let target = self.rx_address(inst);
        let count = self.reg(inst.r1()).wrapping_sub(1);
        self.set_reg(inst.r1(), count);
        if count != 0 {
            self.branch_to(target);
        }
        Ok(())
    }

    fn bcr(&mut self, inst: &Instruction) -> Step {
        if inst.r2() != 0 && self.condition_met(inst.m()) {
            let target = self.reg(inst.r2());
            self.branch_to(target);
        }
        Ok(())
    }

    fn bc(&mut self, inst: &Instruction) -> Step {
        if self.condition_met(inst.m()) {
            let target = self.rx_address(inst);
            self.branch_to(target);
        }
        Ok(())
    }

    fn bxh(&mut self, inst: &Instruction) -> Step {
        let target = self.op2_address(inst);
        if self.index_step(inst).is_gt() {
            self.branch_to(target);
        }
        Ok(())
    }

    fn bxle(&mut self, inst: &Instruction) -> Step {
        let target = self.op2_address(inst);
        if self.index_step(inst).is_le() {
            self.branch_to(target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod branch_tests {
    use crate::instructions::tests::{init_cpu, run_one, CODE_BASE};

    #[test]
    fn test_balr_links_and_branches() {
        let mut cpu = init_cpu();
        cpu.set_cc(2);
        cpu.psw_mut().program_mask = 0x3;
        cpu.set_gpr(15, 0x8000);
        run_one(&mut cpu, &[0x05, 0xEF]); // BALR 14,15
        assert_eq!(cpu.gpr(14) as u32, 0x6300_0000 | (CODE_BASE + 2));
        assert_eq!(cpu.ia(), 0x8000);
    }

    #[test]
    fn test_balr_zero_target_only_links() {
        let mut cpu = init_cpu();
        run_one(&mut cpu, &[0x05, 0xE0]); // BALR 14,0
        assert_eq!(cpu.gpr(14) as u32, 0x4000_0000 | (CODE_BASE + 2));
        assert_eq!(cpu.ia(), CODE_BASE + 2);
    }

    #[test]
    fn test_bal() {
        let mut cpu = init_cpu();
        run_one(&mut cpu, &[0x45, 0xE0, 0x03, 0x00]); // BAL 14,X'300'
        assert_eq!(cpu.gpr(14) as u32, 0x8000_0000 | (CODE_BASE + 4));
        assert_eq!(cpu.ia(), 0x300);
    }

    #[test]
    fn test_branch_on_condition() {
        let mut cpu = init_cpu();
        cpu.set_cc(1);
        run_one(&mut cpu, &[0x47, 0x80, 0x05, 0x00]); // BZ X'500'
        assert_eq!(cpu.ia(), CODE_BASE + 4);
        run_one(&mut cpu, &[0x47, 0x40, 0x05, 0x00]); // BM X'500'
        assert_eq!(cpu.ia(), 0x500);

        cpu.set_gpr(3, 0x900);
        run_one(&mut cpu, &[0x07, 0xF3]); // BR 3
        assert_eq!(cpu.ia(), 0x900);
        run_one(&mut cpu, &[0x07, 0xF0]); // BCR 15,0 never branches
        assert_eq!(cpu.ia(), 0x902);
    }

    #[test]
    fn test_branch_on_count() {
        let mut cpu = init_cpu();
        cpu.set_gpr(2, 2);
        run_one(&mut cpu, &[0x46, 0x20, 0x06, 0x00]); // BCT 2,X'600'
        assert_eq!((cpu.gpr(2), cpu.ia()), (1, 0x600));
        run_one(&mut cpu, &[0x46, 0x20, 0x06, 0x00]);
        assert_eq!((cpu.gpr(2), cpu.ia()), (0, 0x604));

        run_one(&mut cpu, &[0x06, 0x20]); // BCTR 2,0 decrements only
        assert_eq!((cpu.gpr(2), cpu.ia()), (-1, 0x606));
    }

    #[test]
    fn test_branch_on_index() {
        let mut cpu = init_cpu();
        // Loop R1 from 0 by 4 while <= 8, comparand in R5
        cpu.set_gpr(4, 4);
        cpu.set_gpr(5, 8);
        run_one(&mut cpu, &[0x87, 0x14, 0x07, 0x00]); // BXLE 1,4,X'700'
        assert_eq!((cpu.gpr(1), cpu.ia()), (4, 0x700));
        cpu.set_gpr(1, 8);
        run_one(&mut cpu, &[0x87, 0x14, 0x07, 0x00]);
        assert_eq!((cpu.gpr(1), cpu.ia()), (12, 0x704));

        // Odd R3: the increment is its own comparand
        cpu.set_gpr(1, 0);
        cpu.set_gpr(3, 1);
        run_one(&mut cpu, &[0x86, 0x13, 0x08, 0x00]); // BXH 1,3,X'800'
        assert_eq!((cpu.gpr(1), cpu.ia()), (1, 0x708));
        run_one(&mut cpu, &[0x86, 0x13, 0x08, 0x00]);
        assert_eq!((cpu.gpr(1), cpu.ia()), (2, 0x800));
    }
}

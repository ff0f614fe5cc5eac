use super::Instruction;
use crate::constants::{interrupts, ADDRESS_MASK};
use crate::cpu::{intercept_code, Cpu};
use crate::error::{CpuError, Step, Trap};
use crate::psw::Psw;
use log::{debug, error};

/// Execute, PSW manipulation, storage keys and the supervisor call.
/// Also the catch-alls for instructions the core hands back to its host.
pub trait Control {
    fn ex(&mut self, inst: &Instruction) -> Step; // Execute
    fn ssm(&mut self, inst: &Instruction) -> Step; // Set system mask
    fn lpsw(&mut self, inst: &Instruction) -> Step; // Load PSW
    fn stnsm(&mut self, inst: &Instruction) -> Step; // Store then and system mask
    fn stosm(&mut self, inst: &Instruction) -> Step; // Store then or system mask
    fn isk(&mut self, inst: &Instruction) -> Step; // Insert storage key
    fn ssk(&mut self, inst: &Instruction) -> Step; // Set storage key
    fn svc(&mut self, inst: &Instruction) -> Step; // Supervisor call
    fn intercepted(&mut self, inst: &Instruction) -> Step;
    fn unimplemented(&mut self, inst: &Instruction) -> Step;
}

impl Control for Cpu {
    fn ex(&mut self, inst: &Instruction) -> Step {
        let target = self.rx_address(inst);
        let modifier = match inst.r1() {
            0 => 0,
            r => self.reg(r) as u8,
        };
        self.execute_target(target, modifier)
    }

    fn ssm(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        self.psw.system_mask = self.load_u8(self.op2_address(inst))?;
        Ok(())
    }

    fn lpsw(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        let addr = self.op2_address(inst);
        if addr & 0x7 != 0 {
            return Err(Trap::Program(interrupts::SPECIFICATION));
        }
        let psw = Psw::from_u64(self.load_u64(addr)?);
        debug!("LPSW {:016X} from 0x{:06X}", psw.to_u64(), addr);

        // The new PSW takes effect even when it turns out to be unusable
        self.psw = psw;
        psw.validate().map_err(|reason| {
            error!("Rejected PSW {:016X}: {}", psw.to_u64(), reason);
            Trap::InvalidPsw(CpuError::InvalidPsw { address: addr, reason })
        })
    }

    fn stnsm(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        self.store_u8(self.op1_address(inst), self.psw.system_mask)?;
        self.psw.system_mask &= inst.i2();
        Ok(())
    }

    fn stosm(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        self.store_u8(self.op1_address(inst), self.psw.system_mask)?;
        self.psw.system_mask |= inst.i2();
        Ok(())
    }

    fn isk(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        let addr = self.reg(inst.r2()) & ADDRESS_MASK;
        self.check(addr, 1)?;
        let key = self.mem.read_key(Cpu::page_of(addr));
        let value = (self.reg(inst.r1()) & 0xFFFF_FF00) | (key as u32) << 4;
        self.set_reg(inst.r1(), value);
        Ok(())
    }

    fn ssk(&mut self, inst: &Instruction) -> Step {
        self.privileged(inst)?;
        let addr = self.reg(inst.r2()) & ADDRESS_MASK;
        self.check(addr, 1)?;
        let key = ((self.reg(inst.r1()) >> 4) & 0xF) as u8;
        self.mem.write_key(Cpu::page_of(addr), key);
        Ok(())
    }

    fn svc(&mut self, inst: &Instruction) -> Step {
        Err(Trap::Supervisor(inst.i2()))
    }

    fn intercepted(&mut self, inst: &Instruction) -> Step {
        Err(Trap::Intercept(intercept_code(inst)))
    }

    fn unimplemented(&mut self, inst: &Instruction) -> Step {
        Err(Trap::Unimplemented(inst.opcode()))
    }
}

#[cfg(test)]
mod control_tests {
    use crate::constants::{interrupts, vectors};
    use crate::cpu::ExecResult;
    use crate::error::{CpuError, PswError};
    use crate::instructions::tests::{init_cpu, run_one, CODE_BASE};
    use crate::psw::Psw;

    #[test]
    fn test_execute_modifies_a_copy() {
        let mut cpu = init_cpu();
        // Target: MVC 0(1,5),0(6), length byte supplied by R1
        cpu.poke_bytes(0x2000, &[0xD2, 0x00, 0x50, 0x00, 0x60, 0x00]);
        cpu.poke_bytes(0x3000, &[1, 2, 3, 4]);
        cpu.set_gpr(1, 3);
        cpu.set_gpr(5, 0x4000);
        cpu.set_gpr(6, 0x3000);
        cpu.set_gpr(7, 0x2000);
        run_one(&mut cpu, &[0x44, 0x10, 0x70, 0x00]); // EX 1,0(,7)
        assert_eq!(cpu.peek_u32(0x4000), 0x0102_0304);
        assert_eq!(cpu.peek_u8(0x2001), 0x00);
        assert_eq!((cpu.ia(), cpu.ilc()), (CODE_BASE + 4, 2));
    }

    #[test]
    fn test_execute_of_execute() {
        let mut cpu = init_cpu();
        cpu.set_gpr(7, 0x2000);
        cpu.poke_bytes(0x2000, &[0x44, 0x00, 0x70, 0x00]);
        run_one(&mut cpu, &[0x44, 0x00, 0x70, 0x00]);
        let old = Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW));
        assert_eq!(old.interruption_code, interrupts::EXECUTE);
        assert_eq!((old.ia, old.ilc), (CODE_BASE + 4, 2));
    }

    #[test]
    fn test_execute_branch_targets() {
        let mut cpu = init_cpu();
        // Target BALR 0,0 becomes BALR 14,15
        cpu.poke_bytes(0x2000, &[0x05, 0x00]);
        cpu.set_gpr(1, 0xEF);
        cpu.set_gpr(9, 0x2000);
        cpu.set_gpr(15, 0x8000);
        run_one(&mut cpu, &[0x44, 0x10, 0x90, 0x00]); // EX 1,0(,9)
        assert_eq!(cpu.gpr(14) as u32, 0x8000_0000 | (CODE_BASE + 4));
        assert_eq!(cpu.ia(), 0x8000);
        assert_eq!(cpu.peek_u16(0x2000), 0x0500);

        // Target BC 0,X'300' becomes BC 15,X'300'
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x2000, &[0x47, 0x00, 0x03, 0x00]);
        cpu.set_gpr(1, 0xF0);
        cpu.set_gpr(9, 0x2000);
        run_one(&mut cpu, &[0x44, 0x10, 0x90, 0x00]);
        assert_eq!(cpu.ia(), 0x300);
    }

    #[test]
    fn test_execute_privileged_target() {
        let mut cpu = init_cpu();
        cpu.set_problem_state(true);
        cpu.poke_bytes(0x2000, &[0x08, 0x00]); // SSK 0,0
        cpu.set_gpr(1, 0x34);
        cpu.set_gpr(9, 0x2000);
        cpu.poke_bytes(CODE_BASE, &[0x44, 0x10, 0x90, 0x00]);
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0x08)));
        assert_eq!(cpu.ia(), CODE_BASE);
        assert_eq!(cpu.storage_key(0), 0);

        // DIAG reports the modified image
        let mut cpu = init_cpu();
        cpu.poke_bytes(0x2000, &[0x83, 0x00, 0x00, 0x08]);
        cpu.set_gpr(1, 0x12);
        cpu.set_gpr(9, 0x2000);
        cpu.poke_bytes(CODE_BASE, &[0x44, 0x10, 0x90, 0x00]);
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0x8312_0008)));
        assert_eq!(cpu.ia(), CODE_BASE);
        assert_eq!(cpu.peek_u32(0x2000), 0x8300_0008);
    }

    #[test]
    fn test_execute_odd_target() {
        let mut cpu = init_cpu();
        cpu.set_gpr(7, 0x2000);
        run_one(&mut cpu, &[0x44, 0x00, 0x70, 0x01]);
        let old = Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW));
        assert_eq!(old.interruption_code, interrupts::SPECIFICATION);
    }

    #[test]
    fn test_svc_interrupt() {
        let mut cpu = init_cpu();
        cpu.poke_u64(vectors::SVC_NEW_PSW, 0x0000_0000_0000_6000);
        cpu.set_cc(1);
        run_one(&mut cpu, &[0x0A, 0x23]); // SVC 35
        let old = Psw::from_u64(cpu.peek_u64(vectors::SVC_OLD_PSW));
        assert_eq!(old.interruption_code, 0x23);
        assert_eq!((old.ia, old.ilc, old.cc), (CODE_BASE + 2, 1, 1));
        assert_eq!(cpu.ia(), 0x6000);
    }

    #[test]
    fn test_lpsw_loads_and_rejects() {
        let mut cpu = init_cpu();
        cpu.poke_u64(0x2000, 0xFF01_0000_2500_3000);
        cpu.set_gpr(7, 0x2000);
        run_one(&mut cpu, &[0x82, 0x00, 0x70, 0x00]); // LPSW 0(7)
        assert_eq!(cpu.ia(), 0x3000);
        assert_eq!((cpu.cc(), cpu.psw().program_mask), (2, 5));
        assert!(cpu.problem_state());
        assert_eq!(cpu.protection_key(), 0);

        // EC-mode PSW: loaded, then reported
        let mut cpu = init_cpu();
        cpu.poke_u64(0x2000, 0x0008_0000_0000_3000);
        cpu.set_gpr(7, 0x2000);
        cpu.poke_bytes(CODE_BASE, &[0x82, 0x00, 0x70, 0x00]);
        let result = cpu.execute_instruction(0);
        assert_eq!(
            result,
            Err(CpuError::InvalidPsw {
                address: 0x2000,
                reason: PswError::ExtendedControl
            })
        );
        assert_eq!(cpu.ia(), 0x3000);
    }

    #[test]
    fn test_lpsw_alignment() {
        let mut cpu = init_cpu();
        cpu.set_gpr(7, 0x2000);
        run_one(&mut cpu, &[0x82, 0x00, 0x70, 0x04]);
        let old = Psw::from_u64(cpu.peek_u64(vectors::PROGRAM_OLD_PSW));
        assert_eq!(old.interruption_code, interrupts::SPECIFICATION);
    }

    #[test]
    fn test_privileged_in_problem_state() {
        let mut cpu = init_cpu();
        cpu.set_problem_state(true);
        cpu.poke_bytes(CODE_BASE, &[0x80, 0x00, 0x20, 0x00]); // SSM
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0x80)));
        assert_eq!((cpu.ia(), cpu.psw().system_mask), (CODE_BASE, 0));
    }

    #[test]
    fn test_always_intercepted() {
        let mut cpu = init_cpu();
        cpu.poke_bytes(CODE_BASE, &[0x9C, 0x00, 0x01, 0x00]); // SIO
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0x9C)));
        cpu.poke_bytes(CODE_BASE, &[0xB2, 0x02, 0x00, 0x00]); // STIDP
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0xB202)));
        cpu.poke_bytes(CODE_BASE, &[0x83, 0x12, 0x00, 0x08]); // DIAG
        assert_eq!(cpu.execute_instruction(0), Ok(ExecResult::Privileged(0x8312_0008)));
        assert_eq!(cpu.ia(), CODE_BASE);
    }

    #[test]
    fn test_system_mask_ops() {
        let mut cpu = init_cpu();
        cpu.psw_mut().system_mask = 0xF0;
        cpu.set_gpr(2, 0x2000);
        run_one(&mut cpu, &[0xAC, 0x3C, 0x20, 0x00]); // STNSM 0(2),X'3C'
        assert_eq!((cpu.peek_u8(0x2000), cpu.psw().system_mask), (0xF0, 0x30));
        run_one(&mut cpu, &[0xAD, 0x01, 0x20, 0x01]); // STOSM 1(2),X'01'
        assert_eq!((cpu.peek_u8(0x2001), cpu.psw().system_mask), (0x30, 0x31));
        cpu.poke_u8(0x2002, 0xFF);
        run_one(&mut cpu, &[0x80, 0x00, 0x20, 0x02]); // SSM 2(2)
        assert_eq!(cpu.psw().system_mask, 0xFF);
    }

    #[test]
    fn test_storage_keys() {
        let mut cpu = init_cpu();
        cpu.set_gpr(3, 0x9A);
        cpu.set_gpr(4, 0x0000_1800);
        run_one(&mut cpu, &[0x08, 0x34]); // SSK 3,4
        assert_eq!(cpu.storage_key(3), 0x9);
        cpu.set_gpr(5, 0x1234_5600);
        run_one(&mut cpu, &[0x09, 0x54]); // ISK 5,4
        assert_eq!(cpu.gpr(5), 0x1234_5690);
    }
}

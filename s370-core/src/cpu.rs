use crate::constants::{interrupts, vectors, ADDRESS_MASK, MAX_STORAGE_SIZE, PAGE_SIZE};
use crate::decoder::{decoder, instruction_length};
use crate::dispatch::{Dispatch, MatchDispatch, TableDispatch};
use crate::error::{CpuError, Step, Trap};
use crate::instructions::{Instruction, Mnemonic};
use crate::memory::{MemoryMap, Registers, StorageKeys};
use crate::psw::Psw;
use alloc::boxed::Box;
use log::{debug, trace, warn};

/// Instruction dispatch realisation; both behave identically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Match,
    Table,
}

/// Engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    pub memory_size: usize,  // Installed real storage in bytes
    pub strategy: Strategy,  // Opcode dispatch realisation
    pub count_opcodes: bool, // Keep per-opcode execution counters
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            memory_size: MAX_STORAGE_SIZE,
            strategy: Strategy::Table,
            count_opcodes: false,
        }
    }
}

/// Outcome of one `execute_instruction` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResult {
    Ok,
    InvalidOpcode,
    Privileged(u32),
}

impl ExecResult {
    /// Numeric form: 0, -1, or the intercepted operation code
    pub fn code(&self) -> i64 {
        match self {
            ExecResult::Ok => 0,
            ExecResult::InvalidOpcode => -1,
            ExecResult::Privileged(code) => *code as i64,
        }
    }
}

static MATCH_DISPATCH: MatchDispatch = MatchDispatch;
static TABLE_DISPATCH: TableDispatch = TableDispatch;

/// Code handed back to the host for an intercepted privileged operation
pub fn intercept_code(inst: &Instruction) -> u32 {
    match inst.opcode() {
        // DIAG: the whole instruction is significant
        0x83 => inst.word(),
        // Two-byte opcodes
        0xB2 => 0xB200 | inst.bytes[1] as u32,
        op => op as u32,
    }
}

/// Struct representing one System/370 processor in BC mode
pub struct Cpu {
    pub(crate) mem: MemoryMap,              // Real storage and keys
    pub(crate) regs: Registers,             // GPRs and FPRs
    pub(crate) psw: Psw,                    // The live PSW
    dispatcher: &'static dyn Dispatch,      // Opcode -> handler
    counters: Option<Box<[u64; 256]>>,      // Per-opcode execution counts
    pub total_instructions: usize,          // execute_instruction calls outside wait state
}

impl Cpu {
    pub fn new(config: CpuConfig) -> Cpu {
        let size = config
            .memory_size
            .clamp(PAGE_SIZE, MAX_STORAGE_SIZE)
            .next_multiple_of(PAGE_SIZE);
        let dispatcher: &'static dyn Dispatch = match config.strategy {
            Strategy::Match => &MATCH_DISPATCH,
            Strategy::Table => &TABLE_DISPATCH,
        };
        debug!("New CPU using {} dispatch", dispatcher.name());

        let mut cpu = Cpu {
            mem: MemoryMap::new(size),
            regs: Registers::new(),
            psw: Psw::default(),
            dispatcher,
            counters: if config.count_opcodes {
                Some(Box::new([0; 256]))
            } else {
                None
            },
            total_instructions: 0,
        };
        cpu.reset();
        cpu
    }

    /// Zero registers, PSW, storage, keys and counters
    pub fn reset(&mut self) {
        self.mem.reset();
        self.regs.reset();
        self.psw = Psw::default();
        if let Some(counters) = self.counters.as_mut() {
            counters.fill(0);
        }
        self.total_instructions = 0;
    }

    pub fn memory_size(&self) -> usize {
        self.mem.size()
    }

    // Storage peek/poke, absolute 24-bit addresses

    pub fn peek_u8(&self, addr: u32) -> u8 {
        self.mem.read_u8(addr)
    }

    pub fn peek_u16(&self, addr: u32) -> u16 {
        self.mem.read_u16(addr)
    }

    pub fn peek_u32(&self, addr: u32) -> u32 {
        self.mem.read_u32(addr)
    }

    pub fn peek_u64(&self, addr: u32) -> u64 {
        self.mem.read_u64(addr)
    }

    pub fn peek_bytes(&self, addr: u32, out: &mut [u8]) {
        self.mem.read_bytes(addr, out)
    }

    pub fn poke_u8(&mut self, addr: u32, value: u8) {
        self.mem.write_u8(addr, value)
    }

    pub fn poke_u16(&mut self, addr: u32, value: u16) {
        self.mem.write_u16(addr, value)
    }

    pub fn poke_u32(&mut self, addr: u32, value: u32) {
        self.mem.write_u32(addr, value)
    }

    pub fn poke_u64(&mut self, addr: u32, value: u64) {
        self.mem.write_u64(addr, value)
    }

    pub fn poke_bytes(&mut self, addr: u32, data: &[u8]) {
        self.mem.write_bytes(addr, data)
    }

    pub fn storage_key(&self, page: usize) -> u8 {
        self.mem.read_key(page)
    }

    pub fn set_storage_key(&mut self, page: usize, key: u8) {
        self.mem.write_key(page, key)
    }

    // Registers

    pub fn gpr(&self, r: usize) -> i32 {
        self.regs.read(r) as i32
    }

    pub fn set_gpr(&mut self, r: usize, value: i32) {
        self.regs.write(r, value as u32)
    }

    pub fn fpr_short(&self, r: usize) -> u32 {
        self.regs.read_short(r)
    }

    pub fn set_fpr_short(&mut self, r: usize, value: u32) {
        self.regs.write_short(r, value)
    }

    pub fn fpr_long(&self, r: usize) -> u64 {
        self.regs.read_long(r)
    }

    pub fn set_fpr_long(&mut self, r: usize, value: u64) {
        self.regs.write_long(r, value)
    }

    // PSW fields

    pub fn psw(&self) -> &Psw {
        &self.psw
    }

    pub fn psw_mut(&mut self) -> &mut Psw {
        &mut self.psw
    }

    pub fn set_psw(&mut self, psw: Psw) {
        self.psw = psw;
    }

    pub fn ia(&self) -> u32 {
        self.psw.ia
    }

    pub fn set_ia(&mut self, ia: u32) {
        self.psw.ia = ia & ADDRESS_MASK;
    }

    pub fn cc(&self) -> u8 {
        self.psw.cc
    }

    pub fn set_cc(&mut self, cc: u8) {
        self.psw.cc = cc & 0x3;
    }

    pub fn ilc(&self) -> u8 {
        self.psw.ilc
    }

    pub fn set_ilc(&mut self, ilc: u8) {
        self.psw.ilc = ilc & 0x3;
    }

    pub fn interruption_code(&self) -> u16 {
        self.psw.interruption_code
    }

    pub fn set_interruption_code(&mut self, code: u16) {
        self.psw.interruption_code = code;
    }

    pub fn program_mask_bit(&self, bit: u8) -> bool {
        self.psw.program_mask_bit(bit)
    }

    pub fn set_program_mask_bit(&mut self, bit: u8, enabled: bool) {
        self.psw.set_program_mask_bit(bit, enabled)
    }

    pub fn protection_key(&self) -> u8 {
        self.psw.key
    }

    pub fn set_protection_key(&mut self, key: u8) {
        self.psw.key = key & 0xF;
    }

    pub fn problem_state(&self) -> bool {
        self.psw.problem_state
    }

    pub fn set_problem_state(&mut self, problem: bool) {
        self.psw.problem_state = problem;
    }

    pub fn is_waiting(&self) -> bool {
        self.psw.wait
    }

    // Diagnostics

    /// Instructions fetched at IA and successfully decoded. An EX counts
    /// once, under its own opcode; the target is not credited.
    pub fn opcode_count(&self, opcode: u8) -> u64 {
        self.counters.as_ref().map_or(0, |c| c[opcode as usize])
    }

    pub fn opcode_counts(&self) -> Option<&[u64; 256]> {
        self.counters.as_deref()
    }

    /// Execute one instruction.
    ///
    /// `target == 0` runs the instruction at the current IA. A nonzero target
    /// runs the instruction at that address the way EX does: IA and ILC are
    /// left as they are unless the instruction branches or interrupts.
    pub fn execute_instruction(&mut self, target: u32) -> Result<ExecResult, CpuError> {
        if self.psw.wait {
            return Ok(ExecResult::Ok);
        }

        self.total_instructions += 1;
        let before = self.psw;
        let outcome = if target == 0 {
            self.step()
        } else {
            self.execute_target(target & ADDRESS_MASK, 0)
        };

        match outcome {
            Ok(()) => Ok(ExecResult::Ok),
            Err(Trap::Program(code)) => {
                self.program_interrupt(code);
                Ok(ExecResult::Ok)
            }
            Err(Trap::Supervisor(code)) => {
                self.interrupt(vectors::SVC_OLD_PSW, vectors::SVC_NEW_PSW, code as u16);
                Ok(ExecResult::Ok)
            }
            Err(Trap::Intercept(code)) => {
                debug!("Intercepted privileged operation 0x{:X} at 0x{:06X}", code, before.ia);
                self.psw = before;
                Ok(ExecResult::Privileged(code))
            }
            Err(Trap::Unimplemented(opcode)) => {
                warn!("Unimplemented opcode 0x{:02X} at 0x{:06X}", opcode, before.ia);
                self.psw = before;
                Ok(ExecResult::InvalidOpcode)
            }
            Err(Trap::InvalidPsw(e)) => Err(e),
        }
    }

    /// Fetch the instruction image at `addr`: (bytes, length)
    fn fetch(&self, addr: u32) -> Result<([u8; 6], usize), Trap> {
        if addr & 1 != 0 {
            return Err(Trap::Program(interrupts::SPECIFICATION));
        }
        self.check(addr, 2)?;
        let len = instruction_length(self.mem.read_u8(addr));
        self.check(addr, len as u32)?;

        let mut image = [0u8; 6];
        self.mem.read_bytes(addr, &mut image[..len]);
        Ok((image, len))
    }

    /// Normal sequential execution at IA
    fn step(&mut self) -> Step {
        let addr = self.psw.ia;
        let (image, len) = match self.fetch(addr) {
            Ok(fetched) => fetched,
            Err(trap) => {
                self.psw.ilc = 0;
                return Err(trap);
            }
        };
        self.psw.ia = addr.wrapping_add(len as u32) & ADDRESS_MASK;
        self.psw.ilc = (len / 2) as u8;

        let inst = decoder(addr, &image[..len]).map_err(|_| Trap::Program(interrupts::OPERATION))?;
        if let Some(counters) = self.counters.as_mut() {
            counters[inst.opcode() as usize] += 1;
        }
        self.dispatch(&inst)
    }

    /// Run a copy of the instruction at `target` with `modifier` ORed into its
    /// second byte; storage is not touched. Used by EX.
    pub(crate) fn execute_target(&mut self, target: u32, modifier: u8) -> Step {
        let (mut image, len) = self.fetch(target)?;
        image[1] |= modifier;

        let inst = decoder(target, &image[..len]).map_err(|_| Trap::Program(interrupts::OPERATION))?;
        if inst.mnem == Mnemonic::EX {
            return Err(Trap::Program(interrupts::EXECUTE));
        }
        self.dispatch(&inst)
    }

    fn dispatch(&mut self, inst: &Instruction) -> Step {
        trace!("{:06X}: {:?} {:02X?}", inst.address, inst.mnem, inst.bytes.as_slice());

        let dispatcher = self.dispatcher;
        dispatcher.dispatch(self, inst)
    }

    // Interrupt delivery

    /// Store the live PSW as the old PSW, then load the new one
    fn interrupt(&mut self, old: u32, new: u32, code: u16) {
        let mut saved = self.psw;
        saved.interruption_code = code;
        self.mem.write_bytes(old, &saved.encode());

        let mut raw = [0u8; 8];
        self.mem.read_bytes(new, &mut raw);
        self.psw = Psw::decode(&raw);
        debug!(
            "Interrupt code 0x{:04X}: old PSW {:016X} at {}, new IA 0x{:06X}",
            code,
            saved.to_u64(),
            old,
            self.psw.ia
        );
    }

    fn program_interrupt(&mut self, code: u16) {
        self.interrupt(vectors::PROGRAM_OLD_PSW, vectors::PROGRAM_NEW_PSW, code);
    }

    // Helpers for instruction handlers

    pub(crate) fn reg(&self, r: usize) -> u32 {
        self.regs.read(r)
    }

    pub(crate) fn set_reg(&mut self, r: usize, value: u32) {
        self.regs.write(r, value)
    }

    /// base + index + displacement, GPR0 in either field contributing zero
    pub(crate) fn effective_address(&self, base: usize, index: usize, disp: u32) -> u32 {
        let mut addr = disp;
        if base != 0 {
            addr = addr.wrapping_add(self.regs.read(base));
        }
        if index != 0 {
            addr = addr.wrapping_add(self.regs.read(index));
        }
        addr & ADDRESS_MASK
    }

    /// D2(X2,B2) of an RX instruction
    pub(crate) fn rx_address(&self, inst: &Instruction) -> u32 {
        self.effective_address(inst.b2(), inst.x2(), inst.d2())
    }

    /// D1(B1) of SI/SS instructions
    pub(crate) fn op1_address(&self, inst: &Instruction) -> u32 {
        self.effective_address(inst.b1(), 0, inst.d1())
    }

    /// D2(B2) of RS/S/SS instructions
    pub(crate) fn op2_address(&self, inst: &Instruction) -> u32 {
        self.effective_address(inst.b2(), 0, inst.d2())
    }

    pub(crate) fn check(&self, addr: u32, len: u32) -> Step {
        if self.mem.is_valid(addr, len) {
            Ok(())
        } else {
            Err(Trap::Program(interrupts::ADDRESSING))
        }
    }

    pub(crate) fn load_u8(&self, addr: u32) -> Result<u8, Trap> {
        self.check(addr, 1)?;
        Ok(self.mem.read_u8(addr))
    }

    pub(crate) fn load_u16(&self, addr: u32) -> Result<u16, Trap> {
        self.check(addr, 2)?;
        Ok(self.mem.read_u16(addr))
    }

    pub(crate) fn load_u32(&self, addr: u32) -> Result<u32, Trap> {
        self.check(addr, 4)?;
        Ok(self.mem.read_u32(addr))
    }

    pub(crate) fn load_u64(&self, addr: u32) -> Result<u64, Trap> {
        self.check(addr, 8)?;
        Ok(self.mem.read_u64(addr))
    }

    pub(crate) fn store_u8(&mut self, addr: u32, value: u8) -> Step {
        self.check(addr, 1)?;
        self.mem.write_u8(addr, value);
        Ok(())
    }

    pub(crate) fn store_u16(&mut self, addr: u32, value: u16) -> Step {
        self.check(addr, 2)?;
        self.mem.write_u16(addr, value);
        Ok(())
    }

    pub(crate) fn store_u32(&mut self, addr: u32, value: u32) -> Step {
        self.check(addr, 4)?;
        self.mem.write_u32(addr, value);
        Ok(())
    }

    pub(crate) fn store_u64(&mut self, addr: u32, value: u64) -> Step {
        self.check(addr, 8)?;
        self.mem.write_u64(addr, value);
        Ok(())
    }

    /// Transfer control; the default advance has already happened
    pub(crate) fn branch_to(&mut self, addr: u32) {
        self.psw.ia = addr & ADDRESS_MASK;
    }

    /// Program interruption that fires only when its program-mask bit is set
    pub(crate) fn maskable(&self, enabled: bool, code: u16) -> Step {
        if enabled {
            Err(Trap::Program(code))
        } else {
            Ok(())
        }
    }

    /// Even register number required (register pairs)
    pub(crate) fn even_register(&self, r: usize) -> Step {
        if r & 1 != 0 {
            Err(Trap::Program(interrupts::SPECIFICATION))
        } else {
            Ok(())
        }
    }

    /// Privileged instructions run only in supervisor state; otherwise the
    /// host gets them back
    pub(crate) fn privileged(&self, inst: &Instruction) -> Step {
        if self.psw.problem_state {
            Err(Trap::Intercept(intercept_code(inst)))
        } else {
            Ok(())
        }
    }

    pub(crate) fn page_of(addr: u32) -> usize {
        StorageKeys::page_of(addr)
    }
}

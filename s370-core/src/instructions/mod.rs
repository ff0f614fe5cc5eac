pub mod branch;
pub mod control;
pub mod decimal;
pub mod fixed;
pub mod float;
pub mod load_store;
pub mod logical;

// Import trait implementations for CPU instruction families
pub use branch::Branch;
pub use control::Control;
pub use decimal::Decimal;
pub use fixed::FixedPoint;
pub use float::FloatingPoint;
pub use load_store::LoadStore;
pub use logical::Logical;

use heapless::Vec;

// Field masks shared by every format
const NIBBLE: u8 = 0xF;
const DISPLACEMENT_MASK: u16 = 0x0FFF;

/// Operand layout of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    RR, // R1,R2
    RX, // R1,D2(X2,B2)
    RS, // R1,R3,D2(B2)
    SI, // D1(B1),I2
    S,  // D2(B2), two-byte opcode
    SS, // D1(L,B1),D2(B2) or D1(L1,B1),D2(L2,B2)
}

/// System/370 mnemonics known to the decoder.
/// Not all of them are implemented by this engine.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    // RR
    SPM, BALR, BCTR, BCR, SSK, ISK, SVC, MVCL, CLCL,
    LPR, LNR, LTR, LCR, NR, CLR, OR, XR, LR, CR, AR, SR, MR, DR, ALR, SLR,
    LPDR, LNDR, LTDR, LCDR, HDR, LRDR, MXR, MXDR, LDR, CDR, ADR, SDR, MDR, DDR, AWR, SWR,
    LPER, LNER, LTER, LCER, HER, LRER, AXR, SXR, LER, CER, AER, SER, MER, DER, AUR, SUR,
    // RX
    STH, LA, STC, IC, EX, BAL, BCT, BC, LH, CH, AH, SH, MH, CVD, CVB,
    ST, N, CL, O, X, L, C, A, S, M, D, AL, SL,
    STD, MXD, LD, CD, AD, SD, MD, DD, AW, SW,
    STE, LE, CE, AE, SE, ME, DE, AU, SU,
    // RS / SI
    SSM, LPSW, DIAG, WRD, RDD, BXH, BXLE, SRL, SLL, SRA, SLA, SRDL, SLDL, SRDA, SLDA,
    STM, TM, MVI, TS, NI, CLI, OI, XI, LM, SIO, TIO, HIO, TCH,
    STNSM, STOSM, SIGP, MC, LRA, B2, STCTL, LCTL, CS, CDS, CLM, STCM, ICM,
    // SS
    MVN, MVC, MVZ, NC, CLC, OC, XC, TR, TRT, ED, EDMK,
    SRP, MVO, PACK, UNPK, ZAP, CP, AP, SP, MP, DP,
}

/// A decoded instruction: an ephemeral view over 2, 4 or 6 fetched bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u32,      // Where the bytes were fetched from
    pub mnem: Mnemonic,    // Mnemonic representation
    pub format: Format,    // Operand layout
    pub bytes: Vec<u8, 6>, // Raw instruction image
}

impl Instruction {
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Length in bytes (2, 4 or 6)
    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Length in halfwords, as recorded in the PSW
    pub fn ilc(&self) -> u8 {
        (self.bytes.len() / 2) as u8
    }

    fn byte(&self, i: usize) -> u8 {
        self.bytes.get(i).copied().unwrap_or(0)
    }

    pub fn r1(&self) -> usize {
        (self.byte(1) >> 4) as usize
    }

    pub fn r2(&self) -> usize {
        (self.byte(1) & NIBBLE) as usize
    }

    /// RS third register shares the R2/X2 position
    pub fn r3(&self) -> usize {
        self.r2()
    }

    pub fn x2(&self) -> usize {
        self.r2()
    }

    /// Branch mask of BC/BCR (CLM/ICM/STCM carry theirs in the R3 position)
    pub fn m(&self) -> u8 {
        self.byte(1) >> 4
    }

    /// SI immediate byte
    pub fn i2(&self) -> u8 {
        self.byte(1)
    }

    /// SS single length field, as encoded (operand length minus one)
    pub fn l(&self) -> u8 {
        self.byte(1)
    }

    pub fn l1(&self) -> u8 {
        self.byte(1) >> 4
    }

    pub fn l2(&self) -> u8 {
        self.byte(1) & NIBBLE
    }

    /// Base of the first storage operand (SI, SS)
    pub fn b1(&self) -> usize {
        (self.byte(2) >> 4) as usize
    }

    pub fn d1(&self) -> u32 {
        self.displacement(2) as u32
    }

    /// Base of the second storage operand; sits after operand 1 in SS
    pub fn b2(&self) -> usize {
        match self.format {
            Format::SS => (self.byte(4) >> 4) as usize,
            _ => (self.byte(2) >> 4) as usize,
        }
    }

    pub fn d2(&self) -> u32 {
        match self.format {
            Format::SS => self.displacement(4) as u32,
            _ => self.displacement(2) as u32,
        }
    }

    fn displacement(&self, at: usize) -> u16 {
        ((self.byte(at) as u16) << 8 | self.byte(at + 1) as u16) & DISPLACEMENT_MASK
    }

    /// Instruction image as a left-aligned 32-bit value, for intercept codes
    pub fn word(&self) -> u32 {
        u32::from_be_bytes([self.byte(0), self.byte(1), self.byte(2), self.byte(3)])
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::cpu::{Cpu, CpuConfig};
    use crate::decoder::decoder;

    pub const CODE_BASE: u32 = 0x1000;

    /// Supervisor-state CPU with zeroed storage and IA at `CODE_BASE`
    pub fn init_cpu() -> Cpu {
        let mut cpu = Cpu::new(CpuConfig::default());
        cpu.set_ia(CODE_BASE);
        cpu
    }

    /// Place `code` at the current IA and run a single instruction
    pub fn run_one(cpu: &mut Cpu, code: &[u8]) {
        let ia = cpu.ia();
        cpu.poke_bytes(ia, code);
        cpu.execute_instruction(0).unwrap();
    }

    #[test]
    fn test_rx_fields() {
        let i = decoder(0, &[0x45, 0x3A, 0x2F, 0x80]).unwrap();
        assert_eq!(i.mnem, Mnemonic::BAL);
        assert_eq!(i.format, Format::RX);
        assert_eq!((i.r1(), i.x2(), i.b2(), i.d2()), (3, 0xA, 2, 0xF80));
        assert_eq!(i.ilc(), 2);
    }

    #[test]
    fn test_ss_fields() {
        let i = decoder(0, &[0xD4, 0x1F, 0x31, 0x23, 0x4F, 0xFF]).unwrap();
        assert_eq!(i.mnem, Mnemonic::NC);
        assert_eq!(i.l(), 0x1F);
        assert_eq!((i.b1(), i.d1()), (3, 0x123));
        assert_eq!((i.b2(), i.d2()), (4, 0xFFF));
        assert_eq!(i.len(), 6);
    }

    #[test]
    fn test_si_fields() {
        let i = decoder(0, &[0x92, 0x5C, 0xB0, 0x10]).unwrap();
        assert_eq!(i.mnem, Mnemonic::MVI);
        assert_eq!(i.i2(), 0x5C);
        assert_eq!((i.b1(), i.d1()), (0xB, 0x010));
    }
}

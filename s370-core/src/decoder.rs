use crate::error::DecodeError;
use crate::instructions::{Format, Instruction, Mnemonic};
use heapless::Vec;
use log::error;

type Entry = Option<(Mnemonic, Format)>;

/// Every opcode defined by the BC-mode instruction set
const DEFINED: &[(u8, Mnemonic, Format)] = {
    use Format::{RR, RS, RX, SI, SS};
    use Mnemonic::*;
    &[
        (0x04, SPM, RR), (0x05, BALR, RR), (0x06, BCTR, RR), (0x07, BCR, RR),
        (0x08, SSK, RR), (0x09, ISK, RR), (0x0A, SVC, RR), (0x0E, MVCL, RR), (0x0F, CLCL, RR),
        (0x10, LPR, RR), (0x11, LNR, RR), (0x12, LTR, RR), (0x13, LCR, RR),
        (0x14, NR, RR), (0x15, CLR, RR), (0x16, OR, RR), (0x17, XR, RR),
        (0x18, LR, RR), (0x19, CR, RR), (0x1A, AR, RR), (0x1B, SR, RR),
        (0x1C, MR, RR), (0x1D, DR, RR), (0x1E, ALR, RR), (0x1F, SLR, RR),
        (0x20, LPDR, RR), (0x21, LNDR, RR), (0x22, LTDR, RR), (0x23, LCDR, RR),
        (0x24, HDR, RR), (0x25, LRDR, RR), (0x26, MXR, RR), (0x27, MXDR, RR),
        (0x28, LDR, RR), (0x29, CDR, RR), (0x2A, ADR, RR), (0x2B, SDR, RR),
        (0x2C, MDR, RR), (0x2D, DDR, RR), (0x2E, AWR, RR), (0x2F, SWR, RR),
        (0x30, LPER, RR), (0x31, LNER, RR), (0x32, LTER, RR), (0x33, LCER, RR),
        (0x34, HER, RR), (0x35, LRER, RR), (0x36, AXR, RR), (0x37, SXR, RR),
        (0x38, LER, RR), (0x39, CER, RR), (0x3A, AER, RR), (0x3B, SER, RR),
        (0x3C, MER, RR), (0x3D, DER, RR), (0x3E, AUR, RR), (0x3F, SUR, RR),
        (0x40, STH, RX), (0x41, LA, RX), (0x42, STC, RX), (0x43, IC, RX),
        (0x44, EX, RX), (0x45, BAL, RX), (0x46, BCT, RX), (0x47, BC, RX),
        (0x48, LH, RX), (0x49, CH, RX), (0x4A, AH, RX), (0x4B, SH, RX),
        (0x4C, MH, RX), (0x4E, CVD, RX), (0x4F, CVB, RX),
        (0x50, ST, RX), (0x54, N, RX), (0x55, CL, RX), (0x56, O, RX), (0x57, X, RX),
        (0x58, L, RX), (0x59, C, RX), (0x5A, A, RX), (0x5B, S, RX),
        (0x5C, M, RX), (0x5D, D, RX), (0x5E, AL, RX), (0x5F, SL, RX),
        (0x60, STD, RX), (0x67, MXD, RX), (0x68, LD, RX), (0x69, CD, RX),
        (0x6A, AD, RX), (0x6B, SD, RX), (0x6C, MD, RX), (0x6D, DD, RX),
        (0x6E, AW, RX), (0x6F, SW, RX),
        (0x70, STE, RX), (0x78, LE, RX), (0x79, CE, RX), (0x7A, AE, RX),
        (0x7B, SE, RX), (0x7C, ME, RX), (0x7D, DE, RX), (0x7E, AU, RX), (0x7F, SU, RX),
        (0x80, SSM, Format::S), (0x82, LPSW, Format::S), (0x83, DIAG, RS), (0x84, WRD, SI), (0x85, RDD, SI),
        (0x86, BXH, RS), (0x87, BXLE, RS), (0x88, SRL, RS), (0x89, SLL, RS),
        (0x8A, SRA, RS), (0x8B, SLA, RS), (0x8C, SRDL, RS), (0x8D, SLDL, RS),
        (0x8E, SRDA, RS), (0x8F, SLDA, RS),
        (0x90, STM, RS), (0x91, TM, SI), (0x92, MVI, SI), (0x93, TS, Format::S),
        (0x94, NI, SI), (0x95, CLI, SI), (0x96, OI, SI), (0x97, XI, SI), (0x98, LM, RS),
        (0x9C, SIO, Format::S), (0x9D, TIO, Format::S), (0x9E, HIO, Format::S), (0x9F, TCH, Format::S),
        (0xAC, STNSM, SI), (0xAD, STOSM, SI), (0xAE, SIGP, RS), (0xAF, MC, SI),
        (0xB1, LRA, RX), (0xB2, B2, Format::S), (0xB6, STCTL, RS), (0xB7, LCTL, RS),
        (0xBA, CS, RS), (0xBB, CDS, RS), (0xBD, CLM, RS), (0xBE, STCM, RS), (0xBF, ICM, RS),
        (0xD1, MVN, SS), (0xD2, MVC, SS), (0xD3, MVZ, SS), (0xD4, NC, SS),
        (0xD5, CLC, SS), (0xD6, OC, SS), (0xD7, XC, SS),
        (0xDC, TR, SS), (0xDD, TRT, SS), (0xDE, ED, SS), (0xDF, EDMK, SS),
        (0xF0, SRP, SS), (0xF1, MVO, SS), (0xF2, PACK, SS), (0xF3, UNPK, SS),
        (0xF8, ZAP, SS), (0xF9, CP, SS), (0xFA, AP, SS), (0xFB, SP, SS),
        (0xFC, MP, SS), (0xFD, DP, SS),
    ]
};

const fn build_table() -> [Entry; 256] {
    let mut table: [Entry; 256] = [None; 256];
    let mut i = 0;
    while i < DEFINED.len() {
        let (op, mnem, format) = DEFINED[i];
        table[op as usize] = Some((mnem, format));
        i += 1;
    }
    table
}

/// Opcode byte -> mnemonic and operand format
static OPCODE_TABLE: [Entry; 256] = build_table();

/// Instruction length is encoded in the two high-order opcode bits
pub fn instruction_length(opcode: u8) -> usize {
    match opcode >> 6 {
        0 => 2,
        1 | 2 => 4,
        _ => 6,
    }
}

pub fn lookup(opcode: u8) -> Entry {
    OPCODE_TABLE[opcode as usize]
}

/// Decode the instruction image fetched from `address`.
/// `bytes` must hold at least `instruction_length(bytes[0])` bytes.
pub fn decoder(address: u32, bytes: &[u8]) -> Result<Instruction, DecodeError> {
    let opcode = bytes[0];
    let (mnem, format) = match lookup(opcode) {
        Some(entry) => entry,
        None => {
            error!("Undefined opcode 0x{:02X} at 0x{:06X}", opcode, address);
            return Err(DecodeError::Undefined(opcode));
        }
    };

    let len = instruction_length(opcode);
    let mut image = Vec::new();
    for b in bytes.iter().take(len) {
        // Capacity is 6, the longest format
        let _ = image.push(*b);
    }

    Ok(Instruction {
        address,
        mnem,
        format,
        bytes: image,
    })
}

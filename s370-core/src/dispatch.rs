use crate::constants::interrupts;
use crate::cpu::Cpu;
use crate::error::{Step, Trap};
use crate::instructions::*;

/// Routes a decoded instruction to its handler
pub trait Dispatch: Sync {
    fn dispatch(&self, cpu: &mut Cpu, inst: &Instruction) -> Step;
    fn name(&self) -> &'static str;
}

/// Dispatch by matching on the mnemonic
pub struct MatchDispatch;

/// Dispatch through a 256-entry handler table indexed by opcode
pub struct TableDispatch;

pub type Handler = fn(&mut Cpu, &Instruction) -> Step;

impl Dispatch for MatchDispatch {
    fn name(&self) -> &'static str {
        "match"
    }

    fn dispatch(&self, cpu: &mut Cpu, inst: &Instruction) -> Step {
        match inst.mnem {
            // Fixed point
            Mnemonic::LTR => cpu.ltr(inst),
            Mnemonic::LCR => cpu.lcr(inst),
            Mnemonic::LPR => cpu.lpr(inst),
            Mnemonic::LNR => cpu.lnr(inst),
            Mnemonic::AR => cpu.ar(inst),
            Mnemonic::A => cpu.a(inst),
            Mnemonic::AH => cpu.ah(inst),
            Mnemonic::SR => cpu.sr(inst),
            Mnemonic::S => cpu.s(inst),
            Mnemonic::SH => cpu.sh(inst),
            Mnemonic::ALR => cpu.alr(inst),
            Mnemonic::AL => cpu.al(inst),
            Mnemonic::SLR => cpu.slr(inst),
            Mnemonic::SL => cpu.sl(inst),
            Mnemonic::MR => cpu.mr(inst),
            Mnemonic::M => cpu.m(inst),
            Mnemonic::MH => cpu.mh(inst),
            Mnemonic::DR => cpu.dr(inst),
            Mnemonic::D => cpu.d(inst),
            Mnemonic::CR => cpu.cr(inst),
            Mnemonic::C => cpu.c(inst),
            Mnemonic::CH => cpu.ch(inst),
            Mnemonic::SLA => cpu.sla(inst),
            Mnemonic::SRA => cpu.sra(inst),
            Mnemonic::SLL => cpu.sll(inst),
            Mnemonic::SRL => cpu.srl(inst),
            Mnemonic::SLDA => cpu.slda(inst),
            Mnemonic::SRDA => cpu.srda(inst),
            Mnemonic::SLDL => cpu.sldl(inst),
            Mnemonic::SRDL => cpu.srdl(inst),
            Mnemonic::SPM => cpu.spm(inst),

            // Loads and stores
            Mnemonic::LR => cpu.lr(inst),
            Mnemonic::L => cpu.l(inst),
            Mnemonic::LH => cpu.lh(inst),
            Mnemonic::ST => cpu.st(inst),
            Mnemonic::STH => cpu.sth(inst),
            Mnemonic::STC => cpu.stc(inst),
            Mnemonic::STM => cpu.stm(inst),
            Mnemonic::LM => cpu.lm(inst),
            Mnemonic::LA => cpu.la(inst),
            Mnemonic::IC => cpu.ic(inst),
            Mnemonic::ICM => cpu.icm(inst),
            Mnemonic::STCM => cpu.stcm(inst),

            // Logical
            Mnemonic::NR => cpu.nr(inst),
            Mnemonic::N => cpu.n(inst),
            Mnemonic::NI => cpu.ni(inst),
            Mnemonic::NC => cpu.nc(inst),
            Mnemonic::OR => cpu.or(inst),
            Mnemonic::O => cpu.o(inst),
            Mnemonic::OI => cpu.oi(inst),
            Mnemonic::OC => cpu.oc(inst),
            Mnemonic::XR => cpu.xr(inst),
            Mnemonic::X => cpu.x(inst),
            Mnemonic::XI => cpu.xi(inst),
            Mnemonic::XC => cpu.xc(inst),
            Mnemonic::CLR => cpu.clr(inst),
            Mnemonic::CL => cpu.cl(inst),
            Mnemonic::CLI => cpu.cli(inst),
            Mnemonic::CLC => cpu.clc(inst),
            Mnemonic::CLM => cpu.clm(inst),
            Mnemonic::TM => cpu.tm(inst),
            Mnemonic::TS => cpu.ts(inst),
            Mnemonic::CS => cpu.cs(inst),
            Mnemonic::CDS => cpu.cds(inst),
            Mnemonic::MVI => cpu.mvi(inst),
            Mnemonic::MVC => cpu.mvc(inst),
            Mnemonic::MVN => cpu.mvn(inst),
            Mnemonic::MVZ => cpu.mvz(inst),
            Mnemonic::MVCL => cpu.mvcl(inst),
            Mnemonic::CLCL => cpu.clcl(inst),
            Mnemonic::TR => cpu.tr(inst),
            Mnemonic::TRT => cpu.trt(inst),

            // Branching
            Mnemonic::BALR => cpu.balr(inst),
            Mnemonic::BAL => cpu.bal(inst),
            Mnemonic::BCTR => cpu.bctr(inst),
            Mnemonic::BCT => cpu.bct(inst),
            Mnemonic::BCR => cpu.bcr(inst),
            Mnemonic::BC => cpu.bc(inst),
            Mnemonic::BXH => cpu.bxh(inst),
            Mnemonic::BXLE => cpu.bxle(inst),

            // Floating point
            Mnemonic::LER => cpu.ler(inst),
            Mnemonic::LE => cpu.le(inst),
            Mnemonic::LDR => cpu.ldr(inst),
            Mnemonic::LD => cpu.ld(inst),
            Mnemonic::STE => cpu.ste(inst),
            Mnemonic::STD => cpu.std(inst),
            Mnemonic::LTER => cpu.lter(inst),
            Mnemonic::LTDR => cpu.ltdr(inst),
            Mnemonic::LCER => cpu.lcer(inst),
            Mnemonic::LCDR => cpu.lcdr(inst),
            Mnemonic::LPER => cpu.lper(inst),
            Mnemonic::LPDR => cpu.lpdr(inst),
            Mnemonic::LNER => cpu.lner(inst),
            Mnemonic::LNDR => cpu.lndr(inst),
            Mnemonic::HER => cpu.her(inst),
            Mnemonic::HDR => cpu.hdr(inst),
            Mnemonic::AER => cpu.aer(inst),
            Mnemonic::AE => cpu.ae(inst),
            Mnemonic::ADR => cpu.adr(inst),
            Mnemonic::AD => cpu.ad(inst),
            Mnemonic::SER => cpu.ser(inst),
            Mnemonic::SE => cpu.se(inst),
            Mnemonic::SDR => cpu.sdr(inst),
            Mnemonic::SD => cpu.sd(inst),
            Mnemonic::AUR => cpu.aur(inst),
            Mnemonic::AU => cpu.au(inst),
            Mnemonic::AWR => cpu.awr(inst),
            Mnemonic::AW => cpu.aw(inst),
            Mnemonic::SUR => cpu.sur(inst),
            Mnemonic::SU => cpu.su(inst),
            Mnemonic::SWR => cpu.swr(inst),
            Mnemonic::SW => cpu.sw(inst),
            Mnemonic::MER => cpu.mer(inst),
            Mnemonic::ME => cpu.me(inst),
            Mnemonic::MDR => cpu.mdr(inst),
            Mnemonic::MD => cpu.md(inst),
            Mnemonic::DER => cpu.der(inst),
            Mnemonic::DE => cpu.de(inst),
            Mnemonic::DDR => cpu.ddr(inst),
            Mnemonic::DD => cpu.dd(inst),
            Mnemonic::CER => cpu.cer(inst),
            Mnemonic::CE => cpu.ce(inst),
            Mnemonic::CDR => cpu.cdr(inst),
            Mnemonic::CD => cpu.cd(inst),

            // Decimal
            Mnemonic::PACK => cpu.pack(inst),
            Mnemonic::UNPK => cpu.unpk(inst),
            Mnemonic::MVO => cpu.mvo(inst),
            Mnemonic::CVB => cpu.cvb(inst),
            Mnemonic::CVD => cpu.cvd(inst),
            Mnemonic::ZAP => cpu.zap(inst),
            Mnemonic::AP => cpu.ap(inst),
            Mnemonic::SP => cpu.sp(inst),
            Mnemonic::CP => cpu.cp(inst),

            // Control
            Mnemonic::EX => cpu.ex(inst),
            Mnemonic::SSM => cpu.ssm(inst),
            Mnemonic::LPSW => cpu.lpsw(inst),
            Mnemonic::STNSM => cpu.stnsm(inst),
            Mnemonic::STOSM => cpu.stosm(inst),
            Mnemonic::ISK => cpu.isk(inst),
            Mnemonic::SSK => cpu.ssk(inst),
            Mnemonic::SVC => cpu.svc(inst),

            // Handed back to the host in every state
            Mnemonic::DIAG
            | Mnemonic::B2
            | Mnemonic::SIO
            | Mnemonic::TIO
            | Mnemonic::HIO
            | Mnemonic::TCH
            | Mnemonic::WRD
            | Mnemonic::RDD
            | Mnemonic::SIGP
            | Mnemonic::LRA
            | Mnemonic::LCTL
            | Mnemonic::STCTL => cpu.intercepted(inst),

            Mnemonic::MXR
            | Mnemonic::MXDR
            | Mnemonic::MXD
            | Mnemonic::AXR
            | Mnemonic::SXR
            | Mnemonic::LRER
            | Mnemonic::LRDR
            | Mnemonic::MP
            | Mnemonic::DP
            | Mnemonic::ED
            | Mnemonic::EDMK
            | Mnemonic::SRP
            | Mnemonic::MC => cpu.unimplemented(inst),
        }
    }
}

/// Slots the decoder never produces
fn operation(_cpu: &mut Cpu, _inst: &Instruction) -> Step {
    Err(Trap::Program(interrupts::OPERATION))
}

const HANDLERS: &[(u8, Handler)] = &[
    // RR
    (0x04, Cpu::spm), (0x05, Cpu::balr), (0x06, Cpu::bctr), (0x07, Cpu::bcr),
    (0x08, Cpu::ssk), (0x09, Cpu::isk), (0x0A, Cpu::svc), (0x0E, Cpu::mvcl), (0x0F, Cpu::clcl),
    (0x10, Cpu::lpr), (0x11, Cpu::lnr), (0x12, Cpu::ltr), (0x13, Cpu::lcr),
    (0x14, Cpu::nr), (0x15, Cpu::clr), (0x16, Cpu::or), (0x17, Cpu::xr),
    (0x18, Cpu::lr), (0x19, Cpu::cr), (0x1A, Cpu::ar), (0x1B, Cpu::sr),
    (0x1C, Cpu::mr), (0x1D, Cpu::dr), (0x1E, Cpu::alr), (0x1F, Cpu::slr),
    (0x20, Cpu::lpdr), (0x21, Cpu::lndr), (0x22, Cpu::ltdr), (0x23, Cpu::lcdr),
    (0x24, Cpu::hdr), (0x25, Cpu::unimplemented), (0x26, Cpu::unimplemented), (0x27, Cpu::unimplemented),
    (0x28, Cpu::ldr), (0x29, Cpu::cdr), (0x2A, Cpu::adr), (0x2B, Cpu::sdr),
    (0x2C, Cpu::mdr), (0x2D, Cpu::ddr), (0x2E, Cpu::awr), (0x2F, Cpu::swr),
    (0x30, Cpu::lper), (0x31, Cpu::lner), (0x32, Cpu::lter), (0x33, Cpu::lcer),
    (0x34, Cpu::her), (0x35, Cpu::unimplemented), (0x36, Cpu::unimplemented), (0x37, Cpu::unimplemented),
    (0x38, Cpu::ler), (0x39, Cpu::cer), (0x3A, Cpu::aer), (0x3B, Cpu::ser),
    (0x3C, Cpu::mer), (0x3D, Cpu::der), (0x3E, Cpu::aur), (0x3F, Cpu::sur),
    // RX
    (0x40, Cpu::sth), (0x41, Cpu::la), (0x42, Cpu::stc), (0x43, Cpu::ic),
    (0x44, Cpu::ex), (0x45, Cpu::bal), (0x46, Cpu::bct), (0x47, Cpu::bc),
    (0x48, Cpu::lh), (0x49, Cpu::ch), (0x4A, Cpu::ah), (0x4B, Cpu::sh),
    (0x4C, Cpu::mh), (0x4E, Cpu::cvd), (0x4F, Cpu::cvb),
    (0x50, Cpu::st), (0x54, Cpu::n), (0x55, Cpu::cl), (0x56, Cpu::o), (0x57, Cpu::x),
    (0x58, Cpu::l), (0x59, Cpu::c), (0x5A, Cpu::a), (0x5B, Cpu::s),
    (0x5C, Cpu::m), (0x5D, Cpu::d), (0x5E, Cpu::al), (0x5F, Cpu::sl),
    (0x60, Cpu::std), (0x67, Cpu::unimplemented), (0x68, Cpu::ld), (0x69, Cpu::cd),
    (0x6A, Cpu::ad), (0x6B, Cpu::sd), (0x6C, Cpu::md), (0x6D, Cpu::dd),
    (0x6E, Cpu::aw), (0x6F, Cpu::sw),
    (0x70, Cpu::ste), (0x78, Cpu::le), (0x79, Cpu::ce), (0x7A, Cpu::ae),
    (0x7B, Cpu::se), (0x7C, Cpu::me), (0x7D, Cpu::de), (0x7E, Cpu::au), (0x7F, Cpu::su),
    // RS, SI and S
    (0x80, Cpu::ssm), (0x82, Cpu::lpsw), (0x83, Cpu::intercepted),
    (0x84, Cpu::intercepted), (0x85, Cpu::intercepted),
    (0x86, Cpu::bxh), (0x87, Cpu::bxle), (0x88, Cpu::srl), (0x89, Cpu::sll),
    (0x8A, Cpu::sra), (0x8B, Cpu::sla), (0x8C, Cpu::srdl), (0x8D, Cpu::sldl),
    (0x8E, Cpu::srda), (0x8F, Cpu::slda),
    (0x90, Cpu::stm), (0x91, Cpu::tm), (0x92, Cpu::mvi), (0x93, Cpu::ts),
    (0x94, Cpu::ni), (0x95, Cpu::cli), (0x96, Cpu::oi), (0x97, Cpu::xi), (0x98, Cpu::lm),
    (0x9C, Cpu::intercepted), (0x9D, Cpu::intercepted), (0x9E, Cpu::intercepted), (0x9F, Cpu::intercepted),
    (0xAC, Cpu::stnsm), (0xAD, Cpu::stosm), (0xAE, Cpu::intercepted), (0xAF, Cpu::unimplemented),
    (0xB1, Cpu::intercepted), (0xB2, Cpu::intercepted), (0xB6, Cpu::intercepted), (0xB7, Cpu::intercepted),
    (0xBA, Cpu::cs), (0xBB, Cpu::cds), (0xBD, Cpu::clm), (0xBE, Cpu::stcm), (0xBF, Cpu::icm),
    // SS
    (0xD1, Cpu::mvn), (0xD2, Cpu::mvc), (0xD3, Cpu::mvz), (0xD4, Cpu::nc),
    (0xD5, Cpu::clc), (0xD6, Cpu::oc), (0xD7, Cpu::xc),
    (0xDC, Cpu::tr), (0xDD, Cpu::trt), (0xDE, Cpu::unimplemented), (0xDF, Cpu::unimplemented),
    (0xF0, Cpu::unimplemented), (0xF1, Cpu::mvo), (0xF2, Cpu::pack), (0xF3, Cpu::unpk),
    (0xF8, Cpu::zap), (0xF9, Cpu::cp), (0xFA, Cpu::ap), (0xFB, Cpu::sp),
    (0xFC, Cpu::unimplemented), (0xFD, Cpu::unimplemented),
];

const fn build_table() -> [Handler; 256] {
    let mut table: [Handler; 256] = [operation; 256];
    let mut i = 0;
    while i < HANDLERS.len() {
        let (op, handler) = HANDLERS[i];
        table[op as usize] = handler;
        i += 1;
    }
    table
}

static HANDLER_TABLE: [Handler; 256] = build_table();

impl Dispatch for TableDispatch {
    fn name(&self) -> &'static str {
        "table"
    }

    fn dispatch(&self, cpu: &mut Cpu, inst: &Instruction) -> Step {
        HANDLER_TABLE[inst.opcode() as usize](cpu, inst)
    }
}

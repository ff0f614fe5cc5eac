use thiserror::Error;

/// Opcode byte with no entry in the instruction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("undefined opcode {0:#04x}")]
    Undefined(u8),
}

/// Why a PSW loaded by LPSW was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PswError {
    #[error("EC-mode PSW cannot be loaded in BC mode")]
    ExtendedControl,
    #[error("disabled wait state")]
    DisabledWait,
}

/// Failures surfaced to the caller of `Cpu::execute_instruction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("invalid PSW loaded from {address:#08x}: {reason}")]
    InvalidPsw { address: u32, reason: PswError },
}

/// Everything that can cut an instruction short.
///
/// Handlers propagate these with `?`; the execute loop turns them into an
/// interrupt, an intercept result or a caller-visible error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// Program interruption with the given interruption code
    Program(u16),
    /// SVC interruption with the instruction's operand byte
    Supervisor(u8),
    /// Privileged operation handed back to the host
    Intercept(u32),
    /// Architected opcode this engine does not implement
    Unimplemented(u8),
    /// Rejected LPSW, live PSW already updated
    InvalidPsw(CpuError),
}

/// Result of one instruction handler
pub type Step = Result<(), Trap>;

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod constants;
pub mod cpu;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod hfp;
pub mod instructions;
pub mod memory;
pub mod psw;
pub mod utils;

pub use cpu::{Cpu, CpuConfig, ExecResult, Strategy};
pub use error::{CpuError, DecodeError, PswError};
pub use psw::Psw;

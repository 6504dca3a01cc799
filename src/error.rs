use std::collections::TryReserveError;

use thiserror::Error;

/// Raised by the step loop when decode cannot continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error("illegal opcode 0x{opcode:02X} at 0x{address:04X}")]
    IllegalOpcode { opcode: u8, address: u16 },
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("could not grow the device registry: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("device window 0x{start:04X}+0x{len:X} does not fit the address space")]
    InvalidRange { start: u16, len: usize },
}

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("image of {len} bytes at offset 0x{offset:04X} exceeds device size 0x{size:X}")]
    ImageTooLarge { offset: usize, len: usize, size: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

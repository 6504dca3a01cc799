pub mod bus;
pub mod cli;
pub mod cpu;
pub mod disasm;
pub mod error;
pub mod memory;

pub use bus::{Bus, Device, DeviceId};
pub use cpu::{Cpu, Interrupts, Registers, Status};
pub use error::{CpuError, MemoryError, RegistrationError};
pub use memory::{Ram, Rom};

//! 6502 core: register file, stack, step loop and interrupt entry points.

pub mod addressing;
mod instructions;
pub mod opcodes;
pub mod registers;

use crate::bus::{Bus, Device, DeviceId};
use crate::error::{CpuError, RegistrationError};

pub use addressing::Mode;
pub use opcodes::{lookup, Opcode, OPCODES};
pub use registers::{Interrupts, Registers, Status};

pub const STACK_BASE: u16 = 0x0100;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Bytes skipped past the current PC before an interrupt pushes its return
/// address. For BRK these are the padding bytes after the opcode.
pub const INTERRUPT_SKIP: u16 = 2;

pub struct Cpu {
    pub regs: Registers,
    pending: Interrupts,
    cycles: u64,
    bus: Bus,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            regs: Registers::new(),
            pending: Interrupts::empty(),
            cycles: 0,
            bus: Bus::new(),
        }
    }

    /// Append a device to the bus. Must be done before the first `step`.
    pub fn register_device<D: Device + 'static>(
        &mut self,
        start: u16,
        device: D,
    ) -> Result<DeviceId, RegistrationError> {
        self.bus.register(start, device)
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn registers(&self) -> Registers {
        self.regs
    }

    /// Total declared cycles of every instruction executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn pending_interrupts(&self) -> Interrupts {
        self.pending
    }

    /// Return the recorded interrupt requests and clear them.
    pub fn take_pending_interrupts(&mut self) -> Interrupts {
        std::mem::replace(&mut self.pending, Interrupts::empty())
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bus.write(addr, value);
    }

    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let value = self.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    pub fn push(&mut self, value: u8) {
        self.write(STACK_BASE | self.regs.sp as u16, value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    pub fn pop(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.read(STACK_BASE | self.regs.sp as u16)
    }

    /// High byte first, so the word sits little-endian in memory.
    pub fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }

    /// Execute one instruction and return its declared cycle count.
    ///
    /// An undefined opcode leaves every register untouched, so stepping
    /// again reports the same error.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let address = self.regs.pc;
        let opcode = self.read(address);
        let entry = lookup(opcode);

        if !entry.is_defined() {
            log::error!("Illegal opcode 0x{:02X} at PC: 0x{:04X}", opcode, address);
            return Err(CpuError::IllegalOpcode { opcode, address });
        }

        log::trace!(
            "PC: 0x{:04X}, Op: 0x{:02X} {} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            address,
            opcode,
            entry.mnemonic,
            self.regs.a,
            self.regs.x,
            self.regs.y,
            self.regs.status.bits(),
            self.regs.sp
        );

        self.regs.pc = address.wrapping_add(1);
        (entry.execute)(self);

        let cycles = entry.cycles as u32;
        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Step until at least `budget` cycles have elapsed. Returns the cycles
    /// actually consumed, which may overshoot by one instruction.
    pub fn run(&mut self, budget: u64) -> Result<u64, CpuError> {
        let mut elapsed = 0;
        while elapsed < budget {
            elapsed += self.step()? as u64;
        }
        Ok(elapsed)
    }

    pub fn trigger_nmi(&mut self) {
        self.interrupt(Interrupts::NMI, NMI_VECTOR, false);
    }

    pub fn trigger_irq(&mut self) {
        self.interrupt(Interrupts::IRQ, IRQ_VECTOR, false);
    }

    pub fn trigger_reset(&mut self) {
        self.interrupt(Interrupts::RESET, RESET_VECTOR, false);
    }

    /// Shared by BRK and the external triggers: skip two bytes, push PC
    /// high, PC low and the status byte, mask IRQs, then jump through
    /// `vector`. RTI undoes the pushes in reverse.
    pub(crate) fn interrupt(&mut self, source: Interrupts, vector: u16, brk: bool) {
        self.regs.pc = self.regs.pc.wrapping_add(INTERRUPT_SKIP);
        self.push_word(self.regs.pc);

        let mut pushed = self.regs.status;
        pushed.set(Status::BREAK, brk);
        self.push(pushed.bits());

        self.set_flag(Status::INTERRUPT);
        self.pending |= source;
        self.regs.pc = self.bus.read_word(vector);
        log::debug!("{:?} vectored through 0x{:04X} to 0x{:04X}", source, vector, self.regs.pc);
    }
}

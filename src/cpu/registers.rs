use bitflags::bitflags;

use super::Cpu;

bitflags! {
    /// Processor status byte (NV-BDIZC).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const INTERRUPT = 0b00000100;
        const DECIMAL = 0b00001000;
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

bitflags! {
    /// Interrupt sources that have been requested and vectored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interrupts: u8 {
        const NMI = 0b0001;
        const IRQ = 0b0010;
        const RESET = 0b0100;
        const BRK = 0b1000;
    }
}

/// Architectural register file. Copyable, so it doubles as a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
}

impl Registers {
    /// Power-on image: A=X=Y=0, SP=0xFF, PC=0x8000, all flags clear.
    pub const fn new() -> Self {
        Registers {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0x8000,
            status: Status::empty(),
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn set_flag(&mut self, mask: Status) {
        self.regs.status.insert(mask);
    }

    /// Set `mask` when `condition` holds, clear it otherwise.
    pub fn set_flag_if(&mut self, mask: Status, condition: bool) {
        self.regs.status.set(mask, condition);
    }

    pub fn clear_flag(&mut self, mask: Status) {
        self.regs.status.remove(mask);
    }

    pub fn test_flag(&self, mask: Status) -> bool {
        self.regs.status.contains(mask)
    }

    pub fn update_nz(&mut self, value: u8) {
        self.set_flag_if(Status::NEGATIVE, value & 0x80 != 0);
        self.set_flag_if(Status::ZERO, value == 0);
    }

    /// N and Z from the low byte of a 9-bit result, C from bit 8.
    pub fn update_nzc(&mut self, value: u16) {
        self.update_nz(value as u8);
        self.set_flag_if(Status::CARRY, value & 0x100 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_nz_covers_every_byte() {
        let mut cpu = Cpu::new();
        for carry in [false, true] {
            cpu.set_flag_if(Status::CARRY, carry);
            for v in 0..=255u8 {
                cpu.update_nz(v);
                assert_eq!(cpu.test_flag(Status::ZERO), v == 0, "Z for {:02X}", v);
                assert_eq!(cpu.test_flag(Status::NEGATIVE), v & 0x80 != 0, "N for {:02X}", v);
                assert_eq!(cpu.test_flag(Status::CARRY), carry, "C touched for {:02X}", v);
            }
        }
    }

    #[test]
    fn update_nzc_carry_tracks_bit_eight() {
        let mut cpu = Cpu::new();
        for r in 0..=0x1FFu16 {
            cpu.update_nzc(r);
            assert_eq!(cpu.test_flag(Status::CARRY), r > 0xFF, "C for {:03X}", r);
            assert_eq!(cpu.test_flag(Status::ZERO), r & 0xFF == 0, "Z for {:03X}", r);
            assert_eq!(cpu.test_flag(Status::NEGATIVE), r & 0x80 != 0, "N for {:03X}", r);
        }
    }

    #[test]
    fn flag_primitives() {
        let mut cpu = Cpu::new();
        cpu.set_flag(Status::DECIMAL | Status::OVERFLOW);
        assert!(cpu.test_flag(Status::DECIMAL));
        assert!(cpu.test_flag(Status::OVERFLOW));

        cpu.clear_flag(Status::DECIMAL);
        assert!(!cpu.test_flag(Status::DECIMAL));

        cpu.set_flag_if(Status::OVERFLOW, false);
        assert_eq!(cpu.regs.status, Status::empty());
    }

    #[test]
    fn status_bits_match_the_6502_layout() {
        assert_eq!(Status::NEGATIVE.bits(), 0x80);
        assert_eq!(Status::OVERFLOW.bits(), 0x40);
        assert_eq!(Status::BREAK.bits(), 0x10);
        assert_eq!(Status::DECIMAL.bits(), 0x08);
        assert_eq!(Status::INTERRUPT.bits(), 0x04);
        assert_eq!(Status::ZERO.bits(), 0x02);
        assert_eq!(Status::CARRY.bits(), 0x01);
    }
}

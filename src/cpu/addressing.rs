//! Addressing modes as zero-sized strategy types.
//!
//! Each mode is resolved at compile time through a generic parameter on the
//! instruction handler, so the opcode table holds plain function pointers
//! with no per-call mode dispatch. Resolving consumes the operand bytes at
//! PC and leaves PC on the next opcode.

use super::Cpu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl Mode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndexedIndirect
            | Mode::IndirectIndexed
            | Mode::Relative => 1,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
        }
    }
}

/// Where an instruction's operand lives once its mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Accumulator,
    Value(u8),
    Address(u16),
}

pub(crate) trait Addressing {
    const MODE: Mode;

    fn resolve(cpu: &mut Cpu) -> Operand;
}

/// Modes that always produce an effective address.
pub(crate) trait Effective: Addressing {
    fn effective(cpu: &mut Cpu) -> u16;
}

pub(crate) struct Implied;
pub(crate) struct Accumulator;
pub(crate) struct Immediate;
pub(crate) struct ZeroPage;
pub(crate) struct ZeroPageX;
pub(crate) struct ZeroPageY;
pub(crate) struct Absolute;
pub(crate) struct AbsoluteX;
pub(crate) struct AbsoluteY;
pub(crate) struct Indirect;
pub(crate) struct IndexedIndirect;
pub(crate) struct IndirectIndexed;
pub(crate) struct Relative;

// Only used for table metadata; implied handlers never resolve an operand.
impl Addressing for Implied {
    const MODE: Mode = Mode::Implied;

    fn resolve(_cpu: &mut Cpu) -> Operand {
        Operand::Accumulator
    }
}

impl Addressing for Accumulator {
    const MODE: Mode = Mode::Accumulator;

    fn resolve(_cpu: &mut Cpu) -> Operand {
        Operand::Accumulator
    }
}

impl Addressing for Immediate {
    const MODE: Mode = Mode::Immediate;

    fn resolve(cpu: &mut Cpu) -> Operand {
        Operand::Value(cpu.fetch_byte())
    }
}

macro_rules! memory_modes {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Addressing for $ty {
                const MODE: Mode = Mode::$ty;

                fn resolve(cpu: &mut Cpu) -> Operand {
                    Operand::Address(Self::effective(cpu))
                }
            }
        )*
    };
}

memory_modes!(
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
);

impl Effective for ZeroPage {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_byte() as u16
    }
}

impl Effective for ZeroPageX {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_byte().wrapping_add(cpu.regs.x) as u16
    }
}

impl Effective for ZeroPageY {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_byte().wrapping_add(cpu.regs.y) as u16
    }
}

impl Effective for Absolute {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_word()
    }
}

impl Effective for AbsoluteX {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_word().wrapping_add(cpu.regs.x as u16)
    }
}

impl Effective for AbsoluteY {
    fn effective(cpu: &mut Cpu) -> u16 {
        cpu.fetch_word().wrapping_add(cpu.regs.y as u16)
    }
}

impl Effective for Indirect {
    /// The pointer's high byte is fetched without carrying into the next
    /// page, so `($10FF)` reads its high byte from `$1000`.
    fn effective(cpu: &mut Cpu) -> u16 {
        let ptr = cpu.fetch_word();
        let lo = cpu.read(ptr) as u16;
        let hi = cpu.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
        (hi << 8) | lo
    }
}

impl Effective for IndexedIndirect {
    fn effective(cpu: &mut Cpu) -> u16 {
        let zp = cpu.fetch_byte().wrapping_add(cpu.regs.x);
        read_word_zp(cpu, zp)
    }
}

impl Effective for IndirectIndexed {
    fn effective(cpu: &mut Cpu) -> u16 {
        let zp = cpu.fetch_byte();
        read_word_zp(cpu, zp).wrapping_add(cpu.regs.y as u16)
    }
}

impl Effective for Relative {
    fn effective(cpu: &mut Cpu) -> u16 {
        let offset = cpu.fetch_byte() as i8;
        cpu.regs.pc.wrapping_add(offset as u16)
    }
}

/// Pointer fetch from page zero; the high byte wraps to `$00` after `$FF`.
fn read_word_zp(cpu: &mut Cpu, base: u8) -> u16 {
    let lo = cpu.read(base as u16) as u16;
    let hi = cpu.read(base.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

impl Cpu {
    pub(crate) fn load(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.regs.a,
            Operand::Value(v) => v,
            Operand::Address(addr) => self.read(addr),
        }
    }

    pub(crate) fn store(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.regs.a = value,
            Operand::Address(addr) => self.write(addr, value),
            Operand::Value(_) => {
                log::error!("Store of {:02X} into an immediate operand dropped", value)
            }
        }
    }
}

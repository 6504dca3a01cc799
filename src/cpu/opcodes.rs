//! The 256-entry opcode table.
//!
//! Built once at compile time and shared by every `Cpu`. Each entry pairs a
//! handler, already specialised for its addressing mode, with the
//! instruction's base cycle count. Unassigned opcodes hold the `undefined`
//! sentinel with zero cycles.

use std::fmt;

use super::addressing::{
    Absolute, AbsoluteX, AbsoluteY, Accumulator, Addressing, Immediate, Implied, IndexedIndirect,
    Indirect, IndirectIndexed, Mode, Relative, ZeroPage, ZeroPageX, ZeroPageY,
};
use super::instructions::*;
use super::Cpu;

#[derive(Clone, Copy)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub mode: Mode,
    pub cycles: u8,
    pub(crate) execute: fn(&mut Cpu),
}

impl Opcode {
    pub fn is_defined(&self) -> bool {
        self.cycles != 0
    }

    /// Instruction length in bytes, opcode included.
    pub fn byte_len(&self) -> u16 {
        1 + self.mode.operand_len()
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opcode")
            .field("mnemonic", &self.mnemonic)
            .field("mode", &self.mode)
            .field("cycles", &self.cycles)
            .finish()
    }
}

const UNDEFINED: Opcode = Opcode {
    mnemonic: "???",
    mode: Mode::Implied,
    cycles: 0,
    execute: undefined,
};

const fn op<M: Addressing>(mnemonic: &'static str, cycles: u8, execute: fn(&mut Cpu)) -> Opcode {
    Opcode {
        mnemonic,
        mode: M::MODE,
        cycles,
        execute,
    }
}

pub fn lookup(opcode: u8) -> &'static Opcode {
    &OPCODES[opcode as usize]
}

pub static OPCODES: [Opcode; 256] = build();

const fn build() -> [Opcode; 256] {
    let mut t = [UNDEFINED; 256];

    // 0x00 - 0x1F
    t[0x00] = op::<Implied>("BRK", 7, brk);
    t[0x01] = op::<IndexedIndirect>("ORA", 6, ora::<IndexedIndirect>);
    t[0x05] = op::<ZeroPage>("ORA", 3, ora::<ZeroPage>);
    t[0x06] = op::<ZeroPage>("ASL", 5, asl::<ZeroPage>);
    t[0x08] = op::<Implied>("PHP", 3, php);
    t[0x09] = op::<Immediate>("ORA", 2, ora::<Immediate>);
    t[0x0A] = op::<Accumulator>("ASL", 2, asl::<Accumulator>);
    t[0x0D] = op::<Absolute>("ORA", 4, ora::<Absolute>);
    t[0x0E] = op::<Absolute>("ASL", 6, asl::<Absolute>);
    t[0x10] = op::<Relative>("BPL", 2, bpl::<Relative>);
    t[0x11] = op::<IndirectIndexed>("ORA", 5, ora::<IndirectIndexed>);
    t[0x15] = op::<ZeroPageX>("ORA", 4, ora::<ZeroPageX>);
    t[0x16] = op::<ZeroPageX>("ASL", 6, asl::<ZeroPageX>);
    t[0x18] = op::<Implied>("CLC", 2, clc);
    t[0x19] = op::<AbsoluteY>("ORA", 4, ora::<AbsoluteY>);
    t[0x1D] = op::<AbsoluteX>("ORA", 4, ora::<AbsoluteX>);
    t[0x1E] = op::<AbsoluteX>("ASL", 7, asl::<AbsoluteX>);

    // 0x20 - 0x3F
    t[0x20] = op::<Absolute>("JSR", 6, jsr::<Absolute>);
    t[0x21] = op::<IndexedIndirect>("AND", 6, and::<IndexedIndirect>);
    t[0x24] = op::<ZeroPage>("BIT", 3, bit::<ZeroPage>);
    t[0x25] = op::<ZeroPage>("AND", 3, and::<ZeroPage>);
    t[0x26] = op::<ZeroPage>("ROL", 5, rol::<ZeroPage>);
    t[0x28] = op::<Implied>("PLP", 4, plp);
    t[0x29] = op::<Immediate>("AND", 2, and::<Immediate>);
    t[0x2A] = op::<Accumulator>("ROL", 2, rol::<Accumulator>);
    t[0x2C] = op::<Absolute>("BIT", 4, bit::<Absolute>);
    t[0x2D] = op::<Absolute>("AND", 4, and::<Absolute>);
    t[0x2E] = op::<Absolute>("ROL", 6, rol::<Absolute>);
    t[0x30] = op::<Relative>("BMI", 2, bmi::<Relative>);
    t[0x31] = op::<IndirectIndexed>("AND", 5, and::<IndirectIndexed>);
    t[0x35] = op::<ZeroPageX>("AND", 4, and::<ZeroPageX>);
    t[0x36] = op::<ZeroPageX>("ROL", 6, rol::<ZeroPageX>);
    t[0x38] = op::<Implied>("SEC", 2, sec);
    t[0x39] = op::<AbsoluteY>("AND", 4, and::<AbsoluteY>);
    t[0x3D] = op::<AbsoluteX>("AND", 4, and::<AbsoluteX>);
    t[0x3E] = op::<AbsoluteX>("ROL", 7, rol::<AbsoluteX>);

    // 0x40 - 0x5F
    t[0x40] = op::<Implied>("RTI", 6, rti);
    t[0x41] = op::<IndexedIndirect>("EOR", 6, eor::<IndexedIndirect>);
    t[0x45] = op::<ZeroPage>("EOR", 3, eor::<ZeroPage>);
    t[0x46] = op::<ZeroPage>("LSR", 5, lsr::<ZeroPage>);
    t[0x48] = op::<Implied>("PHA", 3, pha);
    t[0x49] = op::<Immediate>("EOR", 2, eor::<Immediate>);
    t[0x4A] = op::<Accumulator>("LSR", 2, lsr::<Accumulator>);
    t[0x4C] = op::<Absolute>("JMP", 3, jmp::<Absolute>);
    t[0x4D] = op::<Absolute>("EOR", 4, eor::<Absolute>);
    t[0x4E] = op::<Absolute>("LSR", 6, lsr::<Absolute>);
    t[0x50] = op::<Relative>("BVC", 2, bvc::<Relative>);
    t[0x51] = op::<IndirectIndexed>("EOR", 5, eor::<IndirectIndexed>);
    t[0x55] = op::<ZeroPageX>("EOR", 4, eor::<ZeroPageX>);
    t[0x56] = op::<ZeroPageX>("LSR", 6, lsr::<ZeroPageX>);
    t[0x58] = op::<Implied>("CLI", 2, cli);
    t[0x59] = op::<AbsoluteY>("EOR", 4, eor::<AbsoluteY>);
    t[0x5D] = op::<AbsoluteX>("EOR", 4, eor::<AbsoluteX>);
    t[0x5E] = op::<AbsoluteX>("LSR", 7, lsr::<AbsoluteX>);

    // 0x60 - 0x7F
    t[0x60] = op::<Implied>("RTS", 6, rts);
    t[0x61] = op::<IndexedIndirect>("ADC", 6, adc::<IndexedIndirect>);
    t[0x65] = op::<ZeroPage>("ADC", 3, adc::<ZeroPage>);
    t[0x66] = op::<ZeroPage>("ROR", 5, ror::<ZeroPage>);
    t[0x68] = op::<Implied>("PLA", 4, pla);
    t[0x69] = op::<Immediate>("ADC", 2, adc::<Immediate>);
    t[0x6A] = op::<Accumulator>("ROR", 2, ror::<Accumulator>);
    t[0x6C] = op::<Indirect>("JMP", 5, jmp::<Indirect>);
    t[0x6D] = op::<Absolute>("ADC", 4, adc::<Absolute>);
    t[0x6E] = op::<Absolute>("ROR", 6, ror::<Absolute>);
    t[0x70] = op::<Relative>("BVS", 2, bvs::<Relative>);
    t[0x71] = op::<IndirectIndexed>("ADC", 5, adc::<IndirectIndexed>);
    t[0x75] = op::<ZeroPageX>("ADC", 4, adc::<ZeroPageX>);
    t[0x76] = op::<ZeroPageX>("ROR", 6, ror::<ZeroPageX>);
    t[0x78] = op::<Implied>("SEI", 2, sei);
    t[0x79] = op::<AbsoluteY>("ADC", 4, adc::<AbsoluteY>);
    t[0x7D] = op::<AbsoluteX>("ADC", 4, adc::<AbsoluteX>);
    t[0x7E] = op::<AbsoluteX>("ROR", 7, ror::<AbsoluteX>);

    // 0x80 - 0x9F
    t[0x81] = op::<IndexedIndirect>("STA", 6, sta::<IndexedIndirect>);
    t[0x84] = op::<ZeroPage>("STY", 3, sty::<ZeroPage>);
    t[0x85] = op::<ZeroPage>("STA", 3, sta::<ZeroPage>);
    t[0x86] = op::<ZeroPage>("STX", 3, stx::<ZeroPage>);
    t[0x88] = op::<Implied>("DEY", 2, dey);
    t[0x8A] = op::<Implied>("TXA", 2, txa);
    t[0x8C] = op::<Absolute>("STY", 4, sty::<Absolute>);
    t[0x8D] = op::<Absolute>("STA", 4, sta::<Absolute>);
    t[0x8E] = op::<Absolute>("STX", 4, stx::<Absolute>);
    t[0x90] = op::<Relative>("BCC", 2, bcc::<Relative>);
    t[0x91] = op::<IndirectIndexed>("STA", 6, sta::<IndirectIndexed>);
    t[0x94] = op::<ZeroPageX>("STY", 4, sty::<ZeroPageX>);
    t[0x95] = op::<ZeroPageX>("STA", 4, sta::<ZeroPageX>);
    t[0x96] = op::<ZeroPageY>("STX", 4, stx::<ZeroPageY>);
    t[0x98] = op::<Implied>("TYA", 2, tya);
    t[0x99] = op::<AbsoluteY>("STA", 5, sta::<AbsoluteY>);
    t[0x9A] = op::<Implied>("TXS", 2, txs);
    t[0x9D] = op::<AbsoluteX>("STA", 5, sta::<AbsoluteX>);

    // 0xA0 - 0xBF
    t[0xA0] = op::<Immediate>("LDY", 2, ldy::<Immediate>);
    t[0xA1] = op::<IndexedIndirect>("LDA", 6, lda::<IndexedIndirect>);
    t[0xA2] = op::<Immediate>("LDX", 2, ldx::<Immediate>);
    t[0xA4] = op::<ZeroPage>("LDY", 3, ldy::<ZeroPage>);
    t[0xA5] = op::<ZeroPage>("LDA", 3, lda::<ZeroPage>);
    t[0xA6] = op::<ZeroPage>("LDX", 3, ldx::<ZeroPage>);
    t[0xA8] = op::<Implied>("TAY", 2, tay);
    t[0xA9] = op::<Immediate>("LDA", 2, lda::<Immediate>);
    t[0xAA] = op::<Implied>("TAX", 2, tax);
    t[0xAC] = op::<Absolute>("LDY", 4, ldy::<Absolute>);
    t[0xAD] = op::<Absolute>("LDA", 4, lda::<Absolute>);
    t[0xAE] = op::<Absolute>("LDX", 4, ldx::<Absolute>);
    t[0xB0] = op::<Relative>("BCS", 2, bcs::<Relative>);
    t[0xB1] = op::<IndirectIndexed>("LDA", 5, lda::<IndirectIndexed>);
    t[0xB4] = op::<ZeroPageX>("LDY", 4, ldy::<ZeroPageX>);
    t[0xB5] = op::<ZeroPageX>("LDA", 4, lda::<ZeroPageX>);
    t[0xB6] = op::<ZeroPageY>("LDX", 4, ldx::<ZeroPageY>);
    t[0xB8] = op::<Implied>("CLV", 2, clv);
    t[0xB9] = op::<AbsoluteY>("LDA", 4, lda::<AbsoluteY>);
    t[0xBA] = op::<Implied>("TSX", 2, tsx);
    t[0xBC] = op::<AbsoluteX>("LDY", 4, ldy::<AbsoluteX>);
    t[0xBD] = op::<AbsoluteX>("LDA", 4, lda::<AbsoluteX>);
    t[0xBE] = op::<AbsoluteY>("LDX", 4, ldx::<AbsoluteY>);

    // 0xC0 - 0xDF
    t[0xC0] = op::<Immediate>("CPY", 2, cpy::<Immediate>);
    t[0xC1] = op::<IndexedIndirect>("CMP", 6, cmp::<IndexedIndirect>);
    t[0xC4] = op::<ZeroPage>("CPY", 3, cpy::<ZeroPage>);
    t[0xC5] = op::<ZeroPage>("CMP", 3, cmp::<ZeroPage>);
    t[0xC6] = op::<ZeroPage>("DEC", 5, dec::<ZeroPage>);
    t[0xC8] = op::<Implied>("INY", 2, iny);
    t[0xC9] = op::<Immediate>("CMP", 2, cmp::<Immediate>);
    t[0xCA] = op::<Implied>("DEX", 2, dex);
    t[0xCC] = op::<Absolute>("CPY", 4, cpy::<Absolute>);
    t[0xCD] = op::<Absolute>("CMP", 4, cmp::<Absolute>);
    t[0xCE] = op::<Absolute>("DEC", 6, dec::<Absolute>);
    t[0xD0] = op::<Relative>("BNE", 2, bne::<Relative>);
    t[0xD1] = op::<IndirectIndexed>("CMP", 5, cmp::<IndirectIndexed>);
    t[0xD5] = op::<ZeroPageX>("CMP", 4, cmp::<ZeroPageX>);
    t[0xD6] = op::<ZeroPageX>("DEC", 6, dec::<ZeroPageX>);
    t[0xD8] = op::<Implied>("CLD", 2, cld);
    t[0xD9] = op::<AbsoluteY>("CMP", 4, cmp::<AbsoluteY>);
    t[0xDD] = op::<AbsoluteX>("CMP", 4, cmp::<AbsoluteX>);
    t[0xDE] = op::<AbsoluteX>("DEC", 7, dec::<AbsoluteX>);

    // 0xE0 - 0xFF
    t[0xE0] = op::<Immediate>("CPX", 2, cpx::<Immediate>);
    t[0xE1] = op::<IndexedIndirect>("SBC", 6, sbc::<IndexedIndirect>);
    t[0xE4] = op::<ZeroPage>("CPX", 3, cpx::<ZeroPage>);
    t[0xE5] = op::<ZeroPage>("SBC", 3, sbc::<ZeroPage>);
    t[0xE6] = op::<ZeroPage>("INC", 5, inc::<ZeroPage>);
    t[0xE8] = op::<Implied>("INX", 2, inx);
    t[0xE9] = op::<Immediate>("SBC", 2, sbc::<Immediate>);
    t[0xEA] = op::<Implied>("NOP", 2, nop);
    t[0xEC] = op::<Absolute>("CPX", 4, cpx::<Absolute>);
    t[0xED] = op::<Absolute>("SBC", 4, sbc::<Absolute>);
    t[0xEE] = op::<Absolute>("INC", 6, inc::<Absolute>);
    t[0xF0] = op::<Relative>("BEQ", 2, beq::<Relative>);
    t[0xF1] = op::<IndirectIndexed>("SBC", 5, sbc::<IndirectIndexed>);
    t[0xF5] = op::<ZeroPageX>("SBC", 4, sbc::<ZeroPageX>);
    t[0xF6] = op::<ZeroPageX>("INC", 6, inc::<ZeroPageX>);
    t[0xF8] = op::<Implied>("SED", 2, sed);
    t[0xF9] = op::<AbsoluteY>("SBC", 4, sbc::<AbsoluteY>);
    t[0xFD] = op::<AbsoluteX>("SBC", 4, sbc::<AbsoluteX>);
    t[0xFE] = op::<AbsoluteX>("INC", 7, inc::<AbsoluteX>);

    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn official_opcode_coverage() {
        let defined = OPCODES.iter().filter(|op| op.is_defined()).count();
        assert_eq!(defined, 151);

        let mnemonics: HashSet<_> = OPCODES
            .iter()
            .filter(|op| op.is_defined())
            .map(|op| op.mnemonic)
            .collect();
        assert_eq!(mnemonics.len(), 56);
    }

    #[test]
    fn undefined_entries_have_no_cycles() {
        for code in [0x02u8, 0x03, 0x80, 0x9C, 0xFF] {
            let entry = lookup(code);
            assert!(!entry.is_defined(), "0x{:02X}", code);
            assert_eq!(entry.mnemonic, "???");
            assert_eq!(entry.cycles, 0);
        }
    }

    #[test]
    fn metadata_for_sample_entries() {
        let lda = lookup(0xA9);
        assert_eq!((lda.mnemonic, lda.mode, lda.cycles), ("LDA", Mode::Immediate, 2));
        assert_eq!(lda.byte_len(), 2);

        let jmp = lookup(0x6C);
        assert_eq!((jmp.mnemonic, jmp.mode, jmp.cycles), ("JMP", Mode::Indirect, 5));
        assert_eq!(jmp.byte_len(), 3);

        let sed = lookup(0xF8);
        assert_eq!(sed.mnemonic, "SED");
        assert_eq!(lookup(0xEA).cycles, 2);
        assert_eq!(lookup(0x00).mnemonic, "BRK");
    }

    #[test]
    fn only_jmp_uses_indirect() {
        for op in OPCODES.iter().filter(|op| op.mode == Mode::Indirect) {
            assert_eq!(op.mnemonic, "JMP");
        }
    }
}

//! Listing generator driven by the opcode table.

use std::fmt;

use crate::cpu::{lookup, Mode, INTERRUPT_SKIP};

const BRK: u8 = 0x00;

/// One decoded instruction (or a lone data byte).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw: Vec<String> = self.bytes.iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "{:04X}  {:<8}  {}", self.address, raw.join(" "), self.text)
    }
}

/// Decode `image` as if it were mapped at `origin`.
///
/// Undefined opcodes, and instructions cut short by the end of the image,
/// come out as `.byte` lines so the walk never loses its place. BRK takes
/// its padding bytes with it, since execution resumes after them.
pub fn disassemble(image: &[u8], origin: u16) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pos = 0usize;

    while pos < image.len() {
        let address = origin.wrapping_add(pos as u16);
        let opcode = image[pos];
        let entry = lookup(opcode);
        let len = if opcode == BRK {
            (1 + INTERRUPT_SKIP as usize).min(image.len() - pos)
        } else {
            entry.byte_len() as usize
        };

        if !entry.is_defined() || pos + len > image.len() {
            lines.push(Line {
                address,
                bytes: vec![opcode],
                text: format!(".byte ${:02X}", opcode),
            });
            pos += 1;
            continue;
        }

        let bytes = image[pos..pos + len].to_vec();
        let operand = if opcode == BRK {
            String::new()
        } else {
            format_operand(entry.mode, &bytes[1..], address)
        };
        let text = if operand.is_empty() {
            entry.mnemonic.to_string()
        } else {
            format!("{} {}", entry.mnemonic, operand)
        };

        lines.push(Line { address, bytes, text });
        pos += len;
    }

    lines
}

fn format_operand(mode: Mode, operand: &[u8], address: u16) -> String {
    let byte = || operand[0];
    let word = || u16::from_le_bytes([operand[0], operand[1]]);

    match mode {
        Mode::Implied => String::new(),
        Mode::Accumulator => "A".to_string(),
        Mode::Immediate => format!("#${:02X}", byte()),
        Mode::ZeroPage => format!("${:02X}", byte()),
        Mode::ZeroPageX => format!("${:02X},X", byte()),
        Mode::ZeroPageY => format!("${:02X},Y", byte()),
        Mode::Absolute => format!("${:04X}", word()),
        Mode::AbsoluteX => format!("${:04X},X", word()),
        Mode::AbsoluteY => format!("${:04X},Y", word()),
        Mode::Indirect => format!("(${:04X})", word()),
        Mode::IndexedIndirect => format!("(${:02X},X)", byte()),
        Mode::IndirectIndexed => format!("(${:02X}),Y", byte()),
        Mode::Relative => {
            // Offset counts from the byte after the branch.
            let target = address.wrapping_add(2).wrapping_add(byte() as i8 as u16);
            format!("${:04X}", target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(image: &[u8], origin: u16) -> Vec<String> {
        disassemble(image, origin).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn formats_each_operand_shape() {
        let image = [
            0xA9, 0x79, // LDA #$79
            0x0A, // ASL A
            0x95, 0x10, // STA $10,X
            0xBE, 0x00, 0x02, // LDX $0200,Y
            0x6C, 0xFF, 0x10, // JMP ($10FF)
            0xA1, 0x20, // LDA ($20,X)
            0x91, 0x86, // STA ($86),Y
            0xEA, // NOP
        ];
        assert_eq!(
            texts(&image, 0x8000),
            [
                "LDA #$79",
                "ASL A",
                "STA $10,X",
                "LDX $0200,Y",
                "JMP ($10FF)",
                "LDA ($20,X)",
                "STA ($86),Y",
                "NOP",
            ]
        );
    }

    #[test]
    fn branch_targets_are_absolute() {
        let image = [0xD0, 0xFE, 0xF0, 0x02];
        assert_eq!(texts(&image, 0x8000), ["BNE $8000", "BEQ $8006"]);
    }

    #[test]
    fn undefined_and_truncated_bytes() {
        let lines = disassemble(&[0x02, 0xAD, 0x00], 0xC000);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, ".byte $02");
        assert_eq!(lines[1].text, ".byte $AD");
        assert_eq!(lines[1].address, 0xC001);
        assert_eq!(lines[2].text, "BRK");
    }

    #[test]
    fn brk_swallows_its_padding() {
        // BRK, two padding bytes that would otherwise decode as ORA ($EA,X),
        // then the instruction RTI returns to.
        let lines = disassemble(&[0x00, 0x01, 0xEA, 0xE8], 0x8000);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, [0x00, 0x01, 0xEA]);
        assert_eq!(lines[0].to_string(), "8000  00 01 EA  BRK");
        assert_eq!(lines[1].address, 0x8003);
        assert_eq!(lines[1].text, "INX");
    }

    #[test]
    fn brk_at_end_of_image_keeps_what_is_left() {
        let lines = disassemble(&[0xEA, 0x00, 0xFF], 0x8000);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].bytes, [0x00, 0xFF]);
        assert_eq!(lines[1].text, "BRK");
    }

    #[test]
    fn display_includes_address_and_raw_bytes() {
        let lines = disassemble(&[0x20, 0x34, 0x12], 0x8000);
        assert_eq!(lines[0].to_string(), "8000  20 34 12  JSR $1234");
    }
}

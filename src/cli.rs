//! Argument helpers shared by the binaries.

use std::num::ParseIntError;

/// Accepts `0x8000`, `$8000` or plain decimal. Only one prefix is stripped.
pub fn parse_u16(s: &str) -> Result<u16, ParseIntError> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'));

    match hex {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => s.parse(),
    }
}

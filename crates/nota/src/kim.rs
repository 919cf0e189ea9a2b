//! Kim character encoding — the codepoint varints used by Nota text.
//!
//! Each character is a big-endian sequence of 7-bit groups with the high
//! bit set on every byte except the last. Text length prefixes count
//! codepoints, not bytes, so skipping a string means walking every
//! character in it.

use nota_buffers::Writer;

use crate::constants::{BYTE_CONTINUE, MAX_KIM_BYTES};
use crate::error::NotaError;

/// Number of kim-encoded characters in `s`, i.e. the value of a text
/// length prefix.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Writes one character: one byte for ASCII, two bytes below U+4000,
/// three bytes for the rest of the Unicode range.
pub fn write_char(writer: &mut Writer, c: char) {
    let val = c as u32;
    if val < 0x80 {
        writer.u8(val as u8);
    } else {
        if val >= 1 << 14 {
            writer.u8(BYTE_CONTINUE | (val >> 14) as u8);
        }
        writer.u8(BYTE_CONTINUE | (val >> 7) as u8);
        writer.u8(val as u8 & 0x7f);
    }
}

/// Reads one character from `data` starting at `*x`, advancing the cursor
/// past it.
///
/// Sequences longer than five bytes and accumulated values that are not
/// Unicode scalar values (surrogates, anything past U+10FFFF) are
/// rejected.
pub fn read_char(data: &[u8], x: &mut usize) -> Result<char, NotaError> {
    let mut val: u32 = 0;
    let mut len = 0usize;
    loop {
        let Some(&next) = data.get(*x) else {
            return Err(NotaError::UnexpectedEof);
        };
        *x += 1;
        len += 1;
        val |= (next & 0x7f) as u32;
        if next & BYTE_CONTINUE == 0 {
            return char::from_u32(val).ok_or(NotaError::InvalidChar);
        }
        if len >= MAX_KIM_BYTES {
            return Err(NotaError::InvalidChar);
        }
        val <<= 7;
    }
}

//! `NotaEncoder` — encodes [`NotaValue`] trees into Nota wire bytes.

use nota_buffers::Writer;

use crate::constants::{NotaTag, BYTE_CONTINUE, PREAMBLE_CONTINUE, PREAMBLE_SIGN, SYM_FALSE, SYM_TRUE};
use crate::error::NotaError;
use crate::kim;
use crate::value::{NotaBits, NotaValue};

pub struct NotaEncoder {
    pub writer: Writer,
}

impl Default for NotaEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotaEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes a single value into a fresh byte vector.
    ///
    /// Fails only on [`NotaValue::Decimal`], which has no wire encoding;
    /// a failed call leaves nothing in the writer.
    pub fn encode(&mut self, value: &NotaValue) -> Result<Vec<u8>, NotaError> {
        self.writer.reset();
        self.write_any(value)?;
        Ok(self.writer.flush())
    }

    pub fn write_any(&mut self, value: &NotaValue) -> Result<(), NotaError> {
        match value {
            NotaValue::Blob(bits) => {
                self.write_blob(bits);
                Ok(())
            }
            NotaValue::Text(s) => {
                self.write_text(s);
                Ok(())
            }
            NotaValue::Array(arr) => self.write_arr(arr),
            NotaValue::Record(pairs) => self.write_record_pairs(pairs),
            NotaValue::Integer(int) => {
                self.write_integer(*int);
                Ok(())
            }
            NotaValue::Decimal(_) => Err(NotaError::DecimalUnsupported),
            NotaValue::Bool(b) => {
                self.write_bool(*b);
                Ok(())
            }
        }
    }

    /// The length prefix counts BITS. Unused low bits of the final byte are
    /// written as zero.
    pub fn write_blob(&mut self, bits: &NotaBits) {
        self.write_unsigned_preamble(NotaTag::Blob, bits.len() as u128);
        let raw = bits.as_raw_slice();
        let tail_bits = bits.len() % 8;
        if tail_bits == 0 {
            self.writer.buf(raw);
        } else {
            // The backing store may carry garbage past the live region;
            // mask it out of the final byte.
            self.writer.buf(&raw[..raw.len() - 1]);
            let mask = 0xffu8 << (8 - tail_bits);
            self.writer.u8(raw[raw.len() - 1] & mask);
        }
    }

    /// The length prefix counts codepoints, not bytes.
    pub fn write_text(&mut self, s: &str) {
        self.write_unsigned_preamble(NotaTag::Text, kim::char_len(s) as u128);
        for c in s.chars() {
            kim::write_char(&mut self.writer, c);
        }
    }

    pub fn write_arr(&mut self, arr: &[NotaValue]) -> Result<(), NotaError> {
        self.write_unsigned_preamble(NotaTag::Array, arr.len() as u128);
        for item in arr {
            self.write_any(item)?;
        }
        Ok(())
    }

    pub fn write_record_pairs(&mut self, pairs: &[(String, NotaValue)]) -> Result<(), NotaError> {
        self.write_unsigned_preamble(NotaTag::Record, pairs.len() as u128);
        for (key, val) in pairs {
            self.write_text(key);
            self.write_any(val)?;
        }
        Ok(())
    }

    pub fn write_integer(&mut self, int: i128) {
        self.write_signed_preamble(NotaTag::Integer, int);
    }

    pub fn write_bool(&mut self, b: bool) {
        self.writer
            .u8(NotaTag::Symbol as u8 | if b { SYM_TRUE } else { SYM_FALSE });
    }

    /// Preamble carrying 4 magnitude bits, then 7-bit continuation groups.
    fn write_unsigned_preamble(&mut self, tag: NotaTag, value: u128) {
        let minimum_bit_len = 128 - value.leading_zeros();
        let bit_len = 4 + ((minimum_bit_len.saturating_sub(4) + 6) / 7) * 7;
        let first = (value >> (bit_len - 4) & 0b1111) as u8;
        let more = if bit_len > 4 { PREAMBLE_CONTINUE } else { 0 };
        self.writer.u8(tag as u8 | more | first);
        self.write_continuation(value, bit_len - 4);
    }

    /// Preamble carrying a sign bit and 3 magnitude bits.
    fn write_signed_preamble(&mut self, tag: NotaTag, value: i128) {
        let sign = if value < 0 { PREAMBLE_SIGN } else { 0 };
        let magnitude = value.unsigned_abs();
        let minimum_bit_len = 128 - magnitude.leading_zeros();
        let bit_len = 3 + ((minimum_bit_len.saturating_sub(3) + 6) / 7) * 7;
        let first = (magnitude >> (bit_len - 3) & 0b111) as u8;
        let more = if bit_len > 3 { PREAMBLE_CONTINUE } else { 0 };
        self.writer.u8(tag as u8 | sign | more | first);
        self.write_continuation(magnitude, bit_len - 3);
    }

    /// Big-endian 7-bit groups; every byte except the last keeps the high
    /// bit set. `bit_len` is always a multiple of 7.
    fn write_continuation(&mut self, value: u128, mut bit_len: u32) {
        while bit_len > 0 {
            let next = (value >> (bit_len - 7)) as u8 & 0x7f;
            if bit_len > 7 {
                self.writer.u8(BYTE_CONTINUE | next);
                bit_len -= 7;
            } else {
                self.writer.u8(next);
                break;
            }
        }
    }
}

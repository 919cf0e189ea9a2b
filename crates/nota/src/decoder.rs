//! `NotaDecoder` — slice-cursor decoder for Nota wire bytes.

use bitvec::vec::BitVec;

use crate::constants::{
    BYTE_CONTINUE, MAX_ARRAY_PREALLOC, MAX_RECORD_PREALLOC, MAX_TEXT_PREALLOC, NotaTag,
    PREAMBLE_CONTINUE, PREAMBLE_SIGN, SYM_FALSE, SYM_TRUE, TAG_MASK,
};
use crate::error::NotaError;
use crate::kim;
use crate::value::NotaValue;

pub struct NotaDecoder {
    pub data: Vec<u8>,
    pub x: usize,
}

impl Default for NotaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotaDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
        }
    }

    /// Decodes one value from the front of `input`. Trailing bytes are
    /// left unread, not treated as an error.
    pub fn decode(&mut self, input: &[u8]) -> Result<NotaValue, NotaError> {
        self.data = input.to_vec();
        self.x = 0;
        self.read_any()
    }

    /// Decodes one value and reports how many bytes it spanned.
    pub fn decode_with_consumed(&mut self, input: &[u8]) -> Result<(NotaValue, usize), NotaError> {
        self.data = input.to_vec();
        self.x = 0;
        let value = self.read_any()?;
        Ok((value, self.x))
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), NotaError> {
        if self.x + n > self.data.len() {
            Err(NotaError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn u8(&mut self) -> Result<u8, NotaError> {
        self.check(1)?;
        let v = self.data[self.x];
        self.x += 1;
        Ok(v)
    }

    #[inline]
    fn buf(&mut self, size: usize) -> Result<Vec<u8>, NotaError> {
        self.check(size)?;
        let v = self.data[self.x..self.x + size].to_vec();
        self.x += size;
        Ok(v)
    }

    pub fn read_any(&mut self) -> Result<NotaValue, NotaError> {
        let preamble = self.u8()?;
        match preamble & TAG_MASK {
            // blob
            0b0000_0000 => {
                let bits = self.read_len(preamble)?;
                self.read_blob(bits)
            }
            // text
            0b0010_0000 => {
                let chars = self.read_len(preamble)?;
                Ok(NotaValue::Text(self.read_text(chars)?))
            }
            // array
            0b0100_0000 => {
                let len = self.read_len(preamble)?;
                self.read_arr(len)
            }
            // record
            0b0110_0000 => {
                let len = self.read_len(preamble)?;
                self.read_record(len)
            }
            // integer
            0b1000_0000 => self.read_integer(preamble),
            // decimal float: the tag exists, its encoding was never settled
            0b1010_0000 => Err(NotaError::DecimalUnsupported),
            // symbol
            0b1100_0000 => match preamble & 0b0001_1111 {
                SYM_FALSE => Ok(NotaValue::Bool(false)),
                SYM_TRUE => Ok(NotaValue::Bool(true)),
                other => Err(NotaError::UnsupportedSymbol(other)),
            },
            _ => Err(NotaError::InvalidTag(self.x - 1)),
        }
    }

    /// Length prefix: 4 bits in the preamble, then 7-bit continuation
    /// groups, most significant first.
    fn read_len(&mut self, preamble: u8) -> Result<usize, NotaError> {
        let mut len = (preamble & 0b0000_1111) as usize;
        if preamble & PREAMBLE_CONTINUE != 0 {
            loop {
                if len > usize::MAX >> 7 {
                    return Err(NotaError::LengthOverflow);
                }
                len <<= 7;
                let next = self.u8()?;
                len |= (next & 0x7f) as usize;
                if next & BYTE_CONTINUE == 0 {
                    break;
                }
            }
        }
        Ok(len)
    }

    /// `bits` counts BITS; the payload occupies `ceil(bits / 8)` bytes and
    /// padding bits in the final byte are dropped.
    fn read_blob(&mut self, bits: usize) -> Result<NotaValue, NotaError> {
        let bytes = bits / 8 + usize::from(bits % 8 != 0);
        let raw = self.buf(bytes)?;
        let mut out = BitVec::from_vec(raw);
        if bits % 8 != 0 {
            out.truncate(bits);
        }
        Ok(NotaValue::Blob(out))
    }

    fn read_text(&mut self, chars: usize) -> Result<String, NotaError> {
        let mut out = String::with_capacity(chars.min(MAX_TEXT_PREALLOC));
        for _ in 0..chars {
            out.push(kim::read_char(&self.data, &mut self.x)?);
        }
        Ok(out)
    }

    fn read_arr(&mut self, size: usize) -> Result<NotaValue, NotaError> {
        let mut arr = Vec::with_capacity(size.min(MAX_ARRAY_PREALLOC));
        for _ in 0..size {
            arr.push(self.read_any()?);
        }
        Ok(NotaValue::Array(arr))
    }

    fn read_record(&mut self, size: usize) -> Result<NotaValue, NotaError> {
        let mut pairs = Vec::with_capacity(size.min(MAX_RECORD_PREALLOC));
        for _ in 0..size {
            let key = self.read_key()?;
            let val = self.read_any()?;
            pairs.push((key, val));
        }
        Ok(NotaValue::Record(pairs))
    }

    /// Record keys must carry the text tag.
    pub fn read_key(&mut self) -> Result<String, NotaError> {
        let preamble = self.u8()?;
        if preamble & TAG_MASK != NotaTag::Text as u8 {
            return Err(NotaError::InvalidRecordKey);
        }
        let chars = self.read_len(preamble)?;
        self.read_text(chars)
    }

    /// Sign-magnitude: sign bit plus 3 magnitude bits in the preamble,
    /// magnitude continuing in 7-bit groups.
    fn read_integer(&mut self, preamble: u8) -> Result<NotaValue, NotaError> {
        let negative = preamble & PREAMBLE_SIGN != 0;
        let mut magnitude = (preamble & 0b0000_0111) as u128;
        if preamble & PREAMBLE_CONTINUE != 0 {
            loop {
                if magnitude > u128::MAX >> 7 {
                    return Err(NotaError::IntegerOverflow);
                }
                magnitude <<= 7;
                let next = self.u8()?;
                magnitude |= (next & 0x7f) as u128;
                if next & BYTE_CONTINUE == 0 {
                    break;
                }
            }
        }
        let int = if negative {
            if magnitude > 1u128 << 127 {
                return Err(NotaError::IntegerOverflow);
            }
            // 2^127 wraps to i128::MIN, which negation maps back onto
            // itself; everything smaller negates exactly.
            (magnitude as i128).wrapping_neg()
        } else {
            i128::try_from(magnitude).map_err(|_| NotaError::IntegerOverflow)?
        };
        Ok(NotaValue::Integer(int))
    }
}

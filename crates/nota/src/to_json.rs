//! `NotaToJsonConverter` — converts Nota wire bytes to a JSON string.
//!
//! Walks the wire directly instead of building intermediate [`NotaValue`]
//! trees. Blobs become data-URI strings; integers wider than 64 bits keep
//! their digits. Output for representable values matches running the
//! decoder and then the `serde_json` conversion.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::constants::{
    BIN_URI_START, BYTE_CONTINUE, NotaTag, PREAMBLE_CONTINUE, PREAMBLE_SIGN, SYM_FALSE, SYM_TRUE,
    TAG_MASK,
};
use crate::error::NotaError;
use crate::kim;

pub struct NotaToJsonConverter {
    data: Vec<u8>,
    x: usize,
}

impl Default for NotaToJsonConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotaToJsonConverter {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
        }
    }

    /// Converts one Nota value to JSON text.
    pub fn convert(&mut self, input: &[u8]) -> Result<String, NotaError> {
        self.data = input.to_vec();
        self.x = 0;
        let mut out = String::new();
        self.val(&mut out)?;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, NotaError> {
        let Some(&v) = self.data.get(self.x) else {
            return Err(NotaError::UnexpectedEof);
        };
        self.x += 1;
        Ok(v)
    }

    fn val(&mut self, out: &mut String) -> Result<(), NotaError> {
        let preamble = self.u8()?;
        match preamble & TAG_MASK {
            0b0000_0000 => {
                let bits = self.len(preamble)?;
                self.bin(bits, out)
            }
            0b0010_0000 => {
                let chars = self.len(preamble)?;
                self.str(chars, out)
            }
            0b0100_0000 => {
                let len = self.len(preamble)?;
                self.arr(len, out)
            }
            0b0110_0000 => {
                let len = self.len(preamble)?;
                self.obj(len, out)
            }
            0b1000_0000 => self.int(preamble, out),
            0b1010_0000 => Err(NotaError::DecimalUnsupported),
            0b1100_0000 => match preamble & 0b0001_1111 {
                SYM_FALSE => {
                    out.push_str("false");
                    Ok(())
                }
                SYM_TRUE => {
                    out.push_str("true");
                    Ok(())
                }
                other => Err(NotaError::UnsupportedSymbol(other)),
            },
            _ => Err(NotaError::InvalidTag(self.x - 1)),
        }
    }

    fn len(&mut self, preamble: u8) -> Result<usize, NotaError> {
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

    fn str(&mut self, chars: usize, out: &mut String) -> Result<(), NotaError> {
        let mut s = String::with_capacity(chars.min(crate::constants::MAX_TEXT_PREALLOC));
        for _ in 0..chars {
            s.push(kim::read_char(&self.data, &mut self.x)?);
        }
        // serde_json handles the escaping rules.
        out.push_str(&serde_json::to_string(&s).unwrap_or_else(|_| "\"\"".to_string()));
        Ok(())
    }

    fn obj(&mut self, size: usize, out: &mut String) -> Result<(), NotaError> {
        out.push('{');
        for i in 0..size {
            if i > 0 {
                out.push(',');
            }
            let preamble = self.u8()?;
            if preamble & TAG_MASK != NotaTag::Text as u8 {
                return Err(NotaError::InvalidRecordKey);
            }
            let chars = self.len(preamble)?;
            self.str(chars, out)?;
            out.push(':');
            self.val(out)?;
        }
        out.push('}');
        Ok(())
    }

    fn arr(&mut self, size: usize, out: &mut String) -> Result<(), NotaError> {
        out.push('[');
        for i in 0..size {
            if i > 0 {
                out.push(',');
            }
            self.val(out)?;
        }
        out.push(']');
        Ok(())
    }

    fn bin(&mut self, bits: usize, out: &mut String) -> Result<(), NotaError> {
        let bytes = bits / 8 + usize::from(bits % 8 != 0);
        if self.x + bytes > self.data.len() {
            return Err(NotaError::UnexpectedEof);
        }
        let b64 = BASE64.encode(&self.data[self.x..self.x + bytes]);
        self.x += bytes;
        out.push('"');
        out.push_str(BIN_URI_START);
        out.push_str(&b64);
        out.push('"');
        Ok(())
    }

    fn int(&mut self, preamble: u8, out: &mut String) -> Result<(), NotaError> {
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
        // Same bounds as the decoder, and the same 64-bit cutoff as the
        // value-level JSON conversion: wider integers are quoted.
        let quoted = if negative {
            if magnitude > 1u128 << 127 {
                return Err(NotaError::IntegerOverflow);
            }
            magnitude > 1u128 << 63
        } else {
            if magnitude > i128::MAX as u128 {
                return Err(NotaError::IntegerOverflow);
            }
            magnitude > u64::MAX as u128
        };
        if quoted {
            out.push('"');
        }
        if negative && magnitude != 0 {
            out.push('-');
        }
        out.push_str(&magnitude.to_string());
        if quoted {
            out.push('"');
        }
        Ok(())
    }
}

//! Convenience helpers over the encoder/decoder pair.

use crate::decoder::NotaDecoder;
use crate::encoder::NotaEncoder;
use crate::error::NotaError;
use crate::to_json::NotaToJsonConverter;
use crate::value::NotaValue;

/// Encodes a value into Nota bytes.
pub fn encode(value: &NotaValue) -> Result<Vec<u8>, NotaError> {
    let mut encoder = NotaEncoder::new();
    encoder.encode(value)
}

/// Decodes a single value from Nota bytes. Trailing bytes are ignored.
pub fn decode(blob: &[u8]) -> Result<NotaValue, NotaError> {
    let mut decoder = NotaDecoder::new();
    decoder.decode(blob)
}

/// Decodes a value and requires it to span exactly `expected_size` bytes.
pub fn validate_exact_size(blob: &[u8], expected_size: usize) -> Result<(), NotaError> {
    let mut decoder = NotaDecoder::new();
    let (_, consumed) = decoder.decode_with_consumed(blob)?;
    if consumed == expected_size {
        Ok(())
    } else {
        Err(NotaError::SizeMismatch {
            expected: expected_size,
            actual: consumed,
        })
    }
}

/// Converts Nota bytes directly to a JSON string.
pub fn to_json_string(blob: &[u8]) -> Result<String, NotaError> {
    let mut converter = NotaToJsonConverter::new();
    converter.convert(blob)
}

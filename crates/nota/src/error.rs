//! Nota codec error type.

use thiserror::Error;

/// Error type for Nota encoding and decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotaError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid type tag at offset {0}")]
    InvalidTag(usize),
    #[error("invalid character in kim text")]
    InvalidChar,
    #[error("record key is not text")]
    InvalidRecordKey,
    #[error("unsupported symbol value {0}")]
    UnsupportedSymbol(u8),
    #[error("decimal floats have no defined wire encoding")]
    DecimalUnsupported,
    #[error("integer magnitude exceeds 128 bits")]
    IntegerOverflow,
    #[error("declared length does not fit in usize")]
    LengthOverflow,
    #[error("value spans {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("JSON value has no Nota representation: {0}")]
    UnrepresentableJson(&'static str),
}

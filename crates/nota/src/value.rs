//! [`NotaValue`] — the universal value type for Nota encoding and decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bitvec::order::Msb0;
use bitvec::vec::BitVec;

use crate::constants::BIN_URI_START;
use crate::error::NotaError;

/// Bit storage used by [`NotaValue::Blob`]. Blob lengths are counted in
/// bits, so byte vectors alone cannot represent every blob.
pub type NotaBits = BitVec<u8, Msb0>;

/// Universal value type spanning everything the Nota wire format can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum NotaValue {
    /// Bit-granular binary data.
    Blob(NotaBits),
    /// Unicode text.
    Text(String),
    /// Sequence of values.
    Array(Vec<NotaValue>),
    /// Key/value pairs in wire order.
    Record(Vec<(String, NotaValue)>),
    /// Signed integer, sign-magnitude on the wire.
    Integer(i128),
    /// Decimal float. Part of the data model, but the format never settled
    /// its wire encoding, so encoding one is an error.
    Decimal(NotaDecimal),
    /// Boolean symbol.
    Bool(bool),
}

/// Decimal float, `coefficient * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotaDecimal {
    pub exponent: i32,
    pub coefficient: i64,
}

impl TryFrom<serde_json::Value> for NotaValue {
    type Error = NotaError;

    /// JSON `null` and non-integer numbers have no Nota counterpart: the
    /// format defines no null symbol, and mapping floats onto decimals
    /// would require the wire encoding the format never pinned down.
    fn try_from(v: serde_json::Value) -> Result<Self, NotaError> {
        Ok(match v {
            serde_json::Value::Null => {
                return Err(NotaError::UnrepresentableJson("null"));
            }
            serde_json::Value::Bool(b) => NotaValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    NotaValue::Integer(i as i128)
                } else if let Some(u) = n.as_u64() {
                    NotaValue::Integer(u as i128)
                } else {
                    return Err(NotaError::UnrepresentableJson("non-integer number"));
                }
            }
            serde_json::Value::String(s) => NotaValue::Text(s),
            serde_json::Value::Array(arr) => NotaValue::Array(
                arr.into_iter()
                    .map(NotaValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(obj) => NotaValue::Record(
                obj.into_iter()
                    .map(|(k, v)| Ok((k, NotaValue::try_from(v)?)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<NotaValue> for serde_json::Value {
    fn from(v: NotaValue) -> Self {
        match v {
            NotaValue::Blob(bits) => {
                let b64 = BASE64.encode(bits.as_raw_slice());
                serde_json::Value::String(format!("{BIN_URI_START}{b64}"))
            }
            NotaValue::Text(s) => serde_json::Value::String(s),
            NotaValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            NotaValue::Record(pairs) => serde_json::Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            NotaValue::Integer(i) => {
                if let Ok(small) = i64::try_from(i) {
                    serde_json::json!(small)
                } else if let Ok(big) = u64::try_from(i) {
                    serde_json::json!(big)
                } else {
                    // JSON numbers top out at 64 bits; wider integers keep
                    // their exact digits as a string.
                    serde_json::Value::String(i.to_string())
                }
            }
            NotaValue::Decimal(d) => serde_json::json!({
                "exponent": d.exponent,
                "coefficient": d.coefficient,
            }),
            NotaValue::Bool(b) => serde_json::Value::Bool(b),
        }
    }
}

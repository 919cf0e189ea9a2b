//! Encoder and decoder for the Nota binary serialization format.
//!
//! Nota values are trees of bit-granular blobs, kim-encoded text, arrays,
//! records, sign-magnitude integers, decimal floats, and boolean symbols.
//! Every value starts with a preamble byte carrying a 3-bit type tag;
//! lengths and magnitudes continue in big-endian 7-bit groups. Text lengths
//! count codepoints and blob lengths count bits, so neither can be skipped
//! without walking the payload.
//!
//! Decimal floats are carried in the data model but the format never
//! settled their wire encoding; encoding or decoding one is an error, not
//! a panic.

mod constants;
mod value;

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod kim;
pub mod to_json;
pub mod util;

pub use constants::NotaTag;
pub use decoder::NotaDecoder;
pub use encoder::NotaEncoder;
pub use error::NotaError;
pub use to_json::NotaToJsonConverter;
pub use value::{NotaBits, NotaDecimal, NotaValue};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &NotaValue) -> Vec<u8> {
        util::encode(value).expect("encode")
    }

    fn record(fields: &[(&str, NotaValue)]) -> NotaValue {
        NotaValue::Record(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        )
    }

    // ---------------------------------------------------------------- encoder

    #[test]
    fn encoder_symbol_bytes() {
        assert_eq!(encode(&NotaValue::Bool(false)), [0xc0]);
        assert_eq!(encode(&NotaValue::Bool(true)), [0xc1]);
    }

    #[test]
    fn encoder_small_integers_fit_the_preamble() {
        assert_eq!(encode(&NotaValue::Integer(0)), [0x80]);
        assert_eq!(encode(&NotaValue::Integer(1)), [0x81]);
        assert_eq!(encode(&NotaValue::Integer(7)), [0x87]);
        assert_eq!(encode(&NotaValue::Integer(-1)), [0x89]);
        assert_eq!(encode(&NotaValue::Integer(-7)), [0x8f]);
    }

    #[test]
    fn encoder_larger_integers_grow_by_whole_groups() {
        // 8 no longer fits 3 bits: one continuation byte.
        assert_eq!(encode(&NotaValue::Integer(8)), [0x90, 0x08]);
        assert_eq!(encode(&NotaValue::Integer(-8)), [0x98, 0x08]);
        assert_eq!(encode(&NotaValue::Integer(1023)), [0x97, 0x7f]);
        assert_eq!(encode(&NotaValue::Integer(1024)), [0x90, 0x88, 0x00]);
    }

    #[test]
    fn encoder_text_length_counts_codepoints() {
        // Six two-byte characters: the length prefix says 6, not 12.
        let bytes = encode(&NotaValue::Text("€€€€€€".into()));
        assert_eq!(bytes[0], 0x26);
        assert_eq!(bytes.len(), 1 + 6 * 2);
    }

    #[test]
    fn encoder_masks_blob_padding_bits() {
        // Three live bits on a backing byte full of ones.
        let mut bits = NotaBits::from_vec(vec![0xff]);
        bits.truncate(3);
        assert_eq!(encode(&NotaValue::Blob(bits)), [0b011, 0b1110_0000]);
    }

    #[test]
    fn encoder_decimal_is_an_error() {
        let mut encoder = NotaEncoder::new();
        let value = NotaValue::Decimal(NotaDecimal {
            exponent: -2,
            coefficient: 314,
        });
        assert_eq!(encoder.encode(&value), Err(NotaError::DecimalUnsupported));
        // A failed encode leaves no partial bytes behind.
        assert_eq!(encoder.encode(&NotaValue::Bool(true)).unwrap(), [0xc1]);
    }

    #[test]
    fn encoder_decimal_inside_container_leaves_writer_clean() {
        let mut encoder = NotaEncoder::new();
        let value = NotaValue::Array(vec![
            NotaValue::Integer(1),
            NotaValue::Decimal(NotaDecimal {
                exponent: 0,
                coefficient: 1,
            }),
        ]);
        assert_eq!(encoder.encode(&value), Err(NotaError::DecimalUnsupported));
        assert_eq!(encoder.encode(&NotaValue::Integer(0)).unwrap(), [0x80]);
    }

    // ---------------------------------------------------------------- decoder

    #[test]
    fn decoder_roundtrip_matrix() {
        let values = vec![
            NotaValue::Bool(true),
            NotaValue::Bool(false),
            NotaValue::Integer(0),
            NotaValue::Integer(-1),
            NotaValue::Integer(2023),
            NotaValue::Integer(i128::MAX),
            NotaValue::Integer(i128::MIN),
            NotaValue::Text("".into()),
            NotaValue::Text("hello, world!".into()),
            NotaValue::Text("snow ☃ and 𓂀".into()),
            NotaValue::Blob(NotaBits::from_vec(vec![0xde, 0xad, 0xbe, 0xef])),
            NotaValue::Array(vec![]),
            NotaValue::Array(vec![NotaValue::Integer(1), NotaValue::Bool(false)]),
            record(&[
                ("a", NotaValue::Integer(1)),
                ("b", NotaValue::Array(vec![NotaValue::Text("x".into())])),
            ]),
        ];
        let mut decoder = NotaDecoder::new();
        for value in values {
            let bytes = encode(&value);
            let decoded = decoder
                .decode(&bytes)
                .unwrap_or_else(|e| panic!("decode failed for {value:?}: {e}"));
            assert_eq!(decoded, value, "roundtrip failed for {value:?}");
        }
    }

    #[test]
    fn decoder_blob_keeps_bit_length() {
        let mut bits = NotaBits::from_vec(vec![0x55]);
        bits.push(true);
        bits.push(true);
        bits.push(false);
        let bytes = encode(&NotaValue::Blob(bits.clone()));
        match util::decode(&bytes).unwrap() {
            NotaValue::Blob(out) => {
                assert_eq!(out.len(), 11);
                assert_eq!(out, bits);
            }
            other => panic!("expected blob, got {other:?}"),
        }
    }

    #[test]
    fn decoder_record_preserves_key_order() {
        let value = record(&[
            ("zz", NotaValue::Integer(1)),
            ("a", NotaValue::Integer(2)),
            ("mm", NotaValue::Integer(3)),
        ]);
        assert_eq!(util::decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn decoder_empty_input_is_eof() {
        assert_eq!(util::decode(&[]), Err(NotaError::UnexpectedEof));
    }

    #[test]
    fn decoder_truncated_payloads_are_eof() {
        // Integer promising a continuation byte that never comes.
        assert_eq!(util::decode(&[0x90]), Err(NotaError::UnexpectedEof));
        // Blob of 11 bits needs two payload bytes.
        assert_eq!(util::decode(&[0x0b, 0x55]), Err(NotaError::UnexpectedEof));
        // Text promising two characters, carrying one.
        assert_eq!(util::decode(&[0x22, 0x61]), Err(NotaError::UnexpectedEof));
    }

    #[test]
    fn decoder_rejects_the_reserved_tag() {
        assert_eq!(util::decode(&[0xe0]), Err(NotaError::InvalidTag(0)));
    }

    #[test]
    fn decoder_rejects_unknown_symbols() {
        assert_eq!(util::decode(&[0xc2]), Err(NotaError::UnsupportedSymbol(2)));
        assert_eq!(
            util::decode(&[0xdf]),
            Err(NotaError::UnsupportedSymbol(0x1f))
        );
    }

    #[test]
    fn decoder_rejects_decimal_tags() {
        assert_eq!(util::decode(&[0xa0]), Err(NotaError::DecimalUnsupported));
    }

    #[test]
    fn decoder_rejects_non_text_record_keys() {
        // One-pair record whose key is a symbol.
        assert_eq!(
            util::decode(&[0x61, 0xc1, 0x80]),
            Err(NotaError::InvalidRecordKey)
        );
    }

    #[test]
    fn decoder_rejects_integer_magnitude_overflow() {
        // Endless all-ones continuation bytes blow past 128 bits.
        let mut bytes = vec![0x97];
        bytes.extend([0xff; 18]);
        assert_eq!(util::decode(&bytes), Err(NotaError::IntegerOverflow));
        // Positive 2^127 does not fit i128.
        let mut bytes = vec![0x92];
        bytes.extend([0x80; 17]);
        bytes.push(0x00);
        assert_eq!(util::decode(&bytes), Err(NotaError::IntegerOverflow));
    }

    #[test]
    fn decoder_rejects_length_overflow() {
        let mut bytes = vec![0x3f];
        bytes.extend([0xff; 9]);
        assert_eq!(util::decode(&bytes), Err(NotaError::LengthOverflow));
    }

    #[test]
    fn decode_with_consumed_reports_the_span() {
        let bytes = encode(&NotaValue::Integer(2023));
        let mut trailing = bytes.clone();
        trailing.extend([0xc1, 0xc0]);
        let mut decoder = NotaDecoder::new();
        let (value, consumed) = decoder.decode_with_consumed(&trailing).unwrap();
        assert_eq!(value, NotaValue::Integer(2023));
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn validate_exact_size_flags_trailing_bytes() {
        let bytes = encode(&NotaValue::Bool(true));
        assert!(util::validate_exact_size(&bytes, bytes.len()).is_ok());
        let mut trailing = bytes.clone();
        trailing.push(0x00);
        assert_eq!(
            util::validate_exact_size(&trailing, trailing.len()),
            Err(NotaError::SizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    // ---------------------------------------------------------------- json

    #[test]
    fn json_to_nota_conversion() {
        let value = NotaValue::try_from(json!({
            "name": "Alice",
            "tags": ["x", "y"],
            "admin": true,
            "age": 30,
        }))
        .unwrap();
        assert_eq!(
            value,
            record(&[
                ("name", NotaValue::Text("Alice".into())),
                (
                    "tags",
                    NotaValue::Array(vec![
                        NotaValue::Text("x".into()),
                        NotaValue::Text("y".into()),
                    ])
                ),
                ("admin", NotaValue::Bool(true)),
                ("age", NotaValue::Integer(30)),
            ])
        );
    }

    #[test]
    fn json_null_and_floats_are_unrepresentable() {
        assert_eq!(
            NotaValue::try_from(json!(null)),
            Err(NotaError::UnrepresentableJson("null"))
        );
        assert_eq!(
            NotaValue::try_from(json!(1.5)),
            Err(NotaError::UnrepresentableJson("non-integer number"))
        );
        assert_eq!(
            NotaValue::try_from(json!([1, null])),
            Err(NotaError::UnrepresentableJson("null"))
        );
    }

    #[test]
    fn nota_to_json_conversion() {
        let value = record(&[
            ("blob", NotaValue::Blob(NotaBits::from_vec(vec![1, 2, 3]))),
            ("big", NotaValue::Integer(i128::MAX)),
            ("small", NotaValue::Integer(-5)),
        ]);
        let json = serde_json::Value::from(value);
        assert_eq!(
            json["blob"],
            json!("data:application/octet-stream;base64,AQID")
        );
        assert_eq!(
            json["big"],
            json!("170141183460469231731687303715884105727")
        );
        assert_eq!(json["small"], json!(-5));
    }

    #[test]
    fn decimal_to_json_keeps_both_parts() {
        let json = serde_json::Value::from(NotaValue::Decimal(NotaDecimal {
            exponent: -2,
            coefficient: 314,
        }));
        assert_eq!(json, json!({"exponent": -2, "coefficient": 314}));
    }

    // ---------------------------------------------------------------- to_json

    #[test]
    fn converter_agrees_with_the_value_level_conversion() {
        let values = vec![
            NotaValue::Bool(true),
            NotaValue::Integer(-123456789),
            NotaValue::Integer(i128::MAX),
            NotaValue::Text("say \"hi\"\n".into()),
            NotaValue::Blob(NotaBits::from_vec(vec![0xde, 0xad])),
            record(&[
                ("k", NotaValue::Text("v".into())),
                ("n", NotaValue::Array(vec![NotaValue::Integer(1)])),
            ]),
        ];
        let mut converter = NotaToJsonConverter::new();
        for value in values {
            let bytes = encode(&value);
            let direct = converter.convert(&bytes).unwrap();
            let parsed: serde_json::Value =
                serde_json::from_str(&direct).expect("converter output is valid JSON");
            assert_eq!(
                parsed,
                serde_json::Value::from(value.clone()),
                "converter disagrees for {value:?}"
            );
        }
    }

    #[test]
    fn converter_propagates_wire_errors() {
        let mut converter = NotaToJsonConverter::new();
        assert_eq!(converter.convert(&[]), Err(NotaError::UnexpectedEof));
        assert_eq!(converter.convert(&[0xa0]), Err(NotaError::DecimalUnsupported));
        assert_eq!(converter.convert(&[0xe5]), Err(NotaError::InvalidTag(0)));
    }
}

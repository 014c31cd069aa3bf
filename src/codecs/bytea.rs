// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `bytea` codec.
//!
//! Binary format carries the payload unchanged. Text format is the hex
//! form, `\x` followed by two lowercase hex digits per byte.

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct ByteaCodec;

impl Codec for ByteaCodec {
    fn format_supported(&self, _format: Format) -> bool {
        true
    }

    fn preferred_format(&self) -> Format {
        Format::Binary
    }

    fn plan_encode(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        match value {
            Value::Bytes(_) => Some(Box::new(ByteaEncodePlan { format })),
            _ => None,
        }
    }

    fn plan_scan(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>> {
        match target {
            Value::Bytes(_) => Some(Box::new(ByteaScanPlan { format })),
            _ => None,
        }
    }

    fn decode_value(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Value> {
        Ok(Value::Bytes(decode_bytea(format, src)?))
    }
}

struct ByteaEncodePlan {
    format: Format,
}

impl EncodePlan for ByteaEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let bytes = match value {
            Value::Bytes(b) => b,
            other => {
                return Err(ConversionError::encode(
                    "bytea",
                    format!("expected bytes value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => buf.extend_from_slice(bytes),
            Format::Text => {
                buf.extend_from_slice(b"\\x");
                buf.extend_from_slice(hex::encode(bytes).as_bytes());
            }
        }
        Ok(IsNull::No)
    }
}

struct ByteaScanPlan {
    format: Format,
}

impl ScanPlan for ByteaScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Bytes(decode_bytea(self.format, src)?);
        Ok(())
    }
}

fn decode_bytea(format: Format, src: &[u8]) -> Result<Vec<u8>> {
    match format {
        Format::Binary => Ok(src.to_vec()),
        Format::Text => {
            let text = as_text("bytea", src)?;
            let hex_digits = text.strip_prefix("\\x").ok_or_else(|| {
                ConversionError::decode("bytea", "text form must start with \\x".to_string())
            })?;
            hex::decode(hex_digits).map_err(|e| ConversionError::decode("bytea", e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_hex_decode() {
        assert_eq!(
            decode_bytea(Format::Text, b"\\xdeadbeef").unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
        assert!(decode_bytea(Format::Text, b"deadbeef").is_err());
        assert!(decode_bytea(Format::Text, b"\\xzz").is_err());
    }

    #[test]
    fn test_text_hex_encode() {
        let registry = TypeRegistry::empty();
        let plan = ByteaEncodePlan {
            format: Format::Text,
        };
        let mut buf = Vec::new();
        plan.encode(&registry, &Value::Bytes(vec![0x01, 0xab]), &mut buf)
            .unwrap();
        assert_eq!(buf, b"\\x01ab");
    }

    #[test]
    fn test_binary_passthrough_keeps_empty_distinct_from_null() {
        let registry = TypeRegistry::empty();
        let mut dst = Value::Bytes(vec![1]);
        ByteaScanPlan {
            format: Format::Binary,
        }
        .scan(&registry, Some(&[]), &mut dst)
        .unwrap();
        assert_eq!(dst, Value::Bytes(vec![]));

        assert!(ByteaScanPlan {
            format: Format::Binary,
        }
        .scan(&registry, None, &mut dst)
        .is_err());
    }
}

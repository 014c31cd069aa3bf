// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `uuid` codec.
//!
//! Binary format is the 16 raw bytes. Text format is the hyphenated
//! form. String values encode by parsing and scan by re-rendering.

use uuid::Uuid;

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct UuidCodec;

impl Codec for UuidCodec {
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
            Value::Uuid(_) | Value::String(_) => Some(Box::new(UuidEncodePlan { format })),
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
            Value::Uuid(_) | Value::String(_) => Some(Box::new(UuidScanPlan { format })),
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
        Ok(Value::Uuid(decode_uuid(format, src)?))
    }
}

struct UuidEncodePlan {
    format: Format,
}

impl EncodePlan for UuidEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let bytes = match value {
            Value::Uuid(bytes) => *bytes,
            Value::String(s) => *Uuid::parse_str(s)
                .map_err(|e| ConversionError::encode("uuid", e.to_string()))?
                .as_bytes(),
            other => {
                return Err(ConversionError::encode(
                    "uuid",
                    format!("expected uuid value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => buf.extend_from_slice(&bytes),
            Format::Text => {
                buf.extend_from_slice(Uuid::from_bytes(bytes).to_string().as_bytes())
            }
        }
        Ok(IsNull::No)
    }
}

struct UuidScanPlan {
    format: Format,
}

impl ScanPlan for UuidScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let bytes = decode_uuid(self.format, src)?;
        *dst = match dst {
            Value::String(_) => Value::String(Uuid::from_bytes(bytes).to_string()),
            _ => Value::Uuid(bytes),
        };
        Ok(())
    }
}

fn decode_uuid(format: Format, src: &[u8]) -> Result<[u8; 16]> {
    match format {
        Format::Binary => {
            expect_len("uuid", src, 16)?;
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(src);
            Ok(bytes)
        }
        Format::Text => {
            let text = as_text("uuid", src)?;
            Ok(*Uuid::parse_str(text)
                .map_err(|e| ConversionError::decode("uuid", e.to_string()))?
                .as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 16] = [
        0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde,
        0xf0,
    ];

    #[test]
    fn test_text_round_trip() {
        let text = b"12345678-9abc-def0-1234-56789abcdef0";
        assert_eq!(decode_uuid(Format::Text, text).unwrap(), SAMPLE);
    }

    #[test]
    fn test_binary_requires_sixteen_bytes() {
        assert!(decode_uuid(Format::Binary, &SAMPLE[..15]).is_err());
        assert_eq!(decode_uuid(Format::Binary, &SAMPLE).unwrap(), SAMPLE);
    }

    #[test]
    fn test_encode_from_string() {
        let registry = TypeRegistry::empty();
        let mut buf = Vec::new();
        UuidEncodePlan {
            format: Format::Binary,
        }
        .encode(
            &registry,
            &Value::String("12345678-9abc-def0-1234-56789abcdef0".into()),
            &mut buf,
        )
        .unwrap();
        assert_eq!(buf, SAMPLE);
    }

    #[test]
    fn test_scan_into_string_renders() {
        let registry = TypeRegistry::empty();
        let mut dst = Value::String(String::new());
        UuidScanPlan {
            format: Format::Binary,
        }
        .scan(&registry, Some(&SAMPLE), &mut dst)
        .unwrap();
        assert_eq!(
            dst,
            Value::String("12345678-9abc-def0-1234-56789abcdef0".into())
        );
    }
}

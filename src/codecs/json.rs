// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `json` and `jsonb` codecs.
//!
//! Both types carry JSON text on the wire. The binary format of `jsonb`
//! prefixes the text with a version byte (currently 1); `json` binary is
//! identical to its text form.

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

const JSONB_VERSION: u8 = 1;

pub struct JsonCodec {
    binary_versioned: bool,
}

impl JsonCodec {
    pub fn json() -> Self {
        JsonCodec {
            binary_versioned: false,
        }
    }

    pub fn jsonb() -> Self {
        JsonCodec {
            binary_versioned: true,
        }
    }

    fn type_name(&self) -> &'static str {
        if self.binary_versioned {
            "jsonb"
        } else {
            "json"
        }
    }
}

impl Codec for JsonCodec {
    fn format_supported(&self, _format: Format) -> bool {
        true
    }

    fn preferred_format(&self) -> Format {
        Format::Text
    }

    fn plan_encode(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        match value {
            Value::Json(_) | Value::String(_) => Some(Box::new(JsonEncodePlan {
                format,
                binary_versioned: self.binary_versioned,
            })),
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
            Value::Json(_) | Value::String(_) => Some(Box::new(JsonScanPlan {
                format,
                binary_versioned: self.binary_versioned,
            })),
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
        let text = json_text(self.type_name(), format, self.binary_versioned, src)?;
        let parsed: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ConversionError::decode(self.type_name(), e.to_string()))?;
        Ok(Value::Json(parsed))
    }
}

struct JsonEncodePlan {
    format: Format,
    binary_versioned: bool,
}

impl EncodePlan for JsonEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        if self.format == Format::Binary && self.binary_versioned {
            buf.push(JSONB_VERSION);
        }
        match value {
            Value::Json(json) => {
                let rendered = serde_json::to_string(json)
                    .map_err(|e| ConversionError::encode("json", e.to_string()))?;
                buf.extend_from_slice(rendered.as_bytes());
            }
            Value::String(s) => buf.extend_from_slice(s.as_bytes()),
            other => {
                return Err(ConversionError::encode(
                    "json",
                    format!("expected json value, got {:?}", other.shape()),
                ))
            }
        }
        Ok(IsNull::No)
    }
}

struct JsonScanPlan {
    format: Format,
    binary_versioned: bool,
}

impl ScanPlan for JsonScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let type_name = if self.binary_versioned { "jsonb" } else { "json" };
        let text = json_text(type_name, self.format, self.binary_versioned, src)?;
        *dst = match dst {
            Value::String(_) => Value::String(text.to_string()),
            _ => Value::Json(
                serde_json::from_str(text)
                    .map_err(|e| ConversionError::decode(type_name, e.to_string()))?,
            ),
        };
        Ok(())
    }
}

fn json_text<'a>(
    type_name: &str,
    format: Format,
    binary_versioned: bool,
    src: &'a [u8],
) -> Result<&'a str> {
    let payload = if format == Format::Binary && binary_versioned {
        match src.split_first() {
            Some((&JSONB_VERSION, rest)) => rest,
            Some((version, _)) => {
                return Err(ConversionError::decode(
                    type_name,
                    format!("unsupported jsonb version {}", version),
                ))
            }
            None => {
                return Err(ConversionError::decode(
                    type_name,
                    "empty jsonb payload".to_string(),
                ))
            }
        }
    } else {
        src
    };
    as_text(type_name, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonb_binary_version_byte() {
        let registry = TypeRegistry::empty();
        let mut buf = Vec::new();
        JsonEncodePlan {
            format: Format::Binary,
            binary_versioned: true,
        }
        .encode(&registry, &Value::Json(json!({"a": 1})), &mut buf)
        .unwrap();
        assert_eq!(buf[0], 1);

        let mut dst = Value::Json(serde_json::Value::Null);
        JsonScanPlan {
            format: Format::Binary,
            binary_versioned: true,
        }
        .scan(&registry, Some(&buf), &mut dst)
        .unwrap();
        assert_eq!(dst, Value::Json(json!({"a": 1})));
    }

    #[test]
    fn test_unsupported_jsonb_version() {
        assert!(json_text("jsonb", Format::Binary, true, &[2, b'1']).is_err());
    }

    #[test]
    fn test_json_binary_has_no_version_byte() {
        assert_eq!(
            json_text("json", Format::Binary, false, b"[1,2]").unwrap(),
            "[1,2]"
        );
    }

    #[test]
    fn test_scan_into_string_keeps_raw_text() {
        let registry = TypeRegistry::empty();
        let mut dst = Value::String(String::new());
        JsonScanPlan {
            format: Format::Text,
            binary_versioned: false,
        }
        .scan(&registry, Some(b"{\"k\": [1, 2]}"), &mut dst)
        .unwrap();
        assert_eq!(dst, Value::String("{\"k\": [1, 2]}".into()));
    }
}

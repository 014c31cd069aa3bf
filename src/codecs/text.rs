// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec for the string types: `text`, `varchar`, `bpchar`, `name` and
//! `unknown`. Both wire formats carry the UTF-8 bytes unchanged.

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct TextCodec;

impl Codec for TextCodec {
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
        _format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        match value {
            Value::String(_) => Some(Box::new(TextEncodePlan)),
            _ => None,
        }
    }

    fn plan_scan(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        _format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>> {
        match target {
            Value::String(_) => Some(Box::new(TextScanPlan)),
            _ => None,
        }
    }

    fn decode_value(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        _format: Format,
        src: &[u8],
    ) -> Result<Value> {
        Ok(Value::String(as_text("text", src)?.to_string()))
    }
}

struct TextEncodePlan;

impl EncodePlan for TextEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        match value {
            Value::String(s) => {
                buf.extend_from_slice(s.as_bytes());
                Ok(IsNull::No)
            }
            other => Err(ConversionError::encode(
                "text",
                format!("expected string value, got {:?}", other.shape()),
            )),
        }
    }
}

struct TextScanPlan;

impl ScanPlan for TextScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::String(as_text("text", src)?.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_utf8() {
        let registry = TypeRegistry::empty();
        let mut dst = Value::String(String::new());
        assert!(TextScanPlan
            .scan(&registry, Some(&[0xff, 0xfe]), &mut dst)
            .is_err());
    }

    #[test]
    fn test_null_is_an_error() {
        let registry = TypeRegistry::empty();
        let mut dst = Value::String(String::new());
        assert!(TextScanPlan.scan(&registry, None, &mut dst).is_err());
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `bool` codec.
//!
//! Binary format is a single byte, 0 or 1. Text format is `t` or `f`.

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct BoolCodec;

impl Codec for BoolCodec {
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
            Value::Bool(_) => Some(Box::new(BoolEncodePlan { format })),
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
            Value::Bool(_) => Some(Box::new(BoolScanPlan { format })),
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
        Ok(Value::Bool(decode_bool(format, src)?))
    }
}

struct BoolEncodePlan {
    format: Format,
}

impl EncodePlan for BoolEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let v = match value {
            Value::Bool(v) => *v,
            other => {
                return Err(ConversionError::encode(
                    "bool",
                    format!("expected bool value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => buf.push(v as u8),
            Format::Text => buf.push(if v { b't' } else { b'f' }),
        }
        Ok(IsNull::No)
    }
}

struct BoolScanPlan {
    format: Format,
}

impl ScanPlan for BoolScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Bool(decode_bool(self.format, src)?);
        Ok(())
    }
}

fn decode_bool(format: Format, src: &[u8]) -> Result<bool> {
    match format {
        Format::Binary => {
            expect_len("bool", src, 1)?;
            match src[0] {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ConversionError::decode(
                    "bool",
                    format!("invalid byte {}", other),
                )),
            }
        }
        Format::Text => match as_text("bool", src)? {
            "t" | "true" => Ok(true),
            "f" | "false" => Ok(false),
            other => Err(ConversionError::decode(
                "bool",
                format!("invalid text {:?}", other),
            )),
        },
    }
}

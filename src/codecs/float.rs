// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `float4` and `float8` codecs.
//!
//! Binary format is the IEEE 754 bit pattern, big-endian. Text format
//! uses the PostgreSQL spellings `NaN`, `Infinity` and `-Infinity` for
//! the non-finite values. The canonical native value is `Float64`.

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatWidth {
    Four,
    Eight,
}

impl FloatWidth {
    fn type_name(self) -> &'static str {
        match self {
            FloatWidth::Four => "float4",
            FloatWidth::Eight => "float8",
        }
    }
}

pub struct FloatCodec {
    width: FloatWidth,
}

impl FloatCodec {
    pub fn float4() -> Self {
        FloatCodec {
            width: FloatWidth::Four,
        }
    }

    pub fn float8() -> Self {
        FloatCodec {
            width: FloatWidth::Eight,
        }
    }
}

impl Codec for FloatCodec {
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
            Value::Float64(_) | Value::Int64(_) => Some(Box::new(FloatEncodePlan {
                width: self.width,
                format,
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
            Value::Float64(_) => Some(Box::new(FloatScanPlan {
                width: self.width,
                format,
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
        Ok(Value::Float64(decode_float(self.width, format, src)?))
    }
}

struct FloatEncodePlan {
    width: FloatWidth,
    format: Format,
}

impl EncodePlan for FloatEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let v = match value {
            Value::Float64(v) => *v,
            Value::Int64(v) => *v as f64,
            other => {
                return Err(ConversionError::encode(
                    self.width.type_name(),
                    format!("expected float8 value, got {:?}", other.shape()),
                ))
            }
        };
        match (self.format, self.width) {
            (Format::Binary, FloatWidth::Four) => {
                buf.extend_from_slice(&(v as f32).to_bits().to_be_bytes())
            }
            (Format::Binary, FloatWidth::Eight) => {
                buf.extend_from_slice(&v.to_bits().to_be_bytes())
            }
            (Format::Text, FloatWidth::Four) => {
                buf.extend_from_slice(render_float(v as f32 as f64).as_bytes())
            }
            (Format::Text, FloatWidth::Eight) => {
                buf.extend_from_slice(render_float(v).as_bytes())
            }
        }
        Ok(IsNull::No)
    }
}

struct FloatScanPlan {
    width: FloatWidth,
    format: Format,
}

impl ScanPlan for FloatScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Float64(decode_float(self.width, self.format, src)?);
        Ok(())
    }
}

pub(crate) fn render_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{}", v)
    }
}

pub(crate) fn parse_float(type_name: &str, text: &str) -> Result<f64> {
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => text
            .parse()
            .map_err(|_| ConversionError::decode(type_name, format!("invalid number {:?}", text))),
    }
}

fn decode_float(width: FloatWidth, format: Format, src: &[u8]) -> Result<f64> {
    match format {
        Format::Binary => match width {
            FloatWidth::Four => {
                expect_len("float4", src, 4)?;
                Ok(f32::from_bits(BigEndian::read_u32(src)) as f64)
            }
            FloatWidth::Eight => {
                expect_len("float8", src, 8)?;
                Ok(f64::from_bits(BigEndian::read_u64(src)))
            }
        },
        Format::Text => parse_float(width.type_name(), as_text(width.type_name(), src)?),
    }
}

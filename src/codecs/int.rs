// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Integer codecs: `int2`, `int4`, `int8` and the unsigned `oid` family.
//!
//! Binary format is a fixed-width big-endian integer. Text format is the
//! plain decimal rendering. The canonical native value is `Int64` for the
//! signed types and `UInt32` for the `oid` family; narrower destinations
//! go through the widening adapter rules.

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntWidth {
    Two,
    Four,
    Eight,
}

impl IntWidth {
    fn type_name(self) -> &'static str {
        match self {
            IntWidth::Two => "int2",
            IntWidth::Four => "int4",
            IntWidth::Eight => "int8",
        }
    }

    fn bytes(self) -> usize {
        match self {
            IntWidth::Two => 2,
            IntWidth::Four => 4,
            IntWidth::Eight => 8,
        }
    }

    fn check_range(self, v: i64) -> Result<i64> {
        let ok = match self {
            IntWidth::Two => i16::try_from(v).is_ok(),
            IntWidth::Four => i32::try_from(v).is_ok(),
            IntWidth::Eight => true,
        };
        if ok {
            Ok(v)
        } else {
            Err(ConversionError::out_of_range(v, self.type_name()))
        }
    }
}

/// Codec for the signed integer types.
pub struct IntCodec {
    width: IntWidth,
}

impl IntCodec {
    pub fn int2() -> Self {
        IntCodec {
            width: IntWidth::Two,
        }
    }

    pub fn int4() -> Self {
        IntCodec {
            width: IntWidth::Four,
        }
    }

    pub fn int8() -> Self {
        IntCodec {
            width: IntWidth::Eight,
        }
    }
}

impl Codec for IntCodec {
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
            Value::Int64(_) => Some(Box::new(IntEncodePlan {
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
            Value::Int64(_) => Some(Box::new(IntScanPlan {
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
        Ok(Value::Int64(decode_int(self.width, format, src)?))
    }
}

struct IntEncodePlan {
    width: IntWidth,
    format: Format,
}

impl EncodePlan for IntEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let v = match value {
            Value::Int64(v) => self.width.check_range(*v)?,
            other => {
                return Err(ConversionError::encode(
                    self.width.type_name(),
                    format!("expected int8 value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => match self.width {
                IntWidth::Two => buf.extend_from_slice(&(v as i16).to_be_bytes()),
                IntWidth::Four => buf.extend_from_slice(&(v as i32).to_be_bytes()),
                IntWidth::Eight => buf.extend_from_slice(&v.to_be_bytes()),
            },
            Format::Text => buf.extend_from_slice(v.to_string().as_bytes()),
        }
        Ok(IsNull::No)
    }
}

struct IntScanPlan {
    width: IntWidth,
    format: Format,
}

impl ScanPlan for IntScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Int64(decode_int(self.width, self.format, src)?);
        Ok(())
    }
}

fn decode_int(width: IntWidth, format: Format, src: &[u8]) -> Result<i64> {
    match format {
        Format::Binary => {
            expect_len(width.type_name(), src, width.bytes())?;
            Ok(match width {
                IntWidth::Two => BigEndian::read_i16(src) as i64,
                IntWidth::Four => BigEndian::read_i32(src) as i64,
                IntWidth::Eight => BigEndian::read_i64(src),
            })
        }
        Format::Text => {
            let text = as_text(width.type_name(), src)?;
            let v: i64 = text
                .parse()
                .map_err(|_| ConversionError::decode(width.type_name(), format!("invalid number {:?}", text)))?;
            width.check_range(v)
        }
    }
}

/// Codec for `oid`, `xid` and `cid`: unsigned 32-bit integers.
pub struct Uint32Codec;

impl Codec for Uint32Codec {
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
            Value::UInt32(_) | Value::Int64(_) => Some(Box::new(Uint32EncodePlan { format })),
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
            Value::UInt32(_) | Value::Int64(_) => Some(Box::new(Uint32ScanPlan { format })),
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
        Ok(Value::UInt32(decode_uint32(format, src)?))
    }
}

struct Uint32EncodePlan {
    format: Format,
}

impl EncodePlan for Uint32EncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let v = match value {
            Value::UInt32(v) => *v,
            Value::Int64(v) => {
                u32::try_from(*v).map_err(|_| ConversionError::out_of_range(v, "uint32"))?
            }
            other => {
                return Err(ConversionError::encode(
                    "uint32",
                    format!("expected uint32 value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => buf.extend_from_slice(&v.to_be_bytes()),
            Format::Text => buf.extend_from_slice(v.to_string().as_bytes()),
        }
        Ok(IsNull::No)
    }
}

struct Uint32ScanPlan {
    format: Format,
}

impl ScanPlan for Uint32ScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let v = decode_uint32(self.format, src)?;
        *dst = match dst {
            Value::Int64(_) => Value::Int64(v as i64),
            _ => Value::UInt32(v),
        };
        Ok(())
    }
}

fn decode_uint32(format: Format, src: &[u8]) -> Result<u32> {
    match format {
        Format::Binary => {
            expect_len("uint32", src, 4)?;
            Ok(BigEndian::read_u32(src))
        }
        Format::Text => {
            let text = as_text("uint32", src)?;
            text.parse()
                .map_err(|_| ConversionError::decode("uint32", format!("invalid number {:?}", text)))
        }
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `timestamp` and `timestamptz` codecs.
//!
//! Binary format is a big-endian `i64` of microseconds since
//! 2000-01-01 00:00:00 UTC. Text format is `YYYY-MM-DD HH:MM:SS[.ffffff]`
//! with a UTC offset suffix for `timestamptz`. The canonical native value
//! stores nanoseconds since the Unix epoch; sub-microsecond precision is
//! truncated on encode.

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

/// Microseconds from the Unix epoch to 2000-01-01 00:00:00 UTC.
const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;

pub struct TimestampCodec {
    with_offset: bool,
}

impl TimestampCodec {
    pub fn timestamp() -> Self {
        TimestampCodec { with_offset: false }
    }

    pub fn timestamptz() -> Self {
        TimestampCodec { with_offset: true }
    }

    fn type_name(&self) -> &'static str {
        if self.with_offset {
            "timestamptz"
        } else {
            "timestamp"
        }
    }
}

impl Codec for TimestampCodec {
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
            Value::Timestamp(_) => Some(Box::new(TimestampEncodePlan {
                format,
                with_offset: self.with_offset,
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
            Value::Timestamp(_) => Some(Box::new(TimestampScanPlan {
                format,
                with_offset: self.with_offset,
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
        Ok(Value::Timestamp(decode_timestamp(
            format,
            self.with_offset,
            self.type_name(),
            src,
        )?))
    }
}

struct TimestampEncodePlan {
    format: Format,
    with_offset: bool,
}

impl EncodePlan for TimestampEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let nanos = match value {
            Value::Timestamp(nanos) => *nanos,
            other => {
                return Err(ConversionError::encode(
                    "timestamp",
                    format!("expected timestamp value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => {
                let pg_micros = nanos
                    .div_euclid(1000)
                    .checked_sub(PG_EPOCH_OFFSET_MICROS)
                    .ok_or_else(|| ConversionError::out_of_range(nanos, "timestamp"))?;
                buf.extend_from_slice(&pg_micros.to_be_bytes());
            }
            Format::Text => {
                buf.extend_from_slice(render_timestamp(nanos, self.with_offset)?.as_bytes());
            }
        }
        Ok(IsNull::No)
    }
}

struct TimestampScanPlan {
    format: Format,
    with_offset: bool,
}

impl ScanPlan for TimestampScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let type_name = if self.with_offset {
            "timestamptz"
        } else {
            "timestamp"
        };
        *dst = Value::Timestamp(decode_timestamp(self.format, self.with_offset, type_name, src)?);
        Ok(())
    }
}

fn render_timestamp(nanos: i64, with_offset: bool) -> Result<String> {
    let secs = nanos.div_euclid(1_000_000_000);
    let nsub = nanos.rem_euclid(1_000_000_000) as u32;
    let dt = DateTime::<Utc>::from_timestamp(secs, nsub)
        .ok_or_else(|| ConversionError::out_of_range(nanos, "timestamp"))?;
    let base = dt.format("%Y-%m-%d %H:%M:%S%.f").to_string();
    if with_offset {
        Ok(format!("{}+00", base))
    } else {
        Ok(base)
    }
}

fn decode_timestamp(format: Format, with_offset: bool, type_name: &str, src: &[u8]) -> Result<i64> {
    match format {
        Format::Binary => {
            expect_len(type_name, src, 8)?;
            let pg_micros = BigEndian::read_i64(src);
            let micros = pg_micros
                .checked_add(PG_EPOCH_OFFSET_MICROS)
                .ok_or_else(|| ConversionError::out_of_range(pg_micros, "timestamp"))?;
            micros
                .checked_mul(1000)
                .ok_or_else(|| ConversionError::out_of_range(micros, "timestamp"))
        }
        Format::Text => {
            let text = as_text(type_name, src)?;
            let nanos = if with_offset {
                DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z")
                    .map_err(|e| ConversionError::decode(type_name, e.to_string()))?
                    .timestamp_nanos_opt()
            } else {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                    .map_err(|e| ConversionError::decode(type_name, e.to_string()))?
                    .and_utc()
                    .timestamp_nanos_opt()
            };
            nanos.ok_or_else(|| {
                ConversionError::decode(type_name, format!("{:?} outside representable range", text))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_pg_epoch_is_zero() {
        // 2000-01-01 00:00:00 UTC
        let nanos = PG_EPOCH_OFFSET_MICROS * 1000;
        let registry = TypeRegistry::empty();
        let plan = TimestampEncodePlan {
            format: Format::Binary,
            with_offset: true,
        };
        let mut buf = Vec::new();
        plan.encode(&registry, &Value::Timestamp(nanos), &mut buf)
            .unwrap();
        assert_eq!(buf, vec![0; 8]);

        assert_eq!(
            decode_timestamp(Format::Binary, true, "timestamptz", &buf).unwrap(),
            nanos
        );
    }

    #[test]
    fn test_text_render_and_parse() {
        // 2023-06-01 12:30:45.5 UTC
        let nanos = 1_685_622_645_500_000_000i64;
        let text = render_timestamp(nanos, true).unwrap();
        assert_eq!(text, "2023-06-01 12:30:45.500+00");
        assert_eq!(
            decode_timestamp(Format::Text, true, "timestamptz", text.as_bytes()).unwrap(),
            nanos
        );
    }

    #[test]
    fn test_text_without_offset() {
        let nanos = 1_685_622_645_000_000_000i64;
        let text = render_timestamp(nanos, false).unwrap();
        assert_eq!(text, "2023-06-01 12:30:45");
        assert_eq!(
            decode_timestamp(Format::Text, false, "timestamp", text.as_bytes()).unwrap(),
            nanos
        );
    }

    #[test]
    fn test_pre_pg_epoch() {
        // 1999-12-31 23:59:59 UTC is one second before the wire epoch.
        let nanos = (PG_EPOCH_OFFSET_MICROS - 1_000_000) * 1000;
        let registry = TypeRegistry::empty();
        let plan = TimestampEncodePlan {
            format: Format::Binary,
            with_offset: false,
        };
        let mut buf = Vec::new();
        plan.encode(&registry, &Value::Timestamp(nanos), &mut buf)
            .unwrap();
        assert_eq!(BigEndian::read_i64(&buf), -1_000_000);
    }
}

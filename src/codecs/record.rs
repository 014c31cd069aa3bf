// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `record` codec: anonymous row values.
//!
//! Binary only, and decode only; PostgreSQL does not accept anonymous
//! records as input. The payload is a field count followed by each
//! field's OID, length (-1 for NULL) and wire bytes. Field types are
//! whatever the wire says, so every field must map to a registered OID.

use byteorder::{BigEndian, ByteOrder};

use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct RecordCodec;

impl Codec for RecordCodec {
    fn format_supported(&self, format: Format) -> bool {
        format == Format::Binary
    }

    fn preferred_format(&self) -> Format {
        Format::Binary
    }

    fn plan_encode(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        _format: Format,
        _value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        None
    }

    fn plan_scan(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>> {
        match target {
            Value::Record(_) if format == Format::Binary => Some(Box::new(RecordScanPlan)),
            _ => None,
        }
    }

    fn decode_value(
        &self,
        registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Value> {
        if format != Format::Binary {
            return Err(ConversionError::decode(
                "record",
                "only the binary format is supported".to_string(),
            ));
        }
        let fields = parse_record(src)?;
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            values.push(match field.bytes {
                None => Value::Null,
                Some(bytes) => {
                    let pg_type = registry.type_for_oid(field.oid).ok_or_else(|| {
                        ConversionError::decode(
                            "record",
                            format!("field has unregistered OID {}", field.oid),
                        )
                    })?;
                    pg_type
                        .codec
                        .decode_value(registry, field.oid, Format::Binary, &bytes)?
                }
            });
        }
        Ok(Value::Record(values))
    }
}

struct RecordScanPlan;

impl ScanPlan for RecordScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let values = match dst {
            Value::Record(values) => values,
            other => {
                return Err(ConversionError::decode(
                    "record",
                    format!("expected record destination, got {:?}", other.shape()),
                ))
            }
        };
        let fields = parse_record(src)?;
        if fields.len() != values.len() {
            return Err(ConversionError::decode(
                "record",
                format!("expected {} fields, got {}", values.len(), fields.len()),
            ));
        }
        for (field, value) in fields.into_iter().zip(values.iter_mut()) {
            registry.scan(field.oid, Format::Binary, field.bytes.as_deref(), value)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct RecordField {
    pub(crate) oid: u32,
    pub(crate) bytes: Option<Vec<u8>>,
}

pub(crate) fn parse_record(src: &[u8]) -> Result<Vec<RecordField>> {
    let short = || ConversionError::decode("record", "truncated payload".to_string());
    if src.len() < 4 {
        return Err(short());
    }
    let nfields = BigEndian::read_i32(&src[0..4]);
    if nfields < 0 {
        return Err(ConversionError::decode(
            "record",
            format!("negative field count {}", nfields),
        ));
    }
    let mut pos = 4;
    // Each field occupies at least its OID and length words, which bounds
    // how many a payload of this size can hold.
    let mut fields = Vec::with_capacity((nfields as usize).min(src.len() / 8));
    for _ in 0..nfields {
        if src.len() < pos + 8 {
            return Err(short());
        }
        let oid = BigEndian::read_u32(&src[pos..pos + 4]);
        let len = BigEndian::read_i32(&src[pos + 4..pos + 8]);
        pos += 8;
        let bytes = if len < 0 {
            None
        } else {
            let len = len as usize;
            if src.len() < pos + len {
                return Err(short());
            }
            let bytes = src[pos..pos + len].to_vec();
            pos += len;
            Some(bytes)
        };
        fields.push(RecordField { oid, bytes });
    }
    if pos != src.len() {
        return Err(ConversionError::decode(
            "record",
            "trailing bytes after last field".to_string(),
        ));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        // (int4 7, NULL)
        let mut src = Vec::new();
        src.extend_from_slice(&2i32.to_be_bytes());
        src.extend_from_slice(&23u32.to_be_bytes());
        src.extend_from_slice(&4i32.to_be_bytes());
        src.extend_from_slice(&7i32.to_be_bytes());
        src.extend_from_slice(&25u32.to_be_bytes());
        src.extend_from_slice(&(-1i32).to_be_bytes());
        src
    }

    #[test]
    fn test_parse_record_fields() {
        let fields = parse_record(&sample()).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].oid, 23);
        assert_eq!(fields[0].bytes.as_deref(), Some(&7i32.to_be_bytes()[..]));
        assert_eq!(fields[1].oid, 25);
        assert_eq!(fields[1].bytes, None);
    }

    #[test]
    fn test_parse_record_trailing_bytes() {
        let mut src = sample();
        src.push(0);
        assert!(parse_record(&src).is_err());
    }

    #[test]
    fn test_parse_record_truncated() {
        let src = sample();
        assert!(parse_record(&src[..src.len() - 2]).is_err());
    }

    #[test]
    fn test_parse_record_huge_field_count_claim() {
        // A 4-byte payload claiming i32::MAX fields must fail the bounds
        // check without reserving space for the claimed count.
        let err = parse_record(&i32::MAX.to_be_bytes()).unwrap_err();
        assert!(matches!(err, ConversionError::Decode { .. }));
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Composite codec for registered row types.
//!
//! Unlike `record`, a composite type's field types are known up front,
//! so it supports both directions. Binary format only; the wire layout
//! is the same as `record`, and the field OIDs on the wire must match
//! the registered definition. Struct values reach this codec through the
//! struct-to-record adapter, which hides underscore-prefixed fields.

use std::sync::Arc;

use crate::codecs::record::parse_record;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::{PgType, TypeRegistry};

/// One field of a composite type definition.
pub struct CompositeField {
    pub name: String,
    pub pg_type: Arc<PgType>,
}

impl CompositeField {
    pub fn new(name: impl Into<String>, pg_type: Arc<PgType>) -> Self {
        CompositeField {
            name: name.into(),
            pg_type,
        }
    }
}

pub struct CompositeCodec {
    fields: Arc<Vec<CompositeField>>,
}

impl CompositeCodec {
    pub fn new(fields: Vec<CompositeField>) -> Self {
        CompositeCodec {
            fields: Arc::new(fields),
        }
    }
}

impl Codec for CompositeCodec {
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
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        match value {
            Value::Record(values)
                if format == Format::Binary && values.len() == self.fields.len() =>
            {
                Some(Box::new(CompositeEncodePlan {
                    fields: Arc::clone(&self.fields),
                }))
            }
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
            Value::Record(values)
                if format == Format::Binary && values.len() == self.fields.len() =>
            {
                Some(Box::new(CompositeScanPlan {
                    fields: Arc::clone(&self.fields),
                }))
            }
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
                "composite",
                "only the binary format is supported".to_string(),
            ));
        }
        let wire_fields = parse_record(src)?;
        check_field_oids(&self.fields, &wire_fields)?;
        let mut values = Vec::with_capacity(self.fields.len());
        for (definition, wire) in self.fields.iter().zip(wire_fields) {
            values.push(match wire.bytes {
                None => Value::Null,
                Some(bytes) => definition.pg_type.codec.decode_value(
                    registry,
                    definition.pg_type.oid,
                    Format::Binary,
                    &bytes,
                )?,
            });
        }
        Ok(Value::Record(values))
    }
}

fn check_field_oids(
    definitions: &[CompositeField],
    wire_fields: &[crate::codecs::record::RecordField],
) -> Result<()> {
    if wire_fields.len() != definitions.len() {
        return Err(ConversionError::decode(
            "composite",
            format!(
                "expected {} fields, got {}",
                definitions.len(),
                wire_fields.len()
            ),
        ));
    }
    for (definition, wire) in definitions.iter().zip(wire_fields) {
        if wire.oid != definition.pg_type.oid {
            return Err(ConversionError::decode(
                "composite",
                format!(
                    "field {:?} has OID {} on the wire, expected {}",
                    definition.name, wire.oid, definition.pg_type.oid
                ),
            ));
        }
    }
    Ok(())
}

struct CompositeEncodePlan {
    fields: Arc<Vec<CompositeField>>,
}

impl EncodePlan for CompositeEncodePlan {
    fn encode(&self, registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let values = match value {
            Value::Record(values) if values.len() == self.fields.len() => values,
            other => {
                return Err(ConversionError::encode(
                    "composite",
                    format!(
                        "expected a record with {} fields, got {:?}",
                        self.fields.len(),
                        other.shape()
                    ),
                ))
            }
        };
        buf.extend_from_slice(&(self.fields.len() as i32).to_be_bytes());
        let mut field_buf = Vec::new();
        for (definition, value) in self.fields.iter().zip(values) {
            buf.extend_from_slice(&definition.pg_type.oid.to_be_bytes());
            field_buf.clear();
            match registry.encode(
                definition.pg_type.oid,
                Format::Binary,
                value,
                &mut field_buf,
            )? {
                IsNull::Yes => buf.extend_from_slice(&(-1i32).to_be_bytes()),
                IsNull::No => {
                    buf.extend_from_slice(&(field_buf.len() as i32).to_be_bytes());
                    buf.extend_from_slice(&field_buf);
                }
            }
        }
        Ok(IsNull::No)
    }
}

struct CompositeScanPlan {
    fields: Arc<Vec<CompositeField>>,
}

impl ScanPlan for CompositeScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let values = match dst {
            Value::Record(values) if values.len() == self.fields.len() => values,
            other => {
                return Err(ConversionError::decode(
                    "composite",
                    format!(
                        "expected a record destination with {} fields, got {:?}",
                        self.fields.len(),
                        other.shape()
                    ),
                ))
            }
        };
        let wire_fields = parse_record(src)?;
        check_field_oids(&self.fields, &wire_fields)?;
        for ((definition, wire), value) in
            self.fields.iter().zip(wire_fields).zip(values.iter_mut())
        {
            registry.scan(
                definition.pg_type.oid,
                Format::Binary,
                wire.bytes.as_deref(),
                value,
            )?;
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec and plan traits.
//!
//! A [`Codec`] bundles everything the engine knows about one PostgreSQL
//! type: which wire formats it supports, how to build encode and scan
//! plans for concrete native shapes, and how to decode raw wire bytes
//! without a caller-supplied destination.
//!
//! Plans are resolved once per (OID, format, shape) combination and then
//! executed repeatedly; all shape dispatch happens at resolution time.

use crate::core::error::Result;
use crate::core::oid::Format;
use crate::core::value::{Primitive, Value};
use crate::encoding::registry::TypeRegistry;

/// Whether an encoded value turned out to be SQL NULL.
///
/// NULL transmits no bytes, so encode plans report it out of band instead
/// of writing a sentinel into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    Yes,
    No,
}

/// A resolved recipe for serializing one native shape to one wire format.
pub trait EncodePlan: Send + Sync {
    /// Append the wire bytes of `value` to `buf`.
    ///
    /// Returns [`IsNull::Yes`] without touching `buf` when the value is
    /// SQL NULL. On error `buf` may hold partial output; callers must
    /// discard it.
    fn encode(&self, registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull>;
}

/// A resolved recipe for populating one native shape from wire bytes.
pub trait ScanPlan: Send + Sync {
    /// Populate `dst` from `src`. `None` is SQL NULL, which is distinct
    /// from an empty byte slice.
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()>;
}

/// Conversion capability for one PostgreSQL type.
pub trait Codec: Send + Sync {
    /// Whether this codec understands the given wire format at all.
    fn format_supported(&self, format: Format) -> bool;

    /// The format the codec prefers when the caller has no opinion.
    fn preferred_format(&self) -> Format;

    /// Resolve an encode plan for the given native value, or `None` when
    /// this codec cannot serialize that shape.
    fn plan_encode(
        &self,
        registry: &TypeRegistry,
        oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>>;

    /// Resolve a scan plan for the given destination shape, or `None`
    /// when this codec cannot populate it.
    fn plan_scan(
        &self,
        registry: &TypeRegistry,
        oid: u32,
        format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>>;

    /// Decode wire bytes into the codec's canonical native value, without
    /// a caller-supplied destination.
    fn decode_value(
        &self,
        registry: &TypeRegistry,
        oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Value>;

    /// Decode wire bytes into the generic primitive acceptance set.
    ///
    /// Text-format input passes through as a string. Binary input is
    /// decoded to the canonical value and re-rendered as text when it
    /// does not fit a primitive directly.
    fn decode_primitive(
        &self,
        registry: &TypeRegistry,
        oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Primitive> {
        if format == Format::Text {
            let text = std::str::from_utf8(src).map_err(|e| {
                crate::core::error::ConversionError::decode("text", e.to_string())
            })?;
            return Ok(Primitive::String(text.to_string()));
        }

        match self.decode_value(registry, oid, format, src)? {
            Value::Null => Ok(Primitive::Null),
            Value::Bool(v) => Ok(Primitive::Bool(v)),
            Value::Int64(v) => Ok(Primitive::Int64(v)),
            Value::Float64(v) => Ok(Primitive::Float64(v)),
            Value::String(v) => Ok(Primitive::String(v)),
            Value::Bytes(v) => Ok(Primitive::Bytes(v)),
            Value::Timestamp(v) => Ok(Primitive::Timestamp(v)),
            other => {
                let mut buf = Vec::new();
                match registry.encode(oid, Format::Text, &other, &mut buf)? {
                    IsNull::Yes => Ok(Primitive::Null),
                    IsNull::No => {
                        let text = String::from_utf8(buf).map_err(|e| {
                            crate::core::error::ConversionError::decode("text", e.to_string())
                        })?;
                        Ok(Primitive::String(text))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_equality() {
        assert_eq!(IsNull::Yes, IsNull::Yes);
        assert_ne!(IsNull::Yes, IsNull::No);
    }
}

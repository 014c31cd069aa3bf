// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode plan resolution.
//!
//! Resolution tries, in order: the text fast paths, the codec registered
//! for the OID, then an ordered list of adapter rules. Each rule adapts
//! the value one step toward a shape some codec accepts and recurses; a
//! rule whose recursion fails falls through to the next rule. The fast
//! paths are re-checked on every recursion level, so an adapter chain can
//! terminate in them.
//!
//! Adapters are resolved in two phases. At resolution time a rule adapts
//! the sample value to prove the rest of the chain resolves. At execution
//! time the wrap plan re-applies the same transformation to the value
//! actually being encoded, so chains stay valid for any value of the
//! resolved shape.

use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{FlatArrayValue, Interval, Shape, Value};
use crate::encoding::codec::{EncodePlan, IsNull};
use crate::encoding::registry::TypeRegistry;

// Every rule reduces the value toward a primitive, so chains are bounded
// by the nesting depth of the input shape.
const MAX_RESOLVE_DEPTH: usize = 64;

/// Resolve an encode plan for `value` as type `oid` in `format`.
pub(crate) fn resolve_encode_plan(
    registry: &TypeRegistry,
    oid: u32,
    format: Format,
    value: &Value,
) -> Option<Box<dyn EncodePlan>> {
    resolve_depth(registry, oid, format, value, 0)
}

fn resolve_depth(
    registry: &TypeRegistry,
    oid: u32,
    format: Format,
    value: &Value,
    depth: usize,
) -> Option<Box<dyn EncodePlan>> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }

    // Text fast paths: any string-shaped value renders to the text format
    // verbatim, registered codec or not.
    if format == Format::Text {
        if matches!(value, Value::String(_)) {
            return Some(Box::new(TextPassthroughEncodePlan));
        }
        if value.text_value().is_some() {
            return Some(Box::new(NullableTextEncodePlan));
        }
    }

    // A zero OID means the caller has no wire type in mind: infer the
    // descriptor from the value's default shape mapping and adopt its OID,
    // so nested resolutions target the inferred wire type.
    let mut oid = oid;
    let pg_type = if oid == 0 {
        let inferred = registry.type_for_shape(&value.shape());
        if let Some(t) = &inferred {
            oid = t.oid;
        }
        inferred
    } else {
        registry.type_for_oid(oid)
    };

    if let Some(pg_type) = pg_type {
        if let Some(plan) = pg_type.codec.plan_encode(registry, oid, format, value) {
            return Some(plan);
        }
    }

    for rule in ENCODE_RULES {
        if let Some((wrap, stub)) = rule(value) {
            if let Some(next) = resolve_depth(registry, oid, format, &stub, depth + 1) {
                return Some(Box::new(WrapEncodePlan { wrap, next }));
            }
        }
    }

    None
}

/// String values pass through to the text format unchanged.
struct TextPassthroughEncodePlan;

impl EncodePlan for TextPassthroughEncodePlan {
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

/// Nullable string values pass through to the text format.
struct NullableTextEncodePlan;

impl EncodePlan for NullableTextEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        match value.text_value() {
            Some(None) => Ok(IsNull::Yes),
            Some(Some(s)) => {
                buf.extend_from_slice(s.as_bytes());
                Ok(IsNull::No)
            }
            None => Err(ConversionError::encode(
                "text",
                format!("expected nullable string value, got {:?}", value.shape()),
            )),
        }
    }
}

/// One adaptation step applied in front of an inner encode plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EncodeWrap {
    /// Unwrap a present optional; an absent one encodes as NULL.
    DerefOptional,
    /// Widen any non-canonical integer to `Int64`.
    WidenInt,
    /// Widen `Float32` to `Float64`.
    WidenFloat,
    /// Convert a duration to an interval with only a microsecond part.
    DurationToInterval,
    /// Render a value with a canonical string form as text.
    FallbackText,
    /// Strip a named wrapper down to its underlying representation.
    UnwrapNamed,
    /// Project the visible fields of a struct into an ordered record.
    StructToRecord,
    /// Flatten a one-dimensional sequence into the flat-array view.
    SequenceFlatten,
    /// Flatten a rectangular nested sequence into the flat-array view.
    MultiDimFlatten,
}

impl EncodeWrap {
    /// Re-apply this adaptation to a value at execution time. `None`
    /// means the adapted value is SQL NULL.
    fn apply(&self, value: &Value) -> Result<Option<Value>> {
        match self {
            EncodeWrap::DerefOptional => match value {
                Value::Optional(opt) => Ok(opt.value.as_deref().cloned()),
                other => Err(wrap_mismatch("optional", other)),
            },
            EncodeWrap::WidenInt => {
                let widened = match value {
                    Value::Int8(v) => *v as i64,
                    Value::Int16(v) => *v as i64,
                    Value::Int32(v) => *v as i64,
                    Value::UInt8(v) => *v as i64,
                    Value::UInt16(v) => *v as i64,
                    Value::UInt32(v) => *v as i64,
                    Value::UInt64(v) => i64::try_from(*v)
                        .map_err(|_| ConversionError::out_of_range(v, "int8"))?,
                    other => return Err(wrap_mismatch("integer", other)),
                };
                Ok(Some(Value::Int64(widened)))
            }
            EncodeWrap::WidenFloat => match value {
                Value::Float32(v) => Ok(Some(Value::Float64(*v as f64))),
                other => Err(wrap_mismatch("float", other)),
            },
            EncodeWrap::DurationToInterval => match value {
                Value::Duration(nanos) => Ok(Some(Value::Interval(Interval {
                    months: 0,
                    days: 0,
                    micros: nanos / 1000,
                }))),
                other => Err(wrap_mismatch("duration", other)),
            },
            EncodeWrap::FallbackText => match value.fallback_text() {
                Some(text) => Ok(Some(Value::String(text))),
                None => Err(wrap_mismatch("textual", value)),
            },
            EncodeWrap::UnwrapNamed => match value {
                Value::Named(named) => Ok(Some(named.inner.clone())),
                other => Err(wrap_mismatch("named", other)),
            },
            EncodeWrap::StructToRecord => match value {
                Value::Struct(fields) => Ok(Some(Value::Record(
                    fields
                        .iter()
                        .filter(|f| f.is_visible())
                        .map(|f| f.value.clone())
                        .collect(),
                ))),
                other => Err(wrap_mismatch("struct", other)),
            },
            EncodeWrap::SequenceFlatten => match value {
                Value::Array(elements) => Ok(Some(Value::FlatArray(FlatArrayValue {
                    dims: vec![elements.len() as i32],
                    elem: value.leaf_element_shape(),
                    elements: elements.clone(),
                }))),
                other => Err(wrap_mismatch("sequence", other)),
            },
            EncodeWrap::MultiDimFlatten => {
                let dims = value.array_extents().ok_or_else(|| {
                    ConversionError::encode(
                        "array",
                        "multi-dimensional array is ragged".to_string(),
                    )
                })?;
                Ok(Some(Value::FlatArray(FlatArrayValue {
                    dims,
                    elem: value.leaf_element_shape(),
                    elements: value.flatten_elements(),
                })))
            }
        }
    }
}

fn wrap_mismatch(expected: &str, got: &Value) -> ConversionError {
    ConversionError::encode(
        expected,
        format!("adapter expected {} value, got {:?}", expected, got.shape()),
    )
}

/// Adapter plan: re-applies one transformation, then delegates.
struct WrapEncodePlan {
    wrap: EncodeWrap,
    next: Box<dyn EncodePlan>,
}

impl EncodePlan for WrapEncodePlan {
    fn encode(&self, registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        match self.wrap.apply(value)? {
            None => Ok(IsNull::Yes),
            Some(adapted) => self.next.encode(registry, &adapted, buf),
        }
    }
}

type EncodeRule = fn(&Value) -> Option<(EncodeWrap, Value)>;

/// Adapter rules in resolution order. Each returns the adapted sample the
/// recursion resolves against.
const ENCODE_RULES: &[EncodeRule] = &[
    rule_deref_optional,
    rule_widen_builtin,
    rule_unwrap_named,
    rule_struct_to_record,
    rule_sequence_flatten,
    rule_multi_dim_flatten,
];

fn rule_deref_optional(value: &Value) -> Option<(EncodeWrap, Value)> {
    match value {
        Value::Optional(opt) => {
            // An absent optional still resolves against the zero exemplar
            // of its inner shape, so NULL encodes through the same plan.
            let stub = match &opt.value {
                Some(inner) => (**inner).clone(),
                None => opt.inner.zero_value(),
            };
            Some((EncodeWrap::DerefOptional, stub))
        }
        _ => None,
    }
}

fn rule_widen_builtin(value: &Value) -> Option<(EncodeWrap, Value)> {
    let wrap = match value {
        Value::Int8(_)
        | Value::Int16(_)
        | Value::Int32(_)
        | Value::UInt8(_)
        | Value::UInt16(_)
        | Value::UInt32(_)
        | Value::UInt64(_) => EncodeWrap::WidenInt,
        Value::Float32(_) => EncodeWrap::WidenFloat,
        Value::Duration(_) => EncodeWrap::DurationToInterval,
        Value::Uuid(_) | Value::Inet(_) => EncodeWrap::FallbackText,
        _ => return None,
    };
    match wrap.apply(value) {
        Ok(Some(stub)) => Some((wrap, stub)),
        // Resolution only needs a representative of the adapted shape, so
        // an out-of-range sample still resolves; the error resurfaces at
        // execution.
        Ok(None) | Err(_) => match wrap {
            EncodeWrap::WidenInt => Some((wrap, Value::Int64(0))),
            _ => None,
        },
    }
}

fn rule_unwrap_named(value: &Value) -> Option<(EncodeWrap, Value)> {
    match value {
        Value::Named(named) if !named.skip_normalization => {
            Some((EncodeWrap::UnwrapNamed, named.inner.clone()))
        }
        _ => None,
    }
}

fn rule_struct_to_record(value: &Value) -> Option<(EncodeWrap, Value)> {
    match value {
        Value::Struct(_) => match EncodeWrap::StructToRecord.apply(value) {
            Ok(Some(stub)) => Some((EncodeWrap::StructToRecord, stub)),
            _ => None,
        },
        _ => None,
    }
}

fn rule_sequence_flatten(value: &Value) -> Option<(EncodeWrap, Value)> {
    match value {
        Value::Array(elements) if !elements.iter().any(|e| matches!(e, Value::Array(_))) => {
            match EncodeWrap::SequenceFlatten.apply(value) {
                Ok(Some(stub)) => Some((EncodeWrap::SequenceFlatten, stub)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn rule_multi_dim_flatten(value: &Value) -> Option<(EncodeWrap, Value)> {
    match value {
        Value::Array(elements) if elements.iter().any(|e| matches!(e, Value::Array(_))) => {
            match EncodeWrap::MultiDimFlatten.apply(value) {
                Ok(Some(stub)) => Some((EncodeWrap::MultiDimFlatten, stub)),
                // Ragged at resolution time: no plan, reported by the caller.
                _ => None,
            }
        }
        _ => None,
    }
}

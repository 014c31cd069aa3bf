// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scan plan resolution.
//!
//! The mirror of encode resolution: fast paths first, then the codec
//! registered for the OID, then the ordered adapter rules with the same
//! fallthrough discipline, and finally the generic destination terminals.
//! Only the top-level entry in the registry memoizes; recursive
//! resolution inside adapter chains never touches the cache.

use std::sync::Arc;

use crate::core::error::{ConversionError, Result};
use crate::core::oid::{self, Format};
use crate::core::value::{FlatArrayValue, Interval, Primitive, Shape, Value};
use crate::encoding::codec::ScanPlan;
use crate::encoding::registry::{PgType, TypeRegistry};

// Every rule reduces the destination toward a primitive, so chains are
// bounded by the nesting depth of the destination shape.
const MAX_RESOLVE_DEPTH: usize = 64;

/// Resolve a scan plan for populating `target` from type `oid` in
/// `format`, or `None` when no chain of adapters reaches a codec or
/// terminal.
pub(crate) fn resolve_scan_plan(
    registry: &TypeRegistry,
    oid: u32,
    format: Format,
    target: &Value,
) -> Option<Box<dyn ScanPlan>> {
    resolve_depth(registry, oid, format, target, 0)
}

fn resolve_depth(
    registry: &TypeRegistry,
    oid: u32,
    format: Format,
    target: &Value,
    depth: usize,
) -> Option<Box<dyn ScanPlan>> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }

    // Fast paths, re-checked on every recursion level.
    match target {
        // Raw destinations always take the wire bytes verbatim.
        Value::Raw(_) => return Some(Box::new(RawCopyScanPlan)),

        // Text-format bytes of any type are valid UTF-8; binary-format
        // bytes only for the types whose binary encoding is their text.
        Value::String(_)
            if format == Format::Text || is_wire_text_oid(oid) =>
        {
            return Some(Box::new(StringCopyScanPlan))
        }

        // Text-format bytes copy into a byte destination for every type
        // except bytea, whose text form is hex-encoded. NULL yields an
        // empty value; use an optional destination to observe NULL.
        Value::Bytes(_) if format == Format::Text && oid != oid::BYTEA_OID => {
            return Some(Box::new(BytesCopyScanPlan))
        }

        Value::Optional(opt)
            if format == Format::Text && opt.inner == Shape::String =>
        {
            return Some(Box::new(NullableTextScanPlan))
        }

        _ => {}
    }

    // A zero OID infers the descriptor from the destination's default
    // shape mapping and adopts its OID for the rest of the resolution,
    // mirroring the encode side.
    let mut oid = oid;
    let pg_type = if oid == 0 {
        let inferred = registry.type_for_shape(&target.shape());
        if let Some(t) = &inferred {
            oid = t.oid;
        }
        inferred
    } else {
        registry.type_for_oid(oid)
    };

    if let Some(pg_type) = &pg_type {
        if let Some(plan) = pg_type.codec.plan_scan(registry, oid, format, target) {
            return Some(plan);
        }
    }

    for rule in SCAN_RULES {
        if let Some((wrap, stub)) = rule(target) {
            if let Some(next) = resolve_depth(registry, oid, format, &stub, depth + 1) {
                return Some(Box::new(WrapScanPlan { wrap, next }));
            }
        }
    }

    // Generic destination terminals.
    match target {
        Value::Any(_) => match pg_type {
            Some(pg_type) => {
                return Some(Box::new(AnySlotScanPlan {
                    pg_type,
                    oid,
                    format,
                }))
            }
            None => return Some(Box::new(RawPrimitiveScanPlan { format })),
        },
        Value::Primitive(_) => match pg_type {
            Some(pg_type) => {
                return Some(Box::new(PrimitiveSlotScanPlan {
                    pg_type,
                    oid,
                    format,
                }))
            }
            None => return Some(Box::new(RawPrimitiveScanPlan { format })),
        },
        _ => {}
    }

    None
}

fn is_wire_text_oid(oid: u32) -> bool {
    matches!(
        oid,
        oid::TEXT_OID | oid::VARCHAR_OID | oid::BPCHAR_OID | oid::NAME_OID | oid::UNKNOWN_OID
    )
}

/// Copies the wire bytes verbatim, whatever the format.
struct RawCopyScanPlan;

impl ScanPlan for RawCopyScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Raw(src.to_vec());
        Ok(())
    }
}

struct StringCopyScanPlan;

impl ScanPlan for StringCopyScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(Shape::String))?;
        let text = std::str::from_utf8(src)
            .map_err(|e| ConversionError::decode("text", e.to_string()))?;
        *dst = Value::String(text.to_string());
        Ok(())
    }
}

struct BytesCopyScanPlan;

impl ScanPlan for BytesCopyScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        *dst = Value::Bytes(src.map(|s| s.to_vec()).unwrap_or_default());
        Ok(())
    }
}

struct NullableTextScanPlan;

impl ScanPlan for NullableTextScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let opt = match dst {
            Value::Optional(opt) => opt,
            other => return Err(scan_mismatch("nullable text", other)),
        };
        match src {
            None => opt.value = None,
            Some(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| ConversionError::decode("text", e.to_string()))?;
                opt.value = Some(Box::new(Value::String(text.to_string())));
            }
        }
        Ok(())
    }
}

fn scan_mismatch(expected: &str, got: &Value) -> ConversionError {
    ConversionError::decode(
        expected,
        format!("adapter expected {} destination, got {:?}", expected, got.shape()),
    )
}

/// One adaptation step applied around an inner scan plan.
#[derive(Debug, Clone)]
pub(crate) enum ScanWrap {
    /// NULL clears the optional; otherwise scan into a fresh zero value
    /// of the inner shape and wrap it.
    NullableIndirection { inner: Shape },
    /// Scan into a canonical `Int64`, then narrow with a range check.
    NarrowInt,
    /// Scan into a canonical `Float64`, then narrow.
    NarrowFloat,
    /// Scan into an interval, then collapse to nanoseconds using the
    /// PostgreSQL day and month conventions (24h days, 30-day months).
    IntervalToDuration,
    /// Scan through a named wrapper into its underlying representation.
    UnwrapNamed,
    /// Scan into an ordered record, then write the fields back to the
    /// struct's visible fields in declared order.
    StructToRecord,
    /// Scan into a one-dimensional flat array, then restore the sequence.
    SequenceUnflatten { elem: Shape },
    /// Scan into a flat array of known rank, then rebuild the nesting.
    MultiDimUnflatten { elem: Shape, rank: usize },
}

impl ScanWrap {
    fn scan_via(
        &self,
        registry: &TypeRegistry,
        next: &dyn ScanPlan,
        src: Option<&[u8]>,
        dst: &mut Value,
    ) -> Result<()> {
        match self {
            ScanWrap::NullableIndirection { inner } => {
                let opt = match dst {
                    Value::Optional(opt) => opt,
                    other => return Err(scan_mismatch("optional", other)),
                };
                match src {
                    None => {
                        opt.value = None;
                        Ok(())
                    }
                    Some(_) => {
                        let mut tmp = inner.zero_value();
                        next.scan(registry, src, &mut tmp)?;
                        opt.value = Some(Box::new(tmp));
                        Ok(())
                    }
                }
            }
            ScanWrap::NarrowInt => {
                let mut tmp = Value::Int64(0);
                next.scan(registry, src, &mut tmp)?;
                let wide = match tmp {
                    Value::Int64(v) => v,
                    other => return Err(scan_mismatch("int8", &other)),
                };
                *dst = match dst {
                    Value::Int8(_) => Value::Int8(
                        i8::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "i8"))?,
                    ),
                    Value::Int16(_) => Value::Int16(
                        i16::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "i16"))?,
                    ),
                    Value::Int32(_) => Value::Int32(
                        i32::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "i32"))?,
                    ),
                    Value::UInt8(_) => Value::UInt8(
                        u8::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "u8"))?,
                    ),
                    Value::UInt16(_) => Value::UInt16(
                        u16::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "u16"))?,
                    ),
                    Value::UInt32(_) => Value::UInt32(
                        u32::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "u32"))?,
                    ),
                    Value::UInt64(_) => Value::UInt64(
                        u64::try_from(wide)
                            .map_err(|_| ConversionError::out_of_range(wide, "u64"))?,
                    ),
                    other => return Err(scan_mismatch("integer", other)),
                };
                Ok(())
            }
            ScanWrap::NarrowFloat => {
                let mut tmp = Value::Float64(0.0);
                next.scan(registry, src, &mut tmp)?;
                let wide = match tmp {
                    Value::Float64(v) => v,
                    other => return Err(scan_mismatch("float8", &other)),
                };
                match dst {
                    Value::Float32(_) => {
                        *dst = Value::Float32(wide as f32);
                        Ok(())
                    }
                    other => Err(scan_mismatch("float", other)),
                }
            }
            ScanWrap::IntervalToDuration => {
                let mut tmp = Value::Interval(Interval::default());
                next.scan(registry, src, &mut tmp)?;
                let interval = match tmp {
                    Value::Interval(v) => v,
                    other => return Err(scan_mismatch("interval", &other)),
                };
                let micros = interval
                    .micros
                    .checked_add(
                        (interval.days as i64)
                            .checked_mul(86_400_000_000)
                            .and_then(|d| {
                                (interval.months as i64)
                                    .checked_mul(2_592_000_000_000)
                                    .map(|m| d + m)
                            })
                            .ok_or_else(|| {
                                ConversionError::out_of_range(interval.micros, "duration")
                            })?,
                    )
                    .ok_or_else(|| ConversionError::out_of_range(interval.micros, "duration"))?;
                let nanos = micros
                    .checked_mul(1000)
                    .ok_or_else(|| ConversionError::out_of_range(micros, "duration"))?;
                *dst = Value::Duration(nanos);
                Ok(())
            }
            ScanWrap::UnwrapNamed => match dst {
                Value::Named(named) => next.scan(registry, src, &mut named.inner),
                other => Err(scan_mismatch("named", other)),
            },
            ScanWrap::StructToRecord => {
                let fields = match dst {
                    Value::Struct(fields) => fields,
                    other => return Err(scan_mismatch("struct", other)),
                };
                let visible: Vec<usize> = fields
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.is_visible())
                    .map(|(i, _)| i)
                    .collect();
                let mut record = Value::Record(
                    visible.iter().map(|&i| fields[i].value.clone()).collect(),
                );
                next.scan(registry, src, &mut record)?;
                let decoded = match record {
                    Value::Record(values) => values,
                    other => return Err(scan_mismatch("record", &other)),
                };
                if decoded.len() != visible.len() {
                    return Err(ConversionError::decode(
                        "record",
                        format!(
                            "expected {} fields, got {}",
                            visible.len(),
                            decoded.len()
                        ),
                    ));
                }
                for (&i, value) in visible.iter().zip(decoded) {
                    fields[i].value = value;
                }
                Ok(())
            }
            ScanWrap::SequenceUnflatten { elem } => {
                let mut tmp = Value::FlatArray(FlatArrayValue {
                    dims: vec![0],
                    elem: elem.clone(),
                    elements: Vec::new(),
                });
                next.scan(registry, src, &mut tmp)?;
                let flat = match tmp {
                    Value::FlatArray(flat) => flat,
                    other => return Err(scan_mismatch("array", &other)),
                };
                if flat.dims.len() > 1 {
                    return Err(ConversionError::decode(
                        "array",
                        format!(
                            "cannot scan {}-dimensional array into a flat sequence",
                            flat.dims.len()
                        ),
                    ));
                }
                *dst = Value::Array(flat.elements);
                Ok(())
            }
            ScanWrap::MultiDimUnflatten { elem, rank } => {
                let mut tmp = Value::FlatArray(FlatArrayValue {
                    dims: vec![0; *rank],
                    elem: elem.clone(),
                    elements: Vec::new(),
                });
                next.scan(registry, src, &mut tmp)?;
                let flat = match tmp {
                    Value::FlatArray(flat) => flat,
                    other => return Err(scan_mismatch("array", &other)),
                };
                if flat.dims.len() != *rank {
                    return Err(ConversionError::decode(
                        "array",
                        format!(
                            "expected {}-dimensional array, got {} dimensions",
                            rank,
                            flat.dims.len()
                        ),
                    ));
                }
                *dst = unflatten(&flat.dims, &flat.elements)?;
                Ok(())
            }
        }
    }
}

/// Rebuild a nested array value from per-dimension extents and row-major
/// elements.
pub(crate) fn unflatten(dims: &[i32], elements: &[Value]) -> Result<Value> {
    let expected: i64 = dims.iter().map(|&d| d as i64).product();
    if expected != elements.len() as i64 {
        return Err(ConversionError::decode(
            "array",
            format!(
                "dimensions {:?} describe {} elements, got {}",
                dims,
                expected,
                elements.len()
            ),
        ));
    }
    Ok(build_nested(dims, elements))
}

fn build_nested(dims: &[i32], elements: &[Value]) -> Value {
    match dims {
        [] | [_] => Value::Array(elements.to_vec()),
        [outer, rest @ ..] => {
            let stride: usize = rest.iter().map(|&d| d as usize).product();
            let mut out = Vec::with_capacity(*outer as usize);
            for i in 0..*outer as usize {
                out.push(build_nested(rest, &elements[i * stride..(i + 1) * stride]));
            }
            Value::Array(out)
        }
    }
}

struct WrapScanPlan {
    wrap: ScanWrap,
    next: Box<dyn ScanPlan>,
}

impl ScanPlan for WrapScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        self.wrap.scan_via(registry, &*self.next, src, dst)
    }
}

type ScanRule = fn(&Value) -> Option<(ScanWrap, Value)>;

/// Adapter rules in resolution order, mirroring the encode side.
const SCAN_RULES: &[ScanRule] = &[
    rule_nullable_indirection,
    rule_narrow_builtin,
    rule_unwrap_named,
    rule_struct_to_record,
    rule_sequence_unflatten,
    rule_multi_dim_unflatten,
];

fn rule_nullable_indirection(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Optional(opt) => Some((
            ScanWrap::NullableIndirection {
                inner: opt.inner.clone(),
            },
            opt.inner.zero_value(),
        )),
        _ => None,
    }
}

fn rule_narrow_builtin(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Int8(_)
        | Value::Int16(_)
        | Value::Int32(_)
        | Value::UInt8(_)
        | Value::UInt16(_)
        | Value::UInt32(_)
        | Value::UInt64(_) => Some((ScanWrap::NarrowInt, Value::Int64(0))),
        Value::Float32(_) => Some((ScanWrap::NarrowFloat, Value::Float64(0.0))),
        Value::Duration(_) => Some((
            ScanWrap::IntervalToDuration,
            Value::Interval(Interval::default()),
        )),
        _ => None,
    }
}

fn rule_unwrap_named(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Named(named) if !named.skip_normalization => {
            Some((ScanWrap::UnwrapNamed, named.inner.clone()))
        }
        _ => None,
    }
}

fn rule_struct_to_record(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Struct(fields) => Some((
            ScanWrap::StructToRecord,
            Value::Record(
                fields
                    .iter()
                    .filter(|f| f.is_visible())
                    .map(|f| f.value.clone())
                    .collect(),
            ),
        )),
        _ => None,
    }
}

fn rule_sequence_unflatten(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Array(elements) if !elements.iter().any(|e| matches!(e, Value::Array(_))) => {
            let elem = target.leaf_element_shape();
            Some((
                ScanWrap::SequenceUnflatten { elem: elem.clone() },
                Value::FlatArray(FlatArrayValue {
                    dims: vec![0],
                    elem,
                    elements: Vec::new(),
                }),
            ))
        }
        _ => None,
    }
}

fn rule_multi_dim_unflatten(target: &Value) -> Option<(ScanWrap, Value)> {
    match target {
        Value::Array(elements) if elements.iter().any(|e| matches!(e, Value::Array(_))) => {
            let dims = target.array_extents()?;
            let elem = target.leaf_element_shape();
            let rank = dims.len();
            Some((
                ScanWrap::MultiDimUnflatten {
                    elem: elem.clone(),
                    rank,
                },
                Value::FlatArray(FlatArrayValue {
                    dims: vec![0; rank],
                    elem,
                    elements: Vec::new(),
                }),
            ))
        }
        _ => None,
    }
}

/// Terminal for an any-typed slot with a registered type: decode to the
/// codec's canonical value.
struct AnySlotScanPlan {
    pg_type: Arc<PgType>,
    oid: u32,
    format: Format,
}

impl ScanPlan for AnySlotScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let slot = match dst {
            Value::Any(slot) => slot,
            other => return Err(scan_mismatch("any", other)),
        };
        match src {
            None => **slot = Value::Null,
            Some(bytes) => {
                **slot = self
                    .pg_type
                    .codec
                    .decode_value(registry, self.oid, self.format, bytes)?;
            }
        }
        Ok(())
    }
}

/// Terminal for the generic primitive slot with a registered type.
struct PrimitiveSlotScanPlan {
    pg_type: Arc<PgType>,
    oid: u32,
    format: Format,
}

impl ScanPlan for PrimitiveSlotScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let decoded = match src {
            None => Primitive::Null,
            Some(bytes) => self
                .pg_type
                .codec
                .decode_primitive(registry, self.oid, self.format, bytes)?,
        };
        match dst {
            Value::Primitive(slot) => {
                *slot = decoded;
                Ok(())
            }
            other => Err(scan_mismatch("primitive", other)),
        }
    }
}

/// Terminal for generic slots when the OID has no registered type: text
/// input becomes a string, binary input raw bytes.
struct RawPrimitiveScanPlan {
    format: Format,
}

impl ScanPlan for RawPrimitiveScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let decoded = match src {
            None => Value::Null,
            Some(bytes) => match self.format {
                Format::Text => {
                    let text = std::str::from_utf8(bytes)
                        .map_err(|e| ConversionError::decode("text", e.to_string()))?;
                    Value::String(text.to_string())
                }
                Format::Binary => Value::Bytes(bytes.to_vec()),
            },
        };
        match dst {
            Value::Any(slot) => {
                **slot = decoded;
                Ok(())
            }
            Value::Primitive(slot) => {
                *slot = match decoded {
                    Value::Null => Primitive::Null,
                    Value::String(s) => Primitive::String(s),
                    Value::Bytes(b) => Primitive::Bytes(b),
                    _ => unreachable!(),
                };
                Ok(())
            }
            other => Err(scan_mismatch("generic", other)),
        }
    }
}

/// Memoized resolution failure: reports the same error on every
/// execution without re-running resolution.
pub(crate) struct FailScanPlan {
    oid: u32,
    format: Format,
    shape: Shape,
}

impl FailScanPlan {
    pub(crate) fn new(oid: u32, format: Format, shape: Shape) -> Self {
        FailScanPlan { oid, format, shape }
    }
}

impl ScanPlan for FailScanPlan {
    fn scan(&self, _registry: &TypeRegistry, _src: Option<&[u8]>, _dst: &mut Value) -> Result<()> {
        Err(ConversionError::scan_failure(
            self.oid,
            self.format,
            self.shape.clone(),
        ))
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Native value type system.
//!
//! Provides a unified value representation for everything the conversion
//! engine can encode to or scan from the PostgreSQL wire. All variants are
//! serde-serializable.
//!
//! # Design Principles
//!
//! - **Closed universe**: native shapes are enum variants, not reflected
//!   runtime types. Adapter rules map one variant to another instead of
//!   inspecting type metadata.
//! - **Shapes are first-class**: every value derives a structural
//!   [`Shape`] fingerprint used for default-type inference and plan-cache
//!   keys.
//! - **Capability forms**: `Record` and `FlatArray` are the views codecs
//!   consume; adapter rules produce them from the user-facing `Struct`
//!   and `Array` variants.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Unified native value for wire conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Untyped SQL NULL.
    Null,

    // Booleans
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8)
    String(String),

    // Binary data
    Bytes(Vec<u8>),

    // Timestamp as nanoseconds since Unix epoch
    Timestamp(i64),

    // Duration as nanoseconds (can be negative)
    Duration(i64),

    /// Interval in PostgreSQL terms: calendar months and days are kept
    /// separate from the sub-day microsecond part.
    Interval(Interval),

    /// UUID as raw big-endian bytes.
    Uuid([u8; 16]),

    /// IP host address or network with prefix length.
    Inet(Inet),

    /// JSON document.
    Json(serde_json::Value),

    /// Arbitrary-precision decimal as a validated string ("NaN" allowed).
    Numeric(String),

    /// Range over an element type.
    Range(Box<RangeValue>),

    /// Nullable wrapper that remembers its inner shape while empty.
    Optional(OptionalValue),

    /// Distinctly named wrapper around another value.
    Named(Box<NamedValue>),

    /// Structure with named fields in declared order. Field names with a
    /// leading underscore are hidden from composite adaptation.
    Struct(Vec<StructField>),

    /// Ordered sequence, possibly nested for multi-dimension data.
    Array(Vec<Value>),

    /// Ordered field accessor consumed by composite/record codecs.
    Record(Vec<Value>),

    /// Flattened array with per-dimension extents, consumed by array codecs.
    FlatArray(FlatArrayValue),

    /// Generic any-typed destination slot.
    Any(Box<Value>),

    /// Generic "accept decoded value" destination slot.
    Primitive(Primitive),

    /// Destination for raw, undecoded wire bytes.
    Raw(Vec<u8>),
}

/// PostgreSQL interval: months, days and microseconds kept separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

/// IP host address or network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inet {
    pub addr: IpAddr,
    /// Prefix length in bits (32 for a bare IPv4 host, 128 for IPv6).
    pub prefix: u8,
}

/// Nullable value carrying its inner shape.
///
/// The shape survives while the value is empty so scan plans can still be
/// resolved and memoized for the inner type, the way a typed nil pointer
/// still knows its pointee type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalValue {
    pub inner: Shape,
    pub value: Option<Box<Value>>,
}

/// Distinctly named wrapper around another value, e.g. a custom enum or
/// domain over a builtin primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    /// Opt-out marker respected by the underlying-representation
    /// normalization adapter rule.
    pub skip_normalization: bool,
    pub inner: Value,
}

/// Named field of a [`Value::Struct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub value: Value,
}

impl StructField {
    /// Create a field.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        StructField {
            name: name.into(),
            value,
        }
    }

    /// Fields with a leading underscore are hidden from composite
    /// adaptation.
    pub fn is_visible(&self) -> bool {
        !self.name.starts_with('_')
    }
}

/// Flattened array view: row-major elements plus per-dimension extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatArrayValue {
    pub dims: Vec<i32>,
    pub elem: Shape,
    pub elements: Vec<Value>,
}

/// Range over an element type. `None` bounds are infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub lower: Option<Value>,
    pub upper: Option<Value>,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
    pub empty: bool,
}

/// Generic acceptance set for destinations that take "any decoded value":
/// the closed analog of a database driver's value union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Nanoseconds since Unix epoch.
    Timestamp(i64),
}

impl Primitive {
    /// Lift a primitive back into the value universe.
    pub fn into_value(self) -> Value {
        match self {
            Primitive::Null => Value::Null,
            Primitive::Bool(v) => Value::Bool(v),
            Primitive::Int64(v) => Value::Int64(v),
            Primitive::Float64(v) => Value::Float64(v),
            Primitive::String(v) => Value::String(v),
            Primitive::Bytes(v) => Value::Bytes(v),
            Primitive::Timestamp(v) => Value::Timestamp(v),
        }
    }
}

/// Structural fingerprint of a native value's concrete representation.
///
/// Shapes identify what a value *is* independent of its payload. They are
/// the keys of the default-shape index and the scan-plan cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Null,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Bytes,
    Timestamp,
    Duration,
    Interval,
    Uuid,
    Inet,
    Json,
    Numeric,
    Range(Box<Shape>),
    Optional(Box<Shape>),
    Named {
        name: String,
        skip_normalization: bool,
        inner: Box<Shape>,
    },
    Struct(Vec<(String, Shape)>),
    Array(Box<Shape>),
    Record(Vec<Shape>),
    FlatArray {
        elem: Box<Shape>,
        dims: usize,
    },
    Any,
    Primitive,
    Raw,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Null => write!(f, "null"),
            Shape::Bool => write!(f, "bool"),
            Shape::Int8 => write!(f, "i8"),
            Shape::Int16 => write!(f, "i16"),
            Shape::Int32 => write!(f, "i32"),
            Shape::Int64 => write!(f, "i64"),
            Shape::UInt8 => write!(f, "u8"),
            Shape::UInt16 => write!(f, "u16"),
            Shape::UInt32 => write!(f, "u32"),
            Shape::UInt64 => write!(f, "u64"),
            Shape::Float32 => write!(f, "f32"),
            Shape::Float64 => write!(f, "f64"),
            Shape::String => write!(f, "string"),
            Shape::Bytes => write!(f, "bytes"),
            Shape::Timestamp => write!(f, "timestamp"),
            Shape::Duration => write!(f, "duration"),
            Shape::Interval => write!(f, "interval"),
            Shape::Uuid => write!(f, "uuid"),
            Shape::Inet => write!(f, "inet"),
            Shape::Json => write!(f, "json"),
            Shape::Numeric => write!(f, "numeric"),
            Shape::Range(elem) => write!(f, "range<{}>", elem),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
            Shape::Named { name, .. } => write!(f, "named<{}>", name),
            Shape::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, (name, shape)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, shape)?;
                }
                write!(f, "}}")
            }
            Shape::Array(elem) => write!(f, "array<{}>", elem),
            Shape::Record(fields) => {
                write!(f, "record(")?;
                for (i, shape) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", shape)?;
                }
                write!(f, ")")
            }
            Shape::FlatArray { elem, dims } => write!(f, "flat_array<{}; {} dims>", elem, dims),
            Shape::Any => write!(f, "any"),
            Shape::Primitive => write!(f, "primitive"),
            Shape::Raw => write!(f, "raw"),
        }
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> String {
        shape.to_string()
    }
}

impl From<&Shape> for String {
    fn from(shape: &Shape) -> String {
        shape.to_string()
    }
}

impl Shape {
    /// True for the builtin primitive shapes the normalization adapter
    /// rule may unwrap a named type to.
    pub fn is_builtin_primitive(&self) -> bool {
        matches!(
            self,
            Shape::Bool
                | Shape::Int8
                | Shape::Int16
                | Shape::Int32
                | Shape::Int64
                | Shape::UInt8
                | Shape::UInt16
                | Shape::UInt32
                | Shape::UInt64
                | Shape::Float32
                | Shape::Float64
                | Shape::String
                | Shape::Bytes
                | Shape::Timestamp
                | Shape::Duration
        )
    }

    /// Materialize the zeroed exemplar of this shape.
    ///
    /// The analog of allocating a fresh zero value for a pointee type:
    /// used by the nullable scan rule and by container codecs to build
    /// element destinations.
    pub fn zero_value(&self) -> Value {
        match self {
            Shape::Null => Value::Null,
            Shape::Bool => Value::Bool(false),
            Shape::Int8 => Value::Int8(0),
            Shape::Int16 => Value::Int16(0),
            Shape::Int32 => Value::Int32(0),
            Shape::Int64 => Value::Int64(0),
            Shape::UInt8 => Value::UInt8(0),
            Shape::UInt16 => Value::UInt16(0),
            Shape::UInt32 => Value::UInt32(0),
            Shape::UInt64 => Value::UInt64(0),
            Shape::Float32 => Value::Float32(0.0),
            Shape::Float64 => Value::Float64(0.0),
            Shape::String => Value::String(String::new()),
            Shape::Bytes => Value::Bytes(Vec::new()),
            Shape::Timestamp => Value::Timestamp(0),
            Shape::Duration => Value::Duration(0),
            Shape::Interval => Value::Interval(Interval::default()),
            Shape::Uuid => Value::Uuid([0; 16]),
            Shape::Inet => Value::Inet(Inet {
                addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                prefix: 32,
            }),
            Shape::Json => Value::Json(serde_json::Value::Null),
            Shape::Numeric => Value::Numeric("0".to_string()),
            Shape::Range(elem) => Value::Range(Box::new(RangeValue {
                lower: Some(elem.zero_value()),
                upper: Some(elem.zero_value()),
                lower_inclusive: true,
                upper_inclusive: false,
                empty: true,
            })),
            Shape::Optional(inner) => Value::Optional(OptionalValue {
                inner: (**inner).clone(),
                value: None,
            }),
            Shape::Named {
                name,
                skip_normalization,
                inner,
            } => Value::Named(Box::new(NamedValue {
                name: name.clone(),
                skip_normalization: *skip_normalization,
                inner: inner.zero_value(),
            })),
            Shape::Struct(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|(name, shape)| StructField::new(name.clone(), shape.zero_value()))
                    .collect(),
            ),
            Shape::Array(_) => Value::Array(Vec::new()),
            Shape::Record(fields) => {
                Value::Record(fields.iter().map(Shape::zero_value).collect())
            }
            Shape::FlatArray { elem, dims } => Value::FlatArray(FlatArrayValue {
                dims: vec![0; *dims],
                elem: (**elem).clone(),
                elements: Vec::new(),
            }),
            Shape::Any => Value::Any(Box::new(Value::Null)),
            Shape::Primitive => Value::Primitive(Primitive::Null),
            Shape::Raw => Value::Raw(Vec::new()),
        }
    }
}

impl Value {
    /// Wrap a value as a present optional, remembering its shape.
    pub fn some(value: Value) -> Value {
        let inner = value.shape();
        Value::Optional(OptionalValue {
            inner,
            value: Some(Box::new(value)),
        })
    }

    /// An empty optional of the given inner shape.
    pub fn none_of(inner: Shape) -> Value {
        Value::Optional(OptionalValue { inner, value: None })
    }

    /// Wrap a value under a distinct type name.
    pub fn named(name: impl Into<String>, inner: Value) -> Value {
        Value::Named(Box::new(NamedValue {
            name: name.into(),
            skip_normalization: false,
            inner,
        }))
    }

    /// Wrap a value under a distinct type name that opts out of
    /// underlying-representation normalization.
    pub fn named_opaque(name: impl Into<String>, inner: Value) -> Value {
        Value::Named(Box::new(NamedValue {
            name: name.into(),
            skip_normalization: true,
            inner,
        }))
    }

    /// Check if this value is the untyped SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Derive the structural shape fingerprint of this value.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Bool,
            Value::Int8(_) => Shape::Int8,
            Value::Int16(_) => Shape::Int16,
            Value::Int32(_) => Shape::Int32,
            Value::Int64(_) => Shape::Int64,
            Value::UInt8(_) => Shape::UInt8,
            Value::UInt16(_) => Shape::UInt16,
            Value::UInt32(_) => Shape::UInt32,
            Value::UInt64(_) => Shape::UInt64,
            Value::Float32(_) => Shape::Float32,
            Value::Float64(_) => Shape::Float64,
            Value::String(_) => Shape::String,
            Value::Bytes(_) => Shape::Bytes,
            Value::Timestamp(_) => Shape::Timestamp,
            Value::Duration(_) => Shape::Duration,
            Value::Interval(_) => Shape::Interval,
            Value::Uuid(_) => Shape::Uuid,
            Value::Inet(_) => Shape::Inet,
            Value::Json(_) => Shape::Json,
            Value::Numeric(_) => Shape::Numeric,
            Value::Range(range) => {
                let bound = range
                    .lower
                    .as_ref()
                    .or(range.upper.as_ref())
                    .map(Value::shape)
                    .unwrap_or(Shape::Null);
                Shape::Range(Box::new(bound))
            }
            Value::Optional(opt) => Shape::Optional(Box::new(opt.inner.clone())),
            Value::Named(named) => Shape::Named {
                name: named.name.clone(),
                skip_normalization: named.skip_normalization,
                inner: Box::new(named.inner.shape()),
            },
            Value::Struct(fields) => Shape::Struct(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), f.value.shape()))
                    .collect(),
            ),
            Value::Array(elements) => {
                let elem = elements.first().map(Value::shape).unwrap_or(Shape::Null);
                Shape::Array(Box::new(elem))
            }
            Value::Record(fields) => Shape::Record(fields.iter().map(Value::shape).collect()),
            Value::FlatArray(flat) => Shape::FlatArray {
                elem: Box::new(flat.elem.clone()),
                dims: flat.dims.len(),
            },
            Value::Any(_) => Shape::Any,
            Value::Primitive(_) => Shape::Primitive,
            Value::Raw(_) => Shape::Raw,
        }
    }

    /// Generic unwrap used by the encode entry point when plan resolution
    /// fails: a [`Value::Primitive`] carrier unwraps to its payload.
    pub fn unwrap_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) => Some(p.clone()),
            _ => None,
        }
    }

    /// Nullable textual rendering, when this shape exposes one.
    ///
    /// `Some(None)` is SQL NULL, `Some(Some(_))` the rendered text.
    pub fn text_value(&self) -> Option<Option<&str>> {
        match self {
            Value::Optional(opt) if opt.inner == Shape::String => match &opt.value {
                None => Some(None),
                Some(inner) => match inner.as_ref() {
                    Value::String(s) => Some(Some(s.as_str())),
                    _ => None,
                },
            },
            _ => None,
        }
    }

    /// Last-resort textual rendering for shapes that have a canonical
    /// string form but no nullable-text capability.
    pub fn fallback_text(&self) -> Option<String> {
        match self {
            Value::Uuid(bytes) => Some(uuid::Uuid::from_bytes(*bytes).to_string()),
            Value::Inet(inet) => Some(render_inet(inet)),
            _ => None,
        }
    }

    /// Per-dimension extents of a (possibly nested) array value.
    ///
    /// Returns `None` when any nesting level is ragged or mixes array and
    /// scalar elements; ragged data is rejected at resolution time, never
    /// truncated or padded.
    pub fn array_extents(&self) -> Option<Vec<i32>> {
        let elements = match self {
            Value::Array(elements) => elements,
            _ => return None,
        };

        let mut dims = vec![elements.len() as i32];
        let nested = elements.iter().filter(|e| matches!(e, Value::Array(_))).count();
        if nested == 0 {
            return Some(dims);
        }
        if nested != elements.len() {
            return None;
        }

        let first = elements[0].array_extents()?;
        for element in &elements[1..] {
            if element.array_extents()? != first {
                return None;
            }
        }
        dims.extend(first);
        Some(dims)
    }

    /// Row-major flattening of a nested array value. Only meaningful for
    /// values whose extents are rectangular.
    pub fn flatten_elements(&self) -> Vec<Value> {
        match self {
            Value::Array(elements) => {
                if elements.iter().all(|e| matches!(e, Value::Array(_))) && !elements.is_empty() {
                    elements.iter().flat_map(Value::flatten_elements).collect()
                } else {
                    elements.clone()
                }
            }
            other => vec![other.clone()],
        }
    }

    /// Shape of the leaf elements of a nested array value.
    pub fn leaf_element_shape(&self) -> Shape {
        match self {
            Value::Array(elements) => match elements.first() {
                Some(first) => first.leaf_element_shape(),
                None => Shape::Null,
            },
            other => other.shape(),
        }
    }
}

/// Canonical text rendering of an inet value: host addresses drop the
/// full-length prefix, networks keep it.
pub(crate) fn render_inet(inet: &Inet) -> String {
    let full = match inet.addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if inet.prefix == full {
        inet.addr.to_string()
    } else {
        format!("{}/{}", inet.addr, inet.prefix)
    }
}

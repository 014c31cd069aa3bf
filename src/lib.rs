// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # pgcodec
//!
//! Plan-based conversion between PostgreSQL wire values and native Rust
//! values. The [`TypeRegistry`] maps OIDs, type names and native value
//! shapes to codecs; conversions resolve an encode or scan plan once per
//! shape and reuse it for every row.
//!
//! ## Architecture
//!
//! - **`core`**: the [`Value`] universe, structural [`Shape`]
//!   fingerprints, wire [`Format`]s and OID constants, and the error
//!   type.
//! - **`encoding`**: the [`Codec`] and plan traits, adapter-rule plan
//!   resolution, and the registry with its memoized scan-plan cache.
//! - **`codecs`**: implementations for the standard PostgreSQL types,
//!   from `bool` up through arrays, ranges and composites.
//!
//! ## Example
//!
//! ```
//! use pgcodec::{Format, TypeRegistry, Value, oid};
//!
//! let registry = TypeRegistry::new();
//!
//! let mut buf = Vec::new();
//! registry
//!     .encode(oid::INT4_OID, Format::Binary, &Value::Int32(42), &mut buf)
//!     .unwrap();
//! assert_eq!(buf, 42i32.to_be_bytes());
//!
//! let mut out = Value::Int32(0);
//! registry
//!     .scan(oid::INT4_OID, Format::Binary, Some(&buf), &mut out)
//!     .unwrap();
//! assert_eq!(out, Value::Int32(42));
//! ```

pub mod codecs;
pub mod core;
pub mod encoding;

pub use crate::core::error::{ConversionError, Result};
pub use crate::core::oid;
pub use crate::core::oid::Format;
pub use crate::core::value::{
    FlatArrayValue, Inet, Interval, NamedValue, OptionalValue, Primitive, RangeValue, Shape,
    StructField, Value,
};
pub use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
pub use crate::encoding::registry::{PgType, TypeRegistry};

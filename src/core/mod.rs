// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core data model: the native value universe, wire formats and OIDs, and
//! the conversion error type.

pub mod error;
pub mod oid;
pub mod value;

pub use error::{ConversionError, Result};
pub use oid::Format;
pub use value::{
    FlatArrayValue, Inet, Interval, NamedValue, OptionalValue, Primitive, RangeValue, Shape,
    StructField, Value,
};

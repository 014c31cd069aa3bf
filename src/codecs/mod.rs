// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec implementations for the standard PostgreSQL types.
//!
//! Each codec converts between its type's wire representation (text and
//! binary format) and one canonical native value. Non-canonical native
//! shapes reach these codecs through the adapter rules, never directly.

pub mod array;
pub mod boolean;
pub mod bytea;
pub mod composite;
pub mod float;
pub mod inet;
pub mod int;
pub mod interval;
pub mod json;
pub mod numeric;
pub mod range;
pub mod record;
pub mod text;
pub mod timestamp;
pub mod uuid;

pub use array::ArrayCodec;
pub use boolean::BoolCodec;
pub use bytea::ByteaCodec;
pub use composite::{CompositeCodec, CompositeField};
pub use float::FloatCodec;
pub use inet::InetCodec;
pub use int::{IntCodec, Uint32Codec};
pub use interval::IntervalCodec;
pub use json::JsonCodec;
pub use numeric::NumericCodec;
pub use range::RangeCodec;
pub use record::RecordCodec;
pub use text::TextCodec;
pub use timestamp::TimestampCodec;
pub use uuid::UuidCodec;

use crate::core::error::{ConversionError, Result};

/// Check a binary payload against its fixed wire length.
pub(crate) fn expect_len(type_name: &str, src: &[u8], want: usize) -> Result<()> {
    if src.len() != want {
        return Err(ConversionError::decode(
            type_name,
            format!("expected {} bytes, got {}", want, src.len()),
        ));
    }
    Ok(())
}

/// Interpret a wire payload as UTF-8 text.
pub(crate) fn as_text<'a>(type_name: &str, src: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(src).map_err(|e| ConversionError::decode(type_name, e.to_string()))
}

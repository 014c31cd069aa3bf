// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types for value conversion.
//!
//! Covers the full conversion taxonomy:
//! - Plan resolution failures (encode and scan side)
//! - NULL assigned to a destination that cannot hold it
//! - Codec-level encode/decode failures
//! - Out-of-range narrowing on capability write-back

use std::fmt;

use crate::core::oid::Format;

/// Errors that can occur while planning or executing a conversion.
#[derive(Debug, Clone)]
pub enum ConversionError {
    /// No encode plan could be resolved for a value shape.
    PlanNotFound {
        /// Target type OID (0 = unknown)
        oid: u32,
        /// Requested wire format
        format: Format,
        /// Shape of the offending native value
        shape: String,
    },

    /// Terminal scan failure: no strategy exists for this destination.
    ScanFailure {
        /// Source type OID
        oid: u32,
        /// Wire format of the source bytes
        format: Format,
        /// Shape of the destination
        shape: String,
    },

    /// SQL NULL arrived for a destination with no empty state.
    NullAssignment {
        /// Shape of the destination
        shape: String,
    },

    /// Codec failed to encode a value.
    Encode {
        /// Type name of the codec reporting the failure
        type_name: String,
        /// Error message
        message: String,
    },

    /// Codec failed to decode wire bytes.
    Decode {
        /// Type name of the codec reporting the failure
        type_name: String,
        /// Error message
        message: String,
    },

    /// A numeric value does not fit the destination width.
    OutOfRange {
        /// The value that overflowed, rendered as text
        value: String,
        /// The destination it was narrowed into
        target: String,
    },
}

impl ConversionError {
    /// Create an encode-side plan resolution failure.
    pub fn plan_not_found(oid: u32, format: Format, shape: impl Into<String>) -> Self {
        ConversionError::PlanNotFound {
            oid,
            format,
            shape: shape.into(),
        }
    }

    /// Create a terminal scan failure.
    pub fn scan_failure(oid: u32, format: Format, shape: impl Into<String>) -> Self {
        ConversionError::ScanFailure {
            oid,
            format,
            shape: shape.into(),
        }
    }

    /// Create a NULL assignment failure.
    pub fn null_assignment(shape: impl Into<String>) -> Self {
        ConversionError::NullAssignment {
            shape: shape.into(),
        }
    }

    /// Create a codec encode failure.
    pub fn encode(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConversionError::Encode {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a codec decode failure.
    pub fn decode(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConversionError::Decode {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create an out-of-range narrowing failure.
    pub fn out_of_range(value: impl fmt::Display, target: impl Into<String>) -> Self {
        ConversionError::OutOfRange {
            value: value.to_string(),
            target: target.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ConversionError::PlanNotFound { oid, format, shape } => vec![
                ("oid", oid.to_string()),
                ("format", format.to_string()),
                ("shape", shape.clone()),
            ],
            ConversionError::ScanFailure { oid, format, shape } => vec![
                ("oid", oid.to_string()),
                ("format", format.to_string()),
                ("shape", shape.clone()),
            ],
            ConversionError::NullAssignment { shape } => vec![("shape", shape.clone())],
            ConversionError::Encode { type_name, message } => {
                vec![("type", type_name.clone()), ("message", message.clone())]
            }
            ConversionError::Decode { type_name, message } => {
                vec![("type", type_name.clone()), ("message", message.clone())]
            }
            ConversionError::OutOfRange { value, target } => {
                vec![("value", value.clone()), ("target", target.clone())]
            }
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::PlanNotFound { oid, format, shape } => {
                write!(f, "unable to encode {shape} into OID {oid} in {format} format")
            }
            ConversionError::ScanFailure { oid, format, shape } => {
                write!(f, "cannot scan OID {oid} in {format} format into {shape}")
            }
            ConversionError::NullAssignment { shape } => {
                write!(f, "cannot assign NULL to {shape}")
            }
            ConversionError::Encode { type_name, message } => {
                write!(f, "{type_name} encode error: {message}")
            }
            ConversionError::Decode { type_name, message } => {
                write!(f, "{type_name} decode error: {message}")
            }
            ConversionError::OutOfRange { value, target } => {
                write!(f, "{value} is out of range for {target}")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Result type for pgcodec operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_not_found_display() {
        let err = ConversionError::plan_not_found(23, Format::Binary, "Struct");
        assert!(matches!(err, ConversionError::PlanNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "unable to encode Struct into OID 23 in binary format"
        );
    }

    #[test]
    fn test_scan_failure_display() {
        let err = ConversionError::scan_failure(25, Format::Text, "Bool");
        assert_eq!(err.to_string(), "cannot scan OID 25 in text format into Bool");
    }

    #[test]
    fn test_null_assignment_display() {
        let err = ConversionError::null_assignment("String");
        assert_eq!(err.to_string(), "cannot assign NULL to String");
    }

    #[test]
    fn test_encode_error_display() {
        let err = ConversionError::encode("int2", "value too large");
        assert_eq!(err.to_string(), "int2 encode error: value too large");
    }

    #[test]
    fn test_decode_error_display() {
        let err = ConversionError::decode("uuid", "expected 16 bytes");
        assert_eq!(err.to_string(), "uuid decode error: expected 16 bytes");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = ConversionError::out_of_range(100_000, "Int16");
        assert_eq!(err.to_string(), "100000 is out of range for Int16");
    }

    #[test]
    fn test_log_fields_plan_not_found() {
        let err = ConversionError::plan_not_found(23, Format::Binary, "Struct");
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ("oid", "23".to_string()));
        assert_eq!(fields[1], ("format", "binary".to_string()));
        assert_eq!(fields[2], ("shape", "Struct".to_string()));
    }

    #[test]
    fn test_error_clone() {
        let err1 = ConversionError::null_assignment("Int32");
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Plan resolution behavior: fast paths that need no registered codec,
//! the adapter rules that bridge value shapes to codecs, and the error
//! paths when no plan exists.

use pgcodec::{oid, ConversionError, Format, IsNull, Primitive, Shape, Value};
use pgcodec::TypeRegistry;

const UNREGISTERED_OID: u32 = 59_999;

#[test]
fn test_null_encodes_without_any_registration() {
    let registry = TypeRegistry::empty();
    let mut buf = Vec::new();
    let is_null = registry
        .encode(UNREGISTERED_OID, Format::Binary, &Value::Null, &mut buf)
        .unwrap();
    assert_eq!(is_null, IsNull::Yes);
    assert!(buf.is_empty());
}

#[test]
fn test_string_text_fast_path_needs_no_codec() {
    let registry = TypeRegistry::empty();
    let mut buf = Vec::new();
    registry
        .encode(
            UNREGISTERED_OID,
            Format::Text,
            &Value::String("hello".into()),
            &mut buf,
        )
        .unwrap();
    assert_eq!(buf, b"hello");
}

#[test]
fn test_string_binary_has_no_fast_path_on_empty_registry() {
    let registry = TypeRegistry::empty();
    let mut buf = Vec::new();
    let err = registry
        .encode(
            UNREGISTERED_OID,
            Format::Binary,
            &Value::String("hello".into()),
            &mut buf,
        )
        .unwrap_err();
    assert!(matches!(err, ConversionError::PlanNotFound { .. }));
}

#[test]
fn test_uuid_falls_back_to_text_at_unregistered_oid() {
    let registry = TypeRegistry::empty();
    let value = Value::Uuid([
        0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde,
        0xf0,
    ]);
    let mut buf = Vec::new();
    registry
        .encode(UNREGISTERED_OID, Format::Text, &value, &mut buf)
        .unwrap();
    assert_eq!(buf, b"12345678-9abc-def0-1234-56789abcdef0");
}

#[test]
fn test_optional_string_text_fast_path() {
    let registry = TypeRegistry::empty();

    let mut buf = Vec::new();
    let is_null = registry
        .encode(
            UNREGISTERED_OID,
            Format::Text,
            &Value::some(Value::String("present".into())),
            &mut buf,
        )
        .unwrap();
    assert_eq!(is_null, IsNull::No);
    assert_eq!(buf, b"present");

    // The same plan shape also carries the absent case.
    buf.clear();
    let is_null = registry
        .encode(
            UNREGISTERED_OID,
            Format::Text,
            &Value::none_of(Shape::String),
            &mut buf,
        )
        .unwrap();
    assert_eq!(is_null, IsNull::Yes);
}

#[test]
fn test_zero_oid_encode_infers_type_from_shape() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    registry
        .encode(0, Format::Binary, &Value::Int32(-1), &mut buf)
        .unwrap();
    // The default mapping carries Int32 to int4.
    assert_eq!(buf, (-1i32).to_be_bytes());
}

#[test]
fn test_zero_oid_scan_infers_type_from_shape() {
    let registry = TypeRegistry::new();
    let mut out = Value::Int32(0);
    registry
        .scan(0, Format::Binary, Some(&(-1i32).to_be_bytes()), &mut out)
        .unwrap();
    assert_eq!(out, Value::Int32(-1));
}

#[test]
fn test_zero_oid_without_shape_mapping_fails() {
    let registry = TypeRegistry::empty();
    let mut buf = Vec::new();
    let err = registry
        .encode(0, Format::Binary, &Value::Int32(1), &mut buf)
        .unwrap_err();
    assert!(matches!(err, ConversionError::PlanNotFound { .. }));
}

#[test]
fn test_deeply_nested_optionals_resolve() {
    let registry = TypeRegistry::new();
    let mut value = Value::Int32(7);
    for _ in 0..12 {
        value = Value::some(value);
    }
    let mut buf = Vec::new();
    registry
        .encode(oid::INT4_OID, Format::Binary, &value, &mut buf)
        .unwrap();
    assert_eq!(buf, 7i32.to_be_bytes());
}

#[test]
fn test_primitive_carrier_unwraps_for_encode() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    registry
        .encode(
            oid::INT8_OID,
            Format::Binary,
            &Value::Primitive(Primitive::Int64(5)),
            &mut buf,
        )
        .unwrap();
    assert_eq!(buf, 5i64.to_be_bytes());
}

#[test]
fn test_named_value_unwraps_for_encode() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    registry
        .encode(
            oid::BOOL_OID,
            Format::Binary,
            &Value::named("active", Value::Bool(true)),
            &mut buf,
        )
        .unwrap();
    assert_eq!(buf, vec![1]);
}

#[test]
fn test_opaque_named_value_does_not_unwrap() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    let err = registry
        .encode(
            oid::BOOL_OID,
            Format::Binary,
            &Value::named_opaque("active", Value::Bool(true)),
            &mut buf,
        )
        .unwrap_err();
    assert!(matches!(err, ConversionError::PlanNotFound { .. }));
}

#[test]
fn test_uint64_widening_checks_range_at_execution() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    // Resolution accepts the shape; the overflow surfaces when the plan runs.
    let err = registry
        .encode(
            oid::INT8_OID,
            Format::Binary,
            &Value::UInt64(u64::MAX),
            &mut buf,
        )
        .unwrap_err();
    assert!(matches!(err, ConversionError::OutOfRange { .. }));
}

#[test]
fn test_any_destination_takes_canonical_value() {
    let registry = TypeRegistry::new();
    let mut out = Value::Any(Box::new(Value::Null));
    registry
        .scan(
            oid::INT2_OID,
            Format::Binary,
            Some(&7i16.to_be_bytes()),
            &mut out,
        )
        .unwrap();
    assert_eq!(out, Value::Any(Box::new(Value::Int64(7))));
}

#[test]
fn test_any_destination_unregistered_text_yields_string() {
    let registry = TypeRegistry::new();
    let mut out = Value::Any(Box::new(Value::Null));
    registry
        .scan(UNREGISTERED_OID, Format::Text, Some(b"whatever"), &mut out)
        .unwrap();
    assert_eq!(out, Value::Any(Box::new(Value::String("whatever".into()))));
}

#[test]
fn test_any_destination_unregistered_binary_yields_bytes() {
    let registry = TypeRegistry::new();
    let mut out = Value::Any(Box::new(Value::Null));
    registry
        .scan(UNREGISTERED_OID, Format::Binary, Some(&[1, 2]), &mut out)
        .unwrap();
    assert_eq!(out, Value::Any(Box::new(Value::Bytes(vec![1, 2]))));
}

#[test]
fn test_primitive_destination_decodes_via_codec() {
    let registry = TypeRegistry::new();
    let mut out = Value::Primitive(Primitive::Null);
    registry
        .scan(
            oid::INT4_OID,
            Format::Binary,
            Some(&9i32.to_be_bytes()),
            &mut out,
        )
        .unwrap();
    assert_eq!(out, Value::Primitive(Primitive::Int64(9)));
}

#[test]
fn test_string_destination_binary_int_is_a_scan_failure() {
    let registry = TypeRegistry::new();
    let mut out = Value::String(String::new());
    let err = registry
        .scan(
            oid::INT4_OID,
            Format::Binary,
            Some(&1i32.to_be_bytes()),
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(err, ConversionError::ScanFailure { .. }));
}

#[test]
fn test_string_destination_copies_wire_text_oids_in_binary() {
    let registry = TypeRegistry::new();
    let mut out = Value::String(String::new());
    registry
        .scan(oid::NAME_OID, Format::Binary, Some(b"relname"), &mut out)
        .unwrap();
    assert_eq!(out, Value::String("relname".into()));
}

#[test]
fn test_raw_destination_copies_bytes_verbatim() {
    let registry = TypeRegistry::new();
    let mut out = Value::Raw(Vec::new());
    registry
        .scan(oid::INT4_OID, Format::Binary, Some(&[0, 0, 0, 9]), &mut out)
        .unwrap();
    assert_eq!(out, Value::Raw(vec![0, 0, 0, 9]));

    let err = registry
        .scan(oid::INT4_OID, Format::Binary, None, &mut out)
        .unwrap_err();
    assert!(matches!(err, ConversionError::NullAssignment { .. }));
}

#[test]
fn test_bytes_destination_copies_text_wire_form() {
    let registry = TypeRegistry::new();
    let mut out = Value::Bytes(Vec::new());
    registry
        .scan(oid::TEXT_OID, Format::Text, Some(b"abc"), &mut out)
        .unwrap();
    assert_eq!(out, Value::Bytes(b"abc".to_vec()));

    // NULL leaves an empty buffer rather than failing.
    let mut out = Value::Bytes(b"old".to_vec());
    registry
        .scan(oid::TEXT_OID, Format::Text, None, &mut out)
        .unwrap();
    assert_eq!(out, Value::Bytes(Vec::new()));
}

#[test]
fn test_optional_scan_restores_inner_shape() {
    let registry = TypeRegistry::new();
    let mut out = Value::none_of(Shape::Int32);
    registry
        .scan(
            oid::INT4_OID,
            Format::Binary,
            Some(&5i32.to_be_bytes()),
            &mut out,
        )
        .unwrap();
    assert_eq!(out, Value::some(Value::Int32(5)));
}

#[test]
fn test_scan_failure_names_the_mismatch() {
    let registry = TypeRegistry::new();
    let mut out = Value::Bool(false);
    let err = registry
        .scan(oid::NUMERIC_OID, Format::Binary, Some(&[0; 8]), &mut out)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("1700"), "{}", message);
    assert!(message.contains("bool"), "{}", message);
}

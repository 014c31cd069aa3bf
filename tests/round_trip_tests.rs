// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end conversions through the default registry: encode a native
//! value to wire bytes, then scan those bytes back into a destination.

use pgcodec::{oid, Format, Inet, Interval, IsNull, RangeValue, Shape, StructField, Value};
use pgcodec::{PgType, TypeRegistry};
use pgcodec::codecs::{CompositeCodec, CompositeField};
use std::sync::Arc;

fn encode(registry: &TypeRegistry, oid: u32, format: Format, value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    let is_null = registry.encode(oid, format, value, &mut buf).unwrap();
    assert_eq!(is_null, IsNull::No);
    buf
}

fn round_trip(registry: &TypeRegistry, oid: u32, format: Format, value: &Value, dst: &mut Value) {
    let buf = encode(registry, oid, format, value);
    registry.scan(oid, format, Some(&buf), dst).unwrap();
}

#[test]
fn test_int4_binary_round_trip() {
    let registry = TypeRegistry::new();
    let mut out = Value::Int32(0);
    round_trip(
        &registry,
        oid::INT4_OID,
        Format::Binary,
        &Value::Int32(-123_456),
        &mut out,
    );
    assert_eq!(out, Value::Int32(-123_456));
}

#[test]
fn test_int2_narrowing_out_of_range() {
    let registry = TypeRegistry::new();
    // 70000 fits int4 on the wire but not an i16 destination.
    let buf = encode(&registry, oid::INT4_OID, Format::Binary, &Value::Int32(70_000));
    let mut out = Value::Int16(0);
    let err = registry
        .scan(oid::INT4_OID, Format::Binary, Some(&buf), &mut out)
        .unwrap_err();
    assert!(matches!(err, pgcodec::ConversionError::OutOfRange { .. }));
}

#[test]
fn test_int_text_round_trip() {
    let registry = TypeRegistry::new();
    let buf = encode(&registry, oid::INT8_OID, Format::Text, &Value::Int64(42));
    assert_eq!(buf, b"42");
    let mut out = Value::Int64(0);
    registry
        .scan(oid::INT8_OID, Format::Text, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, Value::Int64(42));
}

#[test]
fn test_bool_both_formats() {
    let registry = TypeRegistry::new();
    assert_eq!(
        encode(&registry, oid::BOOL_OID, Format::Text, &Value::Bool(true)),
        b"t"
    );
    assert_eq!(
        encode(&registry, oid::BOOL_OID, Format::Binary, &Value::Bool(false)),
        vec![0]
    );
}

#[test]
fn test_float_widening_and_narrowing() {
    let registry = TypeRegistry::new();
    let mut out = Value::Float32(0.0);
    round_trip(
        &registry,
        oid::FLOAT4_OID,
        Format::Binary,
        &Value::Float32(2.5),
        &mut out,
    );
    assert_eq!(out, Value::Float32(2.5));
}

#[test]
fn test_nan_survives_text() {
    let registry = TypeRegistry::new();
    let buf = encode(
        &registry,
        oid::FLOAT8_OID,
        Format::Text,
        &Value::Float64(f64::NAN),
    );
    assert_eq!(buf, b"NaN");
    let mut out = Value::Float64(0.0);
    registry
        .scan(oid::FLOAT8_OID, Format::Text, Some(&buf), &mut out)
        .unwrap();
    match out {
        Value::Float64(v) => assert!(v.is_nan()),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_null_into_string_is_an_error() {
    let registry = TypeRegistry::new();
    let mut out = Value::String(String::new());
    let err = registry
        .scan(oid::TEXT_OID, Format::Text, None, &mut out)
        .unwrap_err();
    assert!(matches!(err, pgcodec::ConversionError::NullAssignment { .. }));
}

#[test]
fn test_null_into_optional_clears_it() {
    let registry = TypeRegistry::new();
    let mut out = Value::some(Value::String("old".into()));
    registry
        .scan(oid::TEXT_OID, Format::Text, None, &mut out)
        .unwrap();
    assert_eq!(out, Value::none_of(Shape::String));
}

#[test]
fn test_empty_string_is_not_null() {
    let registry = TypeRegistry::new();
    let mut out = Value::String("old".into());
    registry
        .scan(oid::TEXT_OID, Format::Text, Some(b""), &mut out)
        .unwrap();
    assert_eq!(out, Value::String(String::new()));
}

#[test]
fn test_optional_encode_null() {
    let registry = TypeRegistry::new();
    let mut buf = Vec::new();
    let is_null = registry
        .encode(
            oid::INT4_OID,
            Format::Binary,
            &Value::none_of(Shape::Int32),
            &mut buf,
        )
        .unwrap();
    assert_eq!(is_null, IsNull::Yes);
    assert!(buf.is_empty());
}

#[test]
fn test_bytea_text_hex() {
    let registry = TypeRegistry::new();
    let buf = encode(
        &registry,
        oid::BYTEA_OID,
        Format::Text,
        &Value::Bytes(vec![0xde, 0xad]),
    );
    assert_eq!(buf, b"\\xdead");
    let mut out = Value::Bytes(Vec::new());
    registry
        .scan(oid::BYTEA_OID, Format::Text, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, Value::Bytes(vec![0xde, 0xad]));
}

#[test]
fn test_timestamptz_binary_round_trip() {
    let registry = TypeRegistry::new();
    let nanos = 1_700_000_000_123_456_000i64;
    let mut out = Value::Timestamp(0);
    round_trip(
        &registry,
        oid::TIMESTAMPTZ_OID,
        Format::Binary,
        &Value::Timestamp(nanos),
        &mut out,
    );
    assert_eq!(out, Value::Timestamp(nanos));
}

#[test]
fn test_duration_through_interval() {
    let registry = TypeRegistry::new();
    // 90 minutes, as nanoseconds.
    let duration = Value::Duration(90 * 60 * 1_000_000_000);
    let mut out = Value::Duration(0);
    round_trip(&registry, oid::INTERVAL_OID, Format::Binary, &duration, &mut out);
    assert_eq!(out, duration);
}

#[test]
fn test_interval_text_round_trip() {
    let registry = TypeRegistry::new();
    let interval = Value::Interval(Interval {
        months: 13,
        days: 2,
        micros: 3_600_000_000,
    });
    let buf = encode(&registry, oid::INTERVAL_OID, Format::Text, &interval);
    assert_eq!(buf, b"1 year 1 mon 2 days 01:00:00");
    let mut out = Value::Interval(Interval::default());
    registry
        .scan(oid::INTERVAL_OID, Format::Text, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, interval);
}

#[test]
fn test_uuid_from_string_and_back() {
    let registry = TypeRegistry::new();
    let text = "12345678-9abc-def0-1234-56789abcdef0";
    let buf = encode(
        &registry,
        oid::UUID_OID,
        Format::Binary,
        &Value::String(text.into()),
    );
    assert_eq!(buf.len(), 16);
    let mut out = Value::String(String::new());
    registry
        .scan(oid::UUID_OID, Format::Binary, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, Value::String(text.into()));
}

#[test]
fn test_jsonb_binary_round_trip() {
    let registry = TypeRegistry::new();
    let doc = Value::Json(serde_json::json!({"k": [1, 2, 3]}));
    let buf = encode(&registry, oid::JSONB_OID, Format::Binary, &doc);
    assert_eq!(buf[0], 1);
    let mut out = Value::Json(serde_json::Value::Null);
    registry
        .scan(oid::JSONB_OID, Format::Binary, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, doc);
}

#[test]
fn test_numeric_binary_round_trip() {
    let registry = TypeRegistry::new();
    for s in ["0", "-12345.678900", "0.00001", "NaN"] {
        let value = Value::Numeric(s.into());
        let mut out = Value::Numeric("0".into());
        round_trip(&registry, oid::NUMERIC_OID, Format::Binary, &value, &mut out);
        assert_eq!(out, value, "{}", s);
    }
}

#[test]
fn test_inet_binary_round_trip() {
    let registry = TypeRegistry::new();
    let inet = Value::Inet(Inet {
        addr: "2001:db8::1".parse().unwrap(),
        prefix: 64,
    });
    let mut out = Value::Inet(Inet {
        addr: "0.0.0.0".parse().unwrap(),
        prefix: 32,
    });
    round_trip(&registry, oid::INET_OID, Format::Binary, &inet, &mut out);
    assert_eq!(out, inet);
}

#[test]
fn test_array_binary_round_trip() {
    let registry = TypeRegistry::new();
    let array = Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]);
    let mut out = Value::Array(vec![Value::Int32(0)]);
    round_trip(&registry, oid::INT4_ARRAY_OID, Format::Binary, &array, &mut out);
    assert_eq!(out, array);
}

#[test]
fn test_array_text_round_trip_with_quoting() {
    let registry = TypeRegistry::new();
    let array = Value::Array(vec![
        Value::String("plain".into()),
        Value::String("has space".into()),
        Value::String("q\"uote".into()),
        Value::String(String::new()),
    ]);
    let buf = encode(&registry, oid::TEXT_ARRAY_OID, Format::Text, &array);
    assert_eq!(buf, br#"{plain,"has space","q\"uote",""}"#.to_vec());
    let mut out = Value::Array(vec![Value::String(String::new())]);
    registry
        .scan(oid::TEXT_ARRAY_OID, Format::Text, Some(&buf), &mut out)
        .unwrap();
    assert_eq!(out, array);
}

#[test]
fn test_array_with_null_elements() {
    let registry = TypeRegistry::new();
    let array = Value::Array(vec![
        Value::some(Value::Int32(1)),
        Value::none_of(Shape::Int32),
    ]);
    let mut out = Value::Array(vec![Value::none_of(Shape::Int32)]);
    round_trip(&registry, oid::INT4_ARRAY_OID, Format::Binary, &array, &mut out);
    assert_eq!(out, array);
}

#[test]
fn test_multi_dim_array_round_trip() {
    let registry = TypeRegistry::new();
    let array = Value::Array(vec![
        Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]),
        Value::Array(vec![Value::Int32(4), Value::Int32(5), Value::Int32(6)]),
    ]);
    let mut out = Value::Array(vec![Value::Array(vec![Value::Int32(0)])]);
    round_trip(&registry, oid::INT4_ARRAY_OID, Format::Binary, &array, &mut out);
    assert_eq!(out, array);
}

#[test]
fn test_ragged_array_rejected_at_encode() {
    let registry = TypeRegistry::new();
    let ragged = Value::Array(vec![
        Value::Array(vec![Value::Int32(1), Value::Int32(2)]),
        Value::Array(vec![Value::Int32(3)]),
    ]);
    let mut buf = Vec::new();
    assert!(registry
        .encode(oid::INT4_ARRAY_OID, Format::Binary, &ragged, &mut buf)
        .is_err());
}

#[test]
fn test_empty_array_round_trip() {
    let registry = TypeRegistry::new();
    let array = Value::Array(vec![]);
    let mut out = Value::Array(vec![Value::Int64(0)]);
    round_trip(&registry, oid::INT8_ARRAY_OID, Format::Binary, &array, &mut out);
    assert_eq!(out, Value::Array(vec![]));
}

#[test]
fn test_int4range_binary_round_trip() {
    let registry = TypeRegistry::new();
    let range = Value::Range(Box::new(RangeValue {
        lower: Some(Value::Int32(1)),
        upper: Some(Value::Int32(10)),
        lower_inclusive: true,
        upper_inclusive: false,
        empty: false,
    }));
    let mut out = Value::Range(Box::new(RangeValue {
        lower: Some(Value::Int32(0)),
        upper: Some(Value::Int32(0)),
        lower_inclusive: false,
        upper_inclusive: false,
        empty: false,
    }));
    round_trip(&registry, oid::INT4RANGE_OID, Format::Binary, &range, &mut out);
    assert_eq!(out, range);
}

#[test]
fn test_range_text_render() {
    let registry = TypeRegistry::new();
    let range = Value::Range(Box::new(RangeValue {
        lower: None,
        upper: Some(Value::Int64(5)),
        lower_inclusive: false,
        upper_inclusive: true,
        empty: false,
    }));
    let buf = encode(&registry, oid::INT8RANGE_OID, Format::Text, &range);
    assert_eq!(buf, b"(,5]");
}

#[test]
fn test_empty_range() {
    let registry = TypeRegistry::new();
    let range = Value::Range(Box::new(RangeValue {
        lower: None,
        upper: None,
        lower_inclusive: false,
        upper_inclusive: false,
        empty: true,
    }));
    assert_eq!(
        encode(&registry, oid::INT4RANGE_OID, Format::Text, &range),
        b"empty"
    );
    assert_eq!(
        encode(&registry, oid::INT4RANGE_OID, Format::Binary, &range),
        vec![0x01]
    );
}

fn registry_with_composite() -> (TypeRegistry, u32) {
    let mut registry = TypeRegistry::new();
    let point_oid = 60_000;
    let int4 = registry.type_for_oid(oid::INT4_OID).unwrap();
    let text = registry.type_for_oid(oid::TEXT_OID).unwrap();
    registry.register_type(PgType::new(
        "point3",
        point_oid,
        Arc::new(CompositeCodec::new(vec![
            CompositeField::new("x", Arc::clone(&int4)),
            CompositeField::new("y", int4),
            CompositeField::new("label", text),
        ])),
    ));
    (registry, point_oid)
}

#[test]
fn test_composite_struct_round_trip() {
    let (registry, point_oid) = registry_with_composite();
    let value = Value::Struct(vec![
        StructField::new("x", Value::Int32(3)),
        StructField::new("y", Value::Int32(4)),
        StructField::new("label", Value::String("origin-ish".into())),
        StructField::new("_cached_norm", Value::Float64(5.0)),
    ]);
    let buf = encode(&registry, point_oid, Format::Binary, &value);

    let mut out = Value::Struct(vec![
        StructField::new("x", Value::Int32(0)),
        StructField::new("y", Value::Int32(0)),
        StructField::new("label", Value::String(String::new())),
        StructField::new("_cached_norm", Value::Float64(5.0)),
    ]);
    registry
        .scan(point_oid, Format::Binary, Some(&buf), &mut out)
        .unwrap();
    // Hidden fields do not participate and keep their value.
    assert_eq!(out, value);
}

#[test]
fn test_composite_field_count_mismatch() {
    let (registry, point_oid) = registry_with_composite();
    let mut buf = Vec::new();
    let short = Value::Record(vec![Value::Int32(1), Value::Int32(2)]);
    assert!(registry
        .encode(point_oid, Format::Binary, &short, &mut buf)
        .is_err());
}

#[test]
fn test_record_decode_into_any() {
    let registry = TypeRegistry::new();
    // Wire bytes of (int4 7, text NULL).
    let mut src = Vec::new();
    src.extend_from_slice(&2i32.to_be_bytes());
    src.extend_from_slice(&oid::INT4_OID.to_be_bytes());
    src.extend_from_slice(&4i32.to_be_bytes());
    src.extend_from_slice(&7i32.to_be_bytes());
    src.extend_from_slice(&oid::TEXT_OID.to_be_bytes());
    src.extend_from_slice(&(-1i32).to_be_bytes());

    let mut out = Value::Any(Box::new(Value::Null));
    registry
        .scan(oid::RECORD_OID, Format::Binary, Some(&src), &mut out)
        .unwrap();
    assert_eq!(
        out,
        Value::Any(Box::new(Value::Record(vec![
            Value::Int64(7),
            Value::Null
        ])))
    );
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bootstrap registrations for the standard PostgreSQL types.
//!
//! Registers every scalar codec, the array type for each scalar, the
//! builtin range types, and the default shape bindings that let values
//! be encoded without naming an OID explicitly.

use std::sync::Arc;

use crate::codecs::{
    ArrayCodec, BoolCodec, ByteaCodec, FloatCodec, InetCodec, IntCodec, IntervalCodec, JsonCodec,
    NumericCodec, RangeCodec, RecordCodec, TextCodec, TimestampCodec, Uint32Codec, UuidCodec,
};
use crate::core::oid::*;
use crate::core::value::Shape;
use crate::encoding::registry::{PgType, TypeRegistry};

pub(crate) fn register_defaults(registry: &mut TypeRegistry) {
    // Scalars. The string types share one codec.
    let bool_t = registry.register_type(PgType::new("bool", BOOL_OID, Arc::new(BoolCodec)));
    let bytea_t = registry.register_type(PgType::new("bytea", BYTEA_OID, Arc::new(ByteaCodec)));
    let int2_t = registry.register_type(PgType::new("int2", INT2_OID, Arc::new(IntCodec::int2())));
    let int4_t = registry.register_type(PgType::new("int4", INT4_OID, Arc::new(IntCodec::int4())));
    let int8_t = registry.register_type(PgType::new("int8", INT8_OID, Arc::new(IntCodec::int8())));
    let oid_t = registry.register_type(PgType::new("oid", OID_OID, Arc::new(Uint32Codec)));
    let xid_t = registry.register_type(PgType::new("xid", XID_OID, Arc::new(Uint32Codec)));
    let cid_t = registry.register_type(PgType::new("cid", CID_OID, Arc::new(Uint32Codec)));
    let float4_t =
        registry.register_type(PgType::new("float4", FLOAT4_OID, Arc::new(FloatCodec::float4())));
    let float8_t =
        registry.register_type(PgType::new("float8", FLOAT8_OID, Arc::new(FloatCodec::float8())));
    let text_t = registry.register_type(PgType::new("text", TEXT_OID, Arc::new(TextCodec)));
    let varchar_t =
        registry.register_type(PgType::new("varchar", VARCHAR_OID, Arc::new(TextCodec)));
    let bpchar_t = registry.register_type(PgType::new("bpchar", BPCHAR_OID, Arc::new(TextCodec)));
    let name_t = registry.register_type(PgType::new("name", NAME_OID, Arc::new(TextCodec)));
    registry.register_type(PgType::new("unknown", UNKNOWN_OID, Arc::new(TextCodec)));
    let timestamp_t = registry.register_type(PgType::new(
        "timestamp",
        TIMESTAMP_OID,
        Arc::new(TimestampCodec::timestamp()),
    ));
    let timestamptz_t = registry.register_type(PgType::new(
        "timestamptz",
        TIMESTAMPTZ_OID,
        Arc::new(TimestampCodec::timestamptz()),
    ));
    let interval_t =
        registry.register_type(PgType::new("interval", INTERVAL_OID, Arc::new(IntervalCodec)));
    let uuid_t = registry.register_type(PgType::new("uuid", UUID_OID, Arc::new(UuidCodec)));
    let json_t = registry.register_type(PgType::new("json", JSON_OID, Arc::new(JsonCodec::json())));
    let jsonb_t =
        registry.register_type(PgType::new("jsonb", JSONB_OID, Arc::new(JsonCodec::jsonb())));
    let numeric_t =
        registry.register_type(PgType::new("numeric", NUMERIC_OID, Arc::new(NumericCodec)));
    let inet_t = registry.register_type(PgType::new("inet", INET_OID, Arc::new(InetCodec::inet())));
    let cidr_t = registry.register_type(PgType::new("cidr", CIDR_OID, Arc::new(InetCodec::cidr())));
    registry.register_type(PgType::new("record", RECORD_OID, Arc::new(RecordCodec)));

    // Array types.
    let arrays: [(&str, u32, &Arc<PgType>); 23] = [
        ("_bool", BOOL_ARRAY_OID, &bool_t),
        ("_bytea", BYTEA_ARRAY_OID, &bytea_t),
        ("_int2", INT2_ARRAY_OID, &int2_t),
        ("_int4", INT4_ARRAY_OID, &int4_t),
        ("_int8", INT8_ARRAY_OID, &int8_t),
        ("_oid", OID_ARRAY_OID, &oid_t),
        ("_xid", XID_ARRAY_OID, &xid_t),
        ("_cid", CID_ARRAY_OID, &cid_t),
        ("_float4", FLOAT4_ARRAY_OID, &float4_t),
        ("_float8", FLOAT8_ARRAY_OID, &float8_t),
        ("_text", TEXT_ARRAY_OID, &text_t),
        ("_varchar", VARCHAR_ARRAY_OID, &varchar_t),
        ("_bpchar", BPCHAR_ARRAY_OID, &bpchar_t),
        ("_name", NAME_ARRAY_OID, &name_t),
        ("_timestamp", TIMESTAMP_ARRAY_OID, &timestamp_t),
        ("_timestamptz", TIMESTAMPTZ_ARRAY_OID, &timestamptz_t),
        ("_interval", INTERVAL_ARRAY_OID, &interval_t),
        ("_uuid", UUID_ARRAY_OID, &uuid_t),
        ("_json", JSON_ARRAY_OID, &json_t),
        ("_jsonb", JSONB_ARRAY_OID, &jsonb_t),
        ("_numeric", NUMERIC_ARRAY_OID, &numeric_t),
        ("_inet", INET_ARRAY_OID, &inet_t),
        ("_cidr", CIDR_ARRAY_OID, &cidr_t),
    ];
    for (name, oid, element) in arrays {
        registry.register_type(PgType::new(
            name,
            oid,
            Arc::new(ArrayCodec::new(Arc::clone(element))),
        ));
    }

    // Range types.
    let ranges: [(&str, u32, &Arc<PgType>); 5] = [
        ("int4range", INT4RANGE_OID, &int4_t),
        ("int8range", INT8RANGE_OID, &int8_t),
        ("numrange", NUMRANGE_OID, &numeric_t),
        ("tsrange", TSRANGE_OID, &timestamp_t),
        ("tstzrange", TSTZRANGE_OID, &timestamptz_t),
    ];
    for (name, oid, element) in ranges {
        registry.register_type(PgType::new(
            name,
            oid,
            Arc::new(RangeCodec::new(Arc::clone(element))),
        ));
    }

    // Default shape bindings, covering the optional and array variants of
    // every base shape.
    let shapes: [(Shape, &str); 17] = [
        (Shape::Bool, "bool"),
        (Shape::Int16, "int2"),
        (Shape::Int32, "int4"),
        (Shape::Int64, "int8"),
        (Shape::Int8, "int8"),
        (Shape::UInt8, "int8"),
        (Shape::UInt16, "int8"),
        (Shape::UInt32, "int8"),
        (Shape::UInt64, "int8"),
        (Shape::Float32, "float4"),
        (Shape::Float64, "float8"),
        (Shape::String, "text"),
        (Shape::Bytes, "bytea"),
        (Shape::Timestamp, "timestamptz"),
        (Shape::Duration, "interval"),
        (Shape::Interval, "interval"),
        (Shape::Uuid, "uuid"),
    ];
    for (shape, name) in shapes {
        register_shape_variants(registry, shape, name);
    }
    register_shape_variants(registry, Shape::Inet, "inet");
    register_shape_variants(registry, Shape::Json, "json");
    register_shape_variants(registry, Shape::Numeric, "numeric");
}

/// Bind a base shape and its common wrappings to a type name: the shape
/// itself, its optional, its array, and the nullable combinations.
fn register_shape_variants(registry: &mut TypeRegistry, shape: Shape, name: &str) {
    let array_name = format!("_{}", name);
    let optional = Shape::Optional(Box::new(shape.clone()));
    let array = Shape::Array(Box::new(shape.clone()));
    let array_of_optional = Shape::Array(Box::new(optional.clone()));

    registry.register_default_shape(shape, name);
    registry.register_default_shape(optional, name);
    registry.register_default_shape(array.clone(), array_name.as_str());
    registry.register_default_shape(
        Shape::Optional(Box::new(array)),
        array_name.as_str(),
    );
    registry.register_default_shape(array_of_optional.clone(), array_name.as_str());
    registry.register_default_shape(
        Shape::Optional(Box::new(array_of_optional)),
        array_name.as_str(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrays_resolve_their_element_type() {
        let registry = TypeRegistry::new();
        let int4_array = registry.type_for_oid(INT4_ARRAY_OID).unwrap();
        assert_eq!(int4_array.name, "_int4");
    }

    #[test]
    fn test_shape_variants_bound() {
        let registry = TypeRegistry::new();
        let optional_text = Shape::Optional(Box::new(Shape::String));
        assert_eq!(
            registry.type_for_shape(&optional_text).unwrap().oid,
            TEXT_OID
        );
        let nullable_int_array =
            Shape::Array(Box::new(Shape::Optional(Box::new(Shape::Int32))));
        assert_eq!(
            registry.type_for_shape(&nullable_int_array).unwrap().oid,
            INT4_ARRAY_OID
        );
    }

    #[test]
    fn test_ranges_registered() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.type_for_name("int8range").unwrap().oid,
            INT8RANGE_OID
        );
    }
}

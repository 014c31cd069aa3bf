// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire format codes and well-known PostgreSQL type OIDs.
//!
//! The OID table is data, not logic: it mirrors the stable OIDs assigned
//! by the PostgreSQL catalog for built-in types. Types discovered at
//! runtime (custom enums, composites) carry server-assigned OIDs and are
//! registered through [`TypeRegistry::register_type`](crate::TypeRegistry::register_type).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire representation of a value: text or binary.
///
/// PostgreSQL tags every parameter and result column with a format code:
/// `0` for text, `1` for binary. Text is the default for unregistered
/// types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    /// Text format (format code 0).
    #[default]
    Text,
    /// Binary format (format code 1).
    Binary,
}

impl Format {
    /// The wire format code.
    pub fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }

    /// Parse a wire format code. Unknown codes are rejected.
    pub fn from_code(code: i16) -> Option<Format> {
        match code {
            0 => Some(Format::Text),
            1 => Some(Format::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Binary => write!(f, "binary"),
        }
    }
}

pub const BOOL_OID: u32 = 16;
pub const BYTEA_OID: u32 = 17;
pub const QCHAR_OID: u32 = 18;
pub const NAME_OID: u32 = 19;
pub const INT8_OID: u32 = 20;
pub const INT2_OID: u32 = 21;
pub const INT4_OID: u32 = 23;
pub const TEXT_OID: u32 = 25;
pub const OID_OID: u32 = 26;
pub const TID_OID: u32 = 27;
pub const XID_OID: u32 = 28;
pub const CID_OID: u32 = 29;
pub const JSON_OID: u32 = 114;
pub const JSON_ARRAY_OID: u32 = 199;
pub const POINT_OID: u32 = 600;
pub const LSEG_OID: u32 = 601;
pub const PATH_OID: u32 = 602;
pub const BOX_OID: u32 = 603;
pub const POLYGON_OID: u32 = 604;
pub const LINE_OID: u32 = 628;
pub const LINE_ARRAY_OID: u32 = 629;
pub const CIDR_OID: u32 = 650;
pub const CIDR_ARRAY_OID: u32 = 651;
pub const FLOAT4_OID: u32 = 700;
pub const FLOAT8_OID: u32 = 701;
pub const CIRCLE_OID: u32 = 718;
pub const CIRCLE_ARRAY_OID: u32 = 719;
pub const UNKNOWN_OID: u32 = 705;
pub const MACADDR_OID: u32 = 829;
pub const INET_OID: u32 = 869;
pub const BOOL_ARRAY_OID: u32 = 1000;
pub const BYTEA_ARRAY_OID: u32 = 1001;
pub const QCHAR_ARRAY_OID: u32 = 1002;
pub const NAME_ARRAY_OID: u32 = 1003;
pub const INT2_ARRAY_OID: u32 = 1005;
pub const INT4_ARRAY_OID: u32 = 1007;
pub const TEXT_ARRAY_OID: u32 = 1009;
pub const TID_ARRAY_OID: u32 = 1010;
pub const XID_ARRAY_OID: u32 = 1011;
pub const CID_ARRAY_OID: u32 = 1012;
pub const BPCHAR_ARRAY_OID: u32 = 1014;
pub const VARCHAR_ARRAY_OID: u32 = 1015;
pub const INT8_ARRAY_OID: u32 = 1016;
pub const POINT_ARRAY_OID: u32 = 1017;
pub const LSEG_ARRAY_OID: u32 = 1018;
pub const PATH_ARRAY_OID: u32 = 1019;
pub const BOX_ARRAY_OID: u32 = 1020;
pub const FLOAT4_ARRAY_OID: u32 = 1021;
pub const FLOAT8_ARRAY_OID: u32 = 1022;
pub const POLYGON_ARRAY_OID: u32 = 1027;
pub const OID_ARRAY_OID: u32 = 1028;
pub const ACLITEM_OID: u32 = 1033;
pub const ACLITEM_ARRAY_OID: u32 = 1034;
pub const MACADDR_ARRAY_OID: u32 = 1040;
pub const INET_ARRAY_OID: u32 = 1041;
pub const BPCHAR_OID: u32 = 1042;
pub const VARCHAR_OID: u32 = 1043;
pub const DATE_OID: u32 = 1082;
pub const TIME_OID: u32 = 1083;
pub const TIMESTAMP_OID: u32 = 1114;
pub const TIMESTAMP_ARRAY_OID: u32 = 1115;
pub const DATE_ARRAY_OID: u32 = 1182;
pub const TIME_ARRAY_OID: u32 = 1183;
pub const TIMESTAMPTZ_OID: u32 = 1184;
pub const TIMESTAMPTZ_ARRAY_OID: u32 = 1185;
pub const INTERVAL_OID: u32 = 1186;
pub const INTERVAL_ARRAY_OID: u32 = 1187;
pub const NUMERIC_ARRAY_OID: u32 = 1231;
pub const BIT_OID: u32 = 1560;
pub const BIT_ARRAY_OID: u32 = 1561;
pub const VARBIT_OID: u32 = 1562;
pub const VARBIT_ARRAY_OID: u32 = 1563;
pub const NUMERIC_OID: u32 = 1700;
pub const RECORD_OID: u32 = 2249;
pub const RECORD_ARRAY_OID: u32 = 2287;
pub const UUID_OID: u32 = 2950;
pub const UUID_ARRAY_OID: u32 = 2951;
pub const JSONB_OID: u32 = 3802;
pub const JSONB_ARRAY_OID: u32 = 3807;
pub const INT4RANGE_OID: u32 = 3904;
pub const INT4RANGE_ARRAY_OID: u32 = 3905;
pub const NUMRANGE_OID: u32 = 3906;
pub const NUMRANGE_ARRAY_OID: u32 = 3907;
pub const TSRANGE_OID: u32 = 3908;
pub const TSRANGE_ARRAY_OID: u32 = 3909;
pub const TSTZRANGE_OID: u32 = 3910;
pub const TSTZRANGE_ARRAY_OID: u32 = 3911;
pub const DATERANGE_OID: u32 = 3912;
pub const DATERANGE_ARRAY_OID: u32 = 3913;
pub const INT8RANGE_OID: u32 = 3926;
pub const INT8RANGE_ARRAY_OID: u32 = 3927;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert_eq!(Format::Text.code(), 0);
        assert_eq!(Format::Binary.code(), 1);
        assert_eq!(Format::from_code(0), Some(Format::Text));
        assert_eq!(Format::from_code(1), Some(Format::Binary));
        assert_eq!(Format::from_code(7), None);
    }

    #[test]
    fn test_format_default_is_text() {
        assert_eq!(Format::default(), Format::Text);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::Text.to_string(), "text");
        assert_eq!(Format::Binary.to_string(), "binary");
    }
}

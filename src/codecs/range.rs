// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Range codec, parameterized by element type.
//!
//! Binary format is a flags byte (empty, bound inclusivity, bound
//! infinity) followed by length-prefixed wire bytes for each finite
//! bound. Text format is `empty` or bracket syntax such as `[1,10)`.
//! An absent bound is infinite; ranges have no NULL bounds.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{RangeValue, Value};
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::{PgType, TypeRegistry};

const RANGE_EMPTY: u8 = 0x01;
const RANGE_LB_INC: u8 = 0x02;
const RANGE_UB_INC: u8 = 0x04;
const RANGE_LB_INF: u8 = 0x08;
const RANGE_UB_INF: u8 = 0x10;

pub struct RangeCodec {
    element: Arc<PgType>,
}

impl RangeCodec {
    pub fn new(element: Arc<PgType>) -> Self {
        RangeCodec { element }
    }
}

impl Codec for RangeCodec {
    fn format_supported(&self, format: Format) -> bool {
        self.element.codec.format_supported(format)
    }

    fn preferred_format(&self) -> Format {
        self.element.codec.preferred_format()
    }

    fn plan_encode(
        &self,
        registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        let range = match value {
            Value::Range(range) => range,
            _ => return None,
        };
        if let Some(bound) = range.lower.as_ref().or(range.upper.as_ref()) {
            registry.plan_encode(self.element.oid, format, bound)?;
        }
        Some(Box::new(RangeEncodePlan {
            element: Arc::clone(&self.element),
            format,
        }))
    }

    fn plan_scan(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>> {
        match target {
            Value::Range(_) => Some(Box::new(RangeScanPlan {
                element: Arc::clone(&self.element),
                format,
            })),
            _ => None,
        }
    }

    fn decode_value(
        &self,
        registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Value> {
        let raw = parse_range(format, src)?;
        let decode_bound = |bytes: &Option<Vec<u8>>| -> Result<Option<Value>> {
            match bytes {
                None => Ok(None),
                Some(bytes) => Ok(Some(self.element.codec.decode_value(
                    registry,
                    self.element.oid,
                    format,
                    bytes,
                )?)),
            }
        };
        Ok(Value::Range(Box::new(RangeValue {
            lower: decode_bound(&raw.lower)?,
            upper: decode_bound(&raw.upper)?,
            lower_inclusive: raw.lower_inclusive,
            upper_inclusive: raw.upper_inclusive,
            empty: raw.empty,
        })))
    }
}

struct RangeEncodePlan {
    element: Arc<PgType>,
    format: Format,
}

impl EncodePlan for RangeEncodePlan {
    fn encode(&self, registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let range = match value {
            Value::Range(range) => range,
            other => {
                return Err(ConversionError::encode(
                    "range",
                    format!("expected range value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => self.encode_binary(registry, range, buf),
            Format::Text => self.encode_text(registry, range, buf),
        }
    }
}

impl RangeEncodePlan {
    fn encode_bound(
        &self,
        registry: &TypeRegistry,
        format: Format,
        bound: &Value,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match registry.encode(self.element.oid, format, bound, &mut out)? {
            IsNull::Yes => Err(ConversionError::encode(
                "range",
                "range bounds cannot be NULL; use an infinite bound".to_string(),
            )),
            IsNull::No => Ok(out),
        }
    }

    fn encode_binary(
        &self,
        registry: &TypeRegistry,
        range: &RangeValue,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        if range.empty {
            buf.push(RANGE_EMPTY);
            return Ok(IsNull::No);
        }
        let mut flags = 0u8;
        if range.lower.is_none() {
            flags |= RANGE_LB_INF;
        } else if range.lower_inclusive {
            flags |= RANGE_LB_INC;
        }
        if range.upper.is_none() {
            flags |= RANGE_UB_INF;
        } else if range.upper_inclusive {
            flags |= RANGE_UB_INC;
        }
        buf.push(flags);
        if let Some(lower) = &range.lower {
            let bytes = self.encode_bound(registry, Format::Binary, lower)?;
            buf.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
            buf.extend_from_slice(&bytes);
        }
        if let Some(upper) = &range.upper {
            let bytes = self.encode_bound(registry, Format::Binary, upper)?;
            buf.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
            buf.extend_from_slice(&bytes);
        }
        Ok(IsNull::No)
    }

    fn encode_text(
        &self,
        registry: &TypeRegistry,
        range: &RangeValue,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        if range.empty {
            buf.extend_from_slice(b"empty");
            return Ok(IsNull::No);
        }
        buf.push(if range.lower.is_some() && range.lower_inclusive {
            b'['
        } else {
            b'('
        });
        if let Some(lower) = &range.lower {
            let bytes = self.encode_bound(registry, Format::Text, lower)?;
            write_quoted_bound(&bytes, buf);
        }
        buf.push(b',');
        if let Some(upper) = &range.upper {
            let bytes = self.encode_bound(registry, Format::Text, upper)?;
            write_quoted_bound(&bytes, buf);
        }
        buf.push(if range.upper.is_some() && range.upper_inclusive {
            b']'
        } else {
            b')'
        });
        Ok(IsNull::No)
    }
}

fn write_quoted_bound(rendered: &[u8], out: &mut Vec<u8>) {
    let needs_quotes = rendered.is_empty()
        || rendered.iter().any(|&b| {
            matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b'"' | b'\\')
                || b.is_ascii_whitespace()
        });
    if !needs_quotes {
        out.extend_from_slice(rendered);
        return;
    }
    out.push(b'"');
    for &b in rendered {
        if b == b'"' || b == b'\\' {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b'"');
}

struct RangeScanPlan {
    element: Arc<PgType>,
    format: Format,
}

impl ScanPlan for RangeScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let exemplar = match dst {
            Value::Range(range) => range.lower.clone().or_else(|| range.upper.clone()),
            other => {
                return Err(ConversionError::decode(
                    "range",
                    format!("expected range destination, got {:?}", other.shape()),
                ))
            }
        };
        let raw = parse_range(self.format, src)?;
        let mut scan_bound = |bytes: &Option<Vec<u8>>| -> Result<Option<Value>> {
            match bytes {
                None => Ok(None),
                Some(bytes) => match &exemplar {
                    Some(exemplar) => {
                        let mut bound = exemplar.shape().zero_value();
                        registry.scan(
                            self.element.oid,
                            self.format,
                            Some(bytes),
                            &mut bound,
                        )?;
                        Ok(Some(bound))
                    }
                    None => Ok(Some(self.element.codec.decode_value(
                        registry,
                        self.element.oid,
                        self.format,
                        bytes,
                    )?)),
                },
            }
        };
        let lower = scan_bound(&raw.lower)?;
        let upper = scan_bound(&raw.upper)?;
        *dst = Value::Range(Box::new(RangeValue {
            lower,
            upper,
            lower_inclusive: raw.lower_inclusive,
            upper_inclusive: raw.upper_inclusive,
            empty: raw.empty,
        }));
        Ok(())
    }
}

/// A parsed range with bounds still in wire form.
struct RawRange {
    lower: Option<Vec<u8>>,
    upper: Option<Vec<u8>>,
    lower_inclusive: bool,
    upper_inclusive: bool,
    empty: bool,
}

fn parse_range(format: Format, src: &[u8]) -> Result<RawRange> {
    match format {
        Format::Binary => parse_binary_range(src),
        Format::Text => parse_text_range(as_text("range", src)?),
    }
}

fn parse_binary_range(src: &[u8]) -> Result<RawRange> {
    let short = || ConversionError::decode("range", "truncated payload".to_string());
    let (&flags, mut rest) = src.split_first().ok_or_else(short)?;

    if flags & RANGE_EMPTY != 0 {
        return Ok(RawRange {
            lower: None,
            upper: None,
            lower_inclusive: false,
            upper_inclusive: false,
            empty: true,
        });
    }

    let mut read_bound = |present: bool| -> Result<Option<Vec<u8>>> {
        if !present {
            return Ok(None);
        }
        if rest.len() < 4 {
            return Err(short());
        }
        let len = BigEndian::read_i32(&rest[0..4]);
        rest = &rest[4..];
        if len < 0 {
            return Err(ConversionError::decode(
                "range",
                "negative bound length".to_string(),
            ));
        }
        let len = len as usize;
        if rest.len() < len {
            return Err(short());
        }
        let bytes = rest[..len].to_vec();
        rest = &rest[len..];
        Ok(Some(bytes))
    };

    let lower = read_bound(flags & RANGE_LB_INF == 0)?;
    let upper = read_bound(flags & RANGE_UB_INF == 0)?;
    Ok(RawRange {
        lower,
        upper,
        lower_inclusive: flags & RANGE_LB_INC != 0,
        upper_inclusive: flags & RANGE_UB_INC != 0,
        empty: false,
    })
}

fn parse_text_range(text: &str) -> Result<RawRange> {
    let bad = |message: &str| ConversionError::decode("range", format!("{}: {:?}", message, text));
    if text.eq_ignore_ascii_case("empty") {
        return Ok(RawRange {
            lower: None,
            upper: None,
            lower_inclusive: false,
            upper_inclusive: false,
            empty: true,
        });
    }

    let bytes = text.as_bytes();
    let lower_inclusive = match bytes.first() {
        Some(b'[') => true,
        Some(b'(') => false,
        _ => return Err(bad("expected '[' or '('")),
    };
    let upper_inclusive = match bytes.last() {
        Some(b']') => true,
        Some(b')') => false,
        _ => return Err(bad("expected ']' or ')'")),
    };

    let mut pos = 1;
    let end = bytes.len() - 1;
    let mut parse_bound = |pos: &mut usize| -> Result<Option<Vec<u8>>> {
        if *pos >= end {
            return Err(bad("missing bound"));
        }
        if bytes[*pos] == b',' || *pos == end {
            return Ok(None);
        }
        if bytes[*pos] == b'"' {
            *pos += 1;
            let mut out = Vec::new();
            loop {
                if *pos >= end {
                    return Err(bad("unterminated quoted bound"));
                }
                match bytes[*pos] {
                    b'"' => {
                        *pos += 1;
                        return Ok(Some(out));
                    }
                    b'\\' => {
                        *pos += 1;
                        if *pos >= end {
                            return Err(bad("dangling escape"));
                        }
                        out.push(bytes[*pos]);
                        *pos += 1;
                    }
                    b => {
                        out.push(b);
                        *pos += 1;
                    }
                }
            }
        }
        let start = *pos;
        while *pos < end && bytes[*pos] != b',' {
            *pos += 1;
        }
        Ok(Some(bytes[start..*pos].to_vec()))
    };

    let lower = parse_bound(&mut pos)?;
    if pos >= end || bytes[pos] != b',' {
        return Err(bad("expected ','"));
    }
    pos += 1;
    let upper = if pos == end {
        None
    } else {
        parse_bound(&mut pos)?
    };
    if pos != end {
        return Err(bad("trailing characters"));
    }

    // An infinite bound is never inclusive.
    let lower_inclusive = lower_inclusive && lower.is_some();
    let upper_inclusive = upper_inclusive && upper.is_some();
    Ok(RawRange {
        lower,
        upper,
        lower_inclusive,
        upper_inclusive,
        empty: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_bounded() {
        let raw = parse_text_range("[1,10)").unwrap();
        assert_eq!(raw.lower.as_deref(), Some(&b"1"[..]));
        assert_eq!(raw.upper.as_deref(), Some(&b"10"[..]));
        assert!(raw.lower_inclusive);
        assert!(!raw.upper_inclusive);
        assert!(!raw.empty);
    }

    #[test]
    fn test_parse_text_infinite_bounds() {
        let raw = parse_text_range("(,5]").unwrap();
        assert_eq!(raw.lower, None);
        assert!(!raw.lower_inclusive);
        assert_eq!(raw.upper.as_deref(), Some(&b"5"[..]));
        assert!(raw.upper_inclusive);

        let raw = parse_text_range("[3,)").unwrap();
        assert_eq!(raw.upper, None);
    }

    #[test]
    fn test_parse_text_empty() {
        assert!(parse_text_range("empty").unwrap().empty);
    }

    #[test]
    fn test_parse_text_quoted_bound() {
        let raw = parse_text_range(r#"["a,b","c\"d"]"#).unwrap();
        assert_eq!(raw.lower.as_deref(), Some(&b"a,b"[..]));
        assert_eq!(raw.upper.as_deref(), Some(&b"c\"d"[..]));
    }

    #[test]
    fn test_binary_flags() {
        let raw = parse_binary_range(&[RANGE_EMPTY]).unwrap();
        assert!(raw.empty);

        let mut src = vec![RANGE_LB_INC | RANGE_UB_INF];
        src.extend_from_slice(&4i32.to_be_bytes());
        src.extend_from_slice(&7i32.to_be_bytes());
        let raw = parse_binary_range(&src).unwrap();
        assert!(raw.lower_inclusive);
        assert_eq!(raw.lower.as_deref(), Some(&7i32.to_be_bytes()[..]));
        assert_eq!(raw.upper, None);
    }

    #[test]
    fn test_binary_truncated() {
        assert!(parse_binary_range(&[]).is_err());
        assert!(parse_binary_range(&[RANGE_LB_INC, 0, 0]).is_err());
    }
}

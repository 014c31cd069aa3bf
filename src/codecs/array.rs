// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Array codec, parameterized by element type.
//!
//! Binary format: dimension count, has-nulls flag, element OID, then per
//! dimension a length and lower bound (always 1 here), then per element
//! a length (-1 for NULL) and the element's wire bytes in the same
//! format as the array. Text format is the brace syntax with double
//! quotes and backslash escapes. Elements are converted through the
//! registry, so every element-level adapter applies inside arrays too.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{FlatArrayValue, Shape, Value};
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::{PgType, TypeRegistry};
use crate::encoding::scan::unflatten;

pub struct ArrayCodec {
    element: Arc<PgType>,
}

impl ArrayCodec {
    pub fn new(element: Arc<PgType>) -> Self {
        ArrayCodec { element }
    }
}

impl Codec for ArrayCodec {
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
        let flat = match value {
            Value::FlatArray(flat) => flat,
            _ => return None,
        };
        // Prove a non-null element can be encoded before committing to
        // the whole array.
        if let Some(sample) = flat.elements.iter().find(|e| !e.is_null()) {
            registry.plan_encode(self.element.oid, format, sample)?;
        }
        Some(Box::new(ArrayEncodePlan {
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
            Value::FlatArray(_) => Some(Box::new(ArrayScanPlan {
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
        let (dims, items) = parse_array(format, src)?;
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            elements.push(match item {
                None => Value::Null,
                Some(bytes) => {
                    self.element
                        .codec
                        .decode_value(registry, self.element.oid, format, &bytes)?
                }
            });
        }
        unflatten(&dims, &elements)
    }
}

struct ArrayEncodePlan {
    element: Arc<PgType>,
    format: Format,
}

impl EncodePlan for ArrayEncodePlan {
    fn encode(&self, registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let flat = match value {
            Value::FlatArray(flat) => flat,
            other => {
                return Err(ConversionError::encode(
                    "array",
                    format!("expected flat array value, got {:?}", other.shape()),
                ))
            }
        };
        let expected: i64 = flat.dims.iter().map(|&d| d as i64).product();
        if expected != flat.elements.len() as i64 {
            return Err(ConversionError::encode(
                "array",
                format!(
                    "dimensions {:?} describe {} elements, got {}",
                    flat.dims,
                    expected,
                    flat.elements.len()
                ),
            ));
        }
        match self.format {
            Format::Binary => self.encode_binary(registry, flat, buf),
            Format::Text => self.encode_text(registry, flat, buf),
        }
    }
}

impl ArrayEncodePlan {
    fn encode_binary(
        &self,
        registry: &TypeRegistry,
        flat: &FlatArrayValue,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        if flat.elements.is_empty() {
            buf.extend_from_slice(&0i32.to_be_bytes());
            buf.extend_from_slice(&0i32.to_be_bytes());
            buf.extend_from_slice(&self.element.oid.to_be_bytes());
            return Ok(IsNull::No);
        }

        let has_nulls = flat.elements.iter().any(element_is_null);
        buf.extend_from_slice(&(flat.dims.len() as i32).to_be_bytes());
        buf.extend_from_slice(&(has_nulls as i32).to_be_bytes());
        buf.extend_from_slice(&self.element.oid.to_be_bytes());
        for &dim in &flat.dims {
            buf.extend_from_slice(&dim.to_be_bytes());
            buf.extend_from_slice(&1i32.to_be_bytes());
        }

        let mut elem_buf = Vec::new();
        for element in &flat.elements {
            elem_buf.clear();
            match registry.encode(self.element.oid, Format::Binary, element, &mut elem_buf)? {
                IsNull::Yes => buf.extend_from_slice(&(-1i32).to_be_bytes()),
                IsNull::No => {
                    buf.extend_from_slice(&(elem_buf.len() as i32).to_be_bytes());
                    buf.extend_from_slice(&elem_buf);
                }
            }
        }
        Ok(IsNull::No)
    }

    fn encode_text(
        &self,
        registry: &TypeRegistry,
        flat: &FlatArrayValue,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        let mut index = 0;
        self.write_text_level(registry, &flat.dims, &flat.elements, &mut index, buf)?;
        Ok(IsNull::No)
    }

    fn write_text_level(
        &self,
        registry: &TypeRegistry,
        dims: &[i32],
        elements: &[Value],
        index: &mut usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        out.push(b'{');
        let len = dims.first().copied().unwrap_or(0);
        for i in 0..len {
            if i > 0 {
                out.push(b',');
            }
            if dims.len() > 1 {
                self.write_text_level(registry, &dims[1..], elements, index, out)?;
            } else {
                let element = &elements[*index];
                *index += 1;
                let mut elem_buf = Vec::new();
                match registry.encode(self.element.oid, Format::Text, element, &mut elem_buf)? {
                    IsNull::Yes => out.extend_from_slice(b"NULL"),
                    IsNull::No => write_quoted_element(&elem_buf, out),
                }
            }
        }
        out.push(b'}');
        Ok(())
    }
}

fn element_is_null(element: &Value) -> bool {
    match element {
        Value::Null => true,
        Value::Optional(opt) => opt.value.is_none(),
        _ => false,
    }
}

fn write_quoted_element(rendered: &[u8], out: &mut Vec<u8>) {
    let needs_quotes = rendered.is_empty()
        || rendered.eq_ignore_ascii_case(b"null")
        || rendered
            .iter()
            .any(|&b| matches!(b, b'{' | b'}' | b',' | b'"' | b'\\') || b.is_ascii_whitespace());
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

struct ArrayScanPlan {
    element: Arc<PgType>,
    format: Format,
}

impl ScanPlan for ArrayScanPlan {
    fn scan(&self, registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        let flat = match dst {
            Value::FlatArray(flat) => flat,
            other => {
                return Err(ConversionError::decode(
                    "array",
                    format!("expected flat array destination, got {:?}", other.shape()),
                ))
            }
        };
        let (dims, items) = parse_array(self.format, src)?;
        let elem = flat.elem.clone();
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            if elem == Shape::Null {
                // Untyped destination: elements decode to their codec's
                // canonical value.
                elements.push(match item {
                    None => Value::Null,
                    Some(bytes) => self.element.codec.decode_value(
                        registry,
                        self.element.oid,
                        self.format,
                        &bytes,
                    )?,
                });
            } else {
                let mut element = elem.zero_value();
                registry.scan(self.element.oid, self.format, item.as_deref(), &mut element)?;
                elements.push(element);
            }
        }
        *flat = FlatArrayValue {
            dims,
            elem,
            elements,
        };
        Ok(())
    }
}

type ArrayItems = (Vec<i32>, Vec<Option<Vec<u8>>>);

fn parse_array(format: Format, src: &[u8]) -> Result<ArrayItems> {
    match format {
        Format::Binary => parse_binary_array(src),
        Format::Text => parse_text_array(as_text("array", src)?),
    }
}

fn parse_binary_array(src: &[u8]) -> Result<ArrayItems> {
    let short = || ConversionError::decode("array", "truncated payload".to_string());
    if src.len() < 12 {
        return Err(short());
    }
    let ndims = BigEndian::read_i32(&src[0..4]);
    let elem_count_limit = src.len(); // an element needs at least its length word
    let mut pos = 12;

    if ndims == 0 {
        return Ok((vec![0], Vec::new()));
    }
    if !(1..=32).contains(&ndims) {
        return Err(ConversionError::decode(
            "array",
            format!("invalid dimension count {}", ndims),
        ));
    }

    let mut dims = Vec::with_capacity(ndims as usize);
    let mut total: i64 = 1;
    for _ in 0..ndims {
        if src.len() < pos + 8 {
            return Err(short());
        }
        let len = BigEndian::read_i32(&src[pos..pos + 4]);
        if len < 0 {
            return Err(ConversionError::decode(
                "array",
                format!("negative dimension length {}", len),
            ));
        }
        dims.push(len);
        total = total.checked_mul(len as i64).ok_or_else(|| {
            ConversionError::decode("array", "dimensions larger than payload".to_string())
        })?;
        pos += 8;
    }
    if total > elem_count_limit as i64 {
        return Err(ConversionError::decode(
            "array",
            "dimensions larger than payload".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(total as usize);
    for _ in 0..total {
        if src.len() < pos + 4 {
            return Err(short());
        }
        let len = BigEndian::read_i32(&src[pos..pos + 4]);
        pos += 4;
        if len < 0 {
            items.push(None);
            continue;
        }
        let len = len as usize;
        if src.len() < pos + len {
            return Err(short());
        }
        items.push(Some(src[pos..pos + len].to_vec()));
        pos += len;
    }
    Ok((dims, items))
}

fn parse_text_array(text: &str) -> Result<ArrayItems> {
    let mut parser = TextArrayParser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    let tree = parser.parse_list()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters"));
    }

    let mut dims = Vec::new();
    measure(&tree, 0, &mut dims)?;
    let mut items = Vec::new();
    flatten(&tree, &mut items);
    if dims.is_empty() {
        dims.push(0);
    }
    Ok((dims, items))
}

enum TextItem {
    Leaf(Option<Vec<u8>>),
    List(Vec<TextItem>),
}

fn measure(item: &TextItem, depth: usize, dims: &mut Vec<i32>) -> Result<()> {
    if let TextItem::List(children) = item {
        if depth == dims.len() {
            dims.push(children.len() as i32);
        } else if dims[depth] != children.len() as i32 {
            return Err(ConversionError::decode(
                "array",
                "ragged dimensions".to_string(),
            ));
        }
        for child in children {
            measure(child, depth + 1, dims)?;
        }
    }
    Ok(())
}

fn flatten(item: &TextItem, items: &mut Vec<Option<Vec<u8>>>) {
    match item {
        TextItem::Leaf(bytes) => items.push(bytes.clone()),
        TextItem::List(children) => {
            for child in children {
                flatten(child, items);
            }
        }
    }
}

struct TextArrayParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl TextArrayParser<'_> {
    fn error(&self, message: &str) -> ConversionError {
        ConversionError::decode("array", format!("{} at byte {}", message, self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_list(&mut self) -> Result<TextItem> {
        self.skip_whitespace();
        if self.peek() != Some(b'{') {
            return Err(self.error("expected '{'"));
        }
        self.pos += 1;
        let mut children = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(TextItem::List(children));
        }
        loop {
            self.skip_whitespace();
            children.push(match self.peek() {
                Some(b'{') => self.parse_list()?,
                Some(b'"') => TextItem::Leaf(Some(self.parse_quoted()?)),
                Some(_) => self.parse_unquoted()?,
                None => return Err(self.error("unterminated array")),
            });
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(TextItem::List(children));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<Vec<u8>> {
        self.pos += 1; // opening quote
        let mut out = Vec::new();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.error("dangling escape"))?;
                    out.push(escaped);
                    self.pos += 1;
                }
                Some(b) => {
                    out.push(b);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated quoted element")),
            }
        }
    }

    fn parse_unquoted(&mut self) -> Result<TextItem> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b != b',' && b != b'}' && b != b'{')
        {
            self.pos += 1;
        }
        let raw = &self.bytes[start..self.pos];
        if raw.is_empty() {
            return Err(self.error("empty unquoted element"));
        }
        if raw.eq_ignore_ascii_case(b"null") {
            Ok(TextItem::Leaf(None))
        } else {
            Ok(TextItem::Leaf(Some(raw.to_vec())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_flat() {
        let (dims, items) = parse_text_array("{1,2,NULL,four}").unwrap();
        assert_eq!(dims, vec![4]);
        assert_eq!(items[0].as_deref(), Some(&b"1"[..]));
        assert_eq!(items[2], None);
        assert_eq!(items[3].as_deref(), Some(&b"four"[..]));
    }

    #[test]
    fn test_parse_text_quoted_escapes() {
        let (_, items) = parse_text_array(r#"{"a,b","c\"d","NULL"}"#).unwrap();
        assert_eq!(items[0].as_deref(), Some(&b"a,b"[..]));
        assert_eq!(items[1].as_deref(), Some(&b"c\"d"[..]));
        // A quoted NULL is the literal string, not SQL NULL.
        assert_eq!(items[2].as_deref(), Some(&b"NULL"[..]));
    }

    #[test]
    fn test_parse_text_multi_dim() {
        let (dims, items) = parse_text_array("{{1,2,3},{4,5,6}}").unwrap();
        assert_eq!(dims, vec![2, 3]);
        assert_eq!(items.len(), 6);
    }

    #[test]
    fn test_parse_text_ragged_rejected() {
        assert!(parse_text_array("{{1,2},{3}}").is_err());
    }

    #[test]
    fn test_parse_text_empty() {
        let (dims, items) = parse_text_array("{}").unwrap();
        assert_eq!(dims, vec![0]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_binary_empty() {
        let mut src = Vec::new();
        src.extend_from_slice(&0i32.to_be_bytes());
        src.extend_from_slice(&0i32.to_be_bytes());
        src.extend_from_slice(&23u32.to_be_bytes());
        let (dims, items) = parse_binary_array(&src).unwrap();
        assert_eq!(dims, vec![0]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_binary_truncated() {
        assert!(parse_binary_array(&[0, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_parse_binary_dimension_product_overflow() {
        // Five dimensions of i32::MAX overflow the element-count product.
        let mut src = Vec::new();
        src.extend_from_slice(&5i32.to_be_bytes());
        src.extend_from_slice(&0i32.to_be_bytes());
        src.extend_from_slice(&23u32.to_be_bytes());
        for _ in 0..5 {
            src.extend_from_slice(&i32::MAX.to_be_bytes());
            src.extend_from_slice(&1i32.to_be_bytes());
        }
        let err = parse_binary_array(&src).unwrap_err();
        assert!(matches!(err, ConversionError::Decode { .. }));
    }

    #[test]
    fn test_quoting_rules() {
        let mut out = Vec::new();
        write_quoted_element(b"plain", &mut out);
        assert_eq!(out, b"plain");

        out.clear();
        write_quoted_element(b"has space", &mut out);
        assert_eq!(out, b"\"has space\"");

        out.clear();
        write_quoted_element(b"", &mut out);
        assert_eq!(out, b"\"\"");

        out.clear();
        write_quoted_element(b"NULL", &mut out);
        assert_eq!(out, b"\"NULL\"");

        out.clear();
        write_quoted_element(b"a\"b\\c", &mut out);
        assert_eq!(out, b"\"a\\\"b\\\\c\"");
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `numeric` codec.
//!
//! The native value is a validated decimal string, so arbitrary
//! precision survives conversion without a big-number dependency. Binary
//! format is the PostgreSQL base-10000 representation: digit-group
//! count, weight of the first group, sign word (`0x0000` positive,
//! `0x4000` negative, `0xC000` NaN), display scale, then the groups as
//! big-endian `u16`s.

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::Value;
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

const SIGN_POSITIVE: u16 = 0x0000;
const SIGN_NEGATIVE: u16 = 0x4000;
const SIGN_NAN: u16 = 0xC000;

pub struct NumericCodec;

impl Codec for NumericCodec {
    fn format_supported(&self, _format: Format) -> bool {
        true
    }

    fn preferred_format(&self) -> Format {
        Format::Binary
    }

    fn plan_encode(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        match value {
            Value::Numeric(_) | Value::Int64(_) => Some(Box::new(NumericEncodePlan { format })),
            _ => None,
        }
    }

    fn plan_scan(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        target: &Value,
    ) -> Option<Box<dyn ScanPlan>> {
        match target {
            Value::Numeric(_) => Some(Box::new(NumericScanPlan { format })),
            _ => None,
        }
    }

    fn decode_value(
        &self,
        _registry: &TypeRegistry,
        _oid: u32,
        format: Format,
        src: &[u8],
    ) -> Result<Value> {
        Ok(Value::Numeric(decode_numeric(format, src)?))
    }
}

struct NumericEncodePlan {
    format: Format,
}

impl EncodePlan for NumericEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let text;
        let s = match value {
            Value::Numeric(s) => s.as_str(),
            Value::Int64(v) => {
                text = v.to_string();
                text.as_str()
            }
            other => {
                return Err(ConversionError::encode(
                    "numeric",
                    format!("expected numeric value, got {:?}", other.shape()),
                ))
            }
        };
        let parsed = parse_decimal(s)
            .ok_or_else(|| ConversionError::encode("numeric", format!("invalid number {:?}", s)))?;
        match self.format {
            Format::Binary => encode_binary(&parsed, buf),
            Format::Text => buf.extend_from_slice(s.as_bytes()),
        }
        Ok(IsNull::No)
    }
}

struct NumericScanPlan {
    format: Format,
}

impl ScanPlan for NumericScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Numeric(decode_numeric(self.format, src)?);
        Ok(())
    }
}

fn decode_numeric(format: Format, src: &[u8]) -> Result<String> {
    match format {
        Format::Binary => decode_binary(src),
        Format::Text => {
            let text = as_text("numeric", src)?;
            if parse_decimal(text).is_none() {
                return Err(ConversionError::decode(
                    "numeric",
                    format!("invalid number {:?}", text),
                ));
            }
            Ok(text.to_string())
        }
    }
}

/// A plain decimal split into its parts. `int_digits` has no leading
/// zeros; `frac_digits` keeps trailing zeros, which carry display scale.
struct Decimal {
    nan: bool,
    negative: bool,
    int_digits: String,
    frac_digits: String,
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.eq_ignore_ascii_case("nan") {
        return Some(Decimal {
            nan: true,
            negative: false,
            int_digits: String::new(),
            frac_digits: String::new(),
        });
    }

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    Some(Decimal {
        nan: false,
        negative,
        int_digits: int_part.trim_start_matches('0').to_string(),
        frac_digits: frac_part.to_string(),
    })
}

fn encode_binary(decimal: &Decimal, buf: &mut Vec<u8>) {
    if decimal.nan {
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&SIGN_NAN.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        return;
    }

    let dscale = decimal.frac_digits.len() as i16;

    // Align the digits to base-10000 groups: pad the integer part on the
    // left and the fraction on the right to multiples of four.
    let int_pad = (4 - decimal.int_digits.len() % 4) % 4;
    let frac_pad = (4 - decimal.frac_digits.len() % 4) % 4;
    let mut digits = String::with_capacity(
        int_pad + decimal.int_digits.len() + decimal.frac_digits.len() + frac_pad,
    );
    digits.extend(std::iter::repeat('0').take(int_pad));
    digits.push_str(&decimal.int_digits);
    digits.push_str(&decimal.frac_digits);
    digits.extend(std::iter::repeat('0').take(frac_pad));

    let mut groups: Vec<u16> = digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u16, |acc, b| acc * 10 + (b - b'0') as u16)
        })
        .collect();

    let mut weight = ((int_pad + decimal.int_digits.len()) / 4) as i16 - 1;
    while groups.first() == Some(&0) {
        groups.remove(0);
        weight -= 1;
    }
    while groups.last() == Some(&0) {
        groups.pop();
    }
    if groups.is_empty() {
        weight = 0;
    }

    buf.extend_from_slice(&(groups.len() as i16).to_be_bytes());
    buf.extend_from_slice(&weight.to_be_bytes());
    let sign = if decimal.negative {
        SIGN_NEGATIVE
    } else {
        SIGN_POSITIVE
    };
    buf.extend_from_slice(&sign.to_be_bytes());
    buf.extend_from_slice(&dscale.to_be_bytes());
    for group in groups {
        buf.extend_from_slice(&group.to_be_bytes());
    }
}

fn decode_binary(src: &[u8]) -> Result<String> {
    if src.len() < 8 {
        return Err(ConversionError::decode(
            "numeric",
            format!("expected at least 8 bytes, got {}", src.len()),
        ));
    }
    let ndigits = BigEndian::read_i16(&src[0..2]);
    let weight = BigEndian::read_i16(&src[2..4]);
    let sign = BigEndian::read_u16(&src[4..6]);
    let dscale = BigEndian::read_i16(&src[6..8]);

    if sign == SIGN_NAN {
        return Ok("NaN".to_string());
    }
    if sign != SIGN_POSITIVE && sign != SIGN_NEGATIVE {
        return Err(ConversionError::decode(
            "numeric",
            format!("invalid sign word {:#06x}", sign),
        ));
    }
    if ndigits < 0 || dscale < 0 || src.len() != 8 + ndigits as usize * 2 {
        return Err(ConversionError::decode(
            "numeric",
            "digit count does not match payload length".to_string(),
        ));
    }

    let groups: Vec<u16> = (0..ndigits as usize)
        .map(|i| BigEndian::read_u16(&src[8 + i * 2..10 + i * 2]))
        .collect();
    if groups.iter().any(|&g| g > 9999) {
        return Err(ConversionError::decode(
            "numeric",
            "digit group exceeds 9999".to_string(),
        ));
    }

    let mut out = String::new();
    if sign == SIGN_NEGATIVE {
        out.push('-');
    }

    if weight >= 0 {
        for i in 0..=weight as usize {
            let group = groups.get(i).copied().unwrap_or(0);
            if i == 0 {
                out.push_str(&group.to_string());
            } else {
                out.push_str(&format!("{:04}", group));
            }
        }
    } else {
        out.push('0');
    }

    if dscale > 0 {
        let mut frac = String::new();
        if weight < 0 {
            frac.push_str(&"0000".repeat((-(weight as i32) - 1) as usize));
        }
        let first_frac_group = if weight >= 0 { weight as usize + 1 } else { 0 };
        for group in groups.iter().skip(first_frac_group) {
            frac.push_str(&format!("{:04}", group));
        }
        frac.truncate(dscale as usize);
        while frac.len() < dscale as usize {
            frac.push('0');
        }
        out.push('.');
        out.push_str(&frac);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(s: &str) -> String {
        let mut buf = Vec::new();
        encode_binary(&parse_decimal(s).unwrap(), &mut buf);
        decode_binary(&buf).unwrap()
    }

    #[test]
    fn test_binary_round_trip() {
        for s in [
            "0",
            "1",
            "-1",
            "12345",
            "10000",
            "9999",
            "1234567890.0987654321",
            "-0.00001",
            "0.5",
            "123.450",
        ] {
            assert_eq!(round_trip(s), normalize(s), "{}", s);
        }
    }

    // Leading '+' and redundant leading zeros do not survive the wire.
    fn normalize(s: &str) -> String {
        let d = parse_decimal(s).unwrap();
        let int = if d.int_digits.is_empty() {
            "0"
        } else {
            &d.int_digits
        };
        let mut out = String::new();
        if d.negative {
            out.push('-');
        }
        out.push_str(int);
        if !d.frac_digits.is_empty() {
            out.push('.');
            out.push_str(&d.frac_digits);
        }
        out
    }

    #[test]
    fn test_nan() {
        assert_eq!(round_trip("NaN"), "NaN");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_decimal("").is_none());
        assert!(parse_decimal("1.2.3").is_none());
        assert!(parse_decimal("12a").is_none());
        assert!(parse_decimal(".").is_none());
        assert!(parse_decimal("-").is_none());
    }

    #[test]
    fn test_parse_accepts_bare_fraction() {
        assert!(parse_decimal(".5").is_some());
        assert!(parse_decimal("5.").is_some());
    }

    #[test]
    fn test_decode_rejects_truncated() {
        assert!(decode_binary(&[0, 2, 0, 0, 0, 0, 0, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_weight_spans_missing_trailing_groups() {
        // 10000 = one group of 1 with weight 1.
        let mut buf = Vec::new();
        encode_binary(&parse_decimal("10000").unwrap(), &mut buf);
        assert_eq!(BigEndian::read_i16(&buf[0..2]), 1);
        assert_eq!(BigEndian::read_i16(&buf[2..4]), 1);
    }
}

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `interval` codec.
//!
//! Binary format is microseconds (`i64`), days (`i32`) and months
//! (`i32`), all big-endian. The three components are kept separate
//! because days and months have no fixed length in calendar arithmetic.
//! Text format follows the `postgres` interval output style, e.g.
//! `1 year 2 mons 3 days 04:05:06.5`.

use byteorder::{BigEndian, ByteOrder};

use crate::codecs::{as_text, expect_len};
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{Interval, Value};
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

pub struct IntervalCodec;

impl Codec for IntervalCodec {
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
            Value::Interval(_) => Some(Box::new(IntervalEncodePlan { format })),
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
            Value::Interval(_) => Some(Box::new(IntervalScanPlan { format })),
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
        Ok(Value::Interval(decode_interval(format, src)?))
    }
}

struct IntervalEncodePlan {
    format: Format,
}

impl EncodePlan for IntervalEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let interval = match value {
            Value::Interval(interval) => interval,
            other => {
                return Err(ConversionError::encode(
                    "interval",
                    format!("expected interval value, got {:?}", other.shape()),
                ))
            }
        };
        match self.format {
            Format::Binary => {
                buf.extend_from_slice(&interval.micros.to_be_bytes());
                buf.extend_from_slice(&interval.days.to_be_bytes());
                buf.extend_from_slice(&interval.months.to_be_bytes());
            }
            Format::Text => buf.extend_from_slice(render_interval(interval).as_bytes()),
        }
        Ok(IsNull::No)
    }
}

struct IntervalScanPlan {
    format: Format,
}

impl ScanPlan for IntervalScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Interval(decode_interval(self.format, src)?);
        Ok(())
    }
}

fn decode_interval(format: Format, src: &[u8]) -> Result<Interval> {
    match format {
        Format::Binary => {
            expect_len("interval", src, 16)?;
            Ok(Interval {
                micros: BigEndian::read_i64(&src[0..8]),
                days: BigEndian::read_i32(&src[8..12]),
                months: BigEndian::read_i32(&src[12..16]),
            })
        }
        Format::Text => parse_interval(as_text("interval", src)?),
    }
}

fn render_interval(interval: &Interval) -> String {
    let mut parts: Vec<String> = Vec::new();
    let years = interval.months / 12;
    let months = interval.months % 12;
    if years != 0 {
        parts.push(format!("{} year{}", years, if years.abs() == 1 { "" } else { "s" }));
    }
    if months != 0 {
        parts.push(format!("{} mon{}", months, if months.abs() == 1 { "" } else { "s" }));
    }
    if interval.days != 0 {
        parts.push(format!(
            "{} day{}",
            interval.days,
            if interval.days.abs() == 1 { "" } else { "s" }
        ));
    }
    if interval.micros != 0 || parts.is_empty() {
        let sign = if interval.micros < 0 { "-" } else { "" };
        let abs = interval.micros.unsigned_abs();
        let hours = abs / 3_600_000_000;
        let minutes = abs % 3_600_000_000 / 60_000_000;
        let seconds = abs % 60_000_000 / 1_000_000;
        let frac = abs % 1_000_000;
        let mut time = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
        if frac != 0 {
            let digits = format!("{:06}", frac);
            time.push('.');
            time.push_str(digits.trim_end_matches('0'));
        }
        parts.push(time);
    }
    parts.join(" ")
}

fn parse_interval(text: &str) -> Result<Interval> {
    let bad = || ConversionError::decode("interval", format!("invalid interval {:?}", text));
    let mut interval = Interval::default();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(bad());
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.contains(':') {
            if i + 1 != tokens.len() {
                return Err(bad());
            }
            interval.micros = parse_time_micros(token).ok_or_else(bad)?;
            break;
        }
        let n: i64 = token.parse().map_err(|_| bad())?;
        let unit = *tokens.get(i + 1).ok_or_else(bad)?;
        match unit {
            "year" | "years" => {
                interval.months = add_i32(interval.months, n.checked_mul(12).ok_or_else(bad)?)
                    .ok_or_else(bad)?
            }
            "mon" | "mons" | "month" | "months" => {
                interval.months = add_i32(interval.months, n).ok_or_else(bad)?
            }
            "day" | "days" => interval.days = add_i32(interval.days, n).ok_or_else(bad)?,
            _ => return Err(bad()),
        }
        i += 2;
    }
    Ok(interval)
}

fn add_i32(acc: i32, n: i64) -> Option<i32> {
    i32::try_from((acc as i64).checked_add(n)?).ok()
}

fn parse_time_micros(token: &str) -> Option<i64> {
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let mut fields = rest.splitn(3, ':');
    let hours: i64 = fields.next()?.parse().ok()?;
    let minutes: i64 = fields.next()?.parse().ok()?;
    let seconds_field = fields.next()?;
    let (secs_str, frac_str) = match seconds_field.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (seconds_field, None),
    };
    let seconds: i64 = secs_str.parse().ok()?;
    let mut micros = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?
        .checked_mul(1_000_000)?;
    if let Some(frac) = frac_str {
        if frac.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let scale = 10i64.pow(6 - frac.len() as u32);
        micros = micros.checked_add(frac.parse::<i64>().ok()? * scale)?;
    }
    Some(if negative { -micros } else { micros })
}

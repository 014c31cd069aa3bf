// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `inet` and `cidr` codecs.
//!
//! Binary format is family byte (2 for IPv4, 3 for IPv6), prefix bits,
//! a cidr flag byte, the address length, then the address bytes. Text
//! format is the address with an optional `/prefix`; `cidr` always
//! prints the prefix.

use std::net::IpAddr;

use crate::codecs::as_text;
use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{render_inet, Inet, Value};
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::registry::TypeRegistry;

const FAMILY_INET: u8 = 2;
const FAMILY_INET6: u8 = 3;

pub struct InetCodec {
    is_cidr: bool,
}

impl InetCodec {
    pub fn inet() -> Self {
        InetCodec { is_cidr: false }
    }

    pub fn cidr() -> Self {
        InetCodec { is_cidr: true }
    }

    fn type_name(&self) -> &'static str {
        if self.is_cidr {
            "cidr"
        } else {
            "inet"
        }
    }
}

impl Codec for InetCodec {
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
            Value::Inet(_) => Some(Box::new(InetEncodePlan {
                format,
                is_cidr: self.is_cidr,
            })),
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
            Value::Inet(_) => Some(Box::new(InetScanPlan {
                format,
                type_name: self.type_name(),
            })),
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
        Ok(Value::Inet(decode_inet(format, self.type_name(), src)?))
    }
}

struct InetEncodePlan {
    format: Format,
    is_cidr: bool,
}

impl EncodePlan for InetEncodePlan {
    fn encode(&self, _registry: &TypeRegistry, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let inet = match value {
            Value::Inet(inet) => inet,
            other => {
                return Err(ConversionError::encode(
                    "inet",
                    format!("expected inet value, got {:?}", other.shape()),
                ))
            }
        };
        let max_bits = match inet.addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if inet.prefix > max_bits {
            return Err(ConversionError::encode(
                "inet",
                format!("prefix /{} exceeds address width", inet.prefix),
            ));
        }
        match self.format {
            Format::Binary => {
                match inet.addr {
                    IpAddr::V4(v4) => {
                        buf.push(FAMILY_INET);
                        buf.push(inet.prefix);
                        buf.push(self.is_cidr as u8);
                        buf.push(4);
                        buf.extend_from_slice(&v4.octets());
                    }
                    IpAddr::V6(v6) => {
                        buf.push(FAMILY_INET6);
                        buf.push(inet.prefix);
                        buf.push(self.is_cidr as u8);
                        buf.push(16);
                        buf.extend_from_slice(&v6.octets());
                    }
                }
            }
            Format::Text => {
                let text = if self.is_cidr {
                    format!("{}/{}", inet.addr, inet.prefix)
                } else {
                    render_inet(inet)
                };
                buf.extend_from_slice(text.as_bytes());
            }
        }
        Ok(IsNull::No)
    }
}

struct InetScanPlan {
    format: Format,
    type_name: &'static str,
}

impl ScanPlan for InetScanPlan {
    fn scan(&self, _registry: &TypeRegistry, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let src = src.ok_or_else(|| ConversionError::null_assignment(dst.shape()))?;
        *dst = Value::Inet(decode_inet(self.format, self.type_name, src)?);
        Ok(())
    }
}

fn decode_inet(format: Format, type_name: &str, src: &[u8]) -> Result<Inet> {
    match format {
        Format::Binary => {
            if src.len() < 4 {
                return Err(ConversionError::decode(
                    type_name,
                    format!("expected at least 4 bytes, got {}", src.len()),
                ));
            }
            let (family, prefix, addr_len, addr_bytes) = (src[0], src[1], src[3], &src[4..]);
            if addr_bytes.len() != addr_len as usize {
                return Err(ConversionError::decode(
                    type_name,
                    "address length does not match payload".to_string(),
                ));
            }
            let addr = match (family, addr_len) {
                (FAMILY_INET, 4) => {
                    let mut octets = [0u8; 4];
                    octets.copy_from_slice(addr_bytes);
                    IpAddr::from(octets)
                }
                (FAMILY_INET6, 16) => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(addr_bytes);
                    IpAddr::from(octets)
                }
                _ => {
                    return Err(ConversionError::decode(
                        type_name,
                        format!("invalid family {} with {} address bytes", family, addr_len),
                    ))
                }
            };
            let max_bits = if addr_len == 4 { 32 } else { 128 };
            if prefix > max_bits {
                return Err(ConversionError::decode(
                    type_name,
                    format!("prefix /{} exceeds address width", prefix),
                ));
            }
            Ok(Inet { addr, prefix })
        }
        Format::Text => {
            let text = as_text(type_name, src)?;
            parse_inet(text)
                .ok_or_else(|| ConversionError::decode(type_name, format!("invalid address {:?}", text)))
        }
    }
}

fn parse_inet(text: &str) -> Option<Inet> {
    let (addr_str, prefix_str) = match text.split_once('/') {
        Some((a, p)) => (a, Some(p)),
        None => (text, None),
    };
    let addr: IpAddr = addr_str.parse().ok()?;
    let max_bits = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    let prefix = match prefix_str {
        Some(p) => p.parse().ok()?,
        None => max_bits,
    };
    if prefix > max_bits {
        return None;
    }
    Some(Inet { addr, prefix })
}

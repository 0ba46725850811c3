//! Network address codecs: `inet`, `cidr`, `macaddr` and `macaddr8`.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::{text, write_display};
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;

/// An address with a prefix length, e.g. `192.168.0.0/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpNetwork {
    pub addr: IpAddr,
    pub prefix: u8,
}

impl IpNetwork {
    /// A network with an explicit prefix. Fails when `prefix` exceeds the
    /// address width.
    pub fn new(addr: IpAddr, prefix: u8) -> CodecResult<Self> {
        if prefix > max_prefix(&addr) {
            return Err(CodecError::OutOfRange(format!("prefix /{prefix} for {addr}")));
        }
        Ok(Self { addr, prefix })
    }

    /// A single host (`/32` or `/128`).
    pub fn host(addr: IpAddr) -> Self {
        Self {
            addr,
            prefix: max_prefix(&addr),
        }
    }

    fn has_host_bits(&self) -> bool {
        match self.addr {
            IpAddr::V4(v4) => {
                let bits = u32::from(v4);
                bits.checked_shl(u32::from(self.prefix)).unwrap_or(0) != 0
            }
            IpAddr::V6(v6) => {
                let bits = u128::from(v6);
                bits.checked_shl(u32::from(self.prefix)).unwrap_or(0) != 0
            }
        }
    }
}

fn max_prefix(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn parse_network(raw: &[u8], kind: &'static str) -> CodecResult<IpNetwork> {
    let s = text(raw)?;
    let (addr, prefix) = match s.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (s, None),
    };
    let addr: IpAddr = addr.parse().map_err(|e| CodecError::parse(kind, raw, e))?;
    match prefix {
        Some(prefix) => {
            let prefix = prefix.parse().map_err(|e| CodecError::parse(kind, raw, e))?;
            IpNetwork::new(addr, prefix)
        }
        None => Ok(IpNetwork::host(addr)),
    }
}

fn write_network(value: &IpNetwork, always_prefix: bool, buf: &mut BytesMut) -> CodecResult<()> {
    write_display(value.addr, buf)?;
    if always_prefix || value.prefix != max_prefix(&value.addr) {
        buf.extend_from_slice(b"/");
        let mut tmp = itoa::Buffer::new();
        buf.extend_from_slice(tmp.format(value.prefix).as_bytes());
    }
    Ok(())
}

/// `inet`: a host address with an optional netmask. A full-width prefix
/// is omitted on output, as PostgreSQL does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgInet;

impl Codec<IpNetwork> for PgInet {
    fn encode(&self, value: &IpNetwork, buf: &mut BytesMut) -> CodecResult<()> {
        write_network(value, false, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<IpNetwork> {
        parse_network(raw, "inet")
    }
}

/// The address alone; any netmask is discarded.
impl Codec<IpAddr> for PgInet {
    fn encode(&self, value: &IpAddr, buf: &mut BytesMut) -> CodecResult<()> {
        write_display(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<IpAddr> {
        parse_network(raw, "inet").map(|net| net.addr)
    }
}

impl ArrayElement for PgInet {
    const LEXER: Lexer = Lexer::Plain;
}

/// `cidr`: a network specification. Bits right of the prefix must be
/// zero and the prefix is always written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgCidr;

impl Codec<IpNetwork> for PgCidr {
    fn encode(&self, value: &IpNetwork, buf: &mut BytesMut) -> CodecResult<()> {
        if value.has_host_bits() {
            return Err(CodecError::OutOfRange(format!(
                "{}/{} has bits set right of the mask",
                value.addr, value.prefix
            )));
        }
        write_network(value, true, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<IpNetwork> {
        let net = parse_network(raw, "cidr")?;
        if net.has_host_bits() {
            return Err(CodecError::parse("cidr", raw, "bits set right of the mask"));
        }
        Ok(net)
    }
}

impl ArrayElement for PgCidr {
    const LEXER: Lexer = Lexer::Plain;
}

/// Collect hex digits, allowing `:`, `-` and `.` as group separators.
fn parse_mac<const N: usize>(raw: &[u8], kind: &'static str) -> CodecResult<Vec<u8>> {
    let s = text(raw)?;
    let mut digits = Vec::with_capacity(N * 2);
    for c in s.chars() {
        match c {
            ':' | '-' | '.' => {}
            c => digits.push(
                c.to_digit(16)
                    .ok_or_else(|| CodecError::parse(kind, raw, "invalid hex digit"))?
                    as u8,
            ),
        }
    }
    if digits.len() % 2 != 0 {
        return Err(CodecError::parse(kind, raw, "odd number of hex digits"));
    }
    Ok(digits.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect())
}

fn write_mac(bytes: &[u8], buf: &mut BytesMut) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b":");
        }
        buf.extend_from_slice(&[HEX[(b >> 4) as usize], HEX[(b & 0x0f) as usize]]);
    }
}

/// `macaddr`, six bytes written as `08:00:2b:01:02:03`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgMacAddr;

impl Codec<[u8; 6]> for PgMacAddr {
    fn encode(&self, value: &[u8; 6], buf: &mut BytesMut) -> CodecResult<()> {
        write_mac(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[u8; 6]> {
        let bytes = parse_mac::<6>(raw, "macaddr")?;
        <[u8; 6]>::try_from(bytes).map_err(|b| CodecError::Length {
            expected: 6,
            got: b.len(),
        })
    }
}

impl ArrayElement for PgMacAddr {
    const LEXER: Lexer = Lexer::Plain;
}

/// `macaddr8`, eight bytes. Six-byte input is widened by inserting
/// `ff:fe` in the middle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgMacAddr8;

impl Codec<[u8; 8]> for PgMacAddr8 {
    fn encode(&self, value: &[u8; 8], buf: &mut BytesMut) -> CodecResult<()> {
        write_mac(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[u8; 8]> {
        let bytes = parse_mac::<8>(raw, "macaddr8")?;
        match *bytes.as_slice() {
            [a, b, c, d, e, f, g, h] => Ok([a, b, c, d, e, f, g, h]),
            [a, b, c, d, e, f] => Ok([a, b, c, 0xff, 0xfe, d, e, f]),
            ref other => Err(CodecError::Length {
                expected: 8,
                got: other.len(),
            }),
        }
    }
}

impl ArrayElement for PgMacAddr8 {
    const LEXER: Lexer = Lexer::Plain;
}

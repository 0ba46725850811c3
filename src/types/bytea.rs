//! `bytea` codec.
//!
//! Output uses the hex format (`\x` followed by two lowercase hex digits per
//! byte). Input also accepts the legacy escape format, where bytes appear
//! literally and `\\` / `\ooo` are escapes.

use bytes::{Bytes, BytesMut};

use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgBytea;

const HEX: &[u8; 16] = b"0123456789abcdef";

pub(crate) fn write_hex(bytes: &[u8], buf: &mut BytesMut) {
    buf.reserve(2 + bytes.len() * 2);
    buf.extend_from_slice(b"\\x");
    for &b in bytes {
        buf.extend_from_slice(&[HEX[(b >> 4) as usize], HEX[(b & 0x0f) as usize]]);
    }
}

fn nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn decode_bytea(raw: &[u8]) -> CodecResult<Vec<u8>> {
    match raw {
        [b'\\', b'x' | b'X', hex @ ..] => decode_hex(hex, raw),
        _ => decode_escape(raw),
    }
}

fn decode_hex(hex: &[u8], raw: &[u8]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(hex.len() / 2);
    let mut digits = hex.iter().copied().filter(|b| !b.is_ascii_whitespace());
    while let Some(hi) = digits.next() {
        let lo = digits
            .next()
            .ok_or_else(|| CodecError::parse("bytea", raw, "odd number of hex digits"))?;
        match (nibble(hi), nibble(lo)) {
            (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
            _ => return Err(CodecError::parse("bytea", raw, "invalid hex digit")),
        }
    }
    Ok(out)
}

fn decode_escape(raw: &[u8]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        match raw.get(i + 1..i + 4) {
            Some(&[a @ b'0'..=b'3', b @ b'0'..=b'7', c @ b'0'..=b'7']) => {
                out.push((a - b'0') << 6 | (b - b'0') << 3 | (c - b'0'));
                i += 4;
            }
            _ if raw.get(i + 1) == Some(&b'\\') => {
                out.push(b'\\');
                i += 2;
            }
            _ => return Err(CodecError::parse("bytea", raw, "invalid escape sequence")),
        }
    }
    Ok(out)
}

impl Codec<Vec<u8>> for PgBytea {
    fn encode(&self, value: &Vec<u8>, buf: &mut BytesMut) -> CodecResult<()> {
        write_hex(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<u8>> {
        decode_bytea(raw)
    }
}

impl Codec<Bytes> for PgBytea {
    fn encode(&self, value: &Bytes, buf: &mut BytesMut) -> CodecResult<()> {
        write_hex(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Bytes> {
        decode_bytea(raw).map(Bytes::from)
    }
}

impl ArrayElement for PgBytea {}

//! `uuid` codec.

use bytes::BytesMut;
use uuid::Uuid;

use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::{Lexer, trim};

/// `uuid`. Written in lowercase hyphenated form; any form `Uuid` accepts
/// (braced, simple, urn) is accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgUuid;

fn parse_uuid(raw: &[u8]) -> CodecResult<Uuid> {
    Uuid::try_parse_ascii(trim(raw)).map_err(|e| CodecError::parse("uuid", raw, e))
}

fn write_uuid(value: &Uuid, buf: &mut BytesMut) {
    let mut tmp = Uuid::encode_buffer();
    buf.extend_from_slice(value.hyphenated().encode_lower(&mut tmp).as_bytes());
}

impl Codec<Uuid> for PgUuid {
    fn encode(&self, value: &Uuid, buf: &mut BytesMut) -> CodecResult<()> {
        write_uuid(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Uuid> {
        parse_uuid(raw)
    }
}

impl Codec<[u8; 16]> for PgUuid {
    fn encode(&self, value: &[u8; 16], buf: &mut BytesMut) -> CodecResult<()> {
        write_uuid(&Uuid::from_bytes(*value), buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[u8; 16]> {
        parse_uuid(raw).map(Uuid::into_bytes)
    }
}

/// Text form, validated but otherwise passed through.
impl Codec<String> for PgUuid {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        parse_uuid(value.as_bytes())?;
        buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        parse_uuid(raw)?;
        Ok(std::str::from_utf8(trim(raw))?.to_string())
    }
}

/// Text form as bytes, validated but otherwise passed through.
impl Codec<Vec<u8>> for PgUuid {
    fn encode(&self, value: &Vec<u8>, buf: &mut BytesMut) -> CodecResult<()> {
        parse_uuid(value)?;
        buf.extend_from_slice(value);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<u8>> {
        parse_uuid(raw)?;
        Ok(trim(raw).to_vec())
    }
}

impl ArrayElement for PgUuid {
    const LEXER: Lexer = Lexer::Plain;
}

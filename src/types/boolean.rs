//! `bool` codec.

use bytes::BytesMut;

use super::text;
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;

/// `bool`. Written as `t` / `f`; every spelling PostgreSQL accepts on
/// input is accepted here, case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgBool;

impl Codec<bool> for PgBool {
    fn encode(&self, value: &bool, buf: &mut BytesMut) -> CodecResult<()> {
        buf.extend_from_slice(if *value { b"t" } else { b"f" });
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<bool> {
        let s = text(raw)?;
        match s.to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
            "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
            _ => Err(CodecError::parse("bool", raw, "expected t or f")),
        }
    }
}

impl ArrayElement for PgBool {
    const LEXER: Lexer = Lexer::Plain;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_decode() {
        for raw in [&b"t"[..], b"TRUE", b"yes", b"On", b"1"] {
            assert!(PgBool.decode(raw).unwrap(), "{:?}", raw);
        }
        for raw in [&b"f"[..], b"false", b"NO", b"off", b"0"] {
            assert!(!PgBool.decode(raw).unwrap(), "{:?}", raw);
        }
        assert!(PgBool.decode(b"maybe").is_err());
        assert!(PgBool.decode(b"").is_err());
    }

    #[test]
    fn test_bool_encode() {
        assert_eq!(&PgBool.to_bytes(&true).unwrap()[..], b"t");
        assert_eq!(&PgBool.to_bytes(&false).unwrap()[..], b"f");
    }
}

//! Character and document types: `text`, `bpchar`, `"char"`, `json`,
//! `jsonb` and `xml`.

use bytes::BytesMut;

use super::reject_nul;
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;

fn decode_string(raw: &[u8]) -> CodecResult<String> {
    Ok(std::str::from_utf8(raw)?.to_string())
}

fn encode_str(value: &str, buf: &mut BytesMut) -> CodecResult<()> {
    reject_nul(value.as_bytes())?;
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

/// `text`, `varchar` and `name`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgText;

impl Codec<String> for PgText {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        encode_str(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        decode_string(raw)
    }
}

/// Raw bytes, no UTF-8 validation.
impl Codec<Vec<u8>> for PgText {
    fn encode(&self, value: &Vec<u8>, buf: &mut BytesMut) -> CodecResult<()> {
        reject_nul(value)?;
        buf.extend_from_slice(value);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(raw.to_vec())
    }
}

impl ArrayElement for PgText {}

/// `bpchar` / `character(n)`, blank padded to its declared length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgBpchar;

impl Codec<String> for PgBpchar {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        encode_str(value, buf)
    }

    /// Padding is kept as sent.
    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        decode_string(raw)
    }
}

/// `character(1)`: trailing padding is ignored and an all-blank value
/// reads as a single space.
impl Codec<char> for PgBpchar {
    fn encode(&self, value: &char, buf: &mut BytesMut) -> CodecResult<()> {
        encode_char(*value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<char> {
        let s = std::str::from_utf8(raw)?;
        let trimmed = s.trim_end_matches(' ');
        if trimmed.is_empty() && !s.is_empty() {
            return Ok(' ');
        }
        single_char(trimmed, raw, "bpchar")
    }
}

impl ArrayElement for PgBpchar {}

/// The single-byte internal `"char"` type.
///
/// Bytes above 0x7f are written as a `\ooo` octal escape; the zero byte
/// is the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgChar;

impl Codec<u8> for PgChar {
    fn encode(&self, value: &u8, buf: &mut BytesMut) -> CodecResult<()> {
        match *value {
            0 => {}
            b if b < 0x80 => buf.extend_from_slice(&[b]),
            b => buf.extend_from_slice(&[
                b'\\',
                b'0' + (b >> 6),
                b'0' + ((b >> 3) & 7),
                b'0' + (b & 7),
            ]),
        }
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<u8> {
        match raw {
            [] => Ok(0),
            [b] => Ok(*b),
            [b'\\', a @ b'0'..=b'3', b @ b'0'..=b'7', c @ b'0'..=b'7'] => {
                Ok((a - b'0') << 6 | (b - b'0') << 3 | (c - b'0'))
            }
            _ => Err(CodecError::parse("char", raw, "expected a single byte")),
        }
    }
}

/// One Unicode scalar value.
impl Codec<char> for PgChar {
    fn encode(&self, value: &char, buf: &mut BytesMut) -> CodecResult<()> {
        encode_char(*value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<char> {
        single_char(std::str::from_utf8(raw)?, raw, "char")
    }
}

impl ArrayElement for PgChar {
    const LEXER: Lexer = Lexer::Runes;
}

fn encode_char(value: char, buf: &mut BytesMut) -> CodecResult<()> {
    if value == '\0' {
        return Err(CodecError::NullByte);
    }
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(value.encode_utf8(&mut tmp).as_bytes());
    Ok(())
}

fn single_char(s: &str, raw: &[u8], kind: &'static str) -> CodecResult<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CodecError::parse(kind, raw, "expected exactly one character")),
    }
}

macro_rules! json_codec {
    ($($(#[$meta:meta])* $codec:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $codec;

            /// Document text, passed through verbatim.
            impl Codec<String> for $codec {
                fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
                    encode_str(value, buf)
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<String> {
                    decode_string(raw)
                }
            }

            impl Codec<Vec<u8>> for $codec {
                fn encode(&self, value: &Vec<u8>, buf: &mut BytesMut) -> CodecResult<()> {
                    reject_nul(value)?;
                    buf.extend_from_slice(value);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<Vec<u8>> {
                    Ok(raw.to_vec())
                }
            }

            impl Codec<serde_json::Value> for $codec {
                fn encode(&self, value: &serde_json::Value, buf: &mut BytesMut) -> CodecResult<()> {
                    buf.extend_from_slice(&serde_json::to_vec(value)?);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<serde_json::Value> {
                    Ok(serde_json::from_slice(raw)?)
                }
            }

            impl ArrayElement for $codec {}
        )*
    };
}

json_codec!(
    /// `json`, stored as the original text.
    PgJson,
    /// `jsonb`, returned in PostgreSQL's normalized form.
    PgJsonb,
);

/// `xml`, passed through verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgXml;

impl Codec<String> for PgXml {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        encode_str(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        decode_string(raw)
    }
}

impl ArrayElement for PgXml {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_round_trip() {
        let s: String = PgText.decode("héllo, wörld".as_bytes()).unwrap();
        assert_eq!(s, "héllo, wörld");
        // no trimming for text
        let s: String = PgText.decode(b"  padded ").unwrap();
        assert_eq!(s, "  padded ");
        assert_eq!(&PgText.to_bytes(&s).unwrap()[..], b"  padded ");
    }

    #[test]
    fn test_text_rejects_nul() {
        assert!(matches!(
            PgText.to_bytes(&"a\0b".to_string()),
            Err(CodecError::NullByte)
        ));
        assert!(Codec::<String>::decode(&PgText, &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_bpchar_char_view() {
        let c: char = PgBpchar.decode(b"x   ").unwrap();
        assert_eq!(c, 'x');
        let c: char = PgBpchar.decode(b" ").unwrap();
        assert_eq!(c, ' ');
        assert!(Codec::<char>::decode(&PgBpchar, b"xy").is_err());
    }

    #[test]
    fn test_internal_char() {
        let b: u8 = PgChar.decode(b"a").unwrap();
        assert_eq!(b, b'a');
        let b: u8 = PgChar.decode(b"\\201").unwrap();
        assert_eq!(b, 0x81);
        let b: u8 = PgChar.decode(b"").unwrap();
        assert_eq!(b, 0);

        assert_eq!(&PgChar.to_bytes(&0x81u8).unwrap()[..], b"\\201");
        assert_eq!(&PgChar.to_bytes(&b'z').unwrap()[..], b"z");

        let c: char = PgChar.decode("日".as_bytes()).unwrap();
        assert_eq!(c, '日');
        assert!(PgChar.to_bytes(&'\0').is_err());
    }

    #[test]
    fn test_json_views() {
        let v: serde_json::Value = PgJsonb.decode(br#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(v, json!({"a": [1, 2]}));
        assert_eq!(&PgJson.to_bytes(&json!([true, null])).unwrap()[..], b"[true,null]");

        let s: String = PgJson.decode(br#"{"b":1,  "a":2}"#).unwrap();
        assert_eq!(s, r#"{"b":1,  "a":2}"#);
        assert!(Codec::<serde_json::Value>::decode(&PgJson, b"{nope").is_err());
    }

    #[test]
    fn test_xml_passthrough() {
        let s: String = PgXml.decode(b"<a>1</a>").unwrap();
        assert_eq!(s, "<a>1</a>");
    }
}

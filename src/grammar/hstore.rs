//! hstore literal parser and serializer: `"k"=>"v", "k2"=>NULL`.

use bytes::BytesMut;
use std::borrow::Cow;

use super::escape::{is_space, quote, unescape};
use crate::error::{CodecError, CodecResult};

/// One parsed pair. A `None` value is an absent (NULL) value.
pub type Pair<'a> = (Cow<'a, [u8]>, Option<Cow<'a, [u8]>>);

/// Parse an hstore literal into its key/value pairs, in wire order.
pub fn parse_hstore(literal: &[u8]) -> CodecResult<Vec<Pair<'_>>> {
    let mut pairs = Vec::new();
    let mut pos = skip_space(literal, 0);
    while pos < literal.len() {
        let (key, quoted) = read_token(literal, &mut pos)?;
        if !quoted && key.is_empty() {
            return Err(CodecError::malformed("hstore", "empty key"));
        }
        pos = skip_space(literal, pos);
        if !literal[pos..].starts_with(b"=>") {
            return Err(CodecError::malformed("hstore", "expected '=>' after key"));
        }
        pos = skip_space(literal, pos + 2);
        let (value, quoted) = read_token(literal, &mut pos)?;
        let value = if !quoted && value.eq_ignore_ascii_case(b"NULL") {
            None
        } else if !quoted && value.is_empty() {
            return Err(CodecError::malformed("hstore", "missing value"));
        } else {
            Some(value)
        };
        pairs.push((key, value));

        pos = skip_space(literal, pos);
        match literal.get(pos) {
            None => break,
            Some(b',') => pos = skip_space(literal, pos + 1),
            Some(_) => return Err(CodecError::malformed("hstore", "expected ',' between pairs")),
        }
        if pos >= literal.len() {
            return Err(CodecError::malformed("hstore", "trailing ','"));
        }
    }
    Ok(pairs)
}

fn skip_space(literal: &[u8], mut pos: usize) -> usize {
    while pos < literal.len() && is_space(literal[pos]) {
        pos += 1;
    }
    pos
}

/// Read a quoted or bare token starting at `pos`. Returns the token and
/// whether it was quoted.
fn read_token<'a>(literal: &'a [u8], pos: &mut usize) -> CodecResult<(Cow<'a, [u8]>, bool)> {
    let start = *pos;
    if literal.get(start) == Some(&b'"') {
        let mut i = start + 1;
        while i < literal.len() {
            match literal[i] {
                b'\\' => i += 2,
                b'"' => {
                    *pos = i + 1;
                    return Ok((unescape(&literal[start + 1..i]), true));
                }
                _ => i += 1,
            }
        }
        return Err(CodecError::malformed("hstore", "unterminated quoted string"));
    }
    let mut i = start;
    while i < literal.len() {
        match literal[i] {
            b'\\' => i += 2,
            b',' => break,
            b'=' if literal.get(i + 1) == Some(&b'>') => break,
            b if is_space(b) => break,
            _ => i += 1,
        }
    }
    let end = i.min(literal.len());
    *pos = end;
    Ok((unescape(&literal[start..end]), false))
}

/// Serialize pairs as `"k"=>"v"` joined by `, `. Keys and present values
/// are always quoted; absent values are written as bare `NULL`.
pub fn write_hstore<'a, I>(pairs: I, buf: &mut BytesMut)
where
    I: IntoIterator<Item = (&'a [u8], Option<&'a [u8]>)>,
{
    for (i, (key, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b", ");
        }
        quote(key, buf);
        buf.extend_from_slice(b"=>");
        match value {
            Some(value) => quote(value, buf),
            None => buf.extend_from_slice(b"NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(pairs: Vec<Pair<'_>>) -> Vec<(String, Option<String>)> {
        pairs
            .into_iter()
            .map(|(k, v)| {
                (
                    String::from_utf8(k.into_owned()).unwrap(),
                    v.map(|v| String::from_utf8(v.into_owned()).unwrap()),
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_hstore() {
        let got = strings(parse_hstore(br#""a"=>"1", "b"=>NULL, "c"=>"NULL""#).unwrap());
        assert_eq!(
            got,
            vec![
                ("a".to_string(), Some("1".to_string())),
                ("b".to_string(), None),
                ("c".to_string(), Some("NULL".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_escapes_and_bare_tokens() {
        let got = strings(parse_hstore(br#""k \"q\""=>"v\\w",bare => x"#).unwrap());
        assert_eq!(
            got,
            vec![
                (r#"k "q""#.to_string(), Some(r"v\w".to_string())),
                ("bare".to_string(), Some("x".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_hstore(b"").unwrap().is_empty());
        assert!(parse_hstore(b"   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_hstore(br#""a"="1""#).is_err());
        assert!(parse_hstore(br#""a"=>"1","#).is_err());
        assert!(parse_hstore(br#""a"=>"1" "b"=>"2""#).is_err());
        assert!(parse_hstore(br#""a=>"1""#).is_err());
    }

    #[test]
    fn test_write_hstore() {
        let mut buf = BytesMut::new();
        let pairs: Vec<(&[u8], Option<&[u8]>)> = vec![
            (&b"a"[..], Some(&b"1"[..])),
            (&b"b"[..], None),
            (&b"q\""[..], Some(&b"\\"[..])),
        ];
        write_hstore(pairs, &mut buf);
        assert_eq!(&buf[..], br#""a"=>"1", "b"=>NULL, "q\""=>"\\""#);
    }
}

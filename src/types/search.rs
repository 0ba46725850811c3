//! Full-text search codecs: `tsvector` and `tsquery`.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use super::reject_nul;
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::escape::is_space;

/// Lexeme weight label. `D` is the default and is never written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weight {
    A,
    B,
    C,
    #[default]
    D,
}

impl Weight {
    fn from_byte(b: u8) -> Option<Self> {
        match b.to_ascii_uppercase() {
            b'A' => Some(Weight::A),
            b'B' => Some(Weight::B),
            b'C' => Some(Weight::C),
            b'D' => Some(Weight::D),
            _ => None,
        }
    }

    fn label(self) -> &'static [u8] {
        match self {
            Weight::A => b"A",
            Weight::B => b"B",
            Weight::C => b"C",
            Weight::D => b"",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexemePosition {
    pub position: u16,
    pub weight: Weight,
}

/// One normalized word with its optional positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lexeme {
    pub word: String,
    #[serde(default)]
    pub positions: Vec<LexemePosition>,
}

impl Lexeme {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            positions: Vec::new(),
        }
    }
}

fn parse_tsvector(raw: &[u8]) -> CodecResult<Vec<Lexeme>> {
    std::str::from_utf8(raw)?;
    let mut lexemes = Vec::new();
    let mut i = 0;
    loop {
        while i < raw.len() && is_space(raw[i]) {
            i += 1;
        }
        if i == raw.len() {
            return Ok(lexemes);
        }
        let word = read_word(raw, &mut i)?;
        let mut positions = Vec::new();
        if raw.get(i) == Some(&b':') {
            i += 1;
            loop {
                let start = i;
                while i < raw.len() && raw[i].is_ascii_digit() {
                    i += 1;
                }
                let digits = std::str::from_utf8(&raw[start..i])?;
                let position = digits
                    .parse()
                    .map_err(|e| CodecError::parse("tsvector", raw, e))?;
                let weight = match raw.get(i).copied().and_then(Weight::from_byte) {
                    Some(weight) => {
                        i += 1;
                        weight
                    }
                    None => Weight::D,
                };
                positions.push(LexemePosition { position, weight });
                if raw.get(i) != Some(&b',') {
                    break;
                }
                i += 1;
            }
        }
        if i < raw.len() && !is_space(raw[i]) {
            return Err(CodecError::malformed("tsvector", "expected space between lexemes"));
        }
        lexemes.push(Lexeme { word, positions });
    }
}

/// Read a quoted (`'it''s'`) or bare word. Backslash escapes the next byte
/// in both forms.
fn read_word(raw: &[u8], pos: &mut usize) -> CodecResult<String> {
    let mut word = Vec::new();
    let mut i = *pos;
    let quoted = raw[i] == b'\'';
    if quoted {
        i += 1;
    }
    loop {
        match raw.get(i) {
            None if quoted => {
                return Err(CodecError::malformed("tsvector", "unterminated quoted lexeme"));
            }
            None => break,
            Some(b'\\') => {
                let next = raw
                    .get(i + 1)
                    .ok_or_else(|| CodecError::malformed("tsvector", "dangling escape"))?;
                word.push(*next);
                i += 2;
            }
            Some(b'\'') if quoted => {
                if raw.get(i + 1) == Some(&b'\'') {
                    word.push(b'\'');
                    i += 2;
                } else {
                    i += 1;
                    break;
                }
            }
            Some(&b) if !quoted && (is_space(b) || b == b':') => break,
            Some(&b) => {
                word.push(b);
                i += 1;
            }
        }
    }
    if word.is_empty() {
        return Err(CodecError::malformed("tsvector", "empty lexeme"));
    }
    *pos = i;
    String::from_utf8(word).map_err(|e| CodecError::Utf8(e.utf8_error()))
}

fn write_lexeme(lexeme: &Lexeme, buf: &mut BytesMut) -> CodecResult<()> {
    if lexeme.word.is_empty() {
        return Err(CodecError::malformed("tsvector", "empty lexeme"));
    }
    reject_nul(lexeme.word.as_bytes())?;
    buf.extend_from_slice(b"'");
    for &b in lexeme.word.as_bytes() {
        match b {
            b'\'' => buf.extend_from_slice(b"''"),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b => buf.extend_from_slice(&[b]),
        }
    }
    buf.extend_from_slice(b"'");
    for (i, pos) in lexeme.positions.iter().enumerate() {
        buf.extend_from_slice(if i == 0 { b":" } else { b"," });
        let mut tmp = itoa::Buffer::new();
        buf.extend_from_slice(tmp.format(pos.position).as_bytes());
        buf.extend_from_slice(pos.weight.label());
    }
    Ok(())
}

fn write_tsvector<'a>(
    lexemes: impl IntoIterator<Item = &'a Lexeme>,
    buf: &mut BytesMut,
) -> CodecResult<()> {
    for (i, lexeme) in lexemes.into_iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b" ");
        }
        write_lexeme(lexeme, buf)?;
    }
    Ok(())
}

/// `tsvector`. Lexemes are written in the order given; the server sorts
/// and merges duplicates itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTsVector;

impl Codec<Vec<Lexeme>> for PgTsVector {
    fn encode(&self, value: &Vec<Lexeme>, buf: &mut BytesMut) -> CodecResult<()> {
        write_tsvector(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<Lexeme>> {
        parse_tsvector(raw)
    }
}

/// Words only; positions are dropped on decode.
impl Codec<Vec<String>> for PgTsVector {
    fn encode(&self, value: &Vec<String>, buf: &mut BytesMut) -> CodecResult<()> {
        let lexemes: Vec<Lexeme> = value.iter().map(Lexeme::new).collect();
        write_tsvector(&lexemes, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<String>> {
        Ok(parse_tsvector(raw)?.into_iter().map(|l| l.word).collect())
    }
}

impl ArrayElement for PgTsVector {}

/// `tsquery`, passed through as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTsQuery;

impl Codec<String> for PgTsQuery {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        reject_nul(value.as_bytes())?;
        buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        Ok(std::str::from_utf8(raw)?.to_string())
    }
}

impl ArrayElement for PgTsQuery {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsvector_decode() {
        let got: Vec<Lexeme> = PgTsVector.decode(b"'a' 'cat':3 'fat':2,4A").unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0], Lexeme::new("a"));
        assert_eq!(
            got[2].positions,
            vec![
                LexemePosition { position: 2, weight: Weight::D },
                LexemePosition { position: 4, weight: Weight::A },
            ]
        );
    }

    #[test]
    fn test_tsvector_quoting() {
        let got: Vec<String> = PgTsVector.decode(br"'it''s' 'back\\slash' bare").unwrap();
        assert_eq!(got, vec!["it's", r"back\slash", "bare"]);

        let out = PgTsVector
            .to_bytes(&vec!["it's".to_string(), r"a\b".to_string()])
            .unwrap();
        assert_eq!(&out[..], br"'it''s' 'a\\b'");
    }

    #[test]
    fn test_tsvector_encode_positions() {
        let lexeme = Lexeme {
            word: "fat".to_string(),
            positions: vec![
                LexemePosition { position: 2, weight: Weight::D },
                LexemePosition { position: 4, weight: Weight::B },
            ],
        };
        assert_eq!(&PgTsVector.to_bytes(&vec![lexeme]).unwrap()[..], b"'fat':2,4B");
    }

    #[test]
    fn test_tsvector_malformed() {
        assert!(Codec::<Vec<Lexeme>>::decode(&PgTsVector, b"'open").is_err());
        assert!(Codec::<Vec<Lexeme>>::decode(&PgTsVector, b"'a':x").is_err());
        assert!(Codec::<Vec<Lexeme>>::decode(&PgTsVector, b"''").is_err());
        assert!(PgTsVector.to_bytes(&vec![String::new()]).is_err());
    }

    #[test]
    fn test_tsquery_passthrough() {
        let q: String = PgTsQuery.decode(b"'fat' & ( 'rat' | 'cat' )").unwrap();
        assert_eq!(q, "'fat' & ( 'rat' | 'cat' )");
    }
}

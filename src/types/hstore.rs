//! `hstore` codec.
//!
//! Maps decode keeping the first occurrence of a duplicated key. `HashMap`
//! values are written in key order so output is deterministic.

use bytes::BytesMut;
use std::collections::{BTreeMap, HashMap};

use super::reject_nul;
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::hstore::{parse_hstore, write_hstore};

/// `hstore`, the key/value extension type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgHStore;

fn utf8(bytes: Vec<u8>) -> CodecResult<String> {
    String::from_utf8(bytes).map_err(|e| CodecError::Utf8(e.utf8_error()))
}

/// Decoded pairs in wire order. `None` values are NULL.
fn decode_pairs(raw: &[u8]) -> CodecResult<Vec<(String, Option<String>)>> {
    parse_hstore(raw)?
        .into_iter()
        .map(|(key, value)| {
            Ok((
                utf8(key.into_owned())?,
                value.map(|v| utf8(v.into_owned())).transpose()?,
            ))
        })
        .collect()
}

fn encode_pairs<'a>(
    pairs: impl IntoIterator<Item = (&'a String, Option<&'a String>)>,
    buf: &mut BytesMut,
) -> CodecResult<()> {
    let pairs: Vec<(&[u8], Option<&[u8]>)> = pairs
        .into_iter()
        .map(|(k, v)| (k.as_bytes(), v.map(|v| v.as_bytes())))
        .collect();
    for (key, value) in &pairs {
        reject_nul(key)?;
        if let Some(value) = value {
            reject_nul(value)?;
        }
    }
    write_hstore(pairs, buf);
    Ok(())
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

impl Codec<HashMap<String, Option<String>>> for PgHStore {
    fn encode(&self, value: &HashMap<String, Option<String>>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_pairs(sorted(value).into_iter().map(|(k, v)| (k, v.as_ref())), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<HashMap<String, Option<String>>> {
        let mut map = HashMap::new();
        for (key, value) in decode_pairs(raw)? {
            map.entry(key).or_insert(value);
        }
        Ok(map)
    }
}

/// NULL values are rejected with [`CodecError::UnexpectedNull`].
impl Codec<HashMap<String, String>> for PgHStore {
    fn encode(&self, value: &HashMap<String, String>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_pairs(sorted(value).into_iter().map(|(k, v)| (k, Some(v))), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<HashMap<String, String>> {
        let mut map = HashMap::new();
        for (key, value) in decode_pairs(raw)? {
            map.entry(key)
                .or_insert(value.ok_or(CodecError::UnexpectedNull)?);
        }
        Ok(map)
    }
}

impl Codec<BTreeMap<String, Option<String>>> for PgHStore {
    fn encode(&self, value: &BTreeMap<String, Option<String>>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_pairs(value.iter().map(|(k, v)| (k, v.as_ref())), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<BTreeMap<String, Option<String>>> {
        let mut map = BTreeMap::new();
        for (key, value) in decode_pairs(raw)? {
            map.entry(key).or_insert(value);
        }
        Ok(map)
    }
}

impl Codec<BTreeMap<String, String>> for PgHStore {
    fn encode(&self, value: &BTreeMap<String, String>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_pairs(value.iter().map(|(k, v)| (k, Some(v))), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for (key, value) in decode_pairs(raw)? {
            map.entry(key)
                .or_insert(value.ok_or(CodecError::UnexpectedNull)?);
        }
        Ok(map)
    }
}

impl ArrayElement for PgHStore {}

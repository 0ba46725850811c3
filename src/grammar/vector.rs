//! Space-delimited vector lexer (`int2vector`, `oidvector`).

use super::array::split_elements;
use crate::error::CodecResult;

/// Split a vector literal such as `1 2 3` on ASCII spaces. No quoting.
pub fn split_vector(literal: &[u8]) -> Vec<&[u8]> {
    literal
        .split(|&b| b == b' ')
        .filter(|span| !span.is_empty())
        .collect()
}

/// Split an array of vectors, e.g. `{"1 2","3 4",NULL}`, handing each
/// element's spans to `decode`. NULL elements map to `None`.
pub fn split_vector_array<T>(
    literal: &[u8],
    mut decode: impl FnMut(Vec<&[u8]>) -> CodecResult<T>,
) -> CodecResult<Vec<Option<T>>> {
    split_elements(literal, b',')?
        .into_iter()
        .map(|element| element.map(|vector| decode(split_vector(&vector))).transpose())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_vector() {
        assert_eq!(split_vector(b"1 2  3"), vec![&b"1"[..], b"2", b"3"]);
        assert!(split_vector(b"").is_empty());
    }

    #[test]
    fn test_split_vector_array() {
        let got = split_vector_array(br#"{"1 2",3,NULL,""}"#, |spans| {
            Ok(spans.iter().map(|s| s.len()).sum::<usize>())
        })
        .unwrap();
        assert_eq!(got, vec![Some(2), Some(1), None, Some(0)]);
    }
}

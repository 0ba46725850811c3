//! One-dimensional arrays of any element codec.
//!
//! `Array<C>` reads `Vec<T>` / `[T; N]` and refuses NULL elements;
//! `NullableArray<C>` reads `Vec<Option<T>>`. The element codec decides
//! how the literal is lexed (see [`ArrayElement`]).

use bytes::BytesMut;

use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;
use crate::grammar::escape::write_element;

/// Array codec whose elements must all be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Array<C>(pub C);

/// Array codec whose elements may be NULL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullableArray<C>(pub C);

fn encode_elements<'a, T: 'a, C>(
    codec: &C,
    values: impl IntoIterator<Item = Option<&'a T>>,
    buf: &mut BytesMut,
) -> CodecResult<()>
where
    C: Codec<T> + ArrayElement,
{
    buf.extend_from_slice(b"{");
    let mut scratch = BytesMut::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(&[C::DELIMITER]);
        }
        let Some(value) = value else {
            buf.extend_from_slice(b"NULL");
            continue;
        };
        scratch.clear();
        codec.encode(value, &mut scratch)?;
        if C::LEXER == Lexer::Plain && !scratch.is_empty() {
            buf.extend_from_slice(&scratch);
        } else {
            write_element(&scratch, C::DELIMITER, buf);
        }
    }
    buf.extend_from_slice(b"}");
    Ok(())
}

fn decode_elements<T, C>(codec: &C, raw: &[u8]) -> CodecResult<Vec<Option<T>>>
where
    C: Codec<T> + ArrayElement,
{
    C::LEXER
        .split(raw, C::DELIMITER)?
        .into_iter()
        .map(|element| element.map(|span| codec.decode(&span)).transpose())
        .collect()
}

fn decode_present<T, C>(codec: &C, raw: &[u8]) -> CodecResult<Vec<T>>
where
    C: Codec<T> + ArrayElement,
{
    C::LEXER
        .split(raw, C::DELIMITER)?
        .into_iter()
        .map(|element| match element {
            Some(span) => codec.decode(&span),
            None => Err(CodecError::UnexpectedNull),
        })
        .collect()
}

impl<T, C> Codec<Vec<T>> for Array<C>
where
    C: Codec<T> + ArrayElement,
{
    fn encode(&self, value: &Vec<T>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_elements(&self.0, value.iter().map(Some), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<T>> {
        decode_present(&self.0, raw)
    }
}

impl<T, C, const N: usize> Codec<[T; N]> for Array<C>
where
    C: Codec<T> + ArrayElement,
{
    fn encode(&self, value: &[T; N], buf: &mut BytesMut) -> CodecResult<()> {
        encode_elements(&self.0, value.iter().map(Some), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[T; N]> {
        let values = decode_present(&self.0, raw)?;
        <[T; N]>::try_from(values).map_err(|values| CodecError::Length {
            expected: N,
            got: values.len(),
        })
    }
}

impl<T, C> Codec<Vec<Option<T>>> for NullableArray<C>
where
    C: Codec<T> + ArrayElement,
{
    fn encode(&self, value: &Vec<Option<T>>, buf: &mut BytesMut) -> CodecResult<()> {
        encode_elements(&self.0, value.iter().map(Option::as_ref), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<Option<T>>> {
        decode_elements(&self.0, raw)
    }
}

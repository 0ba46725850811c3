//! The bidirectional codec trait.
//!
//! One codec unit struct exists per PostgreSQL type (`PgInt4`, `PgPoint`,
//! ...). It implements [`Codec<T>`] once for every Rust type `T` it can
//! be read into and written from, so the query layer picks a
//! (wire type, semantic type) pair simply by choosing the codec and the
//! target type.

use bytes::{Bytes, BytesMut};

use crate::error::CodecResult;
use crate::grammar::Lexer;

/// Text-format encoder/decoder for one PostgreSQL type into `T`.
///
/// Wire NULL is modelled as `None` and never reaches [`Codec::encode`] or
/// [`Codec::decode`]; use the `_nullable` variants at the boundary.
pub trait Codec<T> {
    /// Append the text representation of `value` to `buf`.
    fn encode(&self, value: &T, buf: &mut BytesMut) -> CodecResult<()>;

    /// Parse a non-NULL text value.
    fn decode(&self, raw: &[u8]) -> CodecResult<T>;

    /// Encode into a freshly allocated buffer.
    fn to_bytes(&self, value: &T) -> CodecResult<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(value, &mut buf)?;
        Ok(buf.freeze())
    }

    /// `None` (absent) is encoded as wire NULL, i.e. `None`.
    fn encode_nullable(&self, value: Option<&T>) -> CodecResult<Option<Bytes>> {
        value.map(|v| self.to_bytes(v)).transpose()
    }

    /// Wire NULL decodes to `None`, distinct from any zero value.
    fn decode_nullable(&self, raw: Option<&[u8]>) -> CodecResult<Option<T>> {
        raw.map(|r| self.decode(r)).transpose()
    }
}

/// Array-embedding properties of an element codec.
///
/// The lexer variant is a property of the element type, never detected
/// from the input.
pub trait ArrayElement {
    const LEXER: Lexer = Lexer::Quoted;
    const DELIMITER: u8 = b',';
}

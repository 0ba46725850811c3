//! Codec sets for PostgreSQL types.
//!
//! Each `Pg*` unit struct is the codec for one wire type and implements
//! [`Codec<T>`](crate::codec::Codec) for the Rust types it supports.
//! Plain reads need no dedicated codec beyond these: decoding a `text`
//! column into `String` is simply `PgText.decode(raw)`.

pub mod array;
pub mod bits;
pub mod boolean;
pub mod bytea;
pub mod geometric;
pub mod hstore;
pub mod network;
pub mod numeric;
pub mod range;
pub mod search;
pub mod temporal;
pub mod text;
pub mod uuid;
pub mod vector;

pub use array::{Array, NullableArray};
pub use bits::{PgBit, PgVarBit};
pub use boolean::PgBool;
pub use bytea::PgBytea;
pub use geometric::{
    BoundingBox, Line, LineSegment, Path, PgBox, PgLine, PgLseg, PgPath, PgPoint, PgPolygon,
    Point, Polygon,
};
pub use hstore::PgHStore;
pub use network::{IpNetwork, PgCidr, PgInet, PgMacAddr, PgMacAddr8};
pub use numeric::{
    Float, Integer, PgFloat4, PgFloat8, PgInt2, PgInt4, PgInt8, PgMoney, PgNumeric, PgOid,
};
pub use range::{
    PgDateRange, PgInt4Range, PgInt8Range, PgNumRange, PgTsRange, PgTstzRange, Range,
};
pub use search::{Lexeme, LexemePosition, PgTsQuery, PgTsVector, Weight};
pub use temporal::{PgDate, PgTime, PgTimestamp, PgTimestamptz, PgTimetz, TimeTz};
pub use text::{PgBpchar, PgChar, PgJson, PgJsonb, PgText, PgXml};
pub use self::uuid::PgUuid;
pub use vector::{PgInt2Vector, PgOidVector};

use bytes::BytesMut;
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, CodecResult};

/// View raw bytes as UTF-8 text with surrounding whitespace removed.
pub(crate) fn text(raw: &[u8]) -> CodecResult<&str> {
    Ok(std::str::from_utf8(raw)?.trim())
}

/// Parse a trimmed span with `FromStr`, tagging failures with `kind`.
pub(crate) fn parse_text<T>(raw: &[u8], kind: &'static str) -> CodecResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text(raw)?
        .parse()
        .map_err(|e| CodecError::parse(kind, raw, e))
}

/// Append any `Display` value.
pub(crate) fn write_display(value: impl fmt::Display, buf: &mut BytesMut) -> CodecResult<()> {
    use std::fmt::Write;
    write!(buf, "{value}").map_err(|_| CodecError::Unsupported("value cannot be formatted"))
}

/// PostgreSQL text values cannot carry 0x00.
pub(crate) fn reject_nul(bytes: &[u8]) -> CodecResult<()> {
    if bytes.contains(&0) {
        return Err(CodecError::NullByte);
    }
    Ok(())
}

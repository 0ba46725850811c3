//! `int2vector` and `oidvector`, the space-separated system catalog
//! vectors. Arrays of vectors (`{"1 2",3}`) go through `Array` and
//! `NullableArray` like any other element.

use bytes::BytesMut;

use super::numeric::{Integer, decode_integer};
use crate::codec::{ArrayElement, Codec};
use crate::error::CodecResult;
use crate::grammar::vector::split_vector;

fn write_vector<T: Integer>(values: &[T], buf: &mut BytesMut) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b" ");
        }
        value.write(buf);
    }
}

macro_rules! vector_codec {
    ($($(#[$meta:meta])* $codec:ident => $kind:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $codec;

            impl<T: Integer> Codec<Vec<T>> for $codec {
                fn encode(&self, value: &Vec<T>, buf: &mut BytesMut) -> CodecResult<()> {
                    write_vector(value, buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<Vec<T>> {
                    split_vector(raw)
                        .into_iter()
                        .map(|span| decode_integer(span, $kind))
                        .collect()
                }
            }

            impl ArrayElement for $codec {}
        )*
    };
}

vector_codec!(
    /// `int2vector`, e.g. `1 2 3`.
    PgInt2Vector => "int2vector",
    /// `oidvector`, e.g. `23 25`.
    PgOidVector => "oidvector",
);

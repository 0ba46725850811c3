//! `bit(n)` and `bit varying(n)` codecs.
//!
//! The wire form is a run of `0`/`1` characters, most significant first.

use bytes::BytesMut;

use super::numeric::Integer;
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};

fn bit_digits<'a>(raw: &'a [u8], kind: &'static str) -> CodecResult<&'a [u8]> {
    let digits = crate::grammar::trim(raw);
    if let Some(bad) = digits.iter().find(|&&b| b != b'0' && b != b'1') {
        return Err(CodecError::parse(
            kind,
            raw,
            format!("'{}' is not a valid binary digit", *bad as char),
        ));
    }
    Ok(digits)
}

fn write_bits(bits: impl Iterator<Item = bool>, buf: &mut BytesMut) {
    for bit in bits {
        buf.extend_from_slice(if bit { b"1" } else { b"0" });
    }
}

fn check_digit(b: u8) -> CodecResult<u8> {
    match b {
        0 => Ok(b'0'),
        1 => Ok(b'1'),
        _ => Err(CodecError::OutOfRange(format!("bit value {b}"))),
    }
}

macro_rules! bit_codec {
    ($($(#[$meta:meta])* $codec:ident => $kind:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $codec;

            impl Codec<Vec<bool>> for $codec {
                fn encode(&self, value: &Vec<bool>, buf: &mut BytesMut) -> CodecResult<()> {
                    write_bits(value.iter().copied(), buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<Vec<bool>> {
                    Ok(bit_digits(raw, $kind)?.iter().map(|&b| b == b'1').collect())
                }
            }

            /// One `0`/`1` byte per bit.
            impl Codec<Vec<u8>> for $codec {
                fn encode(&self, value: &Vec<u8>, buf: &mut BytesMut) -> CodecResult<()> {
                    for &b in value {
                        buf.extend_from_slice(&[check_digit(b)?]);
                    }
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<Vec<u8>> {
                    Ok(bit_digits(raw, $kind)?.iter().map(|&b| b - b'0').collect())
                }
            }

            impl Codec<String> for $codec {
                fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
                    buf.extend_from_slice(bit_digits(value.as_bytes(), $kind)?);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<String> {
                    let digits = bit_digits(raw, $kind)?;
                    Ok(digits.iter().map(|&b| b as char).collect())
                }
            }

            /// A single bit, as in `bit(1)`.
            impl Codec<bool> for $codec {
                fn encode(&self, value: &bool, buf: &mut BytesMut) -> CodecResult<()> {
                    write_bits(std::iter::once(*value), buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<bool> {
                    match bit_digits(raw, $kind)? {
                        [b] => Ok(*b == b'1'),
                        digits => Err(CodecError::Length { expected: 1, got: digits.len() }),
                    }
                }
            }

            impl<const N: usize> Codec<[bool; N]> for $codec {
                fn encode(&self, value: &[bool; N], buf: &mut BytesMut) -> CodecResult<()> {
                    write_bits(value.iter().copied(), buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<[bool; N]> {
                    let digits = bit_digits(raw, $kind)?;
                    if digits.len() != N {
                        return Err(CodecError::Length { expected: N, got: digits.len() });
                    }
                    let mut out = [false; N];
                    for (slot, &b) in out.iter_mut().zip(digits) {
                        *slot = b == b'1';
                    }
                    Ok(out)
                }
            }

            impl ArrayElement for $codec {}
        )*
    };
}

bit_codec!(
    /// `bit(n)`, fixed length.
    PgBit => "bit",
    /// `bit varying(n)`.
    PgVarBit => "varbit",
);

/// Parse up to 64 bits as an unsigned pattern.
fn decode_bits_u64(raw: &[u8]) -> CodecResult<u64> {
    let digits = bit_digits(raw, "varbit")?;
    if digits.len() > 64 {
        return Err(CodecError::OutOfRange(format!(
            "{} bits do not fit in 64",
            digits.len()
        )));
    }
    Ok(digits
        .iter()
        .fold(0u64, |acc, &b| acc << 1 | u64::from(b - b'0')))
}

fn write_bits_u64(bits: u64, buf: &mut BytesMut) {
    let width = (64 - bits.leading_zeros()).max(1);
    write_bits((0..width).rev().map(|i| bits >> i & 1 == 1), buf);
}

// Integers read the bit string as a two's-complement pattern at the
// target's width and write their own-width pattern without leading zeros.
macro_rules! varbit_integer {
    ($($t:ty),*) => {
        $(
            impl Codec<$t> for PgVarBit {
                fn encode(&self, value: &$t, buf: &mut BytesMut) -> CodecResult<()> {
                    write_bits_u64(Integer::to_bits(*value), buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<$t> {
                    decode_bits_u64(raw).map(<$t as Integer>::from_bits)
                }
            }
        )*
    };
}

varbit_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

//! Integer, floating point, NUMERIC and MONEY codecs.
//!
//! Integer codecs are generic over the target width: a value decoded into
//! a narrower type wraps with two's-complement semantics (`128` read into
//! an `i8` is `-128`), exactly like an `as` cast.

use bytes::BytesMut;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;

use super::{parse_text, text, write_display};
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;
use crate::grammar::range::Discrete;

/// Fixed-width integer targets.
pub trait Integer: Copy {
    /// Truncate with two's-complement wraparound.
    fn from_i64_wrapping(value: i64) -> Self;
    /// Reinterpret the low bits of `bits`.
    fn from_bits(bits: u64) -> Self;
    /// Two's-complement bit pattern at this type's own width.
    fn to_bits(self) -> u64;
    /// Append the decimal representation.
    fn write(self, buf: &mut BytesMut);
}

macro_rules! impl_integer {
    ($($t:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl Integer for $t {
                #[inline]
                fn from_i64_wrapping(value: i64) -> Self {
                    value as $t
                }

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $t
                }

                #[inline]
                fn to_bits(self) -> u64 {
                    self as $unsigned as u64
                }

                #[inline]
                fn write(self, buf: &mut BytesMut) {
                    let mut tmp = itoa::Buffer::new();
                    buf.extend_from_slice(tmp.format(self).as_bytes());
                }
            }

            impl Discrete for $t {
                fn successor(&self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

impl_integer!(
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    isize => usize,
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    usize => usize,
);

/// Parse a decimal integer span into `T`, wrapping on narrowing.
pub(crate) fn decode_integer<T: Integer>(raw: &[u8], kind: &'static str) -> CodecResult<T> {
    let s = text(raw)?;
    match s.parse::<i64>() {
        Ok(value) => Ok(T::from_i64_wrapping(value)),
        Err(e) => s
            .parse::<u64>()
            .map(T::from_bits)
            .map_err(|_| CodecError::parse(kind, raw, e)),
    }
}

macro_rules! integer_codec {
    ($($(#[$meta:meta])* $codec:ident => $kind:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $codec;

            impl<T: Integer> Codec<T> for $codec {
                fn encode(&self, value: &T, buf: &mut BytesMut) -> CodecResult<()> {
                    value.write(buf);
                    Ok(())
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<T> {
                    decode_integer(raw, $kind)
                }
            }

            impl ArrayElement for $codec {
                const LEXER: Lexer = Lexer::Plain;
            }
        )*
    };
}

integer_codec!(
    /// `int2` / `smallint`.
    PgInt2 => "int2",
    /// `int4` / `integer`.
    PgInt4 => "int4",
    /// `int8` / `bigint`.
    PgInt8 => "int8",
    /// `oid`, unsigned 32-bit object identifier.
    PgOid => "oid",
);

/// Floating point targets.
pub trait Float: Copy + FromStr {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    /// Append the shortest decimal that parses back to the same value.
    fn write(self, buf: &mut BytesMut);
}

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl Float for $t {
                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn write(self, buf: &mut BytesMut) {
                    if self.is_nan() {
                        buf.extend_from_slice(b"NaN");
                    } else if self.is_infinite() {
                        buf.extend_from_slice(if self > 0.0 { &b"Infinity"[..] } else { &b"-Infinity"[..] });
                    } else {
                        let mut tmp = ryu::Buffer::new();
                        let s = tmp.format_finite(self);
                        buf.extend_from_slice(s.strip_suffix(".0").unwrap_or(s).as_bytes());
                    }
                }
            }
        )*
    };
}

impl_float!(f32, f64);

/// Append an `f64` coordinate or value in shortest round-trip form.
#[inline]
pub(crate) fn write_f64(value: f64, buf: &mut BytesMut) {
    value.write(buf);
}

pub(crate) fn decode_float<T: Float>(raw: &[u8], kind: &'static str) -> CodecResult<T>
where
    T::Err: std::fmt::Display,
{
    parse_text(raw, kind)
}

/// `float4` / `real`. Values are rounded to single precision on encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgFloat4;

impl<T: Float> Codec<T> for PgFloat4
where
    T::Err: std::fmt::Display,
{
    fn encode(&self, value: &T, buf: &mut BytesMut) -> CodecResult<()> {
        (value.to_f64() as f32).write(buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<T> {
        decode_float(raw, "float4")
    }
}

impl ArrayElement for PgFloat4 {
    const LEXER: Lexer = Lexer::Plain;
}

/// `float8` / `double precision`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgFloat8;

impl<T: Float> Codec<T> for PgFloat8
where
    T::Err: std::fmt::Display,
{
    fn encode(&self, value: &T, buf: &mut BytesMut) -> CodecResult<()> {
        value.write(buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<T> {
        decode_float(raw, "float8")
    }
}

impl ArrayElement for PgFloat8 {
    const LEXER: Lexer = Lexer::Plain;
}

/// `numeric` / `decimal`, arbitrary precision.
///
/// `Decimal` is exact within its 28 digits; the `String` view passes the
/// text through untouched (including `NaN`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgNumeric;

pub(crate) fn parse_decimal(raw: &[u8]) -> CodecResult<Decimal> {
    let s = text(raw)?;
    let parsed = if s.contains(['e', 'E']) {
        Decimal::from_scientific(s)
    } else {
        Decimal::from_str(s)
    };
    parsed.map_err(|e| CodecError::parse("numeric", raw, e))
}

impl Codec<Decimal> for PgNumeric {
    fn encode(&self, value: &Decimal, buf: &mut BytesMut) -> CodecResult<()> {
        write_display(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Decimal> {
        parse_decimal(raw)
    }
}

impl Codec<f64> for PgNumeric {
    fn encode(&self, value: &f64, buf: &mut BytesMut) -> CodecResult<()> {
        value.write(buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<f64> {
        decode_float(raw, "numeric")
    }
}

impl Codec<String> for PgNumeric {
    fn encode(&self, value: &String, buf: &mut BytesMut) -> CodecResult<()> {
        // validate without reformatting
        if !value.eq_ignore_ascii_case("nan") {
            parse_decimal(value.as_bytes())?;
        }
        buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<String> {
        Ok(text(raw)?.to_string())
    }
}

impl ArrayElement for PgNumeric {
    const LEXER: Lexer = Lexer::Plain;
}

/// `money`: a fixed-point amount held as an `i64` count of cents.
///
/// Written as `$D.DD` (or `-$D.DD`). Input tolerates any leading currency
/// symbol, thousands separators and the accounting `($1.00)` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgMoney {
    symbol: Cow<'static, str>,
}

impl PgMoney {
    /// Codec that writes `symbol` in front of every amount.
    pub fn new(symbol: impl Into<Cow<'static, str>>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Default for PgMoney {
    fn default() -> Self {
        Self::new("$")
    }
}

impl Codec<i64> for PgMoney {
    fn encode(&self, cents: &i64, buf: &mut BytesMut) -> CodecResult<()> {
        if *cents < 0 {
            buf.extend_from_slice(b"-");
        }
        buf.extend_from_slice(self.symbol.as_bytes());
        let abs = cents.unsigned_abs();
        let mut tmp = itoa::Buffer::new();
        buf.extend_from_slice(tmp.format(abs / 100).as_bytes());
        let frac = (abs % 100) as u8;
        buf.extend_from_slice(&[b'.', b'0' + frac / 10, b'0' + frac % 10]);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<i64> {
        parse_money(raw, &self.symbol)
    }
}

impl ArrayElement for PgMoney {}

/// Drop the currency symbol in front of the amount. The configured symbol
/// is matched whole; anything else is skipped up to the first digit.
fn strip_symbol<'a>(s: &'a str, symbol: &str) -> &'a str {
    match s.strip_prefix(symbol) {
        Some(rest) if !symbol.is_empty() => rest,
        _ => s.trim_start_matches(|c: char| !c.is_ascii_digit() && !matches!(c, '-' | '.')),
    }
}

fn strip_sign<'a>(body: &'a str, negative: &mut bool, raw: &[u8]) -> CodecResult<&'a str> {
    match body.strip_prefix('-') {
        Some(_) if *negative => Err(CodecError::parse("money", raw, "duplicate sign")),
        Some(rest) => {
            *negative = true;
            Ok(rest.trim_start())
        }
        None => Ok(body),
    }
}

fn parse_money(raw: &[u8], symbol: &str) -> CodecResult<i64> {
    let s = text(raw)?.trim();
    let (mut body, mut negative) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };
    // the sign may sit on either side of the symbol, never inside the amount
    body = strip_sign(body, &mut negative, raw)?;
    body = strip_symbol(body, symbol).trim_start();
    body = strip_sign(body, &mut negative, raw)?;

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => digits.push(c),
            ',' | ' ' => {}
            _ => return Err(CodecError::parse("money", raw, "unexpected character")),
        }
    }
    let (units, frac) = digits.split_once('.').unwrap_or((&digits, ""));
    if units.is_empty() && frac.is_empty() {
        return Err(CodecError::parse("money", raw, "no digits"));
    }
    if frac.len() > 2 {
        return Err(CodecError::parse("money", raw, "more than two decimal digits"));
    }
    let units: i64 = if units.is_empty() {
        0
    } else {
        units
            .parse()
            .map_err(|e| CodecError::parse("money", raw, e))?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|e| CodecError::parse("money", raw, e))? * 10,
        _ => frac.parse().map_err(|e| CodecError::parse("money", raw, e))?,
    };
    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or_else(|| CodecError::OutOfRange(format!("money {s}")))?;
    Ok(if negative { -cents } else { cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T, C: Codec<T>>(codec: C, value: T) -> String {
        let mut buf = BytesMut::new();
        codec.encode(&value, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn test_integer_decode() {
        let v: i32 = PgInt4.decode(b"42").unwrap();
        assert_eq!(v, 42);
        let v: i64 = PgInt8.decode(b" -9000000000 ").unwrap();
        assert_eq!(v, -9_000_000_000);
        assert!(Codec::<i32>::decode(&PgInt4, b"4.2").is_err());
        assert!(Codec::<i32>::decode(&PgInt4, b"").is_err());
    }

    #[test]
    fn test_integer_wraparound() {
        let v: i8 = PgInt2.decode(b"128").unwrap();
        assert_eq!(v, -128);
        let v: u8 = PgInt2.decode(b"-1").unwrap();
        assert_eq!(v, 255);
        let v: u64 = PgInt8.decode(b"-1").unwrap();
        assert_eq!(v, u64::MAX);
    }

    #[test]
    fn test_integer_encode() {
        assert_eq!(encoded(PgInt2, -10i8), "-10");
        assert_eq!(encoded(PgInt8, u64::MAX), "18446744073709551615");
        assert_eq!(encoded(PgOid, 4294967295u32), "4294967295");
    }

    #[test]
    fn test_float_shortest_round_trip() {
        assert_eq!(encoded(PgFloat8, 0.1f64), "0.1");
        assert_eq!(encoded(PgFloat8, 1.0f64), "1");
        assert_eq!(encoded(PgFloat8, -2.5f64), "-2.5");
        assert_eq!(encoded(PgFloat4, 0.1f32), "0.1");
        assert_eq!(encoded(PgFloat4, 0.1f64), "0.1");
        assert_eq!(encoded(PgFloat8, 0.1f32), "0.1");

        let v = 1.0f64 / 3.0;
        let back: f64 = PgFloat8.decode(encoded(PgFloat8, v).as_bytes()).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(encoded(PgFloat8, f64::NAN), "NaN");
        assert_eq!(encoded(PgFloat8, f64::INFINITY), "Infinity");
        assert_eq!(encoded(PgFloat4, f32::NEG_INFINITY), "-Infinity");

        let v: f64 = PgFloat8.decode(b"-Infinity").unwrap();
        assert_eq!(v, f64::NEG_INFINITY);
        let v: f32 = PgFloat4.decode(b"NaN").unwrap();
        assert!(v.is_nan());
    }

    #[test]
    fn test_numeric() {
        let d: Decimal = PgNumeric.decode(b"123.4500").unwrap();
        assert_eq!(d, Decimal::new(1234500, 4));
        assert_eq!(encoded(PgNumeric, d), "123.4500");

        let s: String = PgNumeric.decode(b"NaN").unwrap();
        assert_eq!(s, "NaN");
        assert!(Codec::<Decimal>::decode(&PgNumeric, b"NaN").is_err());
        assert!(PgNumeric.to_bytes(&"12x".to_string()).is_err());
    }

    #[test]
    fn test_money() {
        let money = PgMoney::default();
        assert_eq!(encoded(money.clone(), 123456i64), "$1234.56");
        assert_eq!(encoded(money.clone(), -5i64), "-$0.05");
        assert_eq!(encoded(PgMoney::new("€"), 100i64), "€1.00");

        assert_eq!(money.decode(b"$1,234.56").unwrap(), 123456);
        assert_eq!(money.decode(b"-$0.05").unwrap(), -5);
        assert_eq!(money.decode(b"($12.30)").unwrap(), -1230);
        assert_eq!(money.decode(b"$7.5").unwrap(), 750);
        assert_eq!(money.decode(b"42").unwrap(), 4200);
        assert!(money.decode(b"$1.234").is_err());
        assert!(money.decode(b"$").is_err());
    }

    #[test]
    fn test_money_sign_and_symbol() {
        let money = PgMoney::default();
        assert!(money.decode(b"1-2").is_err());
        assert!(money.decode(b"$12.30-").is_err());
        assert!(money.decode(b"(-$1.00)").is_err());
        assert_eq!(money.decode(b"$-3.00").unwrap(), -300);
        assert_eq!(money.decode("€5".as_bytes()).unwrap(), 500);

        let francs = PgMoney::new("Fr.");
        assert_eq!(francs.decode(b"Fr.12.50").unwrap(), 1250);
        assert_eq!(francs.decode(b"-Fr.12.50").unwrap(), -1250);
        assert_eq!(encoded(francs.clone(), -1250i64), "-Fr.12.50");
        assert_eq!(francs.decode(encoded(francs.clone(), 99i64).as_bytes()).unwrap(), 99);
    }
}

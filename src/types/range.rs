//! Range codecs: `int4range`, `int8range`, `numrange`, `daterange`,
//! `tsrange` and `tstzrange`.
//!
//! Discrete ranges (integers, dates) are brought to the canonical `[lo,hi)`
//! form on both decode and encode, so `[1,5]` and `(0,6)` read as the same
//! value. Continuous ranges keep their brackets.
//!
//! Each codec also supports a `[Option<T>; 2]` pair view: `None` is an
//! unbounded side and present bounds are written `[lo,hi)`. The pair view
//! cannot hold the empty range, so it is an error in both directions.

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Bound;

use super::numeric::{Integer, PgInt4, PgInt8, PgNumeric};
use super::temporal::{PgDate, PgTimestamp, PgTimestamptz};
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;
use crate::grammar::range::{
    Discrete, RangeLiteral, check_order, normalize, parse_range, write_empty, write_range,
};

/// A range value. `Unbounded` sides are infinite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Range<T> {
    Empty,
    Span { lower: Bound<T>, upper: Bound<T> },
}

impl<T> Range<T> {
    pub fn new(lower: Bound<T>, upper: Bound<T>) -> Self {
        Range::Span { lower, upper }
    }

    /// `[lower,upper)`.
    pub fn closed_open(lower: T, upper: T) -> Self {
        Range::Span {
            lower: Bound::Included(lower),
            upper: Bound::Excluded(upper),
        }
    }

    /// `(,)`, every value.
    pub fn unbounded() -> Self {
        Range::Span {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Range::Empty)
    }

    pub fn lower(&self) -> Option<Bound<&T>> {
        match self {
            Range::Empty => None,
            Range::Span { lower, .. } => Some(lower.as_ref()),
        }
    }

    pub fn upper(&self) -> Option<Bound<&T>> {
        match self {
            Range::Empty => None,
            Range::Span { upper, .. } => Some(upper.as_ref()),
        }
    }
}

fn decode_bound<T, C: Codec<T>>(codec: &C, bound: Bound<&[u8]>) -> CodecResult<Bound<T>> {
    Ok(match bound {
        Bound::Included(span) => Bound::Included(codec.decode(span)?),
        Bound::Excluded(span) => Bound::Excluded(codec.decode(span)?),
        Bound::Unbounded => Bound::Unbounded,
    })
}

/// Decode keeping the literal's brackets.
fn decode_range<T, C: Codec<T>>(codec: &C, raw: &[u8]) -> CodecResult<Range<T>> {
    match parse_range(raw)? {
        RangeLiteral::Empty => Ok(Range::Empty),
        RangeLiteral::Bounds(spans) => Ok(Range::Span {
            lower: decode_bound(codec, spans.lower_bound())?,
            upper: decode_bound(codec, spans.upper_bound())?,
        }),
    }
}

/// Reject inverted bounds and collapse `[x,x)` style ranges to empty.
fn ordered<T: PartialOrd>(range: Range<T>) -> CodecResult<Range<T>> {
    match range {
        Range::Span { lower, upper } if !check_order(&lower, &upper)? => Ok(Range::Empty),
        range => Ok(range),
    }
}

fn canonical<T: Discrete>(range: Range<T>) -> CodecResult<Range<T>> {
    match range {
        Range::Empty => Ok(Range::Empty),
        Range::Span { lower, upper } => Ok(match normalize(lower, upper)? {
            Some((lower, upper)) => Range::Span { lower, upper },
            None => Range::Empty,
        }),
    }
}

fn encode_bound<T, C: Codec<T>>(codec: &C, bound: Bound<&T>) -> CodecResult<Bound<BytesMut>> {
    let scratch = |value: &T| -> CodecResult<BytesMut> {
        let mut buf = BytesMut::new();
        codec.encode(value, &mut buf)?;
        Ok(buf)
    };
    Ok(match bound {
        Bound::Included(value) => Bound::Included(scratch(value)?),
        Bound::Excluded(value) => Bound::Excluded(scratch(value)?),
        Bound::Unbounded => Bound::Unbounded,
    })
}

fn as_span(bound: &Bound<BytesMut>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(buf) => Bound::Included(&buf[..]),
        Bound::Excluded(buf) => Bound::Excluded(&buf[..]),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Encode with the brackets as given.
fn encode_range<T, C: Codec<T>>(codec: &C, range: &Range<T>, buf: &mut BytesMut) -> CodecResult<()> {
    match range {
        Range::Empty => write_empty(buf),
        Range::Span { lower, upper } => {
            let lower = encode_bound(codec, lower.as_ref())?;
            let upper = encode_bound(codec, upper.as_ref())?;
            write_range(as_span(&lower), as_span(&upper), buf);
        }
    }
    Ok(())
}

fn bound_value<T>(bound: Bound<T>) -> Option<T> {
    match bound {
        Bound::Included(v) | Bound::Excluded(v) => Some(v),
        Bound::Unbounded => None,
    }
}

fn pair_of<T>(range: Range<T>) -> CodecResult<[Option<T>; 2]> {
    match range {
        Range::Empty => Err(CodecError::Unsupported("empty range in pair view")),
        Range::Span { lower, upper } => Ok([bound_value(lower), bound_value(upper)]),
    }
}

fn non_empty<T>(range: Range<T>) -> CodecResult<Range<T>> {
    match range {
        Range::Empty => Err(CodecError::Unsupported("empty range in pair view")),
        range => Ok(range),
    }
}

/// `[lo,hi)` with `None` sides unbounded.
fn range_of<T: Clone>([lower, upper]: &[Option<T>; 2]) -> Range<T> {
    Range::Span {
        lower: lower.clone().map_or(Bound::Unbounded, Bound::Included),
        upper: upper.clone().map_or(Bound::Unbounded, Bound::Excluded),
    }
}

// Discrete codecs share one body; integers are generic over the target
// width, dates are stamped per type.
macro_rules! discrete_range_impls {
    ($codec:ident => $element:ident; impl<$t:ident: $($bound:path),+>) => {
        impl<$t: $($bound +)+ Discrete + Clone> Codec<Range<$t>> for $codec {
            discrete_range_impls!(@range $element, $t);
        }

        impl<$t: $($bound +)+ Discrete + Clone> Codec<[Option<$t>; 2]> for $codec {
            discrete_range_impls!(@pair $element, $t);
        }
    };
    ($codec:ident => $element:ident; $t:ty) => {
        impl Codec<Range<$t>> for $codec {
            discrete_range_impls!(@range $element, $t);
        }

        impl Codec<[Option<$t>; 2]> for $codec {
            discrete_range_impls!(@pair $element, $t);
        }
    };
    (@range $element:ident, $t:ty) => {
        fn encode(&self, value: &Range<$t>, buf: &mut BytesMut) -> CodecResult<()> {
            encode_range(&$element, &canonical(value.clone())?, buf)
        }

        fn decode(&self, raw: &[u8]) -> CodecResult<Range<$t>> {
            canonical(decode_range(&$element, raw)?)
        }
    };
    (@pair $element:ident, $t:ty) => {
        fn encode(&self, value: &[Option<$t>; 2], buf: &mut BytesMut) -> CodecResult<()> {
            encode_range(&$element, &non_empty(canonical(range_of(value))?)?, buf)
        }

        fn decode(&self, raw: &[u8]) -> CodecResult<[Option<$t>; 2]> {
            pair_of(canonical(decode_range(&$element, raw)?)?)
        }
    };
}

macro_rules! continuous_range_impls {
    ($codec:ident => $element:ident; $($t:ty),+) => {
        $(
            impl Codec<Range<$t>> for $codec {
                fn encode(&self, value: &Range<$t>, buf: &mut BytesMut) -> CodecResult<()> {
                    match value {
                        Range::Span { lower, upper } if !check_order(lower, upper)? => {
                            write_empty(buf);
                            Ok(())
                        }
                        value => encode_range(&$element, value, buf),
                    }
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<Range<$t>> {
                    ordered(decode_range(&$element, raw)?)
                }
            }

            /// Inclusivity is ignored on decode.
            impl Codec<[Option<$t>; 2]> for $codec {
                fn encode(&self, value: &[Option<$t>; 2], buf: &mut BytesMut) -> CodecResult<()> {
                    encode_range(&$element, &non_empty(ordered(range_of(value))?)?, buf)
                }

                fn decode(&self, raw: &[u8]) -> CodecResult<[Option<$t>; 2]> {
                    pair_of(ordered(decode_range(&$element, raw)?)?)
                }
            }
        )+
    };
}

macro_rules! range_codec {
    ($($(#[$meta:meta])* $codec:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $codec;

            impl ArrayElement for $codec {
                const LEXER: Lexer = Lexer::Composite;
            }
        )*
    };
}

range_codec!(
    /// `int4range`, discrete.
    PgInt4Range,
    /// `int8range`, discrete.
    PgInt8Range,
    /// `numrange`, continuous.
    PgNumRange,
    /// `daterange`, discrete.
    PgDateRange,
    /// `tsrange`, continuous.
    PgTsRange,
    /// `tstzrange`, continuous.
    PgTstzRange,
);

discrete_range_impls!(PgInt4Range => PgInt4; impl<T: Integer>);
discrete_range_impls!(PgInt8Range => PgInt8; impl<T: Integer>);
discrete_range_impls!(PgDateRange => PgDate; NaiveDate);
continuous_range_impls!(PgNumRange => PgNumeric; Decimal, f64);
continuous_range_impls!(PgTsRange => PgTimestamp; NaiveDateTime);
continuous_range_impls!(PgTstzRange => PgTimestamptz; DateTime<FixedOffset>, DateTime<Utc>);

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T, C: Codec<T>>(codec: C, value: &T) -> String {
        String::from_utf8(codec.to_bytes(value).unwrap().to_vec()).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_int_range_normalized() {
        let r: Range<i32> = PgInt4Range.decode(b"(1,5]").unwrap();
        assert_eq!(r, Range::closed_open(2, 6));
        assert_eq!(encoded(PgInt4Range, &r), "[2,6)");

        let r = Range::new(Bound::Excluded(1i64), Bound::Included(5));
        assert_eq!(encoded(PgInt8Range, &r), "[2,6)");
    }

    #[test]
    fn test_int_range_empty_and_unbounded() {
        let r: Range<i32> = PgInt4Range.decode(b"(1,2)").unwrap();
        assert!(r.is_empty());
        let r: Range<i32> = PgInt4Range.decode(b"EMPTY").unwrap();
        assert!(r.is_empty());
        assert_eq!(encoded(PgInt4Range, &Range::<i32>::Empty), "empty");

        let r: Range<i32> = PgInt4Range.decode(b"(,5]").unwrap();
        assert_eq!(r, Range::new(Bound::Unbounded, Bound::Excluded(6)));
        assert_eq!(encoded(PgInt4Range, &Range::<i32>::unbounded()), "(,)");
    }

    #[test]
    fn test_int_range_overflow() {
        assert!(matches!(
            Codec::<Range<i8>>::decode(&PgInt4Range, b"[0,127]"),
            Err(CodecError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_int_range_pair_view() {
        let pair: [Option<i32>; 2] = PgInt4Range.decode(b"[1,10]").unwrap();
        assert_eq!(pair, [Some(1), Some(11)]);
        let pair: [Option<i32>; 2] = PgInt4Range.decode(b"[3,)").unwrap();
        assert_eq!(pair, [Some(3), None]);
        assert_eq!(encoded(PgInt4Range, &[Some(1i32), Some(4)]), "[1,4)");
    }

    #[test]
    fn test_pair_view_rejects_empty() {
        assert!(matches!(
            PgInt4Range.to_bytes(&[Some(4i32), Some(4)]),
            Err(CodecError::Unsupported(_))
        ));
        assert!(matches!(
            Codec::<[Option<i32>; 2]>::decode(&PgInt4Range, b"empty"),
            Err(CodecError::Unsupported(_))
        ));
        assert!(Codec::<[Option<i32>; 2]>::decode(&PgInt4Range, b"(1,2)").is_err());
        assert!(PgNumRange.to_bytes(&[Some(1.5f64), Some(1.5)]).is_err());
        assert!(Codec::<[Option<f64>; 2]>::decode(&PgNumRange, b"empty").is_err());

        // unbounded on both sides is a real value, not a stand-in for empty
        let pair: [Option<i32>; 2] = PgInt4Range.decode(b"(,)").unwrap();
        assert_eq!(pair, [None, None]);
        assert_eq!(encoded(PgInt4Range, &pair), "(,)");
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            Codec::<Range<i32>>::decode(&PgInt4Range, b"[5,1)"),
            Err(CodecError::Malformed { kind: "range", .. })
        ));
        assert!(Codec::<Range<NaiveDate>>::decode(&PgDateRange, b"[2001-01-02,2001-01-01]").is_err());
        assert!(Codec::<Range<Decimal>>::decode(&PgNumRange, b"[2.5,1.5]").is_err());
        assert!(PgInt4Range.to_bytes(&Range::closed_open(5i32, 1)).is_err());
        assert!(PgNumRange.to_bytes(&Range::closed_open(2.5f64, 1.5)).is_err());

        // equal bounds are empty unless both are inclusive
        let r: Range<i32> = PgInt4Range.decode(b"[1,1)").unwrap();
        assert!(r.is_empty());
        let r: Range<i32> = PgInt4Range.decode(b"[1,1]").unwrap();
        assert_eq!(r, Range::closed_open(1, 2));
        let r: Range<Decimal> = PgNumRange.decode(b"(1.5,1.5]").unwrap();
        assert!(r.is_empty());
        assert_eq!(encoded(PgNumRange, &Range::closed_open(1.5f64, 1.5)), "empty");
        let r: Range<Decimal> = PgNumRange.decode(b"[1.5,1.5]").unwrap();
        assert_eq!(encoded(PgNumRange, &r), "[1.5,1.5]");
    }

    #[test]
    fn test_date_range() {
        let r: Range<NaiveDate> = PgDateRange.decode(b"[1999-01-08,2001-05-05]").unwrap();
        assert_eq!(
            r,
            Range::closed_open(ymd(1999, 1, 8), ymd(2001, 5, 6))
        );
        let same: Range<NaiveDate> = PgDateRange.decode(b"(1999-01-07,2001-05-06)").unwrap();
        assert_eq!(r, same);
        assert_eq!(encoded(PgDateRange, &r), "[1999-01-08,2001-05-06)");
    }

    #[test]
    fn test_date_range_infinity_not_shifted() {
        let r: Range<NaiveDate> = PgDateRange.decode(b"[2000-01-01,infinity]").unwrap();
        assert_eq!(
            r,
            Range::new(Bound::Included(ymd(2000, 1, 1)), Bound::Included(NaiveDate::MAX))
        );
    }

    #[test]
    fn test_num_range_keeps_brackets() {
        let r: Range<Decimal> = PgNumRange.decode(b"(1.5,2.5]").unwrap();
        assert_eq!(
            r,
            Range::new(
                Bound::Excluded(Decimal::new(15, 1)),
                Bound::Included(Decimal::new(25, 1))
            )
        );
        assert_eq!(encoded(PgNumRange, &r), "(1.5,2.5]");

        let pair: [Option<f64>; 2] = PgNumRange.decode(b"(1.5,2.5]").unwrap();
        assert_eq!(pair, [Some(1.5), Some(2.5)]);
        assert_eq!(encoded(PgNumRange, &[None, Some(2.5f64)]), "(,2.5)");
    }

    #[test]
    fn test_timestamp_ranges_quote_bounds() {
        let raw = br#"["2001-01-01 00:00:00","2001-01-02 00:00:00")"#;
        let r: Range<NaiveDateTime> = PgTsRange.decode(raw).unwrap();
        assert_eq!(encoded(PgTsRange, &r), String::from_utf8(raw.to_vec()).unwrap());

        let r: Range<DateTime<Utc>> = PgTstzRange
            .decode(br#"["2001-01-01 00:00:00+02",)"#)
            .unwrap();
        assert_eq!(encoded(PgTstzRange, &r), r#"["2000-12-31 22:00:00+00",)"#);
    }
}

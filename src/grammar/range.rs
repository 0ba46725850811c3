//! Range literal parser, writer and discrete-bound normalizer.
//!
//! `[` / `]` mark an inclusive bound, `(` / `)` an exclusive one, an empty
//! bound span is unbounded and `empty` is the empty range.

use bytes::BytesMut;
use std::borrow::Cow;
use std::ops::Bound;

use super::escape::{needs_bound_quote, quote};
use super::trim;
use crate::error::{CodecError, CodecResult};

/// Raw bound spans of a non-empty range literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpans<'a> {
    pub lower: Option<Cow<'a, [u8]>>,
    pub upper: Option<Cow<'a, [u8]>>,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
}

impl<'a> RangeSpans<'a> {
    /// Lower bound with its inclusivity folded in.
    pub fn lower_bound(&self) -> Bound<&[u8]> {
        as_bound(self.lower.as_deref(), self.lower_inclusive)
    }

    /// Upper bound with its inclusivity folded in.
    pub fn upper_bound(&self) -> Bound<&[u8]> {
        as_bound(self.upper.as_deref(), self.upper_inclusive)
    }
}

fn as_bound(span: Option<&[u8]>, inclusive: bool) -> Bound<&[u8]> {
    match span {
        None => Bound::Unbounded,
        Some(span) if inclusive => Bound::Included(span),
        Some(span) => Bound::Excluded(span),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeLiteral<'a> {
    Empty,
    Bounds(RangeSpans<'a>),
}

/// Split a range literal into its bound spans and inclusivity flags.
pub fn parse_range(literal: &[u8]) -> CodecResult<RangeLiteral<'_>> {
    let literal = trim(literal);
    if literal.eq_ignore_ascii_case(b"empty") {
        return Ok(RangeLiteral::Empty);
    }
    let [open, inner @ .., close] = literal else {
        return Err(CodecError::malformed("range", "too short"));
    };
    let lower_inclusive = match open {
        b'[' => true,
        b'(' => false,
        _ => return Err(CodecError::malformed("range", "expected '[' or '('")),
    };
    let upper_inclusive = match close {
        b']' => true,
        b')' => false,
        _ => return Err(CodecError::malformed("range", "expected ']' or ')'")),
    };
    let comma = find_separator(inner)?;
    Ok(RangeLiteral::Bounds(RangeSpans {
        lower: bound_span(&inner[..comma]),
        upper: bound_span(&inner[comma + 1..]),
        lower_inclusive,
        upper_inclusive,
    }))
}

fn find_separator(inner: &[u8]) -> CodecResult<usize> {
    let mut in_quotes = false;
    let mut separator = None;
    let mut i = 0;
    while i < inner.len() {
        match inner[i] {
            b'\\' => i += 1,
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                if separator.replace(i).is_some() {
                    return Err(CodecError::malformed("range", "more than one ',' between bounds"));
                }
            }
            _ => {}
        }
        i += 1;
    }
    if in_quotes {
        return Err(CodecError::malformed("range", "unterminated quoted bound"));
    }
    separator.ok_or_else(|| CodecError::malformed("range", "missing ',' between bounds"))
}

fn bound_span(span: &[u8]) -> Option<Cow<'_, [u8]>> {
    let span = trim(span);
    if span.is_empty() {
        return None;
    }
    if !span.iter().any(|&b| b == b'"' || b == b'\\') {
        return Some(Cow::Borrowed(span));
    }
    let mut out = Vec::with_capacity(span.len());
    let mut in_quotes = false;
    let mut i = 0;
    while i < span.len() {
        match span[i] {
            b'\\' => {
                if let Some(&next) = span.get(i + 1) {
                    out.push(next);
                }
                i += 1;
            }
            // "" inside a quoted bound is a literal quote
            b'"' if in_quotes && span.get(i + 1) == Some(&b'"') => {
                out.push(b'"');
                i += 1;
            }
            b'"' => in_quotes = !in_quotes,
            b => out.push(b),
        }
        i += 1;
    }
    Some(Cow::Owned(out))
}

/// Write `[lo,hi)`-style syntax. Unbounded sides are always written with
/// exclusive brackets and an empty span.
pub fn write_range(lower: Bound<&[u8]>, upper: Bound<&[u8]>, buf: &mut BytesMut) {
    buf.extend_from_slice(match lower {
        Bound::Included(_) => b"[",
        _ => b"(",
    });
    if let Bound::Included(span) | Bound::Excluded(span) = lower {
        write_bound(span, buf);
    }
    buf.extend_from_slice(b",");
    if let Bound::Included(span) | Bound::Excluded(span) = upper {
        write_bound(span, buf);
    }
    buf.extend_from_slice(match upper {
        Bound::Included(_) => b"]",
        _ => b")",
    });
}

/// Write the `empty` range literal.
pub fn write_empty(buf: &mut BytesMut) {
    buf.extend_from_slice(b"empty");
}

fn write_bound(span: &[u8], buf: &mut BytesMut) {
    if needs_bound_quote(span) {
        quote(span, buf);
    } else {
        buf.extend_from_slice(span);
    }
}

/// Element types with a well-defined successor (integers, dates).
pub trait Discrete: PartialOrd + Sized {
    /// The next representable value, or `None` on overflow.
    fn successor(&self) -> Option<Self>;

    /// `infinity` / `-infinity` sentinels are never shifted.
    fn is_infinite(&self) -> bool {
        false
    }
}

/// Reject a lower bound above the upper bound. Returns `false` when the
/// bounds are equal and not both inclusive, which leaves the range empty.
pub fn check_order<T: PartialOrd>(lower: &Bound<T>, upper: &Bound<T>) -> CodecResult<bool> {
    let (Bound::Included(lo) | Bound::Excluded(lo), Bound::Included(hi) | Bound::Excluded(hi)) =
        (lower, upper)
    else {
        return Ok(true);
    };
    if lo > hi {
        return Err(CodecError::malformed(
            "range",
            "lower bound must be less than or equal to upper bound",
        ));
    }
    let closed = matches!((lower, upper), (Bound::Included(_), Bound::Included(_)));
    Ok(lo != hi || closed)
}

/// Shift bounds to the canonical lower-inclusive/upper-exclusive form
/// without changing the represented set. Returns `None` when the range
/// turns out to be empty.
pub fn normalize<T: Discrete>(
    lower: Bound<T>,
    upper: Bound<T>,
) -> CodecResult<Option<(Bound<T>, Bound<T>)>> {
    if !check_order(&lower, &upper)? {
        return Ok(None);
    }
    let lower = match lower {
        Bound::Excluded(v) if !v.is_infinite() => Bound::Included(successor(&v)?),
        other => other,
    };
    let upper = match upper {
        Bound::Included(v) if !v.is_infinite() => Bound::Excluded(successor(&v)?),
        other => other,
    };
    if let (Bound::Included(lo), Bound::Excluded(hi)) = (&lower, &upper) {
        if lo >= hi {
            return Ok(None);
        }
    }
    Ok(Some((lower, upper)))
}

fn successor<T: Discrete>(value: &T) -> CodecResult<T> {
    value
        .successor()
        .ok_or_else(|| CodecError::OutOfRange("range bound has no successor".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, PartialOrd)]
    struct N(i32);

    impl Discrete for N {
        fn successor(&self) -> Option<Self> {
            self.0.checked_add(1).map(N)
        }
    }

    fn bounds(literal: &[u8]) -> RangeSpans<'_> {
        match parse_range(literal).unwrap() {
            RangeLiteral::Bounds(spans) => spans,
            RangeLiteral::Empty => panic!("unexpected empty range"),
        }
    }

    #[test]
    fn test_parse_inclusivity() {
        let spans = bounds(b"[1,10)");
        assert_eq!(spans.lower_bound(), Bound::Included(&b"1"[..]));
        assert_eq!(spans.upper_bound(), Bound::Excluded(&b"10"[..]));

        let spans = bounds(b"(1999-01-07,2001-05-06]");
        assert!(!spans.lower_inclusive);
        assert!(spans.upper_inclusive);
    }

    #[test]
    fn test_parse_unbounded() {
        let spans = bounds(b"(,)");
        assert_eq!(spans.lower_bound(), Bound::Unbounded);
        assert_eq!(spans.upper_bound(), Bound::Unbounded);

        let spans = bounds(b"[5,)");
        assert_eq!(spans.lower_bound(), Bound::Included(&b"5"[..]));
        assert_eq!(spans.upper_bound(), Bound::Unbounded);
    }

    #[test]
    fn test_parse_quoted_bounds() {
        let spans = bounds(br#"["2001-01-01 00:00:00","2001-01-02 00:00:00")"#);
        assert_eq!(spans.lower.as_deref(), Some(&b"2001-01-01 00:00:00"[..]));
        assert_eq!(spans.upper.as_deref(), Some(&b"2001-01-02 00:00:00"[..]));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert_eq!(parse_range(b"empty").unwrap(), RangeLiteral::Empty);
        assert!(parse_range(b"[1,2").is_err());
        assert!(parse_range(b"{1,2}").is_err());
        assert!(parse_range(b"[1;2)").is_err());
        assert!(parse_range(b"[1,2,3)").is_err());
    }

    #[test]
    fn test_write_range() {
        let mut buf = BytesMut::new();
        write_range(Bound::Included(&b"1"[..]), Bound::Excluded(&b"5"[..]), &mut buf);
        assert_eq!(&buf[..], b"[1,5)");

        buf.clear();
        write_range(Bound::Unbounded, Bound::Unbounded, &mut buf);
        assert_eq!(&buf[..], b"(,)");

        buf.clear();
        write_range(Bound::Included(&b"a b"[..]), Bound::Included(&b"c"[..]), &mut buf);
        assert_eq!(&buf[..], br#"["a b",c]"#);
    }

    #[test]
    fn test_normalize() {
        let got = normalize(Bound::Excluded(N(1)), Bound::Included(N(5))).unwrap();
        assert_eq!(got, Some((Bound::Included(N(2)), Bound::Excluded(N(6)))));

        // already canonical: no-op
        let got = normalize(Bound::Included(N(2)), Bound::Excluded(N(6))).unwrap();
        assert_eq!(got, Some((Bound::Included(N(2)), Bound::Excluded(N(6)))));

        let got = normalize(Bound::Unbounded, Bound::Included(N(0))).unwrap();
        assert_eq!(got, Some((Bound::Unbounded, Bound::Excluded(N(1)))));

        assert_eq!(normalize(Bound::Excluded(N(1)), Bound::Excluded(N(2))).unwrap(), None);
        assert!(normalize(Bound::Included(N(0)), Bound::Included(N(i32::MAX))).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(matches!(
            normalize(Bound::Included(N(5)), Bound::Excluded(N(1))),
            Err(CodecError::Malformed { kind: "range", .. })
        ));
        assert!(check_order(&Bound::Excluded(2.5), &Bound::Included(1.0)).is_err());

        assert_eq!(normalize(Bound::Included(N(1)), Bound::Excluded(N(1))).unwrap(), None);
        assert!(!check_order(&Bound::Included(1.0), &Bound::Excluded(1.0)).unwrap());
        assert!(check_order(&Bound::Included(1.0), &Bound::Included(1.0)).unwrap());
        assert!(check_order(&Bound::Unbounded, &Bound::Included(-1.0)).unwrap());
    }
}

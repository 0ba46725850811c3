//! Coordinate splitters for the geometric literals.
//!
//! | type    | literal             |
//! |---------|---------------------|
//! | point   | `(x,y)`             |
//! | line    | `{a,b,c}`           |
//! | lseg    | `[(x1,y1),(x2,y2)]` |
//! | box     | `(x1,y1),(x2,y2)`   |
//! | path    | `[(x,y),...]` open, `((x,y),...)` closed |
//! | polygon | `((x,y),...)`       |

use super::trim;
use crate::error::{CodecError, CodecResult};

/// Raw `x`/`y` spans of one point.
pub type PointSpans<'a> = [&'a [u8]; 2];

pub fn split_point(literal: &[u8]) -> CodecResult<PointSpans<'_>> {
    split_fixed(strip(literal, b'(', b')', "point")?, "point")
}

pub fn split_line(literal: &[u8]) -> CodecResult<[&[u8]; 3]> {
    split_fixed(strip(literal, b'{', b'}', "line")?, "line")
}

pub fn split_lseg(literal: &[u8]) -> CodecResult<[&[u8]; 4]> {
    let inner = strip(literal, b'[', b']', "lseg")?;
    corner_pair(inner, "lseg")
}

pub fn split_box(literal: &[u8]) -> CodecResult<[&[u8]; 4]> {
    corner_pair(trim(literal), "box")
}

/// Split a path literal. Returns `true` for a closed path.
pub fn split_path(literal: &[u8]) -> CodecResult<(bool, Vec<PointSpans<'_>>)> {
    let literal = trim(literal);
    let closed = match literal.first() {
        Some(b'[') => false,
        Some(b'(') => true,
        _ => return Err(CodecError::malformed("path", "expected '[' or '('")),
    };
    let inner = if closed {
        strip(literal, b'(', b')', "path")?
    } else {
        strip(literal, b'[', b']', "path")?
    };
    Ok((closed, split_points(inner, "path")?))
}

pub fn split_polygon(literal: &[u8]) -> CodecResult<Vec<PointSpans<'_>>> {
    split_points(strip(literal, b'(', b')', "polygon")?, "polygon")
}

/// Split `(x,y),(x,y),...` into per-point spans.
pub fn split_points<'a>(list: &'a [u8], kind: &'static str) -> CodecResult<Vec<PointSpans<'a>>> {
    let mut points = Vec::new();
    let mut rest = trim(list);
    while !rest.is_empty() {
        if rest[0] != b'(' {
            return Err(CodecError::malformed(kind, "expected '(' before point"));
        }
        let close = rest
            .iter()
            .position(|&b| b == b')')
            .ok_or_else(|| CodecError::malformed(kind, "unterminated point"))?;
        points.push(split_fixed(&rest[1..close], kind)?);
        rest = trim(&rest[close + 1..]);
        match rest {
            [] => break,
            [b',', tail @ ..] if !tail.is_empty() => rest = trim(tail),
            _ => return Err(CodecError::malformed(kind, "expected ',' between points")),
        }
    }
    Ok(points)
}

fn corner_pair<'a>(list: &'a [u8], kind: &'static str) -> CodecResult<[&'a [u8]; 4]> {
    match split_points(list, kind)?.as_slice() {
        [[x1, y1], [x2, y2]] => Ok([*x1, *y1, *x2, *y2]),
        points => Err(CodecError::malformed(
            kind,
            format!("expected 2 points, got {}", points.len()),
        )),
    }
}

fn strip<'a>(literal: &'a [u8], open: u8, close: u8, kind: &'static str) -> CodecResult<&'a [u8]> {
    match trim(literal) {
        [first, inner @ .., last] if *first == open && *last == close => Ok(inner),
        _ => Err(CodecError::malformed(
            kind,
            format!("expected '{}' ... '{}'", open as char, close as char),
        )),
    }
}

fn split_fixed<'a, const N: usize>(inner: &'a [u8], kind: &'static str) -> CodecResult<[&'a [u8]; N]> {
    let mut spans = [&b""[..]; N];
    let mut parts = inner.split(|&b| b == b',');
    for (i, slot) in spans.iter_mut().enumerate() {
        let part = parts
            .next()
            .ok_or_else(|| CodecError::malformed(kind, format!("expected {N} values, got {i}")))?;
        *slot = trim(part);
    }
    if parts.next().is_some() {
        return Err(CodecError::malformed(kind, format!("more than {N} values")));
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_point() {
        assert_eq!(split_point(b"(1.5,-2)").unwrap(), [&b"1.5"[..], b"-2"]);
        assert!(split_point(b"1,2").is_err());
        assert!(split_point(b"(1,2,3)").is_err());
        assert!(split_point(b"(1)").is_err());
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line(b"{1,-1,0}").unwrap(), [&b"1"[..], b"-1", b"0"]);
    }

    #[test]
    fn test_split_lseg_and_box() {
        assert_eq!(
            split_lseg(b"[(1,2),(3,4)]").unwrap(),
            [&b"1"[..], b"2", b"3", b"4"]
        );
        assert_eq!(
            split_box(b"(3,4),(1,2)").unwrap(),
            [&b"3"[..], b"4", b"1", b"2"]
        );
        assert!(split_box(b"(3,4)").is_err());
        assert!(split_box(b"(3,4),(1,2),(0,0)").is_err());
    }

    #[test]
    fn test_split_path() {
        let (closed, points) = split_path(b"[(0,0),(1,1),(2,0)]").unwrap();
        assert!(!closed);
        assert_eq!(points.len(), 3);

        let (closed, points) = split_path(b"((0,0),(1,1))").unwrap();
        assert!(closed);
        assert_eq!(points[1], [&b"1"[..], b"1"]);
    }

    #[test]
    fn test_split_polygon() {
        let points = split_polygon(b"((0,0),(0,1),(1,1))").unwrap();
        assert_eq!(points.len(), 3);
        assert!(split_polygon(b"((0,0),)").is_err());
        assert!(split_polygon(b"((0,0)(1,1))").is_err());
    }
}

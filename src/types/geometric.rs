//! Geometric codecs: `point`, `line`, `lseg`, `box`, `path` and `polygon`.
//!
//! Coordinates are `f64` written in shortest round-trip form. Inside arrays
//! these types use the composite lexer; `box` arrays are `;`-delimited.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use super::numeric::{decode_float, write_f64};
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::Lexer;
use crate::grammar::geometry::{
    PointSpans, split_box, split_line, split_lseg, split_path, split_point, split_polygon,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Infinite line `a*x + b*y + c = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

/// Axis-aligned rectangle stored as its upper-right and lower-left corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub high: Point,
    pub low: Point,
}

impl BoundingBox {
    /// Box spanned by any two opposite corners.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            high: Point::new(a.x.max(b.x), a.y.max(b.y)),
            low: Point::new(a.x.min(b.x), a.y.min(b.y)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

fn coordinate(span: &[u8], kind: &'static str) -> CodecResult<f64> {
    decode_float(span, kind)
}

fn point_from([x, y]: PointSpans<'_>, kind: &'static str) -> CodecResult<Point> {
    Ok(Point::new(coordinate(x, kind)?, coordinate(y, kind)?))
}

fn points_from(spans: Vec<PointSpans<'_>>, kind: &'static str) -> CodecResult<Vec<Point>> {
    if spans.is_empty() {
        return Err(CodecError::malformed(kind, "at least one point is required"));
    }
    spans.into_iter().map(|p| point_from(p, kind)).collect()
}

fn write_point(point: &Point, buf: &mut BytesMut) {
    buf.extend_from_slice(b"(");
    write_f64(point.x, buf);
    buf.extend_from_slice(b",");
    write_f64(point.y, buf);
    buf.extend_from_slice(b")");
}

fn write_points<'a>(points: impl IntoIterator<Item = &'a Point>, buf: &mut BytesMut) {
    for (i, point) in points.into_iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b",");
        }
        write_point(point, buf);
    }
}

/// `point`, written `(x,y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgPoint;

impl Codec<Point> for PgPoint {
    fn encode(&self, value: &Point, buf: &mut BytesMut) -> CodecResult<()> {
        write_point(value, buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Point> {
        point_from(split_point(raw)?, "point")
    }
}

impl Codec<[f64; 2]> for PgPoint {
    fn encode(&self, [x, y]: &[f64; 2], buf: &mut BytesMut) -> CodecResult<()> {
        write_point(&Point::new(*x, *y), buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[f64; 2]> {
        let p: Point = self.decode(raw)?;
        Ok([p.x, p.y])
    }
}

impl ArrayElement for PgPoint {
    const LEXER: Lexer = Lexer::Composite;
}

/// `line`, written `{a,b,c}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgLine;

impl Codec<Line> for PgLine {
    fn encode(&self, value: &Line, buf: &mut BytesMut) -> CodecResult<()> {
        buf.extend_from_slice(b"{");
        write_f64(value.a, buf);
        buf.extend_from_slice(b",");
        write_f64(value.b, buf);
        buf.extend_from_slice(b",");
        write_f64(value.c, buf);
        buf.extend_from_slice(b"}");
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Line> {
        let [a, b, c] = split_line(raw)?;
        let line = Line {
            a: coordinate(a, "line")?,
            b: coordinate(b, "line")?,
            c: coordinate(c, "line")?,
        };
        if line.a == 0.0 && line.b == 0.0 {
            return Err(CodecError::parse("line", raw, "A and B cannot both be zero"));
        }
        Ok(line)
    }
}

impl Codec<[f64; 3]> for PgLine {
    fn encode(&self, &[a, b, c]: &[f64; 3], buf: &mut BytesMut) -> CodecResult<()> {
        self.encode(&Line { a, b, c }, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[f64; 3]> {
        let line: Line = self.decode(raw)?;
        Ok([line.a, line.b, line.c])
    }
}

impl ArrayElement for PgLine {
    const LEXER: Lexer = Lexer::Composite;
}

/// `lseg`, written `[(x1,y1),(x2,y2)]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgLseg;

impl Codec<LineSegment> for PgLseg {
    fn encode(&self, value: &LineSegment, buf: &mut BytesMut) -> CodecResult<()> {
        buf.extend_from_slice(b"[");
        write_points([&value.start, &value.end], buf);
        buf.extend_from_slice(b"]");
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<LineSegment> {
        let [x1, y1, x2, y2] = split_lseg(raw)?;
        Ok(LineSegment {
            start: point_from([x1, y1], "lseg")?,
            end: point_from([x2, y2], "lseg")?,
        })
    }
}

impl Codec<[Point; 2]> for PgLseg {
    fn encode(&self, [start, end]: &[Point; 2], buf: &mut BytesMut) -> CodecResult<()> {
        self.encode(
            &LineSegment {
                start: *start,
                end: *end,
            },
            buf,
        )
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[Point; 2]> {
        let seg: LineSegment = self.decode(raw)?;
        Ok([seg.start, seg.end])
    }
}

impl ArrayElement for PgLseg {
    const LEXER: Lexer = Lexer::Composite;
}

/// `box`, written `(x1,y1),(x2,y2)` upper-right corner first. Corners are
/// reordered on both decode and encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgBox;

impl Codec<BoundingBox> for PgBox {
    fn encode(&self, value: &BoundingBox, buf: &mut BytesMut) -> CodecResult<()> {
        let canonical = BoundingBox::new(value.high, value.low);
        write_points([&canonical.high, &canonical.low], buf);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<BoundingBox> {
        let [x1, y1, x2, y2] = split_box(raw)?;
        Ok(BoundingBox::new(
            point_from([x1, y1], "box")?,
            point_from([x2, y2], "box")?,
        ))
    }
}

impl Codec<[Point; 2]> for PgBox {
    fn encode(&self, [a, b]: &[Point; 2], buf: &mut BytesMut) -> CodecResult<()> {
        self.encode(&BoundingBox::new(*a, *b), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<[Point; 2]> {
        let bx: BoundingBox = self.decode(raw)?;
        Ok([bx.high, bx.low])
    }
}

impl ArrayElement for PgBox {
    const LEXER: Lexer = Lexer::Composite;
    const DELIMITER: u8 = b';';
}

/// `path`: `[...]` when open, `(...)` when closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgPath;

impl Codec<Path> for PgPath {
    fn encode(&self, value: &Path, buf: &mut BytesMut) -> CodecResult<()> {
        if value.points.is_empty() {
            return Err(CodecError::malformed("path", "at least one point is required"));
        }
        let (open, close) = if value.closed { (b"(", b")") } else { (b"[", b"]") };
        buf.extend_from_slice(open);
        write_points(&value.points, buf);
        buf.extend_from_slice(close);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Path> {
        let (closed, spans) = split_path(raw)?;
        Ok(Path {
            points: points_from(spans, "path")?,
            closed,
        })
    }
}

/// Points only: encodes an open path and ignores closedness on decode.
impl Codec<Vec<Point>> for PgPath {
    fn encode(&self, value: &Vec<Point>, buf: &mut BytesMut) -> CodecResult<()> {
        self.encode(
            &Path {
                points: value.clone(),
                closed: false,
            },
            buf,
        )
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<Point>> {
        let path: Path = self.decode(raw)?;
        Ok(path.points)
    }
}

impl ArrayElement for PgPath {
    const LEXER: Lexer = Lexer::Composite;
}

/// `polygon`, written `((x,y),...)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgPolygon;

impl Codec<Polygon> for PgPolygon {
    fn encode(&self, value: &Polygon, buf: &mut BytesMut) -> CodecResult<()> {
        if value.points.is_empty() {
            return Err(CodecError::malformed("polygon", "at least one point is required"));
        }
        buf.extend_from_slice(b"(");
        write_points(&value.points, buf);
        buf.extend_from_slice(b")");
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Polygon> {
        Ok(Polygon {
            points: points_from(split_polygon(raw)?, "polygon")?,
        })
    }
}

impl Codec<Vec<Point>> for PgPolygon {
    fn encode(&self, value: &Vec<Point>, buf: &mut BytesMut) -> CodecResult<()> {
        self.encode(
            &Polygon {
                points: value.clone(),
            },
            buf,
        )
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<Vec<Point>> {
        let polygon: Polygon = self.decode(raw)?;
        Ok(polygon.points)
    }
}

impl ArrayElement for PgPolygon {
    const LEXER: Lexer = Lexer::Composite;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T, C: Codec<T>>(codec: C, value: &T) -> String {
        String::from_utf8(codec.to_bytes(value).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_point() {
        let p: Point = PgPoint.decode(b"(1.5, -2)").unwrap();
        assert_eq!(p, Point::new(1.5, -2.0));
        assert_eq!(encoded(PgPoint, &p), "(1.5,-2)");
        let xy: [f64; 2] = PgPoint.decode(b"(0,0.1)").unwrap();
        assert_eq!(xy, [0.0, 0.1]);
        assert!(Codec::<Point>::decode(&PgPoint, b"(1,x)").is_err());
    }

    #[test]
    fn test_line() {
        let line: Line = PgLine.decode(b"{1,-1,0}").unwrap();
        assert_eq!(line, Line { a: 1.0, b: -1.0, c: 0.0 });
        assert_eq!(encoded(PgLine, &line), "{1,-1,0}");
        assert!(Codec::<Line>::decode(&PgLine, b"{0,0,1}").is_err());
    }

    #[test]
    fn test_lseg() {
        let seg: LineSegment = PgLseg.decode(b"[(1,2),(3,4)]").unwrap();
        assert_eq!(seg.start, Point::new(1.0, 2.0));
        assert_eq!(seg.end, Point::new(3.0, 4.0));
        assert_eq!(encoded(PgLseg, &seg), "[(1,2),(3,4)]");
    }

    #[test]
    fn test_box_corners_reordered() {
        let bx: BoundingBox = PgBox.decode(b"(1,1),(3,4)").unwrap();
        assert_eq!(bx.high, Point::new(3.0, 4.0));
        assert_eq!(bx.low, Point::new(1.0, 1.0));
        assert_eq!(encoded(PgBox, &bx), "(3,4),(1,1)");

        let corners = [Point::new(0.0, 2.0), Point::new(2.0, 0.0)];
        assert_eq!(encoded(PgBox, &corners), "(2,2),(0,0)");
    }

    #[test]
    fn test_path() {
        let open: Path = PgPath.decode(b"[(1,2),(3,4)]").unwrap();
        assert!(!open.closed);
        assert_eq!(encoded(PgPath, &open), "[(1,2),(3,4)]");

        let closed: Path = PgPath.decode(b"((1,2),(3,4),(5,6))").unwrap();
        assert!(closed.closed);
        assert_eq!(closed.points.len(), 3);
        assert_eq!(encoded(PgPath, &closed), "((1,2),(3,4),(5,6))");

        assert!(Codec::<Path>::decode(&PgPath, b"[]").is_err());
    }

    #[test]
    fn test_polygon() {
        let points: Vec<Point> = PgPolygon.decode(b"((0,0),(1,0),(1,1))").unwrap();
        assert_eq!(points[2], Point::new(1.0, 1.0));
        assert_eq!(encoded(PgPolygon, &points), "((0,0),(1,0),(1,1))");
        assert!(PgPolygon.to_bytes(&Polygon::default()).is_err());
    }
}

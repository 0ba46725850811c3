//! Date and time codecs on top of `chrono`.
//!
//! Text follows PostgreSQL's ISO output style: `1999-01-08`,
//! `04:05:06.789`, `1999-01-08 04:05:06+02`. `infinity` / `-infinity` map to
//! the `MAX` / `MIN` constants of the target type and years before 1 AD
//! carry a trailing ` BC`.

use bytes::BytesMut;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use super::{text, write_display};
use crate::codec::{ArrayElement, Codec};
use crate::error::{CodecError, CodecResult};
use crate::grammar::range::Discrete;

const INFINITY: &str = "infinity";
const NEG_INFINITY: &str = "-infinity";

/// Time of day with a UTC offset, the value of a `timetz` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeTz {
    pub time: NaiveTime,
    /// Seconds east of UTC.
    pub utc_offset: i32,
}

impl TimeTz {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            time,
            utc_offset: offset.local_minus_utc(),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset)
    }
}

// ----- parsing -----

/// Strip a trailing ` BC` era marker.
fn strip_era(s: &str) -> (&str, bool) {
    match s.strip_suffix("BC").or_else(|| s.strip_suffix("bc")) {
        Some(rest) => (rest.trim_end(), true),
        None => (s.strip_suffix(" AD").unwrap_or(s), false),
    }
}

fn parse_ymd(s: &str, bc: bool, raw: &[u8]) -> CodecResult<NaiveDate> {
    let mut parts = s.trim().splitn(3, '-');
    let mut field = || {
        parts
            .next()
            .ok_or_else(|| CodecError::parse("date", raw, "expected YYYY-MM-DD"))
    };
    let year: i32 = field()?.parse().map_err(|e| CodecError::parse("date", raw, e))?;
    let month: u32 = field()?.parse().map_err(|e| CodecError::parse("date", raw, e))?;
    let day: u32 = field()?.parse().map_err(|e| CodecError::parse("date", raw, e))?;
    // 1 BC is astronomical year 0
    let year = if bc { 1 - year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CodecError::parse("date", raw, "date out of range"))
}

fn parse_time(s: &str, raw: &[u8], kind: &'static str) -> CodecResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| CodecError::parse(kind, raw, e))
}

/// Split `04:05:06+02` into the time and `+02`. A missing offset is UTC.
fn split_offset(s: &str) -> (&str, &str) {
    match s.find(['+', '-', 'Z', 'z']) {
        Some(at) => (s[..at].trim_end(), &s[at..]),
        None => (s, ""),
    }
}

/// Accepts `Z`, `+HH`, `+HHMM`, `+HH:MM` and `+HH:MM:SS`.
fn parse_offset(s: &str, raw: &[u8], kind: &'static str) -> CodecResult<FixedOffset> {
    let bad = |msg: &str| CodecError::parse(kind, raw, format!("invalid UTC offset: {msg}"));
    let seconds = match s {
        "" | "Z" | "z" => 0,
        _ => {
            let (sign, body) = match s.as_bytes()[0] {
                b'+' => (1, &s[1..]),
                b'-' => (-1, &s[1..]),
                _ => return Err(bad(s)),
            };
            if !body.is_ascii() {
                return Err(bad(s));
            }
            let fields: Vec<&str> = if !body.contains(':') && body.len() == 4 {
                vec![&body[..2], &body[2..]]
            } else {
                body.split(':').collect()
            };
            if fields.len() > 3 {
                return Err(bad(s));
            }
            let mut seconds = 0i32;
            for (field, (scale, limit)) in fields.iter().zip([(3600, 15), (60, 59), (1, 59)]) {
                let digits = field.bytes().all(|b| b.is_ascii_digit());
                if field.is_empty() || field.len() > 2 || !digits {
                    return Err(bad(s));
                }
                let n: i32 = field.parse().map_err(|_| bad(s))?;
                if n > limit {
                    return Err(bad(s));
                }
                seconds += n * scale;
            }
            sign * seconds
        }
    };
    FixedOffset::east_opt(seconds).ok_or_else(|| bad(s))
}

fn parse_date(raw: &[u8]) -> CodecResult<NaiveDate> {
    match text(raw)? {
        INFINITY => Ok(NaiveDate::MAX),
        NEG_INFINITY => Ok(NaiveDate::MIN),
        s => {
            let (s, bc) = strip_era(s);
            parse_ymd(s, bc, raw)
        }
    }
}

fn parse_timestamp(raw: &[u8]) -> CodecResult<NaiveDateTime> {
    match text(raw)? {
        INFINITY => Ok(NaiveDateTime::MAX),
        NEG_INFINITY => Ok(NaiveDateTime::MIN),
        s => {
            let (s, bc) = strip_era(s);
            match s.split_once([' ', 'T']) {
                Some((date, time)) => Ok(parse_ymd(date, bc, raw)?
                    .and_time(parse_time(time, raw, "timestamp")?)),
                None => parse_ymd(s, bc, raw)?
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| CodecError::parse("timestamp", raw, "date out of range")),
            }
        }
    }
}

fn parse_timestamptz(raw: &[u8]) -> CodecResult<DateTime<FixedOffset>> {
    let s = text(raw)?;
    let infinite = match s {
        INFINITY => Some(DateTime::<Utc>::MAX_UTC),
        NEG_INFINITY => Some(DateTime::<Utc>::MIN_UTC),
        _ => None,
    };
    if let Some(dt) = infinite {
        return Ok(dt.with_timezone(&Utc.fix()));
    }
    let (s, bc) = strip_era(s);
    let (date, rest) = s
        .split_once([' ', 'T'])
        .ok_or_else(|| CodecError::parse("timestamptz", raw, "expected date and time"))?;
    let (time, offset) = split_offset(rest);
    let naive = parse_ymd(date, bc, raw)?.and_time(parse_time(time, raw, "timestamptz")?);
    let offset = parse_offset(offset.trim(), raw, "timestamptz")?;
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| CodecError::parse("timestamptz", raw, "ambiguous local time"))
}

// ----- writing -----

/// `YYYY-MM-DD` with the era folded into a positive year. Returns whether
/// a ` BC` suffix is owed.
fn write_ymd(date: &NaiveDate, buf: &mut BytesMut) -> CodecResult<bool> {
    let year = date.year();
    let bc = year <= 0;
    let year = if bc { 1 - year } else { year };
    write_display(
        format_args!("{:04}-{:02}-{:02}", year, date.month(), date.day()),
        buf,
    )?;
    Ok(bc)
}

fn write_era(bc: bool, buf: &mut BytesMut) {
    if bc {
        buf.extend_from_slice(b" BC");
    }
}

/// `HH:MM:SS` plus the fraction with trailing zeros removed.
fn write_time(time: &NaiveTime, buf: &mut BytesMut) -> CodecResult<()> {
    write_display(
        format_args!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        ),
        buf,
    )?;
    let nanos = time.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        buf.extend_from_slice(b".");
        buf.extend_from_slice(frac.trim_end_matches('0').as_bytes());
    }
    Ok(())
}

/// `+HH`, `+HH:MM` or `+HH:MM:SS`, as short as the offset allows.
fn write_offset(seconds: i32, buf: &mut BytesMut) -> CodecResult<()> {
    buf.extend_from_slice(if seconds < 0 { b"-" } else { b"+" });
    let abs = seconds.unsigned_abs();
    let (h, m, s) = (abs / 3600, abs / 60 % 60, abs % 60);
    write_display(format_args!("{h:02}"), buf)?;
    if m != 0 || s != 0 {
        write_display(format_args!(":{m:02}"), buf)?;
    }
    if s != 0 {
        write_display(format_args!(":{s:02}"), buf)?;
    }
    Ok(())
}

fn write_date(date: &NaiveDate, buf: &mut BytesMut) -> CodecResult<()> {
    if *date == NaiveDate::MAX {
        buf.extend_from_slice(INFINITY.as_bytes());
    } else if *date == NaiveDate::MIN {
        buf.extend_from_slice(NEG_INFINITY.as_bytes());
    } else {
        let bc = write_ymd(date, buf)?;
        write_era(bc, buf);
    }
    Ok(())
}

fn write_timestamp(value: &NaiveDateTime, buf: &mut BytesMut) -> CodecResult<()> {
    if *value == NaiveDateTime::MAX {
        buf.extend_from_slice(INFINITY.as_bytes());
    } else if *value == NaiveDateTime::MIN {
        buf.extend_from_slice(NEG_INFINITY.as_bytes());
    } else {
        let bc = write_ymd(&value.date(), buf)?;
        buf.extend_from_slice(b" ");
        write_time(&value.time(), buf)?;
        write_era(bc, buf);
    }
    Ok(())
}

fn write_timestamptz(value: &DateTime<FixedOffset>, buf: &mut BytesMut) -> CodecResult<()> {
    let utc = value.naive_utc();
    if utc == NaiveDateTime::MAX {
        buf.extend_from_slice(INFINITY.as_bytes());
    } else if utc == NaiveDateTime::MIN {
        buf.extend_from_slice(NEG_INFINITY.as_bytes());
    } else {
        let local = value.naive_local();
        let bc = write_ymd(&local.date(), buf)?;
        buf.extend_from_slice(b" ");
        write_time(&local.time(), buf)?;
        write_offset(value.offset().local_minus_utc(), buf)?;
        write_era(bc, buf);
    }
    Ok(())
}

// ----- codecs -----

/// `date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgDate;

impl Codec<NaiveDate> for PgDate {
    fn encode(&self, value: &NaiveDate, buf: &mut BytesMut) -> CodecResult<()> {
        write_date(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<NaiveDate> {
        parse_date(raw)
    }
}

impl ArrayElement for PgDate {}

impl Discrete for NaiveDate {
    fn successor(&self) -> Option<Self> {
        self.succ_opt()
    }

    fn is_infinite(&self) -> bool {
        *self == NaiveDate::MAX || *self == NaiveDate::MIN
    }
}

/// `time` / `time without time zone`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTime;

impl Codec<NaiveTime> for PgTime {
    fn encode(&self, value: &NaiveTime, buf: &mut BytesMut) -> CodecResult<()> {
        write_time(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<NaiveTime> {
        parse_time(text(raw)?, raw, "time")
    }
}

impl ArrayElement for PgTime {}

/// `timetz` / `time with time zone`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTimetz;

impl Codec<TimeTz> for PgTimetz {
    fn encode(&self, value: &TimeTz, buf: &mut BytesMut) -> CodecResult<()> {
        write_time(&value.time, buf)?;
        write_offset(value.utc_offset, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<TimeTz> {
        let (time, offset) = split_offset(text(raw)?);
        let time = parse_time(time, raw, "timetz")?;
        let offset = parse_offset(offset, raw, "timetz")?;
        Ok(TimeTz::new(time, offset))
    }
}

impl ArrayElement for PgTimetz {}

/// `timestamp` / `timestamp without time zone`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTimestamp;

impl Codec<NaiveDateTime> for PgTimestamp {
    fn encode(&self, value: &NaiveDateTime, buf: &mut BytesMut) -> CodecResult<()> {
        write_timestamp(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<NaiveDateTime> {
        parse_timestamp(raw)
    }
}

impl ArrayElement for PgTimestamp {}

/// `timestamptz` / `timestamp with time zone`. The offset sent by the
/// server is kept; a literal without one is read as UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgTimestamptz;

impl Codec<DateTime<FixedOffset>> for PgTimestamptz {
    fn encode(&self, value: &DateTime<FixedOffset>, buf: &mut BytesMut) -> CodecResult<()> {
        write_timestamptz(value, buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<DateTime<FixedOffset>> {
        parse_timestamptz(raw)
    }
}

impl Codec<DateTime<Utc>> for PgTimestamptz {
    fn encode(&self, value: &DateTime<Utc>, buf: &mut BytesMut) -> CodecResult<()> {
        write_timestamptz(&value.with_timezone(&Utc.fix()), buf)
    }

    fn decode(&self, raw: &[u8]) -> CodecResult<DateTime<Utc>> {
        parse_timestamptz(raw).map(|dt| dt.with_timezone(&Utc))
    }
}

impl ArrayElement for PgTimestamptz {}

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
    fn test_date() {
        let date = PgDate.decode(b"1999-01-08").unwrap();
        assert_eq!(date, ymd(1999, 1, 8));
        assert_eq!(encoded(PgDate, &date), "1999-01-08");
    }

    #[test]
    fn test_date_infinity_and_era() {
        assert_eq!(PgDate.decode(b"infinity").unwrap(), NaiveDate::MAX);
        assert_eq!(PgDate.decode(b"-infinity").unwrap(), NaiveDate::MIN);
        assert_eq!(encoded(PgDate, &NaiveDate::MAX), "infinity");

        let ides = PgDate.decode(b"0044-03-15 BC").unwrap();
        assert_eq!(ides, ymd(-43, 3, 15));
        assert_eq!(encoded(PgDate, &ides), "0044-03-15 BC");
    }

    #[test]
    fn test_date_malformed() {
        assert!(PgDate.decode(b"1999-13-01").is_err());
        assert!(PgDate.decode(b"1999-01").is_err());
        assert!(PgDate.decode(b"yesterday").is_err());
    }

    #[test]
    fn test_time() {
        let t = PgTime.decode(b"04:05:06.789").unwrap();
        assert_eq!(t, NaiveTime::from_hms_milli_opt(4, 5, 6, 789).unwrap());
        assert_eq!(encoded(PgTime, &t), "04:05:06.789");

        let t = PgTime.decode(b"23:59").unwrap();
        assert_eq!(encoded(PgTime, &t), "23:59:00");
    }

    #[test]
    fn test_timetz() {
        let t = PgTimetz.decode(b"04:05:06-08").unwrap();
        assert_eq!(t.utc_offset, -8 * 3600);
        assert_eq!(encoded(PgTimetz, &t), "04:05:06-08");

        let t = PgTimetz.decode(b"04:05:06.5+05:30").unwrap();
        assert_eq!(t.utc_offset, 5 * 3600 + 30 * 60);
        assert_eq!(encoded(PgTimetz, &t), "04:05:06.5+05:30");
    }

    #[test]
    fn test_timestamp() {
        let ts = PgTimestamp.decode(b"2001-02-03 04:05:06").unwrap();
        assert_eq!(ts, ymd(2001, 2, 3).and_hms_opt(4, 5, 6).unwrap());
        assert_eq!(encoded(PgTimestamp, &ts), "2001-02-03 04:05:06");

        let ts = PgTimestamp.decode(b"2001-02-03T04:05:06.123456").unwrap();
        assert_eq!(encoded(PgTimestamp, &ts), "2001-02-03 04:05:06.123456");

        let ts = PgTimestamp.decode(b"0001-01-01 00:00:00 BC").unwrap();
        assert_eq!(ts.date().year(), 0);
        assert_eq!(encoded(PgTimestamp, &ts), "0001-01-01 00:00:00 BC");

        assert_eq!(PgTimestamp.decode(b"infinity").unwrap(), NaiveDateTime::MAX);
    }

    #[test]
    fn test_timestamptz() {
        let ts: DateTime<FixedOffset> = PgTimestamptz.decode(b"2001-02-03 04:05:06+01").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 3600);
        assert_eq!(encoded(PgTimestamptz, &ts), "2001-02-03 04:05:06+01");

        let utc: DateTime<Utc> = PgTimestamptz.decode(b"2001-02-03 04:05:06+01").unwrap();
        assert_eq!(encoded(PgTimestamptz, &utc), "2001-02-03 03:05:06+00");

        let ts: DateTime<FixedOffset> =
            PgTimestamptz.decode(b"2001-02-03 04:05:06.5-03:30:15").unwrap();
        assert_eq!(encoded(PgTimestamptz, &ts), "2001-02-03 04:05:06.5-03:30:15");

        let inf: DateTime<Utc> = PgTimestamptz.decode(b"-infinity").unwrap();
        assert_eq!(inf, DateTime::<Utc>::MIN_UTC);
        assert_eq!(encoded(PgTimestamptz, &inf), "-infinity");
    }

    #[test]
    fn test_timestamptz_malformed() {
        assert!(Codec::<DateTime<Utc>>::decode(&PgTimestamptz, b"2001-02-03").is_err());
        assert!(Codec::<DateTime<Utc>>::decode(&PgTimestamptz, b"2001-02-03 04:05:06+1x").is_err());
    }

    #[test]
    fn test_utc_offset_malformed() {
        let decode = |raw: &str| Codec::<DateTime<Utc>>::decode(&PgTimestamptz, raw.as_bytes());
        assert!(matches!(
            decode("2001-01-01 00:00:00+1é1"),
            Err(CodecError::Parse { kind: "timestamptz", .. })
        ));
        assert!(decode("2001-01-01 00:00:00+16").is_err());
        assert!(decode("2001-01-01 00:00:00+05:60").is_err());
        assert!(decode("2001-01-01 00:00:00+").is_err());
        assert!(decode("2001-01-01 00:00:00+15:59:59").is_ok());

        assert!(matches!(
            PgTimetz.decode(b"04:05:06+99999999"),
            Err(CodecError::Parse { kind: "timetz", .. })
        ));
        assert!(PgTimetz.decode(b"04:05:06+0530").is_ok());
    }

    #[test]
    fn test_date_successor() {
        assert_eq!(ymd(2001, 5, 5).successor(), Some(ymd(2001, 5, 6)));
        assert!(NaiveDate::MAX.is_infinite());
    }
}

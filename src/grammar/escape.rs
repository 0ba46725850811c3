//! Quoting rules for elements embedded in array, range and hstore literals.
//!
//! Inside double quotes only `"` and `\` are backslash-escaped. Control
//! characters other than the whitespace set (e.g. `\b`, `\a`) are written
//! raw: PostgreSQL's array input does not treat them as separators, so they
//! never force quoting.

use bytes::BytesMut;
use std::borrow::Cow;

/// Whitespace that PostgreSQL trims around unquoted elements.
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}

/// Does this array element need to be wrapped in double quotes?
///
/// `delimiter` is the array's element separator (`,` for everything but
/// box arrays).
pub fn needs_quote(element: &[u8], delimiter: u8) -> bool {
    if element.is_empty() || element.eq_ignore_ascii_case(b"NULL") {
        return true;
    }
    element
        .iter()
        .any(|&b| b == delimiter || is_space(b) || matches!(b, b'"' | b'\\' | b'{' | b'}'))
}

/// Does this range bound need to be wrapped in double quotes?
pub fn needs_bound_quote(bound: &[u8]) -> bool {
    bound.is_empty()
        || bound.iter().any(|&b| {
            is_space(b) || matches!(b, b'"' | b'\\' | b'(' | b')' | b'[' | b']' | b',')
        })
}

/// Append `element` wrapped in double quotes, escaping `"` and `\`.
pub fn quote(element: &[u8], buf: &mut BytesMut) {
    buf.reserve(element.len() + 2);
    buf.extend_from_slice(b"\"");
    let mut start = 0;
    for (i, &b) in element.iter().enumerate() {
        if b == b'"' || b == b'\\' {
            buf.extend_from_slice(&element[start..i]);
            buf.extend_from_slice(&[b'\\', b]);
            start = i + 1;
        }
    }
    buf.extend_from_slice(&element[start..]);
    buf.extend_from_slice(b"\"");
}

/// Append an array element, quoting only when [`needs_quote`] says so.
#[inline]
pub fn write_element(element: &[u8], delimiter: u8, buf: &mut BytesMut) {
    if needs_quote(element, delimiter) {
        quote(element, buf);
    } else {
        buf.extend_from_slice(element);
    }
}

/// Strip one pair of surrounding quotes (if present) and remove one level of
/// backslash escaping. A backslash followed by any byte yields that byte.
pub fn unquote(quoted: &[u8]) -> Cow<'_, [u8]> {
    let inner = match quoted {
        [b'"', inner @ .., b'"'] => inner,
        _ => quoted,
    };
    unescape(inner)
}

/// Remove one level of backslash escaping without touching quotes.
pub fn unescape(span: &[u8]) -> Cow<'_, [u8]> {
    if !span.contains(&b'\\') {
        return Cow::Borrowed(span);
    }
    let mut out = Vec::with_capacity(span.len());
    let mut bytes = span.iter();
    while let Some(&b) = bytes.next() {
        if b == b'\\' {
            if let Some(&next) = bytes.next() {
                out.push(next);
            }
        } else {
            out.push(b);
        }
    }
    Cow::Owned(out)
}

//! One-dimensional array lexer.
//!
//! Splits a `{...}` literal into element spans. `None` marks the unquoted
//! `NULL` token; a quoted `"NULL"` is an ordinary four-byte string.

use std::borrow::Cow;

use super::escape::is_space;
use super::trim;
use crate::error::{CodecError, CodecResult};

/// One lexed array element. `None` is an absent (NULL) element.
pub type Element<'a> = Option<Cow<'a, [u8]>>;

/// Splitting strategy, fixed per element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexer {
    /// Delimiter-only splitting for payloads that never need quoting
    /// (integers, floats, booleans, addresses).
    Plain,
    /// Quote-aware splitting with one level of backslash unescaping.
    Quoted,
    /// Quote-aware splitting that also keeps bracketed composites such as
    /// `(1,2)` together when they arrive unquoted.
    Composite,
    /// Quote-aware splitting where every element must be exactly one
    /// Unicode scalar value.
    Runes,
}

impl Lexer {
    /// Split `literal` into element spans.
    pub fn split(self, literal: &[u8], delimiter: u8) -> CodecResult<Vec<Element<'_>>> {
        match self {
            Lexer::Plain => split_plain(literal, delimiter),
            Lexer::Quoted => split_elements(literal, delimiter),
            Lexer::Composite => split_composites(literal, delimiter),
            Lexer::Runes => split_runes(literal, delimiter),
        }
    }
}

/// Remove the outer braces (and an optional `[lo:hi]=` dimension prefix).
pub fn strip_braces(literal: &[u8]) -> CodecResult<&[u8]> {
    let mut literal = trim(literal);
    if literal.first() == Some(&b'[') {
        let eq = literal
            .iter()
            .position(|&b| b == b'=')
            .ok_or_else(|| CodecError::malformed("array", "dimension decoration without '='"))?;
        if literal[..eq].iter().filter(|&&b| b == b'[').count() > 1 {
            return Err(CodecError::Unsupported("multi-dimensional arrays"));
        }
        literal = trim(&literal[eq + 1..]);
    }
    match literal {
        [b'{', inner @ .., b'}'] => Ok(inner),
        _ => Err(CodecError::malformed("array", "expected '{' ... '}'")),
    }
}

/// Split on the delimiter only. No quote or escape handling.
pub fn split_plain(literal: &[u8], delimiter: u8) -> CodecResult<Vec<Element<'_>>> {
    let inner = strip_braces(literal)?;
    if trim(inner).is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(|&b| b == delimiter)
        .map(|span| match trim(span) {
            b"" => Err(CodecError::malformed("array", "empty element")),
            b"NULL" => Ok(None),
            span => Ok(Some(Cow::Borrowed(span))),
        })
        .collect()
}

/// Fully general quote-aware splitting.
pub fn split_elements(literal: &[u8], delimiter: u8) -> CodecResult<Vec<Element<'_>>> {
    scan(literal, delimiter, false)
}

/// Quote-aware splitting that treats `()`, `[]` and `{}` as nesting, for
/// arrays whose elements are geometric or range literals.
pub fn split_composites(literal: &[u8], delimiter: u8) -> CodecResult<Vec<Element<'_>>> {
    scan(literal, delimiter, true)
}

/// Quote-aware splitting where each present element is a single rune.
pub fn split_runes(literal: &[u8], delimiter: u8) -> CodecResult<Vec<Element<'_>>> {
    let elements = scan(literal, delimiter, false)?;
    for element in elements.iter().flatten() {
        // the zero "char" is written as a quoted empty string
        if element.is_empty() {
            continue;
        }
        // high "char" bytes are written as a \ooo octal escape
        if let [b'\\', digits @ ..] = &element[..] {
            if digits.len() == 3 && digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                continue;
            }
        }
        let s = std::str::from_utf8(element)?;
        let mut chars = s.chars();
        if chars.next().is_none() || chars.next().is_some() {
            return Err(CodecError::parse("char", element, "expected exactly one character"));
        }
    }
    Ok(elements)
}

fn scan(literal: &[u8], delimiter: u8, nested: bool) -> CodecResult<Vec<Element<'_>>> {
    let inner = strip_braces(literal)?;
    let mut elements = Vec::new();
    if trim(inner).is_empty() {
        return Ok(elements);
    }
    let mut pos = 0;
    loop {
        let (element, next) = scan_element(inner, pos, delimiter, nested)?;
        elements.push(element);
        match next {
            Some(next) => pos = next,
            None => return Ok(elements),
        }
    }
}

/// Lex one element starting at `start`. Returns the element and the offset
/// just past its delimiter, or `None` at the end of input.
fn scan_element(
    inner: &[u8],
    start: usize,
    delimiter: u8,
    nested: bool,
) -> CodecResult<(Element<'_>, Option<usize>)> {
    let mut begin = start;
    while begin < inner.len() && is_space(inner[begin]) {
        begin += 1;
    }
    if !nested && inner.get(begin) == Some(&b'{') {
        return Err(CodecError::Unsupported("multi-dimensional arrays"));
    }

    let mut end = begin;
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut has_escape = false;
    let mut has_quote = false;
    while end < inner.len() {
        let b = inner[end];
        if b == b'\\' {
            if end + 1 >= inner.len() {
                return Err(CodecError::malformed("array", "dangling escape"));
            }
            has_escape = true;
            end += 2;
            continue;
        }
        if b == b'"' {
            has_quote = true;
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match b {
                b'(' | b'[' | b'{' if nested => depth += 1,
                b')' | b']' | b'}' if nested => depth = depth.saturating_sub(1),
                _ if b == delimiter && depth == 0 => break,
                _ => {}
            }
        }
        end += 1;
    }
    if in_quotes {
        return Err(CodecError::malformed("array", "unterminated quoted element"));
    }
    let next = (end < inner.len()).then_some(end + 1);

    let span = trim(&inner[begin..end]);
    if !has_escape {
        if !has_quote {
            return match span {
                b"" => Err(CodecError::malformed("array", "empty element")),
                b"NULL" => Ok((None, next)),
                span => Ok((Some(Cow::Borrowed(span)), next)),
            };
        }
        if let [b'"', body @ .., b'"'] = span {
            if !body.contains(&b'"') {
                return Ok((Some(Cow::Borrowed(body)), next));
            }
        }
    }

    // Mixed quoting or escapes: rebuild the element byte by byte.
    let mut buf = Vec::with_capacity(end - begin);
    let mut quoted = false;
    let mut keep = 0;
    let mut i = begin;
    while i < end {
        match inner[i] {
            b'\\' => {
                buf.push(inner[i + 1]);
                keep = buf.len();
                i += 2;
                continue;
            }
            b'"' => {
                quoted = !quoted;
                keep = buf.len();
            }
            b => {
                buf.push(b);
                if quoted || !is_space(b) {
                    keep = buf.len();
                }
            }
        }
        i += 1;
    }
    buf.truncate(keep);
    Ok((Some(Cow::Owned(buf)), next))
}

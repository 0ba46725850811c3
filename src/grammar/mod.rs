//! Lexers and parsers for the PostgreSQL text grammar.
//!
//! Everything here works on raw byte spans and knows nothing about the
//! semantic types; the codecs in [`crate::types`] sit on top.

pub mod array;
pub mod escape;
pub mod geometry;
pub mod hstore;
pub mod range;
pub mod vector;

pub use array::{Element, Lexer};

/// Trim the whitespace PostgreSQL ignores around unquoted tokens.
pub(crate) fn trim(mut span: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = span {
        if !escape::is_space(*first) {
            break;
        }
        span = rest;
    }
    while let [rest @ .., last] = span {
        if !escape::is_space(*last) {
            break;
        }
        span = rest;
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim(b"  a b \t\n"), b"a b");
        assert_eq!(trim(b"   "), b"");
        assert_eq!(trim(b""), b"");
    }
}

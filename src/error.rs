//! Error types for the text-format codec.

use thiserror::Error;

/// The main error type for encode/decode operations.
///
/// Every failure aborts only the single value being processed; an array
/// fails as a whole when any one of its elements fails.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The lexer or parser could not locate the delimiters it expects.
    #[error("Malformed {kind} literal: {message}")]
    Malformed { kind: &'static str, message: String },

    /// A span was found but is not a valid value of the expected type.
    #[error("Invalid {kind} value '{input}': {message}")]
    Parse {
        kind: &'static str,
        input: String,
        message: String,
    },

    /// A NULL element or value where the target cannot represent absence.
    #[error("Unexpected NULL value")]
    UnexpectedNull,

    /// Fixed-size target received a different number of items.
    #[error("Expected {expected} elements, got {got}")]
    Length { expected: usize, got: usize },

    /// Value does not fit the wire type (e.g. range bound successor).
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// A text value contains a literal NULL byte (0x00).
    #[error("Value contains NULL byte (0x00) which is invalid in PostgreSQL")]
    NullByte,

    /// Literal shape this codec intentionally does not handle.
    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    /// Type name or OID not present in the registry.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Create a malformed-literal error.
    pub fn malformed(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            message: message.into(),
        }
    }

    /// Create a parse error for the given input span.
    pub fn parse(kind: &'static str, input: &[u8], message: impl ToString) -> Self {
        Self::Parse {
            kind,
            input: String::from_utf8_lossy(input).into_owned(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::malformed("point", "missing ')'");
        assert_eq!(err.to_string(), "Malformed point literal: missing ')'");

        let err = CodecError::parse("int4", b"12x", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Invalid int4 value '12x': invalid digit found in string"
        );
    }
}

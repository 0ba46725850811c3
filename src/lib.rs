//! # qail-pgtext — PostgreSQL text-format codec
//!
//! Bidirectional conversion between Rust values and the PostgreSQL text
//! representation used for query parameters and result columns: scalars,
//! geometry, ranges, hstore and one-dimensional arrays of all of them.
//!
//! ## Quick Example
//!
//! ```rust
//! use qail_pgtext::prelude::*;
//!
//! let ids: Vec<Option<i32>> = NullableArray(PgInt4).decode(b"{1,NULL,3}").unwrap();
//! assert_eq!(ids, vec![Some(1), None, Some(3)]);
//!
//! let days = Range::new(
//!     Bound::Included(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
//!     Bound::Included(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
//! );
//! let literal = PgDateRange.to_bytes(&days).unwrap();
//! assert_eq!(&literal[..], b"[2024-01-01,2024-02-01)");
//! ```
//!
//! ## Choosing a codec
//!
//! | Wire type     | Codec              | Targets                                  |
//! |---------------|--------------------|------------------------------------------|
//! | `int2/4/8`    | `PgInt2/4/8`       | any integer width (wrapping)             |
//! | `numeric`     | `PgNumeric`        | `Decimal`, `f64`, `String`               |
//! | `timestamptz` | `PgTimestamptz`    | `DateTime<FixedOffset>`, `DateTime<Utc>` |
//! | `daterange`   | `PgDateRange`      | `Range<NaiveDate>`, `[Option<_>; 2]`     |
//! | `T[]`         | `Array(C)`         | `Vec<T>`, `[T; N]`                       |
//! | `T[]`         | `NullableArray(C)` | `Vec<Option<T>>`                         |

pub mod codec;
pub mod config;
pub mod error;
pub mod grammar;
pub mod registry;
pub mod types;

pub use codec::{ArrayElement, Codec};
pub use config::{Config, ConfigError};
pub use error::{CodecError, CodecResult};
pub use registry::{PgType, TypeSpec};

pub mod prelude {
    pub use crate::codec::{ArrayElement, Codec};
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::registry::{PgType, TypeSpec};
    pub use crate::types::*;
    pub use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    pub use rust_decimal::Decimal;
    pub use std::ops::Bound;
}

/// Decode a text value, treating wire NULL as `None`.
///
/// ```
/// use qail_pgtext::{decode, types::PgBool};
///
/// assert_eq!(decode::<bool, _>(&PgBool, Some(&b"t"[..])).unwrap(), Some(true));
/// assert_eq!(decode::<bool, _>(&PgBool, None).unwrap(), None);
/// ```
pub fn decode<T, C: Codec<T>>(codec: &C, raw: Option<&[u8]>) -> CodecResult<Option<T>> {
    codec.decode_nullable(raw)
}

/// Encode a value, mapping `None` to wire NULL.
pub fn encode<T, C: Codec<T>>(codec: &C, value: Option<&T>) -> CodecResult<Option<bytes::Bytes>> {
    codec.encode_nullable(value)
}

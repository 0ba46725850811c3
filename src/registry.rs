//! PostgreSQL type catalog: OIDs, names and a JSON bridge.
//!
//! Every registered type is reachable by name or OID and can be decoded
//! into / encoded from `serde_json::Value` through its codec. This is what
//! the `pgtext` binary runs on.

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::Codec;
use crate::config::Config;
use crate::error::{CodecError, CodecResult};
use crate::types::*;

/// PostgreSQL type OIDs
///
/// Reference: https://github.com/postgres/postgres/blob/master/src/include/catalog/pg_type.dat
pub mod oid {
    // Boolean
    pub const BOOL: u32 = 16;

    // Bytes
    pub const BYTEA: u32 = 17;

    // Characters
    pub const CHAR: u32 = 18;
    pub const NAME: u32 = 19;
    pub const TEXT: u32 = 25;
    pub const BPCHAR: u32 = 1042; // blank-padded char
    pub const VARCHAR: u32 = 1043;

    // Integers
    pub const INT8: u32 = 20; // bigint
    pub const INT2: u32 = 21; // smallint
    pub const INT4: u32 = 23; // integer
    pub const OID: u32 = 26;

    // Vectors
    pub const INT2VECTOR: u32 = 22;
    pub const OIDVECTOR: u32 = 30;

    // Documents
    pub const JSON: u32 = 114;
    pub const XML: u32 = 142;
    pub const JSONB: u32 = 3802;

    // Geometry
    pub const POINT: u32 = 600;
    pub const LSEG: u32 = 601;
    pub const PATH: u32 = 602;
    pub const BOX: u32 = 603;
    pub const POLYGON: u32 = 604;
    pub const LINE: u32 = 628;
    pub const CIRCLE: u32 = 718;

    // Network
    pub const CIDR: u32 = 650;
    pub const MACADDR8: u32 = 774;
    pub const MACADDR: u32 = 829;
    pub const INET: u32 = 869;

    // Float
    pub const FLOAT4: u32 = 700;
    pub const FLOAT8: u32 = 701;

    // Numeric
    pub const MONEY: u32 = 790;
    pub const NUMERIC: u32 = 1700;

    // Date/Time
    pub const DATE: u32 = 1082;
    pub const TIME: u32 = 1083;
    pub const TIMESTAMP: u32 = 1114;
    pub const TIMESTAMPTZ: u32 = 1184;
    pub const TIMETZ: u32 = 1266;

    // Bit strings
    pub const BIT: u32 = 1560;
    pub const VARBIT: u32 = 1562;

    // UUID
    pub const UUID: u32 = 2950;

    // Text search
    pub const TSVECTOR: u32 = 3614;
    pub const TSQUERY: u32 = 3615;

    // Ranges
    pub const INT4RANGE: u32 = 3904;
    pub const NUMRANGE: u32 = 3906;
    pub const TSRANGE: u32 = 3908;
    pub const TSTZRANGE: u32 = 3910;
    pub const DATERANGE: u32 = 3912;
    pub const INT8RANGE: u32 = 3926;

    // hstore is an extension; its OID is assigned per database
    pub const HSTORE: u32 = 0;

    // Arrays (defined separately, not element OID + 1)
    pub const BOOL_ARRAY: u32 = 1000;
    pub const BYTEA_ARRAY: u32 = 1001;
    pub const CHAR_ARRAY: u32 = 1002;
    pub const NAME_ARRAY: u32 = 1003;
    pub const INT2_ARRAY: u32 = 1005;
    pub const INT2VECTOR_ARRAY: u32 = 1006;
    pub const INT4_ARRAY: u32 = 1007;
    pub const TEXT_ARRAY: u32 = 1009;
    pub const OIDVECTOR_ARRAY: u32 = 1013;
    pub const BPCHAR_ARRAY: u32 = 1014;
    pub const VARCHAR_ARRAY: u32 = 1015;
    pub const INT8_ARRAY: u32 = 1016;
    pub const POINT_ARRAY: u32 = 1017;
    pub const LSEG_ARRAY: u32 = 1018;
    pub const PATH_ARRAY: u32 = 1019;
    pub const BOX_ARRAY: u32 = 1020;
    pub const FLOAT4_ARRAY: u32 = 1021;
    pub const FLOAT8_ARRAY: u32 = 1022;
    pub const POLYGON_ARRAY: u32 = 1027;
    pub const OID_ARRAY: u32 = 1028;
    pub const LINE_ARRAY: u32 = 629;
    pub const CIDR_ARRAY: u32 = 651;
    pub const CIRCLE_ARRAY: u32 = 719;
    pub const MACADDR8_ARRAY: u32 = 775;
    pub const MONEY_ARRAY: u32 = 791;
    pub const MACADDR_ARRAY: u32 = 1040;
    pub const INET_ARRAY: u32 = 1041;
    pub const TIMESTAMP_ARRAY: u32 = 1115;
    pub const DATE_ARRAY: u32 = 1182;
    pub const TIME_ARRAY: u32 = 1183;
    pub const TIMESTAMPTZ_ARRAY: u32 = 1185;
    pub const NUMERIC_ARRAY: u32 = 1231;
    pub const TIMETZ_ARRAY: u32 = 1270;
    pub const BIT_ARRAY: u32 = 1561;
    pub const VARBIT_ARRAY: u32 = 1563;
    pub const UUID_ARRAY: u32 = 2951;
    pub const JSON_ARRAY: u32 = 199;
    pub const XML_ARRAY: u32 = 143;
    pub const TSVECTOR_ARRAY: u32 = 3643;
    pub const TSQUERY_ARRAY: u32 = 3645;
    pub const JSONB_ARRAY: u32 = 3807;
    pub const INT4RANGE_ARRAY: u32 = 3905;
    pub const NUMRANGE_ARRAY: u32 = 3907;
    pub const TSRANGE_ARRAY: u32 = 3909;
    pub const TSTZRANGE_ARRAY: u32 = 3911;
    pub const DATERANGE_ARRAY: u32 = 3913;
    pub const INT8RANGE_ARRAY: u32 = 3927;
    pub const HSTORE_ARRAY: u32 = 0;
}

fn to_json<T: serde::Serialize>(value: T) -> CodecResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn from_json<T: serde::de::DeserializeOwned>(value: &Value) -> CodecResult<T> {
    Ok(serde_json::from_value(value.clone())?)
}

// Each row: variant, catalog name, OID, array OID, codec expression and
// the JSON-facing value type. Arrays wrap the codec in `NullableArray`.
// The leading identifier names the `&Config` binding codec expressions see.
macro_rules! pg_types {
    ($cfg:ident;
     $($variant:ident => $name:literal, $oid:expr, $array_oid:expr,
       $codec:expr => $value:ty;)*) => {
        /// A registered PostgreSQL base type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PgType {
            $($variant),*
        }

        impl PgType {
            pub const ALL: &'static [PgType] = &[$(PgType::$variant),*];

            /// Catalog name, e.g. `int4`.
            pub fn name(self) -> &'static str {
                match self {
                    $(PgType::$variant => $name),*
                }
            }

            /// Catalog name of the array type, e.g. `int4[]`.
            pub fn array_name(self) -> &'static str {
                match self {
                    $(PgType::$variant => concat!($name, "[]")),*
                }
            }

            /// Type OID. `0` when the type has no fixed OID.
            pub fn oid(self) -> u32 {
                match self {
                    $(PgType::$variant => $oid),*
                }
            }

            pub fn array_oid(self) -> u32 {
                match self {
                    $(PgType::$variant => $array_oid),*
                }
            }

            fn decode_scalar(self, raw: &[u8], $cfg: &Config) -> CodecResult<Value> {
                match self {
                    $(PgType::$variant => {
                        let value: $value = Codec::<$value>::decode(&$codec, raw)?;
                        to_json(value)
                    })*
                }
            }

            fn decode_array(self, raw: &[u8], $cfg: &Config) -> CodecResult<Value> {
                match self {
                    $(PgType::$variant => {
                        let codec = NullableArray($codec);
                        let values: Vec<Option<$value>> =
                            Codec::<Vec<Option<$value>>>::decode(&codec, raw)?;
                        to_json(values)
                    })*
                }
            }

            fn encode_scalar(self, value: &Value, $cfg: &Config, buf: &mut BytesMut) -> CodecResult<()> {
                match self {
                    $(PgType::$variant => {
                        let value: $value = from_json(value)?;
                        Codec::<$value>::encode(&$codec, &value, buf)
                    })*
                }
            }

            fn encode_array(self, value: &Value, $cfg: &Config, buf: &mut BytesMut) -> CodecResult<()> {
                match self {
                    $(PgType::$variant => {
                        let codec = NullableArray($codec);
                        let values: Vec<Option<$value>> = from_json(value)?;
                        Codec::<Vec<Option<$value>>>::encode(&codec, &values, buf)
                    })*
                }
            }
        }
    };
}

pg_types! { cfg;
    Bool => "bool", oid::BOOL, oid::BOOL_ARRAY, PgBool => bool;
    Bytea => "bytea", oid::BYTEA, oid::BYTEA_ARRAY, PgBytea => Vec<u8>;
    Char => "char", oid::CHAR, oid::CHAR_ARRAY, PgChar => char;
    Name => "name", oid::NAME, oid::NAME_ARRAY, PgText => String;
    Int8 => "int8", oid::INT8, oid::INT8_ARRAY, PgInt8 => i64;
    Int2 => "int2", oid::INT2, oid::INT2_ARRAY, PgInt2 => i16;
    Int2Vector => "int2vector", oid::INT2VECTOR, oid::INT2VECTOR_ARRAY,
        PgInt2Vector => Vec<i16>;
    Int4 => "int4", oid::INT4, oid::INT4_ARRAY, PgInt4 => i32;
    Text => "text", oid::TEXT, oid::TEXT_ARRAY, PgText => String;
    Oid => "oid", oid::OID, oid::OID_ARRAY, PgOid => u32;
    OidVector => "oidvector", oid::OIDVECTOR, oid::OIDVECTOR_ARRAY,
        PgOidVector => Vec<u32>;
    Json => "json", oid::JSON, oid::JSON_ARRAY, PgJson => Value;
    Xml => "xml", oid::XML, oid::XML_ARRAY, PgXml => String;
    Point => "point", oid::POINT, oid::POINT_ARRAY, PgPoint => Point;
    Lseg => "lseg", oid::LSEG, oid::LSEG_ARRAY, PgLseg => LineSegment;
    Path => "path", oid::PATH, oid::PATH_ARRAY, PgPath => Path;
    Box => "box", oid::BOX, oid::BOX_ARRAY, PgBox => BoundingBox;
    Polygon => "polygon", oid::POLYGON, oid::POLYGON_ARRAY, PgPolygon => Polygon;
    Line => "line", oid::LINE, oid::LINE_ARRAY, PgLine => Line;
    Cidr => "cidr", oid::CIDR, oid::CIDR_ARRAY, PgCidr => IpNetwork;
    Float4 => "float4", oid::FLOAT4, oid::FLOAT4_ARRAY, PgFloat4 => f32;
    Float8 => "float8", oid::FLOAT8, oid::FLOAT8_ARRAY, PgFloat8 => f64;
    // No circle codec: the literal passes through as text.
    Circle => "circle", oid::CIRCLE, oid::CIRCLE_ARRAY, PgText => String;
    MacAddr8 => "macaddr8", oid::MACADDR8, oid::MACADDR8_ARRAY, PgMacAddr8 => [u8; 8];
    Money => "money", oid::MONEY, oid::MONEY_ARRAY, cfg.money() => i64;
    MacAddr => "macaddr", oid::MACADDR, oid::MACADDR_ARRAY, PgMacAddr => [u8; 6];
    Inet => "inet", oid::INET, oid::INET_ARRAY, PgInet => IpNetwork;
    Bpchar => "bpchar", oid::BPCHAR, oid::BPCHAR_ARRAY, PgBpchar => String;
    Varchar => "varchar", oid::VARCHAR, oid::VARCHAR_ARRAY, PgText => String;
    Date => "date", oid::DATE, oid::DATE_ARRAY, PgDate => NaiveDate;
    Time => "time", oid::TIME, oid::TIME_ARRAY, PgTime => NaiveTime;
    Timestamp => "timestamp", oid::TIMESTAMP, oid::TIMESTAMP_ARRAY, PgTimestamp => NaiveDateTime;
    Timestamptz => "timestamptz", oid::TIMESTAMPTZ, oid::TIMESTAMPTZ_ARRAY,
        PgTimestamptz => DateTime<FixedOffset>;
    Timetz => "timetz", oid::TIMETZ, oid::TIMETZ_ARRAY, PgTimetz => TimeTz;
    Bit => "bit", oid::BIT, oid::BIT_ARRAY, PgBit => String;
    VarBit => "varbit", oid::VARBIT, oid::VARBIT_ARRAY, PgVarBit => String;
    Numeric => "numeric", oid::NUMERIC, oid::NUMERIC_ARRAY, PgNumeric => Decimal;
    Uuid => "uuid", oid::UUID, oid::UUID_ARRAY, PgUuid => ::uuid::Uuid;
    TsVector => "tsvector", oid::TSVECTOR, oid::TSVECTOR_ARRAY, PgTsVector => Vec<Lexeme>;
    TsQuery => "tsquery", oid::TSQUERY, oid::TSQUERY_ARRAY, PgTsQuery => String;
    Jsonb => "jsonb", oid::JSONB, oid::JSONB_ARRAY, PgJsonb => Value;
    Int4Range => "int4range", oid::INT4RANGE, oid::INT4RANGE_ARRAY, PgInt4Range => Range<i32>;
    NumRange => "numrange", oid::NUMRANGE, oid::NUMRANGE_ARRAY, PgNumRange => Range<Decimal>;
    TsRange => "tsrange", oid::TSRANGE, oid::TSRANGE_ARRAY, PgTsRange => Range<NaiveDateTime>;
    TstzRange => "tstzrange", oid::TSTZRANGE, oid::TSTZRANGE_ARRAY,
        PgTstzRange => Range<DateTime<FixedOffset>>;
    DateRange => "daterange", oid::DATERANGE, oid::DATERANGE_ARRAY, PgDateRange => Range<NaiveDate>;
    Int8Range => "int8range", oid::INT8RANGE, oid::INT8RANGE_ARRAY, PgInt8Range => Range<i64>;
    HStore => "hstore", oid::HSTORE, oid::HSTORE_ARRAY, PgHStore => BTreeMap<String, Option<String>>;
}

impl PgType {
    /// Look up a base type by catalog name or common SQL alias,
    /// case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let canonical = match name.as_str() {
            "boolean" => "bool",
            "smallint" => "int2",
            "integer" | "int" => "int4",
            "bigint" => "int8",
            "real" => "float4",
            "double precision" | "float" => "float8",
            "decimal" => "numeric",
            "character varying" => "varchar",
            "character" => "bpchar",
            "\"char\"" => "char",
            "bit varying" => "varbit",
            "time without time zone" => "time",
            "time with time zone" => "timetz",
            "timestamp without time zone" => "timestamp",
            "timestamp with time zone" => "timestamptz",
            other => other,
        };
        Self::ALL.iter().copied().find(|ty| ty.name() == canonical)
    }

    /// Look up a base type by OID.
    pub fn from_oid(oid: u32) -> Option<Self> {
        if oid == 0 {
            return None;
        }
        Self::ALL.iter().copied().find(|ty| ty.oid() == oid)
    }

    /// Decode a scalar text value into JSON. See [`TypeSpec::decode_json`].
    pub fn decode_json(self, raw: Option<&[u8]>, config: &Config) -> CodecResult<Value> {
        TypeSpec::scalar(self).decode_json(raw, config)
    }

    /// Encode JSON into a scalar text value. See [`TypeSpec::encode_json`].
    pub fn encode_json(self, value: &Value, config: &Config) -> CodecResult<Option<Bytes>> {
        TypeSpec::scalar(self).encode_json(value, config)
    }
}

impl fmt::Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A base type or a one-dimensional array of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    pub ty: PgType,
    pub array: bool,
}

impl TypeSpec {
    pub fn scalar(ty: PgType) -> Self {
        Self { ty, array: false }
    }

    pub fn array(ty: PgType) -> Self {
        Self { ty, array: true }
    }

    /// Resolve `int4`, `integer[]` or the catalog spelling `_int4`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let spec = if let Some(base) = name.strip_suffix("[]") {
            PgType::from_name(base).map(Self::array)
        } else if let Some(base) = name.strip_prefix('_') {
            PgType::from_name(base).map(Self::array)
        } else {
            PgType::from_name(name).map(Self::scalar)
        };
        match spec {
            Some(spec) => tracing::debug!(input = name, resolved = %spec, "resolved type"),
            None => tracing::debug!(input = name, "unknown type"),
        }
        spec
    }

    /// Resolve a base or array type OID.
    pub fn from_oid(oid: u32) -> Option<Self> {
        if oid == 0 {
            return None;
        }
        PgType::ALL.iter().copied().find_map(|ty| {
            if ty.oid() == oid {
                Some(Self::scalar(ty))
            } else if ty.array_oid() == oid {
                Some(Self::array(ty))
            } else {
                None
            }
        })
    }

    pub fn name(&self) -> &'static str {
        if self.array {
            self.ty.array_name()
        } else {
            self.ty.name()
        }
    }

    pub fn oid(&self) -> u32 {
        if self.array {
            self.ty.array_oid()
        } else {
            self.ty.oid()
        }
    }

    /// Decode a text value into JSON. Wire NULL becomes `null`.
    pub fn decode_json(&self, raw: Option<&[u8]>, config: &Config) -> CodecResult<Value> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };
        if self.array {
            self.ty.decode_array(raw, config)
        } else {
            self.ty.decode_scalar(raw, config)
        }
    }

    /// Encode JSON into a text value. `null` becomes wire NULL.
    pub fn encode_json(&self, value: &Value, config: &Config) -> CodecResult<Option<Bytes>> {
        if value.is_null() {
            return Ok(None);
        }
        let mut buf = BytesMut::new();
        if self.array {
            self.ty.encode_array(value, config, &mut buf)?;
        } else {
            self.ty.encode_scalar(value, config, &mut buf)?;
        }
        Ok(Some(buf.freeze()))
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeSpec {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CodecError::UnknownType(s.to_string()))
    }
}

/// Map OID to a human-readable type name
pub fn oid_to_name(oid: u32) -> &'static str {
    TypeSpec::from_oid(oid).map_or("unknown", |spec| spec.name())
}

/// Check if an OID represents an array type
pub fn is_array_oid(oid: u32) -> bool {
    TypeSpec::from_oid(oid).is_some_and(|spec| spec.array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_and_oids() {
        assert_eq!(PgType::from_name("integer"), Some(PgType::Int4));
        assert_eq!(PgType::from_name("INT4"), Some(PgType::Int4));
        assert_eq!(PgType::from_name("timestamp with time zone"), Some(PgType::Timestamptz));
        assert_eq!(PgType::from_name("nope"), None);

        assert_eq!(oid_to_name(oid::INT4), "int4");
        assert_eq!(oid_to_name(oid::INT4_ARRAY), "int4[]");
        assert_eq!(oid_to_name(999_999), "unknown");
        assert!(is_array_oid(oid::BOX_ARRAY));
        assert!(!is_array_oid(oid::BOX));
        assert_eq!(TypeSpec::from_oid(oid::HSTORE), None);
    }

    #[test]
    fn test_unique_names_and_oids() {
        for (i, a) in PgType::ALL.iter().enumerate() {
            for b in &PgType::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
                if a.oid() != 0 {
                    assert_ne!(a.oid(), b.oid(), "{a} / {b}");
                    assert_ne!(a.array_oid(), b.array_oid(), "{a} / {b}");
                }
            }
        }
    }

    #[test]
    fn test_type_spec_parse() {
        assert_eq!(TypeSpec::parse("int4[]"), Some(TypeSpec::array(PgType::Int4)));
        assert_eq!(TypeSpec::parse("_text"), Some(TypeSpec::array(PgType::Text)));
        assert_eq!(TypeSpec::parse("daterange"), Some(TypeSpec::scalar(PgType::DateRange)));
        assert!("bogus[]".parse::<TypeSpec>().is_err());
    }

    #[test]
    fn test_decode_json() {
        let config = Config::default();
        let spec = TypeSpec::array(PgType::Int4);
        assert_eq!(
            spec.decode_json(Some(&b"{1,NULL,3}"[..]), &config).unwrap(),
            json!([1, null, 3])
        );
        assert_eq!(spec.decode_json(None, &config).unwrap(), Value::Null);

        let spec = TypeSpec::scalar(PgType::Point);
        assert_eq!(
            spec.decode_json(Some(&b"(1,2)"[..]), &config).unwrap(),
            json!({"x": 1.0, "y": 2.0})
        );
    }

    #[test]
    fn test_encode_json() {
        let config = Config::default();
        let spec = TypeSpec::array(PgType::Text);
        let out = spec
            .encode_json(&json!(["a b", null, "NULL"]), &config)
            .unwrap()
            .unwrap();
        assert_eq!(&out[..], br#"{"a b",NULL,"NULL"}"#);
        assert_eq!(spec.encode_json(&Value::Null, &config).unwrap(), None);
    }

    #[test]
    fn test_money_symbol_from_config() {
        let mut config = Config::default();
        config.money.symbol = "€".to_string();
        let out = TypeSpec::scalar(PgType::Money)
            .encode_json(&json!(1050), &config)
            .unwrap()
            .unwrap();
        assert_eq!(&out[..], "€10.50".as_bytes());
    }

    #[test]
    fn test_vector_array_json() {
        let config = Config::default();
        let spec = TypeSpec::array(PgType::Int2Vector);
        let value = spec.decode_json(Some(&br#"{"1 2",3}"#[..]), &config).unwrap();
        assert_eq!(value, json!([[1, 2], [3]]));
        let out = spec.encode_json(&value, &config).unwrap().unwrap();
        assert_eq!(&out[..], br#"{"1 2",3}"#);
    }
}

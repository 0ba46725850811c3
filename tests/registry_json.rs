use pretty_assertions::assert_eq;
use qail_pgtext::registry::oid;
use qail_pgtext::{Config, PgType, TypeSpec};
use serde_json::{Value, json};

fn decode(spec: &str, raw: &str) -> Value {
    let spec: TypeSpec = spec.parse().unwrap();
    spec.decode_json(Some(raw.as_bytes()), &Config::default()).unwrap()
}

fn encode(spec: &str, value: Value) -> Option<String> {
    let spec: TypeSpec = spec.parse().unwrap();
    spec.encode_json(&value, &Config::default())
        .unwrap()
        .map(|bytes| String::from_utf8(bytes.to_vec()).unwrap())
}

#[test]
fn test_every_type_resolves_by_name_and_oid() {
    for &ty in PgType::ALL {
        assert_eq!(PgType::from_name(ty.name()), Some(ty));
        assert_eq!(TypeSpec::parse(ty.array_name()), Some(TypeSpec::array(ty)));
        if ty.oid() != 0 {
            assert_eq!(PgType::from_oid(ty.oid()), Some(ty));
            assert_eq!(TypeSpec::from_oid(ty.array_oid()), Some(TypeSpec::array(ty)));
        }
    }
    assert_eq!(TypeSpec::from_oid(oid::TSTZRANGE_ARRAY).unwrap().name(), "tstzrange[]");
}

#[test]
fn test_scalars() {
    assert_eq!(decode("bool", "yes"), json!(true));
    assert_eq!(decode("bigint", "-42"), json!(-42));
    assert_eq!(decode("float8", "NaN"), Value::Null);
    assert_eq!(decode("numeric", "123.4500"), json!("123.4500"));
    assert_eq!(decode("money", "$1,234.56"), json!(123456));
    assert_eq!(decode("uuid", "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11"), json!("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"));
    assert_eq!(decode("date", "1999-01-08"), json!("1999-01-08"));
    assert_eq!(decode("jsonb", r#"{"a": [1, 2]}"#), json!({"a": [1, 2]}));
    assert_eq!(decode("bytea", r"\x0102"), json!([1, 2]));
    assert_eq!(decode("circle", "<(1,2),3>"), json!("<(1,2),3>"));
}

#[test]
fn test_composites() {
    assert_eq!(
        decode("box", "(1,1),(3,3)"),
        json!({"high": {"x": 3.0, "y": 3.0}, "low": {"x": 1.0, "y": 1.0}})
    );
    assert_eq!(
        decode("int4range", "[1,5]"),
        json!({"Span": {"lower": {"Included": 1}, "upper": {"Excluded": 6}}})
    );
    assert_eq!(decode("int4range", "empty"), json!("Empty"));
    assert_eq!(
        decode("hstore", r#""a"=>"1", "b"=>NULL"#),
        json!({"a": "1", "b": null})
    );
}

#[test]
fn test_arrays() {
    assert_eq!(decode("_int4", "{1,NULL,3}"), json!([1, null, 3]));
    assert_eq!(decode("text[]", r#"{a,"b c",NULL}"#), json!(["a", "b c", null]));
    assert_eq!(
        decode("point[]", r#"{"(1,2)",NULL}"#),
        json!([{"x": 1.0, "y": 2.0}, null])
    );
}

#[test]
fn test_encode() {
    assert_eq!(encode("int2", json!(7)).as_deref(), Some("7"));
    assert_eq!(encode("int2", Value::Null), None);
    assert_eq!(encode("money", json!(-5)).as_deref(), Some("-$0.05"));
    assert_eq!(
        encode("hstore", json!({"b": "2", "a": "1"})).as_deref(),
        Some(r#""a"=>"1", "b"=>"2""#)
    );
    assert_eq!(
        encode("daterange", json!({"Span": {"lower": {"Included": "2024-01-01"}, "upper": {"Included": "2024-01-31"}}}))
            .as_deref(),
        Some("[2024-01-01,2024-02-01)")
    );
    assert_eq!(
        encode("bytea[]", json!([[97, 98, 99], null])).as_deref(),
        Some(r#"{"\\x616263",NULL}"#)
    );
}

#[test]
fn test_json_round_trip_through_literal() {
    let cases = [
        ("int8[]", "{1,2,3}"),
        ("text[]", r#"{"",NULL,"a\\b"}"#),
        ("tstzrange", r#"["2001-01-01 00:00:00+00","2001-01-02 00:00:00+00")"#),
        ("inet", "192.168.1.5/24"),
        ("macaddr", "08:00:2b:01:02:03"),
        ("timetz", "04:05:06-08"),
        ("tsvector", "'cat':3A 'fat':2"),
        ("int2vector", "1 2 3"),
        ("oidvector[]", r#"{"23 25",16}"#),
        ("bit[]", "{101,0}"),
    ];
    for (ty, literal) in cases {
        let value = decode(ty, literal);
        assert_eq!(encode(ty, value).as_deref(), Some(literal), "{ty}");
    }
}

#[test]
fn test_errors() {
    let config = Config::default();
    assert!("geometry".parse::<TypeSpec>().is_err());
    let int4 = TypeSpec::scalar(PgType::Int4);
    assert!(int4.decode_json(Some(b"abc".as_slice()), &config).is_err());
    assert!(int4.encode_json(&json!("seven"), &config).is_err());
}

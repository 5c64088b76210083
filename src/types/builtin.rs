//! Built-in semantic types and their wire identifiers.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{Oid, TypeDescriptor, TypeTable, Value};
use crate::error::BoxError;

pub const TEXT: Oid = 25;
pub const UNSPECIFIED: Oid = 0;
pub const INT2: Oid = 21;
pub const INT4: Oid = 23;
pub const INT8: Oid = 20;
pub const OID: Oid = 26;
pub const FLOAT4: Oid = 700;
pub const FLOAT8: Oid = 701;
pub const JSON: Oid = 114;
pub const JSONB: Oid = 3802;
pub const BOOL: Oid = 16;
pub const BYTEA: Oid = 17;
pub const DATE: Oid = 1082;
pub const TIME: Oid = 1083;
pub const TIMESTAMP: Oid = 1114;
pub const TIMESTAMPTZ: Oid = 1184;
pub const VARCHAR: Oid = 1043;

/// Element identifier → array identifier for the well-known types.
pub const ARRAY_TYPES: [(Oid, Oid); 16] = [
    (BOOL, 1000),
    (BYTEA, 1001),
    (INT8, 1016),
    (INT2, 1005),
    (INT4, 1007),
    (TEXT, 1009),
    (OID, 1028),
    (JSON, 199),
    (FLOAT4, 1021),
    (FLOAT8, 1022),
    (VARCHAR, 1015),
    (DATE, 1182),
    (TIME, 1183),
    (TIMESTAMP, 1115),
    (TIMESTAMPTZ, 1185),
    (JSONB, 3807),
];

/// The built-in type table.
pub fn builtin_types() -> TypeTable {
    let mut table = TypeTable::new();

    table.insert(
        "string",
        TypeDescriptor::new(TEXT, vec![], Arc::new(|x: &Value| x.to_text()), None),
    );
    table.insert(
        "number",
        TypeDescriptor::new(
            UNSPECIFIED,
            vec![INT2, INT4, OID, FLOAT4, FLOAT8],
            Arc::new(|x: &Value| x.to_text()),
            Some(Arc::new(parse_number)),
        ),
    );
    table.insert(
        "json",
        TypeDescriptor::new(
            JSONB,
            vec![JSON, JSONB],
            Arc::new(|x: &Value| x.to_json().to_string()),
            Some(Arc::new(parse_json)),
        )
        .whole_value(),
    );
    table.insert(
        "boolean",
        TypeDescriptor::new(
            BOOL,
            vec![BOOL],
            Arc::new(serialize_bool),
            Some(Arc::new(|x: &str| -> Result<Value, BoxError> {
                Ok(Value::Bool(x == "t"))
            })),
        ),
    );
    table.insert(
        "date",
        TypeDescriptor::new(
            TIMESTAMPTZ,
            vec![DATE, TIME, TIMESTAMP, TIMESTAMPTZ],
            Arc::new(|x: &Value| x.to_text()),
            Some(Arc::new(parse_timestamp)),
        ),
    );
    table.insert(
        "bytea",
        TypeDescriptor::new(
            BYTEA,
            vec![BYTEA],
            Arc::new(serialize_bytea),
            Some(Arc::new(parse_bytea)),
        ),
    );

    table
}

/// Parse numeric text. Surrounding whitespace is ignored.
pub fn parse_number(x: &str) -> Result<Value, BoxError> {
    let n: f64 = x.trim().parse()?;
    Ok(Value::Number(n))
}

pub fn parse_json(x: &str) -> Result<Value, BoxError> {
    Ok(Value::Json(serde_json::from_str(x)?))
}

pub fn serialize_bool(x: &Value) -> String {
    let flag = match x.untagged() {
        Value::Bool(true) => "t",
        _ => "f",
    };
    flag.to_string()
}

pub fn serialize_bytea(x: &Value) -> String {
    match x.untagged() {
        Value::Bytes(bytes) => format!("\\x{}", hex::encode(bytes)),
        other => format!("\\x{}", hex::encode(other.to_text())),
    }
}

pub fn parse_bytea(x: &str) -> Result<Value, BoxError> {
    let digits = x
        .strip_prefix("\\x")
        .ok_or("bytea text must start with \\x")?;
    Ok(Value::Bytes(hex::decode(digits)?))
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M:%S"];

/// Parse date, time and timestamp text into a UTC timestamp.
///
/// Values without an offset are read as UTC. A bare date is midnight; a bare
/// time of day lands on 1970-01-01.
pub fn parse_timestamp(x: &str) -> Result<Value, BoxError> {
    let s = x.trim().replacen('T', " ", 1);

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&s, format) {
            return Ok(Value::Timestamp(ts.with_timezone(&Utc)));
        }
    }
    if let Some(naive) = s.strip_suffix('Z') {
        for format in NAIVE_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
                return Ok(Value::Timestamp(ts.and_utc()));
            }
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&s, format) {
            return Ok(Value::Timestamp(ts.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(Value::Timestamp(date.and_time(NaiveTime::default()).and_utc()));
    }
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&s, format) {
            return Ok(Value::Timestamp(NaiveDate::default().and_time(time).and_utc()));
        }
    }

    Err(format!("unrecognized date/time text '{x}'").into())
}

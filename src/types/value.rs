//! Native values exchanged with the codec.
//!
//! `Value` is a closed union over everything the layer knows how to send or
//! receive. Inference and serialization match on it directly instead of
//! probing runtime shapes.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use super::Oid;
use crate::codec::serialize_array;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    /// 64-bit integer that must not be sent through the float path.
    BigInt(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Array(Vec<Value>),
    /// Value carrying an explicit wire type that overrides inference.
    Typed { oid: Oid, value: Box<Value> },
}

impl Value {
    /// Tag a value with an explicit wire type identifier.
    pub fn typed(oid: Oid, value: impl Into<Value>) -> Self {
        Value::Typed {
            oid,
            value: Box::new(value.into()),
        }
    }

    /// The value with any explicit type tag removed.
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Typed { value, .. } => value.untagged(),
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.untagged(), Value::Null)
    }

    /// Generic string conversion used when no typed serializer applies.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Timestamp(ts) => format_timestamp(ts),
            Value::Bytes(bytes) => format!("\\x{}", hex::encode(bytes)),
            Value::Json(json) => json.to_string(),
            Value::Array(xs) => serialize_array(xs, &|x: &Value| x.to_text()),
            Value::Typed { value, .. } => value.to_text(),
        }
    }

    /// Convert into a JSON document for the json serializer.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Text(s) => Json::String(s.clone()),
            Value::Number(n) => json_number(*n),
            Value::BigInt(i) => Json::from(*i),
            Value::Bool(b) => Json::Bool(*b),
            Value::Timestamp(ts) => Json::String(format_timestamp(ts)),
            Value::Bytes(bytes) => Json::String(hex::encode(bytes)),
            Value::Json(json) => json.clone(),
            Value::Array(xs) => Json::Array(xs.iter().map(Value::to_json).collect()),
            Value::Typed { value, .. } => value.to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Format a float the way the store prints numeric text.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Integral floats within the exact range become JSON integers; non-finite
/// values become null.
fn json_number(n: f64) -> serde_json::Value {
    const EXACT: f64 = 9_007_199_254_740_992.0;

    if n.fract() == 0.0 && n.abs() <= EXACT {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::BigInt(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self {
        Value::Array(xs)
    }
}

use super::builtin::{BOOL, BYTEA, INT8, TIMESTAMPTZ, UNSPECIFIED};
use super::{Oid, Value};

/// Pick the wire type identifier for an outgoing value.
///
/// Explicit tags win, then structure (timestamps, arrays, bytes), then the
/// primitive kind. Arrays report their first element's type, so an empty
/// array infers as unspecified unless tagged.
pub fn infer_type(value: &Value) -> Oid {
    match value {
        Value::Typed { oid, .. } => *oid,
        Value::Timestamp(_) => TIMESTAMPTZ,
        Value::Array(xs) => xs.first().map_or(UNSPECIFIED, infer_type),
        Value::Bytes(_) => BYTEA,
        Value::Number(_) => UNSPECIFIED,
        Value::BigInt(_) => INT8,
        Value::Bool(_) => BOOL,
        Value::Null | Value::Text(_) | Value::Json(_) => UNSPECIFIED,
    }
}

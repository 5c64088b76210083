//! Diagnostic field codes and retry-eligible routines.
//!
//! Error responses from the store arrive as single-byte field codes paired
//! with text. These tables turn them into named fields and flag the internal
//! routines whose errors mean a cached statement or plan went stale.

use std::collections::BTreeMap;

/// Field code → field name.
pub const ERROR_FIELDS: [(u8, &str); 18] = [
    (b'S', "severity_local"),
    (b'V', "severity"),
    (b'C', "code"),
    (b'M', "message"),
    (b'D', "detail"),
    (b'H', "hint"),
    (b'P', "position"),
    (b'p', "internal_position"),
    (b'q', "internal_query"),
    (b'W', "where"),
    (b's', "schema_name"),
    (b't', "table_name"),
    (b'c', "column_name"),
    (b'd', "data_type_name"),
    (b'n', "constraint_name"),
    (b'F', "file"),
    (b'L', "line"),
    (b'R', "routine"),
];

/// Routines whose errors are worth one retry after re-preparing.
pub const RETRY_ROUTINES: [&str; 3] = [
    "FetchPreparedStatement",
    "RevalidateCachedQuery",
    "transformAssignedExpr",
];

pub fn field_name(code: u8) -> Option<&'static str> {
    ERROR_FIELDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn is_retry_routine(routine: &str) -> bool {
    RETRY_ROUTINES.iter().any(|r| *r == routine)
}

/// Named diagnostic fields built from a raw code → text mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFields {
    fields: BTreeMap<&'static str, String>,
}

impl ErrorFields {
    /// Map raw `(code, text)` pairs to named fields. Unknown codes are
    /// dropped; a repeated code keeps the last value.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        let fields = raw
            .into_iter()
            .filter_map(|(code, text)| field_name(code).map(|name| (name, text.into())))
            .collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn routine(&self) -> Option<&str> {
        self.get("routine")
    }

    /// True when the error came from a routine in `RETRY_ROUTINES`.
    pub fn is_retryable(&self) -> bool {
        self.routine().is_some_and(is_retry_routine)
    }

    pub fn into_map(self) -> BTreeMap<&'static str, String> {
        self.fields
    }
}

/// Build the error-object shape from raw protocol fields.
pub fn error_fields<I, S>(raw: I) -> BTreeMap<&'static str, String>
where
    I: IntoIterator<Item = (u8, S)>,
    S: Into<String>,
{
    ErrorFields::from_raw(raw).into_map()
}

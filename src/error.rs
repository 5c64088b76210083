//! Error types for the value codec layer.

use std::error::Error;

use thiserror::Error;

use crate::types::Oid;

/// Boxed error returned by element parse functions.
///
/// Lets `serde_json`, `chrono` and `hex` failures flow through `?` inside a
/// parse function; the registry attaches the wire identifier afterwards.
pub type BoxError = Box<dyn Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed array literal at byte {position}: {reason}")]
    MalformedArrayLiteral { position: usize, reason: String },

    #[error("Failed to parse value of type {oid} from '{raw}': {source}")]
    ValueParse {
        oid: Oid,
        raw: String,
        #[source]
        source: BoxError,
    },

    #[error("Unknown semantic type '{name}'")]
    UnknownSemanticType { name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedArrayLiteral {
            position,
            reason: reason.into(),
        }
    }

    pub fn value_parse(oid: Oid, raw: impl Into<String>, source: BoxError) -> Self {
        CodecError::ValueParse {
            oid,
            raw: raw.into(),
            source,
        }
    }
}

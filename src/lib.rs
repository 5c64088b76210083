//! pg_codec - value codec layer for a row-and-column wire protocol
//!
//! Converts native values to the text representation the store expects and
//! back again:
//! - a type registry keyed by wire type identifier, built from a table of
//!   semantic types and extensible with user types
//! - type inference for outgoing values
//! - the array literal codec (`{...}` with quoting and nesting)
//! - identifier escaping, naming convention translation and diagnostic
//!   field tables used at the wire boundary
//!
//! # Example
//!
//! ```
//! use pg_codec::{TypeRegistry, Value};
//!
//! let registry = TypeRegistry::defaults();
//! let parsed = registry.parse(1007, "{1,{2,3}}").unwrap();
//! assert_eq!(
//!     parsed,
//!     Value::Array(vec![
//!         Value::Number(1.0),
//!         Value::Array(vec![Value::Number(2.0), Value::Number(3.0)]),
//!     ])
//! );
//!
//! let param = registry.parameter(&Value::Array(vec![Value::Bool(true), Value::Bool(false)]));
//! assert_eq!(param.oid, 1000);
//! assert_eq!(param.text.as_deref(), Some(r#"{"t","f"}"#));
//! ```

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod types;

pub use codec::{escape_identifier, parse_array, serialize_array};
pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use naming::{from_camel, from_kebab, from_pascal, to_camel, to_kebab, to_pascal, NamingConvention};
pub use types::{
    infer_type, merge_user_types, Oid, Parameter, TypeDescriptor, TypeRegistry, TypeTable, Value,
};

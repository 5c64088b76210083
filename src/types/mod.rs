//! Semantic types, the registry built from them, and type inference.
//!
//! A semantic type (e.g. "date") names one `TypeDescriptor`: the wire
//! identifier used when sending, the identifiers whose text is parsed with
//! its rules, and the two conversion functions. The registry flattens a table
//! of descriptors into lookups keyed by wire identifier.

pub mod builtin;
mod infer;
mod registry;
mod value;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

pub use infer::infer_type;
pub use registry::{merge_user_types, Parameter, TypeRegistry};
pub use value::{format_number, format_timestamp, Value};

/// Wire type identifier.
pub type Oid = u32;

/// Converts a native value to wire text.
pub type SerializeFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Converts wire text to a native value.
pub type ParseFn = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;

/// One entry in a type table.
#[derive(Clone)]
pub struct TypeDescriptor {
    /// Identifier used when sending a value of this type.
    pub to: Oid,
    /// Identifiers parsed with `parse`. Empty means generic string handling.
    pub from: Vec<Oid>,
    pub serialize: SerializeFn,
    /// `None` registers the identity parser for every identifier in `from`.
    pub parse: Option<ParseFn>,
    /// `serialize` takes arrays whole instead of element by element.
    pub whole_value: bool,
}

impl TypeDescriptor {
    pub fn new(to: Oid, from: Vec<Oid>, serialize: SerializeFn, parse: Option<ParseFn>) -> Self {
        Self {
            to,
            from,
            serialize,
            parse,
            whole_value: false,
        }
    }

    /// Mark the serializer as taking arrays whole (e.g. json).
    pub fn whole_value(mut self) -> Self {
        self.whole_value = true;
        self
    }

    /// Same conversion functions under different wire identifiers.
    pub fn retarget(&self, to: Oid, from: Vec<Oid>) -> Self {
        Self {
            to,
            from,
            serialize: Arc::clone(&self.serialize),
            parse: self.parse.clone(),
            whole_value: self.whole_value,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("parse", &self.parse.is_some())
            .field("whole_value", &self.whole_value)
            .finish_non_exhaustive()
    }
}

/// Semantic type name → descriptor.
///
/// Ordered by name so registry construction is deterministic when two
/// entries claim the same identifier.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    entries: BTreeMap<String, TypeDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the descriptor for `name`.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Type registry: wire identifier → serialize/parse functions.
//!
//! The default registry is built once from the built-in table and shared
//! process-wide. Merging user types produces a new registry and never touches
//! the shared one.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::{debug, trace};

use super::builtin::{builtin_types, ARRAY_TYPES, UNSPECIFIED};
use super::{infer_type, Oid, ParseFn, SerializeFn, TypeTable, Value};
use crate::codec::{parse_array, serialize_array};
use crate::error::{BoxError, CodecError, Result};

static DEFAULT_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(|| {
    ARRAY_TYPES
        .iter()
        .fold(TypeRegistry::build(&builtin_types()), |registry, &(element, array)| {
            registry.with_array_type(element, array)
        })
});

/// An outgoing value ready for the query-parameter layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Wire type identifier to declare; array values report the array type.
    pub oid: Oid,
    /// Wire text, `None` for SQL NULL.
    pub text: Option<String>,
}

#[derive(Clone, Default)]
pub struct TypeRegistry {
    serializers: HashMap<Oid, SerializeFn>,
    parsers: HashMap<Oid, ParseFn>,
    /// element → array
    arrays: HashMap<Oid, Oid>,
    /// array → element
    elements: HashMap<Oid, Oid>,
    /// Identifiers whose serializer takes arrays whole.
    whole_values: HashSet<Oid>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn sorted<'a>(keys: impl Iterator<Item = &'a Oid>) -> Vec<Oid> {
            let mut keys: Vec<Oid> = keys.copied().collect();
            keys.sort_unstable();
            keys
        }

        let mut arrays: Vec<(Oid, Oid)> = self.arrays.iter().map(|(&e, &a)| (e, a)).collect();
        arrays.sort_unstable();

        f.debug_struct("TypeRegistry")
            .field("serializers", &sorted(self.serializers.keys()))
            .field("parsers", &sorted(self.parsers.keys()))
            .field("arrays", &arrays)
            .field("whole_values", &sorted(self.whole_values.iter()))
            .finish()
    }
}

impl TypeRegistry {
    /// Flatten a type table into serializer and parser lookups.
    ///
    /// Each descriptor registers its serializer under `to` and its parser
    /// under every identifier in `from`. A descriptor without a parser
    /// registers the identity parser, so it still overrides on merge.
    /// Whole-value descriptors also serialize for each `from` identifier that
    /// has no serializer of its own.
    pub fn build(table: &TypeTable) -> Self {
        let mut registry = Self::default();
        for (_, descriptor) in table.iter() {
            registry
                .serializers
                .insert(descriptor.to, Arc::clone(&descriptor.serialize));
            let parse = descriptor.parse.clone().unwrap_or_else(identity_parser);
            for &oid in &descriptor.from {
                registry.parsers.insert(oid, Arc::clone(&parse));
            }

            if descriptor.whole_value {
                registry.whole_values.insert(descriptor.to);
                for &oid in &descriptor.from {
                    registry.whole_values.insert(oid);
                    registry
                        .serializers
                        .entry(oid)
                        .or_insert_with(|| Arc::clone(&descriptor.serialize));
                }
            }
        }
        registry
    }

    /// The shared registry built from the built-in table.
    pub fn defaults() -> &'static TypeRegistry {
        &DEFAULT_REGISTRY
    }

    /// A new registry with `user` entries layered over this one.
    ///
    /// Keys registered by `user` replace the existing entry; everything else
    /// passes through unchanged.
    pub fn merged(&self, user: &TypeTable) -> TypeRegistry {
        let overlay = TypeRegistry::build(user);
        debug!(
            user_types = user.len(),
            serializers = overlay.serializers.len(),
            parsers = overlay.parsers.len(),
            "merging user types"
        );

        let mut merged = self.clone();
        for oid in overlay.serializers.keys() {
            merged.whole_values.remove(oid);
        }
        merged.whole_values.extend(overlay.whole_values);
        merged.serializers.extend(overlay.serializers);
        merged.parsers.extend(overlay.parsers);
        merged
    }

    /// A new registry that also knows `array` holds elements of `element`.
    pub fn with_array_type(mut self, element: Oid, array: Oid) -> Self {
        self.arrays.insert(element, array);
        self.elements.insert(array, element);
        self
    }

    pub fn serializer(&self, oid: Oid) -> Option<&SerializeFn> {
        self.serializers.get(&oid)
    }

    pub fn parser(&self, oid: Oid) -> Option<&ParseFn> {
        self.parsers.get(&oid)
    }

    /// Array identifier whose elements are `element`.
    pub fn array_type(&self, element: Oid) -> Option<Oid> {
        self.arrays.get(&element).copied()
    }

    /// True when `oid` serializes arrays as one value rather than as an
    /// array literal.
    pub fn is_whole_value(&self, oid: Oid) -> bool {
        self.whole_values.contains(&oid)
    }

    /// Element identifier of the array type `array`.
    pub fn element_type(&self, array: Oid) -> Option<Oid> {
        self.elements.get(&array).copied()
    }

    /// Parse wire text received for a column of type `oid`.
    ///
    /// Unregistered identifiers fall back to the raw text.
    pub fn parse(&self, oid: Oid, raw: &str) -> Result<Value> {
        if let Some(parse) = self.parsers.get(&oid) {
            return parse(raw).map_err(|e| CodecError::value_parse(oid, raw, e));
        }

        if let Some(element) = self.element_type(oid) {
            let parse = self.parsers.get(&element);
            let parse_element = |s: &str| -> Result<Value> {
                match parse {
                    Some(parse) => parse(s).map_err(|e| CodecError::value_parse(oid, s, e)),
                    None => Ok(Value::Text(s.to_string())),
                }
            };
            return parse_array(raw, &parse_element).map(Value::Array);
        }

        trace!(oid, "no parser registered, returning raw text");
        Ok(Value::Text(raw.to_string()))
    }

    /// Serialize `value` as wire type `oid`.
    ///
    /// Arrays go through the array codec with the element serializer unless
    /// `oid` takes them whole; an explicit tag on the value replaces `oid`.
    /// Unknown identifiers use generic string conversion.
    pub fn serialize(&self, oid: Oid, value: &Value) -> String {
        match value {
            Value::Typed { oid: tag, value } => self.serialize(*tag, value),
            Value::Array(xs) if !self.is_whole_value(oid) => {
                let element = self.element_type(oid).unwrap_or(oid);
                match self.serializers.get(&element) {
                    Some(serialize) => serialize_array(xs, &**serialize),
                    None => serialize_array(xs, &|x: &Value| x.to_text()),
                }
            }
            other => match self.serializers.get(&oid) {
                Some(serialize) => serialize(other),
                None => other.to_text(),
            },
        }
    }

    /// Infer, serialize and report the declared type of an outgoing value.
    pub fn parameter(&self, value: &Value) -> Parameter {
        let inferred = infer_type(value);

        let oid = match value.untagged() {
            Value::Array(_)
                if inferred != UNSPECIFIED
                    && !self.is_whole_value(inferred)
                    && self.element_type(inferred).is_none() =>
            {
                self.array_type(inferred).unwrap_or(inferred)
            }
            _ => inferred,
        };

        let text = if value.is_null() {
            None
        } else {
            Some(self.serialize(inferred, value))
        };

        Parameter { oid, text }
    }
}

/// Layer `user` over the shared default registry.
pub fn merge_user_types(user: &TypeTable) -> TypeRegistry {
    TypeRegistry::defaults().merged(user)
}

fn identity_parser() -> ParseFn {
    Arc::new(|x: &str| -> std::result::Result<Value, BoxError> { Ok(Value::Text(x.to_string())) })
}

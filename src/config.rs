//! Codec configuration.
//!
//! Loads a JSON document describing the application-side naming convention
//! and any extra wire types to register:
//!
//! ```json
//! {
//!   "naming": "camel",
//!   "types": [
//!     { "name": "citext", "like": "string", "to": 25, "from": [16385], "array": 16386 }
//!   ]
//! }
//! ```
//!
//! Extra types borrow the conversion functions of a built-in semantic type
//! (`like`) under their own wire identifiers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::naming::NamingConvention;
use crate::types::builtin::builtin_types;
use crate::types::{merge_user_types, Oid, TypeRegistry, TypeTable};

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Application-side naming convention. `None` leaves names untouched.
    #[serde(default)]
    pub naming: Option<NamingConvention>,

    /// Extra wire types layered over the built-ins.
    #[serde(default)]
    pub types: Vec<UserTypeConfig>,
}

/// A user type declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserTypeConfig {
    /// Semantic type name for the new entry.
    pub name: String,
    /// Built-in semantic type whose functions are reused.
    pub like: String,
    /// Identifier used when sending.
    pub to: Oid,
    /// Identifiers parsed with the borrowed parser. Accepts one or many.
    #[serde(default, deserialize_with = "one_or_many")]
    pub from: Vec<Oid>,
    /// Array identifier whose elements are `to`.
    #[serde(default)]
    pub array: Option<Oid>,
}

impl CodecConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CodecError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content).map_err(|e| {
            CodecError::Config(format!("Invalid JSON in {}: {}", path.display(), e))
        })?;

        debug!(
            path = %path.display(),
            types = config.types.len(),
            naming = ?config.naming,
            "loaded codec configuration"
        );
        Ok(config)
    }

    /// Build the user type table declared by this configuration.
    pub fn user_types(&self) -> Result<TypeTable> {
        let builtins = builtin_types();
        let mut table = TypeTable::new();
        for user in &self.types {
            let base = builtins
                .get(&user.like)
                .ok_or_else(|| CodecError::UnknownSemanticType {
                    name: user.like.clone(),
                })?;
            table.insert(user.name.clone(), base.retarget(user.to, user.from.clone()));
        }
        Ok(table)
    }

    /// The default registry with this configuration's types merged in.
    pub fn registry(&self) -> Result<TypeRegistry> {
        let registry = merge_user_types(&self.user_types()?);
        Ok(self
            .types
            .iter()
            .filter_map(|user| user.array.map(|array| (user.to, array)))
            .fold(registry, |registry, (element, array)| {
                registry.with_array_type(element, array)
            }))
    }

    /// Store-side name → application-side name.
    pub fn app_name(&self, store_name: &str) -> String {
        match self.naming {
            Some(convention) => convention.to_app(store_name),
            None => store_name.to_string(),
        }
    }

    /// Application-side name → store-side name.
    pub fn store_name(&self, app_name: &str) -> String {
        match self.naming {
            Some(convention) => convention.to_store(app_name),
            None => app_name.to_string(),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<Oid>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Oid),
        Many(Vec<Oid>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(oid) => vec![oid],
        OneOrMany::Many(oids) => oids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CITEXT: &str = r#"
    {
        "naming": "camel",
        "types": [
            { "name": "citext", "like": "string", "to": 25, "from": [16385], "array": 16386 },
            { "name": "money_num", "like": "number", "to": 790, "from": 790 }
        ]
    }
    "#;

    #[rstest]
    fn test_deserialization() {
        let config = CodecConfig::from_json(CITEXT).unwrap();
        assert_eq!(config.naming, Some(NamingConvention::Camel));
        assert_eq!(config.types.len(), 2);
        assert_eq!(config.types[0].from, vec![16385]);
        assert_eq!(config.types[0].array, Some(16386));
        assert_eq!(config.types[1].from, vec![790]);
        assert_eq!(config.types[1].array, None);
    }

    #[rstest]
    fn test_empty_document_is_default() {
        let config = CodecConfig::from_json("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[rstest]
    fn test_unknown_field_rejected() {
        assert!(CodecConfig::from_json(r#"{ "nameing": "camel" }"#).is_err());
    }

    #[rstest]
    fn test_registry_uses_borrowed_functions() {
        let registry = CodecConfig::from_json(CITEXT).unwrap().registry().unwrap();
        assert_eq!(registry.parse(790, "12.5").unwrap(), Value::Number(12.5));
        assert_eq!(registry.parse(16385, "Hello").unwrap(), Value::Text("Hello".into()));
        assert_eq!(
            registry.parse(16386, "{a,B}").unwrap(),
            Value::Array(vec![Value::Text("a".into()), Value::Text("B".into())])
        );
        assert_eq!(registry.array_type(25), Some(16386));
    }

    #[rstest]
    fn test_registry_keeps_builtins() {
        let registry = CodecConfig::from_json(CITEXT).unwrap().registry().unwrap();
        assert_eq!(registry.parse(16, "t").unwrap(), Value::Bool(true));
        assert_eq!(registry.parse(23, "7").unwrap(), Value::Number(7.0));
    }

    #[rstest]
    fn test_unknown_like_is_error() {
        let config = CodecConfig::from_json(
            r#"{ "types": [ { "name": "x", "like": "nope", "to": 1 } ] }"#,
        )
        .unwrap();
        let err = config.registry().unwrap_err();
        assert!(matches!(err, CodecError::UnknownSemanticType { name } if name == "nope"));
    }

    #[rstest]
    fn test_naming_applied() {
        let config = CodecConfig::from_json(CITEXT).unwrap();
        assert_eq!(config.app_name("created_at"), "createdAt");
        assert_eq!(config.store_name("createdAt"), "created_at");
    }

    #[rstest]
    fn test_no_naming_is_identity() {
        let config = CodecConfig::default();
        assert_eq!(config.app_name("created_at"), "created_at");
        assert_eq!(config.store_name("createdAt"), "createdAt");
    }

    #[rstest]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CITEXT.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = CodecConfig::load(file.path()).unwrap();
        assert_eq!(config.types[0].name, "citext");
    }

    #[rstest]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = CodecConfig::load(temp_dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[rstest]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ invalid json }").unwrap();
        file.flush().unwrap();

        let err = CodecConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}

//! Naming convention translation between store-side snake_case and
//! application-side camelCase, PascalCase and kebab-case.
//!
//! All functions are total over ASCII identifiers. Round trips are only
//! guaranteed for snake_case without leading, trailing or doubled underscores.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());

/// `snake_case` → `camelCase`. Each `_x` becomes `X`.
pub fn to_camel(x: &str) -> String {
    let mut chars = x.chars();
    match chars.next() {
        Some(first) => capitalize_after_underscores(first.to_string(), chars),
        None => String::new(),
    }
}

/// `snake_case` → `PascalCase`.
pub fn to_pascal(x: &str) -> String {
    let mut chars = x.chars();
    match chars.next() {
        Some(first) => capitalize_after_underscores(first.to_uppercase().collect(), chars),
        None => String::new(),
    }
}

/// `snake_case` → `kebab-case`.
pub fn to_kebab(x: &str) -> String {
    x.replace('_', "-")
}

/// `camelCase` → `snake_case`.
pub fn from_camel(x: &str) -> String {
    UPPERCASE.replace_all(x, "_$0").to_lowercase()
}

/// `PascalCase` → `snake_case`. The first letter never gets an underscore.
pub fn from_pascal(x: &str) -> String {
    let mut chars = x.chars();
    match chars.next() {
        Some(first) => {
            let mut out = first.to_string();
            out.push_str(&UPPERCASE.replace_all(chars.as_str(), "_$0"));
            out.to_lowercase()
        }
        None => String::new(),
    }
}

/// `kebab-case` → `snake_case`.
pub fn from_kebab(x: &str) -> String {
    x.replace('-', "_")
}

fn capitalize_after_underscores(mut out: String, mut rest: std::str::Chars<'_>) -> String {
    while let Some(c) = rest.next() {
        if c == '_' {
            // a trailing underscore has nothing to capitalize and is dropped
            if let Some(next) = rest.next() {
                out.extend(next.to_uppercase());
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Application-side naming convention for column and field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    Camel,
    Pascal,
    Kebab,
}

impl NamingConvention {
    /// Store name → application name.
    pub fn to_app(self, store_name: &str) -> String {
        match self {
            Self::Camel => to_camel(store_name),
            Self::Pascal => to_pascal(store_name),
            Self::Kebab => to_kebab(store_name),
        }
    }

    /// Application name → store name.
    pub fn to_store(self, app_name: &str) -> String {
        match self {
            Self::Camel => from_camel(app_name),
            Self::Pascal => from_pascal(app_name),
            Self::Kebab => from_kebab(app_name),
        }
    }
}

// src/manifest/value.rs

//! Dynamic document tree for manifest and rules files
//!
//! Manifests carry loosely-typed bags (`extras`) whose shape is only known
//! to the templates. Documents are decoded into [`Value`] and read through
//! typed accessors that return `Option`, so each lookup in a precedence chain
//! can fall through to the next source instead of failing.

use indexmap::IndexMap;
use serde::Serialize;

/// A node of a decoded YAML document
///
/// Mappings keep document order, which matters for rules such as
/// `map_run_deps` whose iteration order shows up in generated test commands.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// An empty mapping
    pub fn empty_map() -> Self {
        Self::Map(IndexMap::new())
    }

    /// Look up a key when this node is a mapping
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// String value with surrounding whitespace removed, if non-empty
    pub fn as_trimmed_str(&self) -> Option<&str> {
        self.as_str().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Render a node as plain text
    ///
    /// Scalars print bare; collections print as compact JSON.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::List(_) | Self::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Items of a list node as strings; anything else yields an empty list
    pub fn string_list(&self) -> Vec<String> {
        self.as_list()
            .map(|items| items.iter().map(Value::to_plain_string).collect())
            .unwrap_or_default()
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_yaml::Value::String(s) => Self::Str(s),
            serde_yaml::Value::Sequence(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Self::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (key_string(k), Value::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Mapping keys are always strings in the tree
fn key_string(key: serde_yaml::Value) -> String {
    match Value::from(key) {
        Value::Str(s) => s,
        other => other.to_plain_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(doc).unwrap())
    }

    #[test]
    fn test_mapping_preserves_document_order() {
        let value = parse("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_typed_accessors() {
        let value = parse("name: opencv\nbuild: 3\nneeds: [numpy, 2]\nversion: '  '\n");
        assert_eq!(value.get("name").and_then(Value::as_str), Some("opencv"));
        assert_eq!(value.get("build").and_then(Value::as_i64), Some(3));
        assert_eq!(value.get("needs").unwrap().string_list(), vec!["numpy", "2"]);
        assert_eq!(value.get("version").and_then(Value::as_trimmed_str), None);
        assert!(value.get("missing").is_none());
        assert!(Value::Str("x".to_string()).get("x").is_none());
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let value = parse("1: one\ntrue: yes\n");
        assert_eq!(value.get("1").and_then(Value::as_str), Some("one"));
        assert_eq!(value.get("true").and_then(Value::as_str), Some("yes"));
    }

    #[test]
    fn test_string_list_of_scalar_is_empty() {
        assert!(Value::Str("numpy".to_string()).string_list().is_empty());
        assert!(Value::Null.string_list().is_empty());
    }
}

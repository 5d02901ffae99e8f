//! Projected values
//!
//! This module defines the nested structure produced by `as_array` and
//! consumed by `from_array`.

use std::fmt;

/// Key under which element attributes are projected
pub const ATTRIBUTES_KEY: &str = "xml_attributes";

/// A projected element record or one of its parts
///
/// Maps keep insertion order. Keys made only of digits are treated as
/// sibling indices by `from_array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text content
    Text(String),
    /// Repeated records
    List(Vec<Value>),
    /// Keyed records
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Build a map from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list from values
    pub fn list<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    /// An empty map
    pub fn empty_map() -> Self {
        Value::Map(Vec::new())
    }

    /// Get the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the items, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the entries, if this is a map
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Mutable lookup of a key in a map
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Map(entries) => entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Set a key in a map, replacing an existing entry in place
    ///
    /// A non-map value is turned into an empty map first.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !matches!(self, Value::Map(_)) {
            *self = Value::empty_map();
        }
        if let Value::Map(entries) = self {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Append to the list stored under `key`, creating it if needed
    ///
    /// A non-list entry under `key` is replaced by a list.
    pub fn push_to(&mut self, key: &str, value: Value) {
        match self.get_mut(key) {
            Some(Value::List(items)) => items.push(value),
            _ => self.insert(key, Value::List(vec![value])),
        }
    }

    /// Check if this is empty text, an empty list or an empty map
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::List(_) => write!(f, "[List]"),
            Value::Map(_) => write!(f, "[Map]"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => serde::ser::Serialize::serialize(items, serializer),
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

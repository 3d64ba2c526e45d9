//! Row records rendered by the paged table.
//!
//! A record is an open-ended mapping from field name to JSON value, plus the
//! key used to address the row in action events.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Identifier of a row, as sent back to the owner in action events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(String);

impl RowKey {
    /// Create a new row key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the key as a numeric backend id.
    pub fn as_id(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RowKey {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RowKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// A single row of table data.
///
/// Records are read-only to the table. Owners build them from their typed
/// collections and hand a fresh `Vec<Record>` to the table whenever the
/// collection changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: RowKey,
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record with the given key.
    pub fn new(key: impl Into<RowKey>) -> Self {
        Self {
            key: key.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Build a record from any serializable struct.
    ///
    /// The value of `key_field` becomes the row key. Non-object values yield a
    /// record with no fields.
    pub fn from_serialize<T: Serialize>(item: &T, key_field: &str) -> serde_json::Result<Self> {
        let fields = match serde_json::to_value(item)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let key = fields.get(key_field).map(value_to_key).unwrap_or_default();
        Ok(Self {
            key: RowKey(key),
            fields,
        })
    }

    /// The row key.
    pub fn key(&self) -> &RowKey {
        &self.key
    }

    /// Look up a field; missing fields read as `Value::Null`.
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }

    /// Look up a field and render it as a plain string.
    pub fn get_str(&self, name: &str) -> String {
        value_to_key(self.get(name))
    }
}

impl From<String> for RowKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

fn value_to_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

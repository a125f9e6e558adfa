//! Document model
//!
//! A document is the full field-value mapping stored for one key. On disk it
//! is a YAML file whose top level is expected to be a mapping; a file that
//! parses to a scalar or a list is only rejected at the point an operation
//! actually needs the mapping shape:
//! - field lookup on a non-mapping answers "no such field"
//! - field listing or mutation on a non-mapping is a file format error

use serde_yaml::{Mapping, Value};

use crate::error::{Result, StoreError};

/// The field-value mapping stored for one key
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Create an empty document (an empty top-level mapping)
    pub fn new() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    /// Wrap an already-parsed YAML value.
    ///
    /// The value is accepted as-is; non-mapping top levels surface as
    /// errors from the accessors below, not here.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// The raw top-level YAML value
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Look up one field.
    ///
    /// Fails with `NoSuchField` when the field is absent, and also when the
    /// top level is not a mapping (there is nothing to look fields up in).
    pub fn field(&self, name: &str) -> Result<&Value> {
        let key = Value::String(name.to_string());
        match &self.root {
            Value::Mapping(map) => map.get(&key),
            _ => None,
        }
        .ok_or_else(|| StoreError::NoSuchField(name.to_string()))
    }

    /// The field names, in the document's own order.
    ///
    /// Keys are returned as raw YAML values: a document may legally use
    /// non-string keys and they list as-is.
    pub fn field_names(&self) -> Result<Vec<Value>> {
        match &self.root {
            Value::Mapping(map) => Ok(map.keys().cloned().collect()),
            _ => Err(StoreError::FileFormat(
                "top-level document is not a mapping".to_string(),
            )),
        }
    }

    /// Set one field, inserting or overwriting.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match &mut self.root {
            Value::Mapping(map) => {
                map.insert(Value::String(name.to_string()), value);
                Ok(())
            }
            _ => Err(StoreError::FileFormat(
                "top-level document is not a mapping".to_string(),
            )),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

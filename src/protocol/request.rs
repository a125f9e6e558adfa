//! Request definitions
//!
//! Represents requests from clients.

use serde_yaml::Value;

use crate::error::Result;

use super::{HEADER_CONTENT_LENGTH, HEADER_FIELD, HEADER_KEY};

/// The four request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Fetch one field of one document
    Get,

    /// List all stored keys
    Keys,

    /// List one document's field names
    Fields,

    /// Write one field of one document
    Put,
}

impl Method {
    /// Parse a method line; `None` for anything but the four known names
    pub fn parse(name: &str) -> Option<Method> {
        match name {
            "GET" => Some(Method::Get),
            "KEYS" => Some(Method::Keys),
            "FIELDS" => Some(Method::Fields),
            "PUT" => Some(Method::Put),
            _ => None,
        }
    }

    /// The wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Keys => "KEYS",
            Method::Fields => "FIELDS",
            Method::Put => "PUT",
        }
    }

    /// The exact header names this method requires, in the required order
    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            Method::Get => &[HEADER_KEY, HEADER_FIELD],
            Method::Keys => &[],
            Method::Fields => &[HEADER_KEY],
            Method::Put => &[HEADER_KEY, HEADER_FIELD, HEADER_CONTENT_LENGTH],
        }
    }
}

/// An ordered, uniquely-keyed header mapping.
///
/// Order matters: per-method validation checks the header *sequence*, not
/// just the set. Inserting a name that is already present overwrites its
/// value in place (last write wins) without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header; an existing name keeps its position, the value is
    /// replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed request: method, ordered headers, and (for PUT) the YAML body
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl Request {
    /// Build a GET request for one field of one document
    pub fn get(key: &str, field: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert(HEADER_KEY, key);
        headers.insert(HEADER_FIELD, field);
        Self {
            method: Method::Get,
            headers,
            body: None,
        }
    }

    /// Build a KEYS request
    pub fn keys() -> Self {
        Self {
            method: Method::Keys,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Build a FIELDS request for one document
    pub fn fields(key: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert(HEADER_KEY, key);
        Self {
            method: Method::Fields,
            headers,
            body: None,
        }
    }

    /// Build a PUT request writing `value` to one field.
    ///
    /// The Content-length header is computed from the YAML serialization of
    /// the value, which is exactly what `write_request` puts on the wire.
    pub fn put(key: &str, field: &str, value: Value) -> Result<Self> {
        let body_text = super::codec::serialize_body(&value)?;

        let mut headers = Headers::new();
        headers.insert(HEADER_KEY, key);
        headers.insert(HEADER_FIELD, field);
        headers.insert(HEADER_CONTENT_LENGTH, body_text.len().to_string());

        Ok(Self {
            method: Method::Put,
            headers,
            body: Some(value),
        })
    }
}

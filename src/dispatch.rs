//! Method dispatcher
//!
//! One request in, exactly one response out: validate the header shape for
//! the method, run it against the document store, and fold every error from
//! below into its wire status. Nothing past this boundary unwinds into the
//! connection loop.

use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::protocol::{Method, Request, Response, Status, HEADER_FIELD, HEADER_KEY};
use crate::store::DocumentStore;

/// Characters a Key header value must not contain: space and colon would
/// break header parsing, the path separator would escape the storage
/// directory
const KEY_FORBIDDEN: &[char] = &[' ', ':', '/'];

/// Characters a Field header value must not contain
const FIELD_FORBIDDEN: &[char] = &[' '];

/// Validates and executes requests against a shared document store
pub struct Dispatcher {
    store: DocumentStore,
}

impl Dispatcher {
    /// Create a dispatcher over the given store
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Handle one request, producing exactly one response.
    ///
    /// Every validation and storage error maps to its status here; no error
    /// escapes to the caller.
    pub fn dispatch(&self, request: &Request) -> Response {
        match self.execute(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("{} failed: {}", request.method.as_str(), e);
                Response::from_error(&e)
            }
        }
    }

    fn execute(&self, request: &Request) -> Result<Response> {
        self.validate_headers(request)?;

        match request.method {
            Method::Get => self.get(request),
            Method::Keys => self.keys(),
            Method::Fields => self.fields(request),
            Method::Put => self.put(request),
        }
    }

    // =========================================================================
    // Header validation
    // =========================================================================

    /// Check the exact header set, in the required order, plus the
    /// character-class rules on Key and Field values. Runs before any
    /// storage access.
    fn validate_headers(&self, request: &Request) -> Result<()> {
        let expected = request.method.required_headers();
        let names: Vec<&str> = request.headers.names().collect();
        if names != expected {
            return Err(StoreError::BadRequest(format!(
                "{} expects headers {:?}, got {:?}",
                request.method.as_str(),
                expected,
                names
            )));
        }

        if let Some(key) = request.headers.get(HEADER_KEY) {
            if key.is_empty() || key.contains(KEY_FORBIDDEN) {
                return Err(StoreError::BadRequest(format!("invalid key: {key:?}")));
            }
        }
        if let Some(field) = request.headers.get(HEADER_FIELD) {
            if field.contains(FIELD_FORBIDDEN) {
                return Err(StoreError::BadRequest(format!("invalid field: {field:?}")));
            }
        }

        Ok(())
    }

    // =========================================================================
    // Method semantics
    // =========================================================================

    fn get(&self, request: &Request) -> Result<Response> {
        let (key, field) = key_and_field(request)?;
        let document = self.store.load(key)?;
        let value = document.field(field)?;
        Ok(Response::ok(to_yaml(value)?))
    }

    fn keys(&self) -> Result<Response> {
        let keys = self.store.list_keys()?;
        Ok(Response::ok(to_yaml(&keys)?))
    }

    fn fields(&self, request: &Request) -> Result<Response> {
        let key = header(request, HEADER_KEY)?;
        let document = self.store.load(key)?;
        let names = document.field_names()?;
        Ok(Response::ok(to_yaml(&names)?))
    }

    /// Write one field. A key with no backing file yet is created with just
    /// this field; the load-modify-save runs under one guard acquisition.
    fn put(&self, request: &Request) -> Result<Response> {
        let (key, field) = key_and_field(request)?;
        let value = request
            .body
            .clone()
            .ok_or_else(|| StoreError::BadRequest("PUT without a body".to_string()))?;

        self.store
            .update(key, |document| document.set_field(field, value))?;

        Ok(Response::empty(Status::Ok))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch a header that validation has already established is present
fn header<'a>(request: &'a Request, name: &str) -> Result<&'a str> {
    request
        .headers
        .get(name)
        .ok_or_else(|| StoreError::BadRequest(format!("missing {name} header")))
}

fn key_and_field<'a>(request: &'a Request) -> Result<(&'a str, &'a str)> {
    Ok((header(request, HEADER_KEY)?, header(request, HEADER_FIELD)?))
}

/// Dump a value as a response body. YAML serialization of already-parsed
/// values does not realistically fail; a failure means the stored document
/// holds something unrepresentable.
fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| StoreError::FileFormat(e.to_string()))
}

//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (line-delimited text, UTF-8, `\n` terminated)
//!
//! ### Request Format
//! ```text
//! <METHOD>\n
//! <HeaderName>:<HeaderValue>\n   (zero or more, order significant)
//! \n
//! [<Content-length> raw bytes]   (PUT only, YAML-encoded value)
//! ```
//!
//! ### Methods
//! - GET:    headers Key, Field       — fetch one field of one document
//! - KEYS:   no headers               — list all stored keys
//! - FIELDS: header Key               — list one document's field names
//! - PUT:    headers Key, Field, Content-length — write one field
//!
//! ### Response Format
//! ```text
//! <code> <text>\n
//! <HeaderName>:<HeaderValue>\n   (zero or more)
//! \n
//! [body bytes]
//! ```
//!
//! ### Status Codes
//! - 100 Ok
//! - 200 No such key
//! - 201 Read error
//! - 202 File format error
//! - 203 Unknown method
//! - 204 No such field
//! - 205 Write error
//! - 206 YAML error
//! - 300 Bad request

mod request;
mod response;
mod codec;

pub use request::{Headers, Method, Request};
pub use response::{Response, Status};
pub use codec::{read_request, read_response, write_request, write_response};

/// Header naming the document a request operates on
pub const HEADER_KEY: &str = "Key";

/// Header naming the field inside the document
pub const HEADER_FIELD: &str = "Field";

/// Header carrying the byte length of a request or response body
pub const HEADER_CONTENT_LENGTH: &str = "Content-length";

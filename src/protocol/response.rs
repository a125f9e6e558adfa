//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

use crate::error::StoreError;

use super::{Headers, HEADER_CONTENT_LENGTH};

/// Response status codes, fixed at definition time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NoSuchKey,
    ReadError,
    FileFormatError,
    UnknownMethod,
    NoSuchField,
    WriteError,
    YamlError,
    BadRequest,
}

impl Status {
    /// The numeric wire code
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 100,
            Status::NoSuchKey => 200,
            Status::ReadError => 201,
            Status::FileFormatError => 202,
            Status::UnknownMethod => 203,
            Status::NoSuchField => 204,
            Status::WriteError => 205,
            Status::YamlError => 206,
            Status::BadRequest => 300,
        }
    }

    /// The status text that follows the code on the status line
    pub fn text(&self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::NoSuchKey => "No such key",
            Status::ReadError => "Read error",
            Status::FileFormatError => "File format error",
            Status::UnknownMethod => "Unknown method",
            Status::NoSuchField => "No such field",
            Status::WriteError => "Write error",
            Status::YamlError => "YAML error",
            Status::BadRequest => "Bad request",
        }
    }

    /// Resolve a wire code back to a status (client side)
    pub fn from_code(code: u16) -> Option<Status> {
        match code {
            100 => Some(Status::Ok),
            200 => Some(Status::NoSuchKey),
            201 => Some(Status::ReadError),
            202 => Some(Status::FileFormatError),
            203 => Some(Status::UnknownMethod),
            204 => Some(Status::NoSuchField),
            205 => Some(Status::WriteError),
            206 => Some(Status::YamlError),
            300 => Some(Status::BadRequest),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.text())
    }
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: Option<String>,
}

impl Response {
    /// A `100 Ok` response carrying a pre-serialized body.
    ///
    /// Sets Content-length to the body's byte length.
    pub fn ok(body: String) -> Self {
        let mut headers = Headers::new();
        headers.insert(HEADER_CONTENT_LENGTH, body.len().to_string());
        Self {
            status: Status::Ok,
            headers,
            body: Some(body),
        }
    }

    /// A bodyless response with the given status
    pub fn empty(status: Status) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    /// The single error response for a failed request.
    ///
    /// Framing-terminal errors (disconnects, raw I/O) are handled before
    /// this point by the connection loop; anything that still lacks a
    /// status degrades to `300 Bad request`.
    pub fn from_error(err: &StoreError) -> Self {
        Self::empty(err.status().unwrap_or(Status::BadRequest))
    }
}

//! Error types for yamlstore
//!
//! Provides a unified error type for all operations. Every variant below the
//! framing layer maps onto exactly one wire status (see
//! [`StoreError::status`]); `ConnectionClosed` and raw I/O errors are
//! terminal for the connection and are never reported to the peer.

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for yamlstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    /// The client closed the connection before completing a request.
    /// Terminal for the connection; no response is sent.
    #[error("client closed the connection")]
    ConnectionClosed,

    #[error("unknown method: {0:?}")]
    UnknownMethod(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// The PUT body did not parse as a YAML value.
    #[error("YAML error in request body: {0}")]
    BodyYaml(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("read error: {0}")]
    ReadError(String),

    /// The backing file did not parse, or its top level is not usable as a
    /// mapping for the requested operation.
    #[error("file format error: {0}")]
    FileFormat(String),

    #[error("no such field: {0}")]
    NoSuchField(String),

    #[error("write error: {0}")]
    WriteError(String),
}

impl StoreError {
    /// The wire status for this error, or `None` for errors that are
    /// terminal for the connection (`ConnectionClosed`, raw I/O failures).
    pub fn status(&self) -> Option<Status> {
        match self {
            StoreError::Io(_) | StoreError::ConnectionClosed => None,
            StoreError::UnknownMethod(_) => Some(Status::UnknownMethod),
            StoreError::BadRequest(_) => Some(Status::BadRequest),
            StoreError::BodyYaml(_) => Some(Status::YamlError),
            StoreError::NoSuchKey(_) => Some(Status::NoSuchKey),
            StoreError::ReadError(_) => Some(Status::ReadError),
            StoreError::FileFormat(_) => Some(Status::FileFormatError),
            StoreError::NoSuchField(_) => Some(Status::NoSuchField),
            StoreError::WriteError(_) => Some(Status::WriteError),
        }
    }
}

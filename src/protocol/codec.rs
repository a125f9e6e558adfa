//! Protocol codec
//!
//! Reading and writing functions for the wire protocol, server side
//! (`read_request` / `write_response`) and client side (`write_request` /
//! `read_response`).
//!
//! ## Framing
//!
//! A message head is a run of `\n`-terminated lines closed by one blank
//! line. End-of-stream before the blank terminator is how a peer's
//! disconnect is detected, and surfaces as `ConnectionClosed`. A PUT request
//! additionally carries `Content-length` raw bytes after the terminator,
//! parsed as a single YAML value.

use std::io::{BufRead, ErrorKind, Write};

use serde_yaml::Value;

use crate::error::{Result, StoreError};

use super::{Headers, Method, Request, Response, Status, HEADER_CONTENT_LENGTH};

/// Maximum accepted PUT body size (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Server side: request in, response out
// =============================================================================

/// Read one complete request from a stream.
///
/// Blocks until a full request head (and, for PUT, body) is received.
/// Errors:
/// - `ConnectionClosed` — the stream ended before the request did
/// - `UnknownMethod` — the first line is not one of the four methods;
///   headers are not parsed in this case
/// - `BadRequest` — a header line with more than one colon, a bad
///   Content-length, or non-UTF-8 text
/// - `BodyYaml` — a PUT body that does not parse as YAML
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Request> {
    let lines = read_head(reader)?;

    let method_line = lines.first().map(String::as_str).unwrap_or("");
    let method = Method::parse(method_line)
        .ok_or_else(|| StoreError::UnknownMethod(method_line.to_string()))?;

    let headers = parse_headers(lines.get(1..).unwrap_or_default())?;

    let body = if method == Method::Put {
        Some(read_body(reader, &headers)?)
    } else {
        None
    };

    Ok(Request {
        method,
        headers,
        body,
    })
}

/// Write a response to a stream and flush it
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writeln!(writer, "{} {}", response.status.code(), response.status.text())?;
    for (name, value) in response.headers.iter() {
        writeln!(writer, "{name}:{value}")?;
    }
    writer.write_all(b"\n")?;
    if let Some(body) = &response.body {
        writer.write_all(body.as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Client side: request out, response in
// =============================================================================

/// Write a request to a stream and flush it.
///
/// A PUT body is serialized from the request's YAML value; the request's
/// Content-length header (set by [`Request::put`]) names its byte length.
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writeln!(writer, "{}", request.method.as_str())?;
    for (name, value) in request.headers.iter() {
        writeln!(writer, "{name}:{value}")?;
    }
    writer.write_all(b"\n")?;
    if let Some(value) = &request.body {
        writer.write_all(serialize_body(value)?.as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read one complete response from a stream.
///
/// The body is read only when a Content-length header is present.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let lines = read_head(reader)?;

    let status_line = lines.first().map(String::as_str).unwrap_or("");
    let status = status_line
        .split_once(' ')
        .and_then(|(code, _)| code.parse::<u16>().ok())
        .and_then(Status::from_code)
        .ok_or_else(|| StoreError::BadRequest(format!("malformed status line: {status_line:?}")))?;

    let headers = parse_headers(lines.get(1..).unwrap_or_default())?;

    let body = match headers.get(HEADER_CONTENT_LENGTH) {
        Some(value) => {
            let length = parse_content_length(value)?;
            let bytes = read_exact_body(reader, length)?;
            let text = String::from_utf8(bytes).map_err(|_| {
                StoreError::BadRequest("response body is not valid UTF-8".to_string())
            })?;
            Some(text)
        }
        None => None,
    };

    Ok(Response {
        status,
        headers,
        body,
    })
}

// =============================================================================
// Internals
// =============================================================================

/// Serialize a YAML value the way it goes on the wire
pub(crate) fn serialize_body(value: &Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| StoreError::BodyYaml(e.to_string()))
}

/// Read lines up to (and consuming) the blank terminator.
///
/// Trailing whitespace is stripped from every line; a line of only
/// whitespace counts as the terminator.
fn read_head<R: BufRead>(reader: &mut R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let n = match reader.read_line(&mut line) {
            Ok(n) => n,
            // The bytes up to the newline are consumed, so framing stays
            // line-aligned and the connection can keep serving
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StoreError::BadRequest(
                    "request line is not valid UTF-8".to_string(),
                ))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        if n == 0 {
            return Err(StoreError::ConnectionClosed);
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            return Ok(lines);
        }
        lines.push(trimmed.to_string());
    }
}

/// Parse header lines into an ordered mapping.
///
/// Exactly one colon separates name from value. More than one colon is a
/// `BadRequest`; a line without any colon is tolerated and ignored.
/// Duplicate names: last write wins.
fn parse_headers(lines: &[String]) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in lines {
        match line.matches(':').count() {
            0 => continue,
            1 => {
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name, value);
                }
            }
            _ => {
                return Err(StoreError::BadRequest(format!(
                    "malformed header line: {line:?}"
                )))
            }
        }
    }
    Ok(headers)
}

/// Read and parse a PUT body.
///
/// A missing Content-length header defaults to 0 bytes, which parses as a
/// YAML null.
fn read_body<R: BufRead>(reader: &mut R, headers: &Headers) -> Result<Value> {
    let length = match headers.get(HEADER_CONTENT_LENGTH) {
        Some(value) => parse_content_length(value)?,
        None => 0,
    };

    let bytes = read_exact_body(reader, length)?;
    serde_yaml::from_slice(&bytes).map_err(|e| StoreError::BodyYaml(e.to_string()))
}

fn parse_content_length(value: &str) -> Result<usize> {
    let length = value.trim().parse::<usize>().map_err(|_| {
        StoreError::BadRequest(format!("invalid {HEADER_CONTENT_LENGTH}: {value:?}"))
    })?;
    if length > MAX_BODY_SIZE {
        return Err(StoreError::BadRequest(format!(
            "body too large: {length} bytes (max {MAX_BODY_SIZE})"
        )));
    }
    Ok(length)
}

/// Read exactly `length` body bytes; a disconnect mid-body is
/// `ConnectionClosed`
fn read_exact_body<R: BufRead>(reader: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            StoreError::ConnectionClosed
        } else {
            StoreError::Io(e)
        }
    })?;
    Ok(bytes)
}

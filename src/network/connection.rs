//! Connection Handler
//!
//! Owns one client connection for its whole lifetime, looping
//! frame → dispatch → write until the client disconnects.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::{Result, StoreError};
use crate::protocol::{read_request, write_response, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for line framing)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared request dispatcher
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed).
    ///
    /// Reads requests in a loop and sends exactly one response per request
    /// the client completes. Returns when the client disconnects or an
    /// unrecoverable I/O error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader) {
                Ok(request) => request,
                Err(StoreError::ConnectionClosed) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(StoreError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                // Malformed input is answered and the connection keeps going
                Err(
                    e @ (StoreError::UnknownMethod(_)
                    | StoreError::BadRequest(_)
                    | StoreError::BodyYaml(_)),
                ) => {
                    tracing::debug!("Rejected request from {}: {}", self.peer_addr, e);
                    self.send_response(Response::from_error(&e))?;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            let response = self.dispatcher.dispatch(&request);

            if let Err(e) = self.send_response(response) {
                // The client may vanish before the response lands; that is a
                // normal end of the connection, not a server fault
                if let StoreError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// I/O error kinds that mean the peer is gone rather than the server broke
fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
    )
}

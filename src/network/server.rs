//! TCP Server
//!
//! Accepts connections and hands each one to its own handler thread. The
//! accept loop never blocks on a handler's work; a handler blocks only its
//! own client (and, while it holds the storage guard, other handlers'
//! storage operations).

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;

use super::Connection;

/// TCP server for yamlstore
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,

    /// Admission bound: connections past this count are dropped at accept
    max_connections: usize,

    /// Currently active handler threads
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from the config.
    ///
    /// Binding is separate from `run` so callers (and tests) can learn the
    /// actual address when the config asked for port 0.
    pub fn bind(config: &Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            dispatcher,
            max_connections: config.max_connections,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The address the listener actually bound
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever (blocking).
    ///
    /// Each accepted stream gets one handler thread; a failed accept is
    /// logged and the loop continues.
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.active.load(Ordering::Acquire) >= self.max_connections {
                tracing::warn!(
                    "Connection limit ({}) reached, dropping {}",
                    self.max_connections,
                    stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "unknown".to_string())
                );
                continue;
            }

            self.active.fetch_add(1, Ordering::AcqRel);
            let dispatcher = Arc::clone(&self.dispatcher);
            let active = Arc::clone(&self.active);

            thread::spawn(move || {
                match Connection::new(stream, dispatcher) {
                    Ok(mut connection) => {
                        if let Err(e) = connection.handle() {
                            tracing::warn!("Connection error: {}", e);
                        }
                    }
                    Err(e) => tracing::warn!("Failed to set up connection: {}", e),
                }
                active.fetch_sub(1, Ordering::AcqRel);
            });
        }

        Ok(())
    }
}

//! End-to-end server tests
//!
//! These drive a real server over TCP:
//! - The full request/response scenario from the protocol description
//! - Recoverable errors keeping the connection alive
//! - Concurrent writers never tearing or half-merging a document

use std::fs;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;

use serde_yaml::Value;
use tempfile::TempDir;
use yamlstore::network::Server;
use yamlstore::protocol::{read_response, write_request, Request, Response, Status};
use yamlstore::{Config, Dispatcher, DocumentStore};

// =============================================================================
// Helper Functions
// =============================================================================

/// Start a server on an ephemeral port, accepting in a background thread
fn start_server() -> (TempDir, SocketAddr) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(store));

    let config = Config::builder()
        .data_dir(temp_dir.path())
        .listen_addr("127.0.0.1:0")
        .build();

    let server = Server::bind(&config, dispatcher).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run());

    (temp_dir, addr)
}

/// One client connection with split read/write handles
struct Client {
    reader: BufReader<TcpStream>,
    stream: TcpStream,
}

impl Client {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Self { reader, stream }
    }

    fn send(&mut self, request: &Request) -> Response {
        write_request(&mut self.stream, request).unwrap();
        read_response(&mut self.reader).unwrap()
    }

    fn send_raw(&mut self, bytes: &[u8]) -> Response {
        self.stream.write_all(bytes).unwrap();
        self.stream.flush().unwrap();
        read_response(&mut self.reader).unwrap()
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_protocol_scenario() {
    let (temp, addr) = start_server();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();

    let mut client = Client::connect(addr);

    // GET an existing field
    let response = client.send(&Request::get("alice", "age"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.headers.get("Content-length"), Some("3"));
    assert_eq!(response.body.as_deref(), Some("30\n"));

    // GET a missing key
    let response = client.send(&Request::get("bob", "age"));
    assert_eq!(response.status, Status::NoSuchKey);

    // FIELDS of the document
    let response = client.send(&Request::fields("alice"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body.as_deref(), Some("- age\n"));

    // PUT a new field, then read it back
    let put = Request::put("alice", "city", Value::String("Bratislava".to_string())).unwrap();
    let response = client.send(&put);
    assert_eq!(response.status, Status::Ok);

    let response = client.send(&Request::get("alice", "city"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body.as_deref(), Some("Bratislava\n"));

    // Missing Field header is a validation failure
    let response = client.send_raw(b"GET\nKey:alice\n\n");
    assert_eq!(response.status, Status::BadRequest);
}

#[test]
fn test_keys_over_tcp() {
    let (temp, addr) = start_server();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();
    fs::write(temp.path().join("bob.yaml"), "age: 25\n").unwrap();

    let mut client = Client::connect(addr);
    let response = client.send(&Request::keys());
    assert_eq!(response.status, Status::Ok);

    let mut keys: Vec<String> = serde_yaml::from_str(&response.body.unwrap()).unwrap();
    keys.sort();
    assert_eq!(keys, vec!["alice", "bob"]);
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_recoverable_errors_keep_connection_alive() {
    let (temp, addr) = start_server();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();

    let mut client = Client::connect(addr);

    // Unknown method
    let response = client.send_raw(b"PING\n\n");
    assert_eq!(response.status, Status::UnknownMethod);

    // Malformed header line (two colons)
    let response = client.send_raw(b"GET\nKey:a:b\nField:age\n\n");
    assert_eq!(response.status, Status::BadRequest);

    // Same connection still serves valid requests
    let response = client.send(&Request::get("alice", "age"));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body.as_deref(), Some("30\n"));
}

#[test]
fn test_requests_are_sequential_per_connection() {
    let (_temp, addr) = start_server();

    let mut client = Client::connect(addr);
    for i in 0..10 {
        let put = Request::put("counter", "n", Value::from(i as i64)).unwrap();
        assert_eq!(client.send(&put).status, Status::Ok);
    }

    let response = client.send(&Request::get("counter", "n"));
    assert_eq!(response.body.as_deref(), Some("9\n"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_puts_never_tear_the_document() {
    let (temp, addr) = start_server();

    const ROUNDS: i64 = 20;

    // Two connections hammer different fields of the same key
    let writers: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|field| {
            thread::spawn(move || {
                let mut client = Client::connect(addr);
                for i in 0..ROUNDS {
                    let put = Request::put("shared", field, Value::from(i)).unwrap();
                    assert_eq!(client.send(&put).status, Status::Ok);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    // The file on disk is one well-formed mapping holding both writers'
    // final values — never a mix of half of each
    let text = fs::read_to_string(temp.path().join("shared.yaml")).unwrap();
    let document: Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(document["left"].as_i64(), Some(ROUNDS - 1));
    assert_eq!(document["right"].as_i64(), Some(ROUNDS - 1));
}

#[test]
fn test_concurrent_connections_are_independent() {
    let (temp, addr) = start_server();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || {
                let mut client = Client::connect(addr);
                for _ in 0..10 {
                    let response = client.send(&Request::get("alice", "age"));
                    assert_eq!(response.status, Status::Ok);
                    assert_eq!(response.body.as_deref(), Some("30\n"));
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
}

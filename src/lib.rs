//! # yamlstore
//!
//! A small networked key/field store:
//! - One YAML document per key, persisted as `<key>.yaml` on disk
//! - Line-delimited text protocol (`GET`, `KEYS`, `FIELDS`, `PUT`)
//! - One handler thread per client connection
//! - A single process-wide guard serializing all storage I/O
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (thread per connection)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ read_request / write_response
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Dispatcher                                │
//! │        (header validation + method semantics)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ guarded load/save/list
//!                       ▼
//!               ┌───────────────┐
//!               │ DocumentStore │
//!               │ (<key>.yaml)  │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod document;
pub mod store;
pub mod protocol;
pub mod dispatch;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::Config;
pub use document::Document;
pub use store::DocumentStore;
pub use dispatch::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of yamlstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

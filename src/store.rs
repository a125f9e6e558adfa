//! Document store
//!
//! Loads and saves per-key YAML documents under a single storage directory.
//!
//! ## Concurrency
//!
//! All file I/O — for *any* key — runs under one process-wide mutex, held for
//! the full duration of the operation. This is deliberately coarse: no two
//! handler threads can ever observe or produce a torn read or write, at the
//! cost of serializing operations on unrelated keys behind each other.
//!
//! `save` overwrites the backing file in place; a crash mid-write can leave a
//! corrupt file. Known limitation.

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::document::Document;
use crate::error::{Result, StoreError};

/// File extension for stored documents
const DOCUMENT_EXT: &str = "yaml";

/// On-disk store of one YAML document per key
pub struct DocumentStore {
    /// Directory holding the `<key>.yaml` files
    data_dir: PathBuf,

    /// Serializes every load/save/list across all connections
    io_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open a store rooted at the given directory, creating it if absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = path.into();
        fs::create_dir_all(&data_dir)?;

        Ok(Self {
            data_dir,
            io_lock: Mutex::new(()),
        })
    }

    /// Load the document for `key`.
    ///
    /// Errors:
    /// - `NoSuchKey` — no backing file for this key
    /// - `ReadError` — any other I/O failure
    /// - `FileFormat` — the bytes are not a YAML document
    pub fn load(&self, key: &str) -> Result<Document> {
        let _guard = self.io_lock.lock();
        self.load_locked(key)
    }

    /// Serialize `document` and overwrite the backing file for `key`.
    ///
    /// Fails with `WriteError` on any failure.
    pub fn save(&self, key: &str, document: &Document) -> Result<()> {
        let _guard = self.io_lock.lock();
        self.save_locked(key, document)
    }

    /// Load-or-create the document for `key`, apply `mutate`, and save —
    /// all under a single guard acquisition.
    ///
    /// A missing key starts from an empty document; every other load error
    /// propagates. Holding the guard across the whole read-modify-write is
    /// what keeps two concurrent writers from losing each other's update.
    pub fn update<F>(&self, key: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> Result<()>,
    {
        let _guard = self.io_lock.lock();

        let mut document = match self.load_locked(key) {
            Ok(doc) => doc,
            Err(StoreError::NoSuchKey(_)) => Document::new(),
            Err(e) => return Err(e),
        };

        mutate(&mut document)?;
        self.save_locked(key, &document)
    }

    /// List all stored keys: the base names of the directory's `*.yaml`
    /// entries, in directory order (not guaranteed sorted).
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let _guard = self.io_lock.lock();

        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| StoreError::ReadError(e.to_string()))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadError(e.to_string()))?;
            let path = entry.path();

            if path.extension().and_then(OsStr::to_str) != Some(DOCUMENT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
                keys.push(stem.to_string());
            }
        }

        Ok(keys)
    }

    /// The storage directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // =========================================================================
    // Internals (callers hold the guard)
    // =========================================================================

    fn load_locked(&self, key: &str) -> Result<Document> {
        let path = self.document_path(key);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NoSuchKey(key.to_string()))
            }
            // Non-UTF-8 bytes are a malformed document, not an I/O fault
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StoreError::FileFormat(e.to_string()))
            }
            Err(e) => return Err(StoreError::ReadError(e.to_string())),
        };

        let root =
            serde_yaml::from_str(&text).map_err(|e| StoreError::FileFormat(e.to_string()))?;
        Ok(Document::from_value(root))
    }

    fn save_locked(&self, key: &str, document: &Document) -> Result<()> {
        let text = serde_yaml::to_string(document.as_value())
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        fs::write(self.document_path(key), text).map_err(|e| StoreError::WriteError(e.to_string()))
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.{DOCUMENT_EXT}"))
    }
}

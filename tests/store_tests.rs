//! Tests for DocumentStore
//!
//! These tests verify:
//! - Save/load round trips
//! - The load/save/list error taxonomy
//! - Non-mapping top-level documents
//! - update() create-on-missing and read-modify-write behavior

use std::fs;

use serde_yaml::Value;
use tempfile::TempDir;
use yamlstore::{Document, DocumentStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Load/Save Tests
// =============================================================================

#[test]
fn test_save_load_round_trip() {
    let (_temp, store) = setup_temp_store();

    let mut document = Document::new();
    document
        .set_field("age", Value::from(30i64))
        .unwrap();
    document
        .set_field("name", Value::String("Alice".to_string()))
        .unwrap();
    store.save("alice", &document).unwrap();

    let loaded = store.load("alice").unwrap();
    assert_eq!(loaded.field("age").unwrap().as_i64(), Some(30));
    assert_eq!(loaded.field("name").unwrap().as_str(), Some("Alice"));
}

#[test]
fn test_load_missing_key() {
    let (_temp, store) = setup_temp_store();

    let result = store.load("nobody");
    assert!(matches!(result, Err(StoreError::NoSuchKey(_))));
}

#[test]
fn test_load_unparseable_file() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("broken.yaml"), "key: [unclosed").unwrap();

    let result = store.load("broken");
    assert!(matches!(result, Err(StoreError::FileFormat(_))));
}

#[test]
fn test_field_lookup_on_non_mapping_document() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("scalar.yaml"), "just a string\n").unwrap();

    // The file parses; only the field access fails
    let document = store.load("scalar").unwrap();
    assert!(matches!(
        document.field("age"),
        Err(StoreError::NoSuchField(_))
    ));
    assert!(matches!(
        document.field_names(),
        Err(StoreError::FileFormat(_))
    ));
}

#[test]
fn test_missing_field_on_mapping_document() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();

    let document = store.load("alice").unwrap();
    assert!(matches!(
        document.field("city"),
        Err(StoreError::NoSuchField(_))
    ));
}

#[test]
fn test_field_names_preserve_document_order() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("alice.yaml"), "zeta: 1\nalpha: 2\nmid: 3\n").unwrap();

    let document = store.load("alice").unwrap();
    let names: Vec<String> = document
        .field_names()
        .unwrap()
        .into_iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

// =============================================================================
// Key Listing Tests
// =============================================================================

#[test]
fn test_list_keys() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();
    fs::write(temp.path().join("bob.yaml"), "age: 25\n").unwrap();
    fs::write(temp.path().join("notes.txt"), "not a document").unwrap();

    let mut keys = store.list_keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["alice", "bob"]);
}

#[test]
fn test_list_keys_empty_store() {
    let (_temp, store) = setup_temp_store();
    assert!(store.list_keys().unwrap().is_empty());
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_creates_missing_key() {
    let (_temp, store) = setup_temp_store();

    store
        .update("fresh", |doc| {
            doc.set_field("city", Value::String("Bratislava".to_string()))
        })
        .unwrap();

    let loaded = store.load("fresh").unwrap();
    assert_eq!(loaded.field("city").unwrap().as_str(), Some("Bratislava"));
}

#[test]
fn test_update_preserves_other_fields() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("alice.yaml"), "age: 30\n").unwrap();

    store
        .update("alice", |doc| {
            doc.set_field("city", Value::String("Bratislava".to_string()))
        })
        .unwrap();

    let loaded = store.load("alice").unwrap();
    assert_eq!(loaded.field("age").unwrap().as_i64(), Some(30));
    assert_eq!(loaded.field("city").unwrap().as_str(), Some("Bratislava"));
}

#[test]
fn test_update_on_non_mapping_document_fails() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("scalar.yaml"), "just a string\n").unwrap();

    let result = store.update("scalar", |doc| {
        doc.set_field("city", Value::String("Bratislava".to_string()))
    });
    assert!(matches!(result, Err(StoreError::FileFormat(_))));
}

#[test]
fn test_update_propagates_load_errors_other_than_missing() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("broken.yaml"), "key: [unclosed").unwrap();

    let result = store.update("broken", |doc| doc.set_field("x", Value::Null));
    assert!(matches!(result, Err(StoreError::FileFormat(_))));
}

#[test]
fn test_open_creates_directory() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");

    let store = DocumentStore::open(&nested).unwrap();
    assert!(nested.is_dir());
    assert!(store.list_keys().unwrap().is_empty());
}

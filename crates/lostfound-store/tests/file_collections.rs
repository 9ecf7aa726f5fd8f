//! File-backed collection persistence tests.

use lostfound_store::{CollectionStore, FileKeyValueStore, KeyValueStore};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::tempdir;

/// Records written by one store instance are visible to a fresh one.
#[test]
fn collections_survive_reopen() {
    let temp = tempdir().expect("tempdir");
    let store = CollectionStore::new(Arc::new(
        FileKeyValueStore::new(temp.path()).expect("backend"),
    ));
    store
        .append_one("lostItems", &json!({ "id": "a", "status": "pending" }))
        .expect("append");
    store
        .append_one("lostItems", &json!({ "id": "b", "status": "pending" }))
        .expect("append");

    let reopened = CollectionStore::new(Arc::new(
        FileKeyValueStore::new(temp.path()).expect("backend"),
    ));
    let records: Vec<Value> = reopened.load_all("lostItems");
    assert_eq!(
        records,
        vec![
            json!({ "id": "a", "status": "pending" }),
            json!({ "id": "b", "status": "pending" }),
        ]
    );
}

/// A corrupted file reads as empty and the next append starts a fresh array.
#[test]
fn corrupted_file_is_treated_as_empty() {
    let temp = tempdir().expect("tempdir");
    let backend = Arc::new(FileKeyValueStore::new(temp.path()).expect("backend"));
    backend.set("foundItems", "[{\"id\":").expect("corrupt");

    let store = CollectionStore::new(backend);
    assert_eq!(store.load_all::<Value>("foundItems"), Vec::<Value>::new());

    store
        .append_one("foundItems", &json!({ "id": "c" }))
        .expect("append");
    assert_eq!(
        store.load_all::<Value>("foundItems"),
        vec![json!({ "id": "c" })]
    );
}

/// The guard lets callers update two collections under one lock.
#[test]
fn guard_updates_several_collections() {
    let temp = tempdir().expect("tempdir");
    let store = CollectionStore::new(Arc::new(
        FileKeyValueStore::new(temp.path()).expect("backend"),
    ));
    {
        let guard = store.lock();
        guard
            .replace_all("lostItems", &[json!({ "id": 1 })])
            .expect("lost");
        guard
            .replace_all("foundItems", &[json!({ "id": 2 })])
            .expect("found");
    }
    assert_eq!(store.load_all::<Value>("lostItems"), vec![json!({ "id": 1 })]);
    assert_eq!(store.load_all::<Value>("foundItems"), vec![json!({ "id": 2 })]);
}

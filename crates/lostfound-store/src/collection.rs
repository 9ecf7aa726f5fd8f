//! Whole-collection persistence on top of a key-value backend.
//!
//! Every collection is stored as one JSON array under its name. Reads never
//! fail: a missing key, an unreadable backend, or content that is not a JSON
//! array all load as an empty collection. Entries are decoded one by one, so a
//! single entry of an unexpected shape only hides itself. Writes rewrite the
//! full array.

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Collection facade shared by intake sessions and the admin desk.
pub struct CollectionStore {
    backend: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl CollectionStore {
    /// Wrap a key-value backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Load every record of a collection that decodes as `T`, in stored order.
    pub fn load_all<T: DeserializeOwned>(&self, collection: &str) -> Vec<T> {
        read_snapshot(self.backend.as_ref(), collection).into_records()
    }

    /// Append one record to a collection.
    pub fn append_one<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        self.lock().append_one(collection, record)
    }

    /// Replace the full contents of a collection.
    pub fn replace_all<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        self.lock().replace_all(collection, records)
    }

    /// Hold the write lock across several loads and writes.
    pub fn lock(&self) -> CollectionGuard<'_> {
        CollectionGuard {
            backend: self.backend.as_ref(),
            _guard: self.write_lock.lock(),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Record(T),
    /// Stored entry that did not decode; written back verbatim.
    Raw(Value),
}

/// One collection as stored, decoded entry by entry.
///
/// Writing a snapshot back keeps the entries that did not decode exactly as
/// they were read.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<T> {
    entries: Vec<Entry<T>>,
}

impl<T> CollectionSnapshot<T> {
    /// Decoded records, in stored order.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Record(record) => Some(record),
            Entry::Raw(_) => None,
        })
    }

    /// First decoded record matching `predicate`, for in-place updates.
    pub fn find_mut(&mut self, predicate: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Record(record) if predicate(&*record) => Some(record),
            _ => None,
        })
    }

    /// Entries kept raw because they did not decode.
    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Raw(_)))
            .count()
    }

    pub fn into_records(self) -> Vec<T> {
        self.entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Record(record) => Some(record),
                Entry::Raw(_) => None,
            })
            .collect()
    }
}

/// Exclusive access to the collections for one read-modify-write cycle.
pub struct CollectionGuard<'a> {
    backend: &'a dyn KeyValueStore,
    _guard: MutexGuard<'a, ()>,
}

impl CollectionGuard<'_> {
    /// Load every record of a collection that decodes as `T`, in stored order.
    pub fn load_all<T: DeserializeOwned>(&self, collection: &str) -> Vec<T> {
        read_snapshot(self.backend, collection).into_records()
    }

    /// Load a collection keeping undecodable entries for a later rewrite.
    pub fn load_snapshot<T: DeserializeOwned>(&self, collection: &str) -> CollectionSnapshot<T> {
        read_snapshot(self.backend, collection)
    }

    /// Append one record to a collection.
    pub fn append_one<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let mut values = read_values(self.backend, collection);
        values.push(serde_json::to_value(record)?);
        self.write_values(collection, &values)
    }

    /// Replace the full contents of a collection.
    pub fn replace_all<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.write_values(collection, &values)
    }

    /// Write a snapshot back, decoded records and raw entries in their original order.
    pub fn write_snapshot<T: Serialize>(
        &self,
        collection: &str,
        snapshot: &CollectionSnapshot<T>,
    ) -> Result<(), StoreError> {
        let values = snapshot
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Record(record) => serde_json::to_value(record),
                Entry::Raw(value) => Ok(value.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.write_values(collection, &values)
    }

    fn write_values(&self, collection: &str, values: &[Value]) -> Result<(), StoreError> {
        let contents = serde_json::to_string(values)?;
        self.backend.set(collection, &contents)?;
        debug!(
            "collection written (collection={}, records={})",
            collection,
            values.len()
        );
        Ok(())
    }
}

fn read_values(backend: &dyn KeyValueStore, collection: &str) -> Vec<Value> {
    let contents = match backend.get(collection) {
        Ok(Some(contents)) => contents,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(
                "collection unreadable, treating as empty (collection={}, err={})",
                collection, err
            );
            return Vec::new();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(values) => values,
        Err(err) => {
            warn!(
                "collection malformed, treating as empty (collection={}, err={})",
                collection, err
            );
            Vec::new()
        }
    }
}

fn read_snapshot<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    collection: &str,
) -> CollectionSnapshot<T> {
    let entries = read_values(backend, collection)
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let decoded = <T as Deserialize>::deserialize(&value);
            match decoded {
                Ok(record) => Entry::Record(record),
                Err(err) => {
                    warn!(
                        "skipping undecodable entry (collection={}, index={}, err={})",
                        collection, idx, err
                    );
                    Entry::Raw(value)
                }
            }
        })
        .collect();
    CollectionSnapshot { entries }
}

#[cfg(test)]
mod tests {
    use super::CollectionStore;
    use crate::kv::{KeyValueStore, MemoryKeyValueStore};
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        id: u32,
        label: String,
    }

    fn tag(id: u32, label: &str) -> Tag {
        Tag {
            id,
            label: label.to_string(),
        }
    }

    #[test]
    fn missing_and_malformed_collections_load_empty() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = CollectionStore::new(backend.clone());
        assert_eq!(store.load_all::<Tag>("tags"), Vec::<Tag>::new());

        backend.set("tags", "{not json").expect("set");
        assert_eq!(store.load_all::<Tag>("tags"), Vec::<Tag>::new());

        backend.set("tags", r#"{"id": 1}"#).expect("set");
        assert_eq!(store.load_all::<Tag>("tags"), Vec::<Tag>::new());
    }

    #[test]
    fn odd_entries_hide_only_themselves() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = CollectionStore::new(backend.clone());
        backend
            .set("tags", r#"[{"id": 1, "label": "a"}, {"id": "x"}, {"id": 2, "label": "b"}]"#)
            .expect("set");
        assert_eq!(store.load_all::<Tag>("tags"), vec![tag(1, "a"), tag(2, "b")]);
    }

    #[test]
    fn snapshot_rewrite_keeps_raw_entries_in_place() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = CollectionStore::new(backend.clone());
        backend
            .set("tags", r#"[{"id": 1, "label": "a"}, {"legacy": true}, {"id": 2, "label": "b"}]"#)
            .expect("set");

        let guard = store.lock();
        let mut snapshot = guard.load_snapshot::<Tag>("tags");
        assert_eq!(snapshot.skipped(), 1);
        snapshot
            .find_mut(|tag| tag.id == 2)
            .expect("tag 2")
            .label = "renamed".to_string();
        guard.write_snapshot("tags", &snapshot).expect("write");
        drop(guard);

        let stored: Value =
            serde_json::from_str(&backend.get("tags").expect("get").expect("value")).expect("json");
        assert_eq!(
            stored,
            json!([
                { "id": 1, "label": "a" },
                { "legacy": true },
                { "id": 2, "label": "renamed" },
            ])
        );
    }

    #[test]
    fn append_preserves_order_and_replace_overwrites() {
        let store = CollectionStore::new(Arc::new(MemoryKeyValueStore::new()));
        store.append_one("tags", &tag(1, "a")).expect("append");
        store.append_one("tags", &tag(2, "b")).expect("append");
        assert_eq!(store.load_all::<Tag>("tags"), vec![tag(1, "a"), tag(2, "b")]);

        store.replace_all("tags", &[tag(3, "c")]).expect("replace");
        assert_eq!(store.load_all::<Tag>("tags"), vec![tag(3, "c")]);
    }

    #[test]
    fn collections_are_independent() {
        let store = CollectionStore::new(Arc::new(MemoryKeyValueStore::new()));
        store.append_one("left", &tag(1, "l")).expect("append");
        store.append_one("right", &tag(2, "r")).expect("append");
        assert_eq!(store.load_all::<Tag>("left"), vec![tag(1, "l")]);
        assert_eq!(store.load_all::<Tag>("right"), vec![tag(2, "r")]);
    }
}

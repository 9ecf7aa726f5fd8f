//! Key-value backends holding one serialized collection per key.

use crate::error::StoreError;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for a key, `None` when nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the raw value for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed store writing each key to `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    /// Root directory for stored values.
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file-backed store under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized file key-value store (root={})", root.display());
        Ok(Self { root })
    }

    /// Root directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the value file for a key.
    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Path to the temporary file used while rewriting a key.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.tmp"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.value_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Rewrite a key through a temp file so readers never see a partial value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        let temp_path = self.temp_path(key);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, &path)?;
        debug!("wrote key (key={}, bytes={})", key, value.len());
        Ok(())
    }
}

/// Keys become file names, so keep them to a conservative alphabet.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// In-memory store used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
    use crate::StoreError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_and_leaves_no_temp_file() {
        let temp = tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(temp.path().join("data")).expect("store");
        assert_eq!(store.get("lostItems").expect("get"), None);

        store.set("lostItems", "[]").expect("set");
        store.set("lostItems", "[1]").expect("overwrite");
        assert_eq!(store.get("lostItems").expect("get"), Some("[1]".to_string()));
        assert!(store.root().join("lostItems.json").exists());
        assert!(!store.root().join("lostItems.json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let temp = tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(temp.path()).expect("store");
        let err = store.set("../escape", "x").expect_err("invalid");
        assert!(matches!(err, StoreError::InvalidKey(key) if key == "../escape"));
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryKeyValueStore::new();
        store.set("foundItems", "a").expect("set");
        store.set("foundItems", "b").expect("set");
        assert_eq!(store.get("foundItems").expect("get"), Some("b".to_string()));
        assert_eq!(store.get("other").expect("get"), None);
    }
}

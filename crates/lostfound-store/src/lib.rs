//! Durable key-value storage for lost & found collections.

pub mod collection;
pub mod error;
pub mod kv;

/// Collection-level read/append/replace API.
pub use collection::{CollectionGuard, CollectionSnapshot, CollectionStore};
/// Store error type.
pub use error::StoreError;
/// Key-value backends.
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

//! Error types for the core crate.

use crate::types::ItemId;
use lostfound_store::StoreError;
use thiserror::Error;

/// Errors returned by intake sessions and admin desk operations.
#[derive(Debug, Error)]
pub enum LostFoundCoreError {
    /// No record in the collection carries this id.
    #[error("unknown {kind} item: {id}")]
    UnknownItem { kind: &'static str, id: String },
    /// An id prefix matched more than one record.
    #[error("ambiguous {kind} id prefix {prefix:?} ({count} matches)")]
    AmbiguousId {
        kind: &'static str,
        prefix: String,
        count: usize,
    },
    /// Status transition not permitted from the record's current status.
    #[error("cannot move {kind} item {id} from {from} to {to}")]
    InvalidTransition {
        kind: &'static str,
        id: ItemId,
        from: &'static str,
        to: &'static str,
    },
    /// Operation requires a pending lost report.
    #[error("lost item {0} is no longer pending")]
    NotPending(ItemId),
    /// Admin form is missing a required field.
    #[error("invalid form: {0}")]
    InvalidForm(String),
    /// Persisting a collection failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

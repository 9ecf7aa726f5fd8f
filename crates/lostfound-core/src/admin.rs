//! Admin desk operations over the lost and found collections.

use crate::error::LostFoundCoreError;
use crate::matcher::{MatchedItem, find_matches};
use crate::types::{
    FOUND_COLLECTION, FoundRecord, FoundStatus, ItemId, LOST_COLLECTION, LostRecord, LostStatus,
};
use chrono::Utc;
use log::{debug, error, info, warn};
use lostfound_store::CollectionStore;
use std::sync::Arc;

/// Single-turn form staff use to log a found item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundItemForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: String,
}

/// Record types the admin desk can search and resolve.
trait DeskItem {
    const KIND: &'static str;

    fn id(&self) -> &ItemId;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

impl DeskItem for LostRecord {
    const KIND: &'static str = "lost";

    fn id(&self) -> &ItemId {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
}

impl DeskItem for FoundRecord {
    const KIND: &'static str = "found";

    fn id(&self) -> &ItemId {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
}

/// Keep items whose name or description contains `term`, ignoring case.
fn filter_items<T: DeskItem>(items: Vec<T>, term: Option<&str>) -> Vec<T> {
    let Some(term) = term.filter(|term| !term.is_empty()) else {
        return items;
    };
    let term = term.to_lowercase();
    items
        .into_iter()
        .filter(|item| {
            item.name().to_lowercase().contains(&term)
                || item.description().to_lowercase().contains(&term)
        })
        .collect()
}

/// Find the single item whose id equals or starts with `reference`.
///
/// Accepts full ids as well as the short reference numbers printed in
/// summaries, with or without a leading `#`.
fn resolve_in<T: DeskItem>(items: Vec<T>, reference: &str) -> Result<T, LostFoundCoreError> {
    let prefix = reference.trim().trim_start_matches('#').to_lowercase();
    if prefix.is_empty() {
        return Err(LostFoundCoreError::UnknownItem {
            kind: T::KIND,
            id: reference.to_string(),
        });
    }
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| item.id().has_prefix(&prefix))
        .collect();
    match matches.len() {
        0 => Err(LostFoundCoreError::UnknownItem {
            kind: T::KIND,
            id: reference.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(LostFoundCoreError::AmbiguousId {
            kind: T::KIND,
            prefix: prefix.clone(),
            count,
        }),
    }
}

/// Staff-facing view over both collections.
#[derive(Clone)]
pub struct AdminDesk {
    store: Arc<CollectionStore>,
}

impl AdminDesk {
    pub fn new(store: Arc<CollectionStore>) -> Self {
        Self { store }
    }

    /// Lost reports, optionally filtered by a search term.
    pub fn lost_items(&self, search: Option<&str>) -> Vec<LostRecord> {
        filter_items(self.store.load_all(LOST_COLLECTION), search)
    }

    /// Found items, optionally filtered by a search term.
    pub fn found_items(&self, search: Option<&str>) -> Vec<FoundRecord> {
        filter_items(self.store.load_all(FOUND_COLLECTION), search)
    }

    /// Resolve a lost report by full id or unique id prefix.
    pub fn resolve_lost(&self, reference: &str) -> Result<LostRecord, LostFoundCoreError> {
        resolve_in(self.store.load_all(LOST_COLLECTION), reference)
    }

    /// Resolve a found item by full id or unique id prefix.
    pub fn resolve_found(&self, reference: &str) -> Result<FoundRecord, LostFoundCoreError> {
        resolve_in(self.store.load_all(FOUND_COLLECTION), reference)
    }

    /// Run the match finder for a pending lost report against every found item.
    pub fn find_matches(&self, lost_id: &ItemId) -> Result<Vec<MatchedItem>, LostFoundCoreError> {
        let lost = self.lost_by_id(lost_id)?;
        if lost.status != LostStatus::Pending {
            return Err(LostFoundCoreError::NotPending(lost_id.clone()));
        }
        let found: Vec<FoundRecord> = self.store.load_all(FOUND_COLLECTION);
        let matches = find_matches(&lost, &found);
        info!(
            "match search finished (lost_id={}, candidates={}, matches={})",
            lost_id,
            found.len(),
            matches.len()
        );
        Ok(matches)
    }

    /// Mark a lost report found and, when given, the found item claimed.
    ///
    /// Both transitions are checked before either collection is written. If
    /// the found collection cannot be written, the lost collection is restored
    /// so the claim can be retried. All other entries are rewritten as read.
    pub fn mark_found(
        &self,
        lost_id: &ItemId,
        found_id: Option<&ItemId>,
    ) -> Result<(), LostFoundCoreError> {
        let guard = self.store.lock();
        let original_lost = guard.load_snapshot::<LostRecord>(LOST_COLLECTION);
        let mut lost_items = original_lost.clone();
        let lost = lost_items
            .find_mut(|item| item.id == *lost_id)
            .ok_or_else(|| unknown("lost", lost_id))?;
        check_lost_transition(lost, LostStatus::Found)?;
        lost.status = LostStatus::Found;

        let mut found_items = None;
        if let Some(found_id) = found_id {
            let mut snapshot = guard.load_snapshot::<FoundRecord>(FOUND_COLLECTION);
            let found = snapshot
                .find_mut(|item| item.id == *found_id)
                .ok_or_else(|| unknown("found", found_id))?;
            if !found.status.can_transition_to(FoundStatus::Claimed) {
                return Err(LostFoundCoreError::InvalidTransition {
                    kind: "found",
                    id: found_id.clone(),
                    from: found.status.as_str(),
                    to: FoundStatus::Claimed.as_str(),
                });
            }
            found.status = FoundStatus::Claimed;
            found_items = Some(snapshot);
        }

        guard.write_snapshot(LOST_COLLECTION, &lost_items)?;
        if let Some(found_items) = found_items
            && let Err(err) = guard.write_snapshot(FOUND_COLLECTION, &found_items)
        {
            warn!(
                "found collection write failed, restoring lost report (lost_id={}, err={})",
                lost_id, err
            );
            if let Err(restore_err) = guard.write_snapshot(LOST_COLLECTION, &original_lost) {
                error!(
                    "failed to restore lost collection (lost_id={}, err={})",
                    lost_id, restore_err
                );
            }
            return Err(err.into());
        }
        info!(
            "lost item marked found (lost_id={}, found_id={:?})",
            lost_id,
            found_id.map(ItemId::as_str)
        );
        Ok(())
    }

    /// Close a pending lost report without a match.
    pub fn close_report(&self, lost_id: &ItemId) -> Result<(), LostFoundCoreError> {
        let guard = self.store.lock();
        let mut lost_items = guard.load_snapshot::<LostRecord>(LOST_COLLECTION);
        let lost = lost_items
            .find_mut(|item| item.id == *lost_id)
            .ok_or_else(|| unknown("lost", lost_id))?;
        check_lost_transition(lost, LostStatus::Closed)?;
        lost.status = LostStatus::Closed;
        guard.write_snapshot(LOST_COLLECTION, &lost_items)?;
        info!("lost report closed (lost_id={})", lost_id);
        Ok(())
    }

    /// Log a found item from the single-turn admin form.
    pub fn add_found_item(&self, form: FoundItemForm) -> Result<FoundRecord, LostFoundCoreError> {
        if form.name.trim().is_empty() {
            return Err(LostFoundCoreError::InvalidForm(
                "name must not be empty".to_string(),
            ));
        }
        let record = FoundRecord {
            id: ItemId::generate(),
            name: form.name,
            description: form.description,
            location: form.location,
            date: form.date,
            status: FoundStatus::Available,
            created_at: Utc::now(),
        };
        self.store.append_one(FOUND_COLLECTION, &record)?;
        info!("found item added (id={}, name_len={})", record.id, record.name.len());
        Ok(record)
    }

    fn lost_by_id(&self, lost_id: &ItemId) -> Result<LostRecord, LostFoundCoreError> {
        self.store
            .load_all::<LostRecord>(LOST_COLLECTION)
            .into_iter()
            .find(|item| item.id == *lost_id)
            .ok_or_else(|| unknown("lost", lost_id))
    }
}

fn unknown(kind: &'static str, id: &ItemId) -> LostFoundCoreError {
    LostFoundCoreError::UnknownItem {
        kind,
        id: id.to_string(),
    }
}

/// Check a lost report may move to `next`.
fn check_lost_transition(item: &LostRecord, next: LostStatus) -> Result<(), LostFoundCoreError> {
    if item.status.can_transition_to(next) {
        return Ok(());
    }
    debug!(
        "rejecting lost transition (lost_id={}, from={}, to={})",
        item.id,
        item.status.as_str(),
        next.as_str()
    );
    Err(LostFoundCoreError::InvalidTransition {
        kind: "lost",
        id: item.id.clone(),
        from: item.status.as_str(),
        to: next.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::{AdminDesk, FoundItemForm, filter_items};
    use crate::error::LostFoundCoreError;
    use crate::types::{FoundStatus, ItemId, LOST_COLLECTION, LostRecord, LostStatus};
    use chrono::Utc;
    use lostfound_store::{CollectionStore, MemoryKeyValueStore};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn desk() -> (AdminDesk, Arc<CollectionStore>) {
        let store = Arc::new(CollectionStore::new(Arc::new(MemoryKeyValueStore::new())));
        (AdminDesk::new(store.clone()), store)
    }

    fn lost(name: &str, description: &str) -> LostRecord {
        LostRecord {
            id: ItemId::generate(),
            name: name.to_string(),
            description: description.to_string(),
            location: "Library".to_string(),
            date: "today".to_string(),
            contact_info: "555".to_string(),
            status: LostStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let items = vec![lost("Blue Umbrella", ""), lost("Wallet", "blue leather")];
        assert_eq!(filter_items(items.clone(), Some("BLUE")).len(), 2);
        assert_eq!(filter_items(items.clone(), Some("wallet")).len(), 1);
        assert_eq!(filter_items(items.clone(), Some("")).len(), 2);
        assert_eq!(filter_items(items, None).len(), 2);
    }

    #[test]
    fn add_found_item_requires_a_name() {
        let (desk, _) = desk();
        let err = desk
            .add_found_item(FoundItemForm::default())
            .expect_err("empty name");
        assert!(matches!(err, LostFoundCoreError::InvalidForm(_)));

        let record = desk
            .add_found_item(FoundItemForm {
                name: "Notebook".to_string(),
                ..FoundItemForm::default()
            })
            .expect("add");
        assert_eq!(record.status, FoundStatus::Available);
        assert_eq!(record.location, "");
        assert_eq!(desk.found_items(None), vec![record]);
    }

    #[test]
    fn resolve_accepts_short_reference_and_rejects_unknown() {
        let (desk, store) = desk();
        let item = lost("Keys", "");
        store.append_one(LOST_COLLECTION, &item).expect("append");
        let short = crate::types::short_id(&item.id);

        assert_eq!(desk.resolve_lost(&format!("#{short}")).expect("resolve"), item);
        assert_eq!(
            desk.resolve_lost(&item.id.to_string()).expect("resolve"),
            item
        );
        let err = desk.resolve_lost("zzzz").expect_err("unknown");
        assert!(matches!(err, LostFoundCoreError::UnknownItem { kind: "lost", .. }));
    }

    #[test]
    fn closed_reports_cannot_be_matched_or_reopened() {
        let (desk, store) = desk();
        let item = lost("Keys", "");
        store.append_one(LOST_COLLECTION, &item).expect("append");

        desk.close_report(&item.id).expect("close");
        assert_eq!(desk.lost_items(None)[0].status, LostStatus::Closed);

        let err = desk.find_matches(&item.id).expect_err("closed");
        assert!(matches!(err, LostFoundCoreError::NotPending(ref id) if *id == item.id));
        let err = desk.mark_found(&item.id, None).expect_err("terminal");
        assert!(matches!(
            err,
            LostFoundCoreError::InvalidTransition { from: "closed", to: "found", .. }
        ));
    }
}

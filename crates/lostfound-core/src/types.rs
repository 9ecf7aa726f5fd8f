//! Core data types shared by intake sessions and the admin desk.

use chrono::{DateTime, Local, Utc};
use lostfound_config::FieldKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a lost or found record.
///
/// New records get a v4 uuid. Stored records may carry any string, such as
/// the millisecond timestamps written by earlier versions of the office tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Fresh random identifier for a new record.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased id without `-` separators.
    fn compact(&self) -> String {
        self.0
            .chars()
            .filter(|ch| *ch != '-')
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Whether `prefix` (already lowercased) starts this id, with or without separators.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.to_lowercase().starts_with(prefix) || self.compact().starts_with(prefix)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Collection holding lost-item reports.
pub const LOST_COLLECTION: &str = "lostItems";
/// Collection holding found-item entries.
pub const FOUND_COLLECTION: &str = "foundItems";

/// Length of the identifier prefix shown to users as a reference number.
const SHORT_ID_LEN: usize = 8;

/// Return the reference number printed in summaries for an id.
pub fn short_id(id: &ItemId) -> String {
    id.compact().chars().take(SHORT_ID_LEN).collect()
}

/// Which collection a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Found,
}

impl ReportKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Lost => "lost",
            ReportKind::Found => "found",
        }
    }

    /// Name of the persisted collection for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ReportKind::Lost => LOST_COLLECTION,
            ReportKind::Found => FOUND_COLLECTION,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a lost-item report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LostStatus {
    /// Awaiting a match or a decision.
    Pending,
    /// Reunited with its owner.
    Found,
    /// Closed without a match.
    Closed,
}

impl LostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LostStatus::Pending => "pending",
            LostStatus::Found => "found",
            LostStatus::Closed => "closed",
        }
    }

    /// Display label used on the admin desk.
    pub fn label(&self) -> &'static str {
        match self {
            LostStatus::Pending => "قيد الانتظار",
            LostStatus::Found => "تم العثور عليه",
            LostStatus::Closed => "مغلق",
        }
    }

    /// Only pending reports move, and only to a terminal status.
    pub fn can_transition_to(&self, next: LostStatus) -> bool {
        matches!(
            (self, next),
            (LostStatus::Pending, LostStatus::Found) | (LostStatus::Pending, LostStatus::Closed)
        )
    }
}

/// Lifecycle of a found item held by the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoundStatus {
    /// Held at the office.
    Available,
    /// Handed back to its owner.
    Claimed,
}

impl FoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoundStatus::Available => "available",
            FoundStatus::Claimed => "claimed",
        }
    }

    /// Display label used on the admin desk.
    pub fn label(&self) -> &'static str {
        match self {
            FoundStatus::Available => "متاح",
            FoundStatus::Claimed => "تم استلامه",
        }
    }

    pub fn can_transition_to(&self, next: FoundStatus) -> bool {
        matches!((self, next), (FoundStatus::Available, FoundStatus::Claimed))
    }
}

/// Persisted lost-item report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LostRecord {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub location: String,
    /// Free text as typed by the reporter.
    pub date: String,
    pub contact_info: String,
    pub status: LostStatus,
    pub created_at: DateTime<Utc>,
}

/// Persisted found-item entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundRecord {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub status: FoundStatus,
    pub created_at: DateTime<Utc>,
}

/// Record produced when an intake flow finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletedReport {
    Lost(LostRecord),
    Found(FoundRecord),
}

impl CompletedReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            CompletedReport::Lost(_) => ReportKind::Lost,
            CompletedReport::Found(_) => ReportKind::Found,
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            CompletedReport::Lost(record) => &record.id,
            CompletedReport::Found(record) => &record.id,
        }
    }

    /// Value of a collected field; found records have no contact info.
    pub fn field(&self, field: FieldKey) -> &str {
        match (self, field) {
            (CompletedReport::Lost(record), FieldKey::Name) => &record.name,
            (CompletedReport::Lost(record), FieldKey::Location) => &record.location,
            (CompletedReport::Lost(record), FieldKey::Date) => &record.date,
            (CompletedReport::Lost(record), FieldKey::Description) => &record.description,
            (CompletedReport::Lost(record), FieldKey::ContactInfo) => &record.contact_info,
            (CompletedReport::Found(record), FieldKey::Name) => &record.name,
            (CompletedReport::Found(record), FieldKey::Location) => &record.location,
            (CompletedReport::Found(record), FieldKey::Date) => &record.date,
            (CompletedReport::Found(record), FieldKey::Description) => &record.description,
            (CompletedReport::Found(_), FieldKey::ContactInfo) => "",
        }
    }
}

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One entry of a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    /// Local `HH:MM`, display only.
    pub timestamp: String,
}

impl ChatMessage {
    /// Build a message stamped with the current local time.
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, content)
    }
}

#[cfg(test)]
mod tests {
    use super::{FoundRecord, FoundStatus, ItemId, LostRecord, LostStatus, short_id};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn lost_status_transitions_are_one_way() {
        assert!(LostStatus::Pending.can_transition_to(LostStatus::Found));
        assert!(LostStatus::Pending.can_transition_to(LostStatus::Closed));
        assert!(!LostStatus::Pending.can_transition_to(LostStatus::Pending));
        assert!(!LostStatus::Found.can_transition_to(LostStatus::Closed));
        assert!(!LostStatus::Closed.can_transition_to(LostStatus::Found));
        assert!(FoundStatus::Available.can_transition_to(FoundStatus::Claimed));
        assert!(!FoundStatus::Claimed.can_transition_to(FoundStatus::Available));
    }

    #[test]
    fn lost_record_uses_camel_case_storage_keys() {
        let id = ItemId::generate();
        let created_at = Utc::now();
        let record = LostRecord {
            id,
            name: "محفظة".to_string(),
            description: "جلدية".to_string(),
            location: "مبنى 1".to_string(),
            date: "أمس".to_string(),
            contact_info: "0500000000".to_string(),
            status: LostStatus::Pending,
            created_at,
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["contactInfo"], json!("0500000000"));
        assert_eq!(value["status"], json!("pending"));
        assert!(value.get("createdAt").is_some());
        let back: LostRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn short_id_is_eight_hex_chars() {
        let uuid = Uuid::new_v4();
        let id = ItemId::from(uuid);
        let short = short_id(&id);
        assert_eq!(short.len(), 8);
        assert!(uuid.simple().to_string().starts_with(&short));
        assert!(id.has_prefix(&short));
        assert!(id.has_prefix(&uuid.to_string()));
    }

    #[test]
    fn timestamp_ids_from_older_records_decode() {
        let record: FoundRecord = serde_json::from_value(json!({
            "id": "1712345678901",
            "name": "Laptop",
            "description": "silver",
            "location": "Library",
            "date": "2024-04-05",
            "status": "available",
            "createdAt": "2024-04-05T10:00:00.000Z",
        }))
        .expect("deserialize");
        assert_eq!(record.id.as_str(), "1712345678901");
        assert_eq!(short_id(&record.id), "17123456");
        assert_eq!(record.status, FoundStatus::Available);
    }
}

//! Journal entry records and submission payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a journal entry was started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitiatedBy {
    /// The user opened the flow themselves
    #[default]
    #[serde(rename = "self")]
    SelfStarted,
    /// A scheduled prompt opened the flow
    #[serde(rename = "scheduled")]
    Scheduled,
}

/// A historical journal entry as read back from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// Primary emotion curriculum entry
    pub curriculum_id: i64,
    /// Optional secondary emotion, always distinct from the primary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_curriculum_id: Option<i64>,
    /// Optional self-care strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<i64>,
    #[serde(default)]
    pub initiated_by: InitiatedBy,
}

/// Payload for submitting a new journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub curriculum_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_curriculum_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<i64>,
    pub initiated_by: InitiatedBy,
}

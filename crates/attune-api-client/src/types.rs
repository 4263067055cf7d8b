//! Request types for the Attune API

use attune_types::{InitiatedBy, NewJournalEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the Attune HTTP API
    pub base_url: String,
    /// User the client acts on behalf of
    pub user_id: i64,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user_id: 0,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Options for listing journal entries
#[derive(Debug, Clone, Default)]
pub struct ListEntriesOptions {
    /// Only entries at or after this timestamp
    pub from: Option<DateTime<Utc>>,
    /// Only entries at or before this timestamp
    pub to: Option<DateTime<Utc>>,
    /// Only entries using this strategy
    pub strategy_id: Option<i64>,
    /// Pagination limit (service default: 100)
    pub limit: Option<u32>,
    /// Pagination offset
    pub offset: Option<u32>,
}

/// Wire body for creating a journal entry
#[derive(Debug, Clone, Serialize)]
pub struct CreateJournalRequest {
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub curriculum_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_curriculum_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<i64>,
    pub initiated_by: InitiatedBy,
}

impl CreateJournalRequest {
    pub fn from_entry(entry: &NewJournalEntry, user_id: i64) -> Self {
        Self {
            created_at: Utc::now(),
            user_id,
            curriculum_id: entry.curriculum_id,
            secondary_curriculum_id: entry.secondary_curriculum_id,
            strategy_id: entry.strategy_id,
            initiated_by: entry.initiated_by,
        }
    }
}

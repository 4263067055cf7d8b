//! Attune API client
//!
//! HTTP client for the Attune journaling REST API: catalog fetch,
//! journal submission and listing, and the analytics endpoints. The SDK
//! crate wraps this client behind collaborator traits; hosts that need
//! raw API access can use it directly.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use types::{ApiConfig, CreateJournalRequest, ListEntriesOptions};

// Re-export the shared data model
pub use attune_types as model;

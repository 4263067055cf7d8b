//! Attune SDK - Emotion Journaling Client Core
//!
//! Platform-neutral core for Attune clients: the entry-logging wizard,
//! circular phase paging, and remote-first analytics with a local
//! fallback that matches the server's numbers exactly.
//!
//! # Architecture
//!
//! Hosting UIs observe state through `tokio::sync::watch` channels and
//! drive it through async methods; the SDK never calls into the host.
//! Remote collaborators are traits (`SubmitJournal`, `RemoteAnalytics`,
//! `FetchCatalog`), implemented for [`ApiClient`] in [`remote`] and
//! stubbed in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use attune_sdk::{ApiClient, ApiConfig, FlowCoordinator, SessionCache};
//! use attune_sdk::model::InitiatedBy;
//! use std::sync::Arc;
//!
//! let client = Arc::new(ApiClient::new(ApiConfig {
//!     base_url: "http://localhost:8000".into(),
//!     user_id: 1,
//!     ..Default::default()
//! }));
//! let cache = Arc::new(SessionCache::utc());
//!
//! let catalog = Arc::new(client.get_catalog().await?);
//! let flow = FlowCoordinator::new(catalog, client.clone()).with_cache(cache.clone());
//!
//! flow.begin(InitiatedBy::SelfStarted).await;
//! flow.select_curriculum(42).await?;
//! flow.advance().await?; // secondary (optional)
//! flow.advance().await?; // strategy (optional)
//! flow.advance().await?; // review
//! let entry = flow.submit().await?;
//! ```

// Circular phase paging arithmetic
pub mod paging;

// Session cache backing local analytics fallback
pub mod cache;

// Entry-logging wizard state machine
pub mod flow;

// Analytics loading, local calculators, query state
pub mod analytics;

// Host platform event channel
pub mod events;

// Remote collaborator impls for the HTTP client
pub mod remote;

// Error types
pub mod error;

// Re-export flow types
pub use flow::{CatalogScope, FlowCoordinator, FlowSelection, FlowSnapshot, FlowStep, SubmitJournal};

// Re-export analytics types
pub use analytics::{
    AnalyticsSource, DistributionMetric, GrowthIndicatorsMetric, Metric, OverviewMetric,
    QueryState, RemoteAnalytics, StrategyUsageMetric, TemporalPatternsMetric,
};

// Re-export cache types
pub use cache::{LocalSnapshot, SessionCache};

// Re-export event types
pub use events::{host_event_channel, HostEvent, HostEventSender};

// Re-export remote collaborator traits
pub use remote::FetchCatalog;

// Re-export error types
pub use error::{CoreError, Result};

// Re-export from underlying crates
pub use attune_api_client::{ApiClient, ApiConfig, ListEntriesOptions};
pub use attune_types as model;

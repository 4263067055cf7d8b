//! Remote collaborator implementations for [`ApiClient`]
//!
//! The SDK's state machines depend on narrow traits (`SubmitJournal`,
//! `RemoteAnalytics`, `FetchCatalog`) so tests can stub them; the HTTP
//! client satisfies all three. API errors are folded into [`CoreError`]
//! here, so nothing above this module sees `reqwest`.

use crate::analytics::RemoteAnalytics;
use crate::error::Result;
use crate::flow::SubmitJournal;
use async_trait::async_trait;
use attune_api_client::ApiClient;
use attune_types::{
    AnalyticsOverview, Catalog, DateRange, Distribution, DistributionParams, GrowthIndicators,
    JournalEntry, NewJournalEntry, StrategyUsage, TemporalPatterns,
};

/// Collaborator that loads the session catalog.
#[async_trait]
pub trait FetchCatalog: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Catalog>;
}

#[async_trait]
impl FetchCatalog for ApiClient {
    async fn fetch_catalog(&self) -> Result<Catalog> {
        Ok(self.get_catalog().await?)
    }
}

#[async_trait]
impl SubmitJournal for ApiClient {
    async fn submit(&self, entry: &NewJournalEntry) -> Result<JournalEntry> {
        Ok(self.create_entry(entry).await?)
    }
}

#[async_trait]
impl RemoteAnalytics for ApiClient {
    async fn strategy_usage(&self, limit: usize) -> Result<StrategyUsage> {
        Ok(ApiClient::strategy_usage(self, limit).await?)
    }

    async fn temporal_patterns(&self, range: &DateRange) -> Result<TemporalPatterns> {
        Ok(ApiClient::temporal_patterns(self, range).await?)
    }

    async fn growth_indicators(&self, range: &DateRange) -> Result<GrowthIndicators> {
        Ok(ApiClient::growth_indicators(self, range).await?)
    }

    async fn distribution(&self, params: &DistributionParams) -> Result<Distribution> {
        Ok(ApiClient::distribution(self, params).await?)
    }

    async fn overview(&self, range: &DateRange) -> Result<AnalyticsOverview> {
        Ok(ApiClient::overview(self, range).await?)
    }
}

//! Analytics subsystem
//!
//! Five metrics (strategy usage, temporal patterns, growth indicators,
//! phase/layer distribution, overview), each served by an
//! [`AnalyticsSource`] that asks the remote service first and falls
//! back to the local calculators when the session cache can answer.

use crate::cache::LocalSnapshot;
use crate::error::Result;
use async_trait::async_trait;
use attune_types::{
    AnalyticsOverview, DateRange, Distribution, DistributionParams, GrowthIndicators,
    StrategyUsage, TemporalPatterns,
};

// Pure local calculators, numerically matched to the remote service
pub mod local;

// Metric bindings connecting remote endpoints to local calculators
pub mod metrics;

// Remote-first loading with cancel-on-replace
pub mod source;

pub use metrics::{
    DistributionMetric, GrowthIndicatorsMetric, OverviewMetric, StrategyUsageMetric,
    TemporalPatternsMetric,
};
pub use source::AnalyticsSource;

/// Lifecycle of one analytics query.
///
/// `Idle` and `Loading` render identically to callers; both count as
/// pending.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<P> {
    Idle,
    Loading,
    Loaded(P),
    Error(String),
}

impl<P> QueryState<P> {
    /// No settled result yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Idle | QueryState::Loading)
    }

    /// The loaded payload, if any.
    pub fn payload(&self) -> Option<&P> {
        match self {
            QueryState::Loaded(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Remote analytics collaborator, one method per metric.
#[async_trait]
pub trait RemoteAnalytics: Send + Sync {
    async fn strategy_usage(&self, limit: usize) -> Result<StrategyUsage>;
    async fn temporal_patterns(&self, range: &DateRange) -> Result<TemporalPatterns>;
    async fn growth_indicators(&self, range: &DateRange) -> Result<GrowthIndicators>;
    async fn distribution(&self, params: &DistributionParams) -> Result<Distribution>;
    async fn overview(&self, range: &DateRange) -> Result<AnalyticsOverview>;
}

/// One analytics metric: how to fetch it remotely and how to recompute
/// it from the session cache.
#[async_trait]
pub trait Metric: Send + Sync + 'static {
    type Params: Clone + Send + Sync + 'static;
    type Payload: Clone + PartialEq + Send + Sync + 'static;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        params: &Self::Params,
    ) -> Result<Self::Payload>;

    fn compute_local(&self, snapshot: &LocalSnapshot, params: &Self::Params) -> Self::Payload;
}

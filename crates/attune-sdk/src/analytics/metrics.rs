//! Metric bindings
//!
//! One unit struct per analytics metric, pairing the remote endpoint
//! with the local calculator that reproduces it. `AnalyticsSource` is
//! generic over these, so every metric gets the same remote-first,
//! local-fallback loading behavior.

use super::{local, Metric, RemoteAnalytics};
use crate::cache::LocalSnapshot;
use crate::error::Result;
use async_trait::async_trait;
use attune_types::{
    AnalyticsOverview, DateRange, Distribution, DistributionParams, GrowthIndicators,
    StrategyUsage, TemporalPatterns,
};

/// Top strategies and diversity over the most recent entries.
pub struct StrategyUsageMetric;

#[async_trait]
impl Metric for StrategyUsageMetric {
    type Params = usize;
    type Payload = StrategyUsage;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        limit: &usize,
    ) -> Result<StrategyUsage> {
        remote.strategy_usage(*limit).await
    }

    fn compute_local(&self, snapshot: &LocalSnapshot, limit: &usize) -> StrategyUsage {
        local::strategy_usage(&snapshot.catalog, &snapshot.entries, *limit)
    }
}

/// Hourly buckets and consistency over a date range.
pub struct TemporalPatternsMetric;

#[async_trait]
impl Metric for TemporalPatternsMetric {
    type Params = DateRange;
    type Payload = TemporalPatterns;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        range: &DateRange,
    ) -> Result<TemporalPatterns> {
        remote.temporal_patterns(range).await
    }

    fn compute_local(&self, snapshot: &LocalSnapshot, range: &DateRange) -> TemporalPatterns {
        local::temporal_patterns(&snapshot.entries, range, snapshot.utc_offset)
    }
}

/// Medicinal trend and layer/phase coverage over a date range.
pub struct GrowthIndicatorsMetric;

#[async_trait]
impl Metric for GrowthIndicatorsMetric {
    type Params = DateRange;
    type Payload = GrowthIndicators;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        range: &DateRange,
    ) -> Result<GrowthIndicators> {
        remote.growth_indicators(range).await
    }

    fn compute_local(&self, snapshot: &LocalSnapshot, range: &DateRange) -> GrowthIndicators {
        local::growth_indicators(&snapshot.catalog, &snapshot.entries, range)
    }
}

/// Per-phase or per-layer entry shares.
pub struct DistributionMetric;

#[async_trait]
impl Metric for DistributionMetric {
    type Params = DistributionParams;
    type Payload = Distribution;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        params: &DistributionParams,
    ) -> Result<Distribution> {
        remote.distribution(params).await
    }

    fn compute_local(&self, snapshot: &LocalSnapshot, params: &DistributionParams) -> Distribution {
        local::distribution(&snapshot.catalog, &snapshot.entries, params)
    }
}

/// Streaks, ratios, and dominant emotion over a date range.
pub struct OverviewMetric;

#[async_trait]
impl Metric for OverviewMetric {
    type Params = DateRange;
    type Payload = AnalyticsOverview;

    async fn fetch_remote(
        &self,
        remote: &dyn RemoteAnalytics,
        range: &DateRange,
    ) -> Result<AnalyticsOverview> {
        remote.overview(range).await
    }

    fn compute_local(&self, snapshot: &LocalSnapshot, range: &DateRange) -> AnalyticsOverview {
        local::overview(&snapshot.catalog, &snapshot.entries, range, snapshot.utc_offset)
    }
}

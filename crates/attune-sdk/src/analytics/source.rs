//! Remote-first analytics loading
//!
//! `AnalyticsSource` owns one metric's query state. Each `load` takes a
//! sequence ticket; when a newer load (or `cancel`) supersedes it, the
//! stale request's result is discarded without touching published
//! state. On remote failure the source recomputes the payload locally
//! from the session cache, so callers see `Loaded` either way; `Error`
//! is published only when the cache cannot answer.

use super::{Metric, QueryState, RemoteAnalytics};
use crate::cache::SessionCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Loader and state holder for one analytics metric.
pub struct AnalyticsSource<M: Metric> {
    metric: M,
    remote: Arc<dyn RemoteAnalytics>,
    cache: Arc<SessionCache>,
    seq: AtomicU64,
    tx: watch::Sender<QueryState<M::Payload>>,
}

impl<M: Metric> AnalyticsSource<M> {
    pub fn new(metric: M, remote: Arc<dyn RemoteAnalytics>, cache: Arc<SessionCache>) -> Self {
        let (tx, _rx) = watch::channel(QueryState::Idle);
        Self {
            metric,
            remote,
            cache,
            seq: AtomicU64::new(0),
            tx,
        }
    }

    /// Watch the query state. The receiver always sees the latest
    /// published state first.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<M::Payload>> {
        self.tx.subscribe()
    }

    /// Current query state.
    pub fn state(&self) -> QueryState<M::Payload> {
        self.tx.borrow().clone()
    }

    /// Load the metric: publish `Loading`, ask the remote service, and
    /// fall back to the local calculators when the session cache can
    /// answer. A load superseded by a newer one publishes nothing.
    pub async fn load(&self, params: M::Params) {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(ticket, QueryState::Loading);

        let fetched = self.metric.fetch_remote(self.remote.as_ref(), &params).await;
        if !self.is_current(ticket) {
            debug!(ticket, "discarding superseded analytics result");
            return;
        }

        match fetched {
            Ok(payload) => self.publish(ticket, QueryState::Loaded(payload)),
            Err(err) => {
                // Only transport/decode failures are recoverable locally.
                let fallback = if err.is_remote_failure() {
                    self.cache.snapshot().await
                } else {
                    None
                };
                match fallback {
                    Some(snapshot) => {
                        warn!(error = %err, "remote analytics failed, serving local fallback");
                        let payload = self.metric.compute_local(&snapshot, &params);
                        self.publish(ticket, QueryState::Loaded(payload));
                    }
                    None => {
                        warn!(error = %err, "remote analytics failed with no cached fallback");
                        self.publish(ticket, QueryState::Error(err.to_string()));
                    }
                }
            }
        }
    }

    /// Retry after an error. Identical to a fresh load.
    pub async fn retry(&self, params: M::Params) {
        self.load(params).await;
    }

    /// Invalidate any in-flight load without publishing a new state.
    pub fn cancel(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == ticket
    }

    // The ticket check runs inside the channel's send lock, so a
    // competing publisher cannot interleave between check and write.
    fn publish(&self, ticket: u64, state: QueryState<M::Payload>) {
        self.tx.send_if_modified(|current| {
            if self.is_current(ticket) {
                *current = state;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::StrategyUsageMetric;
    use crate::error::{CoreError, Result};
    use attune_types::{
        AnalyticsOverview, Catalog, DateRange, Distribution, DistributionParams, GrowthIndicators,
        InitiatedBy, JournalEntry, StrategyUsage, TemporalPatterns,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Remote stub: strategy_usage answers `first` on its first call
    /// (parked on the gate, when present) and `rest` afterwards.
    struct StubRemote {
        first: Result<StrategyUsage>,
        rest: Result<StrategyUsage>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl StubRemote {
        fn ok(payload: StrategyUsage) -> Self {
            Self {
                first: Ok(payload.clone()),
                rest: Ok(payload),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            let err = CoreError::Transport("connection refused".into());
            Self {
                first: Err(err.clone()),
                rest: Err(err),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(payload: StrategyUsage, gate: Arc<Notify>) -> Self {
            Self {
                first: Ok(payload.clone()),
                rest: Ok(payload),
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            }
        }

        /// First call parks on the gate and answers `stale`; later calls
        /// answer `fresh` immediately.
        fn two_phase(stale: StrategyUsage, fresh: StrategyUsage, gate: Arc<Notify>) -> Self {
            Self {
                first: Ok(stale),
                rest: Ok(fresh),
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteAnalytics for StubRemote {
        async fn strategy_usage(&self, _limit: usize) -> Result<StrategyUsage> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                self.first.clone()
            } else {
                self.rest.clone()
            }
        }

        async fn temporal_patterns(&self, _range: &DateRange) -> Result<TemporalPatterns> {
            unimplemented!("not exercised")
        }

        async fn growth_indicators(&self, _range: &DateRange) -> Result<GrowthIndicators> {
            unimplemented!("not exercised")
        }

        async fn distribution(&self, _params: &DistributionParams) -> Result<Distribution> {
            unimplemented!("not exercised")
        }

        async fn overview(&self, _range: &DateRange) -> Result<AnalyticsOverview> {
            unimplemented!("not exercised")
        }
    }

    fn remote_payload() -> StrategyUsage {
        StrategyUsage { top_strategies: vec![], diversity_score: 42.0, total_entries: 7 }
    }

    async fn populated_cache() -> Arc<SessionCache> {
        let cache = SessionCache::utc();
        cache
            .install_catalog(Catalog { phase_order: vec![], layers: vec![] })
            .await;
        cache
            .install_entries(vec![JournalEntry {
                id: 1,
                created_at: Utc::now(),
                curriculum_id: 1,
                secondary_curriculum_id: None,
                strategy_id: None,
                initiated_by: InitiatedBy::SelfStarted,
            }])
            .await;
        Arc::new(cache)
    }

    #[tokio::test]
    async fn test_remote_success_publishes_loaded() {
        let source = AnalyticsSource::new(
            StrategyUsageMetric,
            Arc::new(StubRemote::ok(remote_payload())),
            Arc::new(SessionCache::utc()),
        );
        assert!(source.state().is_pending());

        source.load(50).await;
        assert_eq!(source.state(), QueryState::Loaded(remote_payload()));
    }

    #[tokio::test]
    async fn test_remote_failure_with_cache_serves_local_fallback() {
        let source = AnalyticsSource::new(
            StrategyUsageMetric,
            Arc::new(StubRemote::failing()),
            populated_cache().await,
        );

        source.load(50).await;
        // The cached entry has no strategy, so the local answer is the
        // empty usage payload - but it is Loaded, never Error.
        assert_eq!(source.state(), QueryState::Loaded(StrategyUsage::default()));
    }

    #[tokio::test]
    async fn test_remote_failure_without_cache_publishes_error() {
        let source = AnalyticsSource::new(
            StrategyUsageMetric,
            Arc::new(StubRemote::failing()),
            Arc::new(SessionCache::utc()),
        );

        source.load(50).await;
        match source.state() {
            QueryState::Error(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_after_error_can_succeed() {
        let cache = populated_cache().await;
        let failing = AnalyticsSource::new(
            StrategyUsageMetric,
            Arc::new(StubRemote::failing()),
            Arc::new(SessionCache::utc()),
        );
        failing.load(50).await;
        assert!(matches!(failing.state(), QueryState::Error(_)));

        let recovering =
            AnalyticsSource::new(StrategyUsageMetric, Arc::new(StubRemote::ok(remote_payload())), cache);
        recovering.retry(50).await;
        assert_eq!(recovering.state(), QueryState::Loaded(remote_payload()));
    }

    #[tokio::test]
    async fn test_overlapping_loads_last_call_wins() {
        let gate = Arc::new(Notify::new());
        let stale = StrategyUsage { top_strategies: vec![], diversity_score: 1.0, total_entries: 1 };
        let remote = Arc::new(StubRemote::two_phase(stale, remote_payload(), gate.clone()));
        let source = Arc::new(AnalyticsSource::new(
            StrategyUsageMetric,
            remote.clone(),
            Arc::new(SessionCache::utc()),
        ));

        let first = {
            let source = source.clone();
            tokio::spawn(async move { source.load(50).await })
        };
        // Wait until the first load is parked inside the remote call.
        while remote.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // A second load completes while the first is still parked.
        source.retry(50).await;
        assert_eq!(source.state(), QueryState::Loaded(remote_payload()));

        // The first load resolves afterwards; its stale result is
        // discarded, so the second result stands.
        gate.notify_one();
        first.await.expect("load task");
        assert_eq!(source.state(), QueryState::Loaded(remote_payload()));
    }

    #[tokio::test]
    async fn test_cancel_leaves_loading_state_untouched() {
        let gate = Arc::new(Notify::new());
        let remote = Arc::new(StubRemote::gated(remote_payload(), gate.clone()));
        let source = Arc::new(AnalyticsSource::new(
            StrategyUsageMetric,
            remote.clone(),
            Arc::new(SessionCache::utc()),
        ));

        let task = {
            let source = source.clone();
            tokio::spawn(async move { source.load(50).await })
        };
        while remote.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(source.state(), QueryState::Loading);

        source.cancel();
        gate.notify_one();
        task.await.expect("load task");

        // The cancelled load resolved but published nothing.
        assert_eq!(source.state(), QueryState::Loading);
    }
}

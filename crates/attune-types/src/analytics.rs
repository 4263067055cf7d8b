//! Analytics payloads, query parameters, and threshold contracts
//!
//! These shapes are returned by the remote analytics service and
//! reproduced bit-for-bit by the SDK's local calculators. The tier
//! thresholds (`ConsistencyTier`, `TrendSignificance`) are a shared
//! contract with calling UIs and must not drift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive time window for range-based analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The trailing `days` window ending now.
    pub fn trailing_days(days: i64) -> Self {
        let end = Utc::now();
        Self { start: end - Duration::days(days), end }
    }

    /// Whether a timestamp falls inside the window (both ends inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Midpoint of the window, used for first-half/second-half splits.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + self.duration() / 2
    }

    /// The equal-length window immediately before this one.
    pub fn previous_period(&self) -> Self {
        Self { start: self.start - self.duration(), end: self.start }
    }
}

/// One strategy's share of recent usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyShare {
    pub strategy_id: i64,
    pub label: String,
    pub percentage: f64,
}

/// Strategy usage analytics over the most recent entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyUsage {
    /// Sorted by use count descending, ties broken by ascending id
    pub top_strategies: Vec<StrategyShare>,
    /// 100 * distinct strategies used / total strategy uses, in [0,100]
    pub diversity_score: f64,
    /// Number of strategy uses counted
    pub total_entries: u64,
}

/// Entry count for one local hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBucket {
    pub hour: u8,
    pub count: u64,
}

/// Temporal journaling patterns over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    /// Hours with zero entries are omitted
    pub hourly_distribution: Vec<HourBucket>,
    /// Day-spread score in [0,100], see `ConsistencyTier`
    pub consistency_score: f64,
}

/// Growth indicators over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthIndicators {
    /// Percentage-point change in medicinal share between the first and
    /// second half of the window; positive means increasing
    pub medicinal_trend_percent: f64,
    /// Distinct emotion layers referenced in the window
    pub layer_diversity_count: u64,
    /// Distinct phases referenced, out of the fixed total of 6
    pub phase_coverage_count: u64,
}

/// One slice of a phase or layer distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub id: i64,
    pub percentage: f64,
}

/// Share of entries per phase or per layer. Percentages sum to 100
/// modulo rounding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub items: Vec<DistributionSlice>,
}

/// Which dimension a distribution query aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionScope {
    /// Keyed by the phase's index in `phase_order`
    Phase,
    /// Keyed by layer id
    Layer,
}

/// How a distribution query selects entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryWindow {
    /// All entries inside a date range
    Range(DateRange),
    /// The most recent `limit` entries
    Recent { limit: usize },
}

/// Parameters for a distribution query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionParams {
    pub scope: DistributionScope,
    pub window: EntryWindow,
}

/// Aggregate usage overview for a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_entries: u64,
    /// Consecutive days with at least one entry, ending at the window end
    pub current_streak: u32,
    /// Longest consecutive-day run in the window
    pub longest_streak: u32,
    /// Entries per day over the window
    pub avg_frequency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<DateTime<Utc>>,
    /// Percentage of entries with medicinal dosage
    pub medicinal_ratio: f64,
    /// Percentage-point change vs. the previous equal-length period
    pub medicinal_trend: f64,
    /// Most frequent layer over the trailing 7 days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_layer_id: Option<i64>,
    /// Most frequent phase over the trailing 7 days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_phase_id: Option<i64>,
    pub unique_emotions: u64,
    pub strategies_used: u64,
    pub secondary_emotions_pct: f64,
}

/// Consistency score tiers, shared with calling UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyTier {
    /// Score >= 80
    Good,
    /// Score in [50, 80)
    Fair,
    /// Score < 50
    Poor,
}

impl ConsistencyTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Significance of a medicinal trend, shared with calling UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSignificance {
    /// Trend > +5 percentage points
    Positive,
    /// Trend < -5 percentage points
    Negative,
    /// Within the +/-5 point band
    Neutral,
}

impl TrendSignificance {
    pub fn from_trend(trend: f64) -> Self {
        if trend > 5.0 {
            Self::Positive
        } else if trend < -5.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

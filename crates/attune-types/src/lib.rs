//! Attune shared data model
//!
//! Serde types shared between the API client and the SDK core:
//!
//! 1. **Catalog** - the fixed six-phase emotional cycle, its layers,
//!    curriculum entries and self-care strategies
//! 2. **Journal** - historical journal entries and submission payloads
//! 3. **Analytics** - payload shapes returned by the analytics service
//!    and reproduced by the SDK's local calculators
//!
//! The wire format matches the backend's snake_case JSON. The catalog is
//! immutable for the lifetime of a client session; lookup helpers here
//! never mutate and never panic on unknown ids.

// Catalog: layers, phases, curriculum entries, strategies
pub mod catalog;

// Journal entries and submission payloads
pub mod journal;

// Analytics payloads, query parameters, and threshold contracts
pub mod analytics;

pub use catalog::{
    Catalog, CurriculumEntry, CurriculumRef, Dosage, Layer, Phase, StrategyEntry,
    PHASE_COUNT, STRATEGY_LAYER_ID,
};

pub use journal::{InitiatedBy, JournalEntry, NewJournalEntry};

pub use analytics::{
    AnalyticsOverview, ConsistencyTier, DateRange, Distribution, DistributionParams,
    DistributionScope, DistributionSlice, EntryWindow, GrowthIndicators, HourBucket,
    StrategyShare, StrategyUsage, TemporalPatterns, TrendSignificance,
};

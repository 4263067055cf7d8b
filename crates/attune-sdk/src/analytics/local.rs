//! Local analytics calculators
//!
//! Pure, deterministic functions over the cached catalog and entry set.
//! Each must reproduce the remote service's numeric output exactly for
//! identical entries, catalog, and time window - the fallback path is
//! only invisible to the UI if the numbers agree.
//!
//! Entries referencing ids absent from the current catalog are dropped
//! from totals, never raised as errors. An empty entry set is a valid
//! "no data" result: zeroed scores, empty distributions.

use attune_types::{
    AnalyticsOverview, Catalog, DateRange, Distribution, DistributionParams, DistributionScope,
    DistributionSlice, Dosage, EntryWindow, GrowthIndicators, HourBucket, JournalEntry,
    StrategyShare, StrategyUsage, TemporalPatterns,
};
use chrono::{Duration, FixedOffset, NaiveDate, Timelike};
use std::collections::{BTreeMap, BTreeSet};

/// Percentages are reported with one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Strategy usage over the most recent `limit` strategy-bearing entries.
///
/// `diversity_score` is 100 * distinct strategies used / total strategy
/// uses, clamped to [0,100], and 0 when nothing was counted.
pub fn strategy_usage(catalog: &Catalog, entries: &[JournalEntry], limit: usize) -> StrategyUsage {
    let mut with_strategy: Vec<&JournalEntry> = entries
        .iter()
        .filter(|entry| entry.strategy_id.is_some())
        .collect();
    with_strategy.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for entry in with_strategy.into_iter().take(limit) {
        let Some(id) = entry.strategy_id else { continue };
        // Stale strategy ids are dropped from totals.
        if catalog.find_strategy(id).is_none() {
            continue;
        }
        *counts.entry(id).or_insert(0) += 1;
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return StrategyUsage::default();
    }

    let mut ranked: Vec<(i64, u64)> = counts.iter().map(|(&id, &count)| (id, count)).collect();
    // Count descending, ties broken by ascending strategy id.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let top_strategies = ranked
        .iter()
        .map(|&(id, count)| StrategyShare {
            strategy_id: id,
            label: catalog
                .find_strategy(id)
                .map(|strategy| strategy.label.clone())
                .unwrap_or_default(),
            percentage: round1(count as f64 / total as f64 * 100.0),
        })
        .collect();

    let distinct = counts.len() as f64;
    let diversity_score = round1((distinct / total as f64 * 100.0).clamp(0.0, 100.0));

    StrategyUsage {
        top_strategies,
        diversity_score,
        total_entries: total,
    }
}

/// Hourly bucketing and day-spread consistency over a time window.
///
/// `consistency_score` is 100 * distinct local days with at least one
/// entry / total days in the window, rounded to one decimal. Days are
/// taken at the caller's UTC offset.
pub fn temporal_patterns(
    entries: &[JournalEntry],
    range: &DateRange,
    offset: FixedOffset,
) -> TemporalPatterns {
    let mut hours = [0u64; 24];
    let mut active_days: BTreeSet<NaiveDate> = BTreeSet::new();

    for entry in entries.iter().filter(|e| range.contains(e.created_at)) {
        let local = entry.created_at.with_timezone(&offset);
        hours[local.hour() as usize] += 1;
        active_days.insert(local.date_naive());
    }

    let hourly_distribution = hours
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(hour, &count)| HourBucket { hour: hour as u8, count })
        .collect();

    let window_days = window_day_count(range, offset);
    let consistency_score = if window_days > 0 && !active_days.is_empty() {
        round1((active_days.len() as f64 / window_days as f64 * 100.0).clamp(0.0, 100.0))
    } else {
        0.0
    };

    TemporalPatterns {
        hourly_distribution,
        consistency_score,
    }
}

/// Growth indicators over a time window.
///
/// The medicinal trend is the percentage-point change in medicinal
/// share between the first and second half of the window; positive
/// means the medicinal share is increasing.
pub fn growth_indicators(
    catalog: &Catalog,
    entries: &[JournalEntry],
    range: &DateRange,
) -> GrowthIndicators {
    let windowed: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| range.contains(e.created_at))
        .collect();

    let midpoint = range.midpoint();
    let first_share = medicinal_share(
        catalog,
        windowed.iter().filter(|e| e.created_at < midpoint).copied(),
    );
    let second_share = medicinal_share(
        catalog,
        windowed.iter().filter(|e| e.created_at >= midpoint).copied(),
    );

    let mut layers: BTreeSet<i64> = BTreeSet::new();
    let mut phases: BTreeSet<&str> = BTreeSet::new();
    for entry in &windowed {
        for id in [Some(entry.curriculum_id), entry.secondary_curriculum_id]
            .into_iter()
            .flatten()
        {
            if let Some(found) = catalog.locate_curriculum(id) {
                layers.insert(found.layer.id);
                phases.insert(found.phase.name.as_str());
            }
        }
    }

    GrowthIndicators {
        medicinal_trend_percent: round1(second_share - first_share),
        layer_diversity_count: layers.len() as u64,
        phase_coverage_count: phases.len() as u64,
    }
}

/// Share of entries per phase or layer.
///
/// Phase slices are keyed by the phase's position in `phase_order`
/// (per-layer phase ids are not comparable across layers); layer slices
/// by layer id. Percentages sum to 100 modulo rounding.
pub fn distribution(
    catalog: &Catalog,
    entries: &[JournalEntry],
    params: &DistributionParams,
) -> Distribution {
    let selected: Vec<&JournalEntry> = match params.window {
        EntryWindow::Range(range) => entries
            .iter()
            .filter(|e| range.contains(e.created_at))
            .collect(),
        EntryWindow::Recent { limit } => {
            let mut all: Vec<&JournalEntry> = entries.iter().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            all.truncate(limit);
            all
        }
    };

    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for entry in selected {
        let Some(found) = catalog.locate_curriculum(entry.curriculum_id) else {
            continue;
        };
        let key = match params.scope {
            DistributionScope::Layer => found.layer.id,
            DistributionScope::Phase => match catalog.phase_position(&found.phase.name) {
                Some(position) => position as i64,
                None => continue,
            },
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Distribution::default();
    }

    let mut ranked: Vec<(i64, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    Distribution {
        items: ranked
            .into_iter()
            .map(|(id, count)| DistributionSlice {
                id,
                percentage: round1(count as f64 / total as f64 * 100.0),
            })
            .collect(),
    }
}

/// Aggregate usage overview, matching the remote service's formulas.
///
/// Streaks count consecutive local days with at least one entry; the
/// current streak is zero unless the latest entry falls on the window's
/// last day or the day before. The medicinal trend here compares the
/// window against the previous equal-length period, which is how the
/// overview endpoint defines it.
pub fn overview(
    catalog: &Catalog,
    entries: &[JournalEntry],
    range: &DateRange,
    offset: FixedOffset,
) -> AnalyticsOverview {
    let mut windowed: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| range.contains(e.created_at))
        .collect();
    windowed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if windowed.is_empty() {
        return AnalyticsOverview::default();
    }

    let total_entries = windowed.len() as u64;
    let last_check_in = Some(windowed[0].created_at);

    let dates_desc: Vec<NaiveDate> = {
        let unique: BTreeSet<NaiveDate> = windowed
            .iter()
            .map(|e| e.created_at.with_timezone(&offset).date_naive())
            .collect();
        unique.into_iter().rev().collect()
    };

    let end_date = range.end.with_timezone(&offset).date_naive();
    let current_streak = current_streak(&dates_desc, end_date);
    let longest_streak = longest_streak(&dates_desc);

    let window_days = (range.end - range.start).num_days() + 1;
    let avg_frequency = if window_days > 0 {
        total_entries as f64 / window_days as f64
    } else {
        0.0
    };

    let medicinal_ratio = medicinal_share(catalog, windowed.iter().copied());
    let previous = range.previous_period();
    let previous_ratio = medicinal_share(
        catalog,
        entries.iter().filter(|e| previous.contains(e.created_at)),
    );
    let medicinal_trend = medicinal_ratio - previous_ratio;

    let (dominant_layer_id, dominant_phase_id) = dominant_layer_and_phase(catalog, entries, range);

    let unique_emotions = windowed
        .iter()
        .map(|e| e.curriculum_id)
        .collect::<BTreeSet<_>>()
        .len() as u64;

    let strategies_used = windowed
        .iter()
        .filter_map(|e| e.strategy_id)
        .collect::<BTreeSet<_>>()
        .len() as u64;

    let with_secondary = windowed
        .iter()
        .filter(|e| e.secondary_curriculum_id.is_some())
        .count() as u64;
    let secondary_emotions_pct = with_secondary as f64 / total_entries as f64 * 100.0;

    AnalyticsOverview {
        total_entries,
        current_streak,
        longest_streak,
        avg_frequency,
        last_check_in,
        medicinal_ratio,
        medicinal_trend,
        dominant_layer_id,
        dominant_phase_id,
        unique_emotions,
        strategies_used,
        secondary_emotions_pct,
    }
}

/// Percentage of resolvable entries whose primary curriculum entry has
/// medicinal dosage. Unresolvable ids are dropped from both counts.
fn medicinal_share<'a>(
    catalog: &Catalog,
    entries: impl Iterator<Item = &'a JournalEntry>,
) -> f64 {
    let mut total = 0u64;
    let mut medicinal = 0u64;
    for entry in entries {
        let Some(found) = catalog.locate_curriculum(entry.curriculum_id) else {
            continue;
        };
        total += 1;
        if found.entry.dosage == Dosage::Medicinal {
            medicinal += 1;
        }
    }
    if total > 0 {
        medicinal as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Number of local calendar days the window spans, both ends inclusive.
fn window_day_count(range: &DateRange, offset: FixedOffset) -> i64 {
    let start = range.start.with_timezone(&offset).date_naive();
    let end = range.end.with_timezone(&offset).date_naive();
    (end - start).num_days() + 1
}

/// Consecutive-day streak ending at the window's last day (or the day
/// before). `dates` must be unique and sorted descending.
fn current_streak(dates: &[NaiveDate], end_date: NaiveDate) -> u32 {
    let Some(&most_recent) = dates.first() else {
        return 0;
    };
    if most_recent < end_date - Duration::days(1) {
        return 0;
    }

    let mut streak = 0u32;
    let mut expected = most_recent;
    for &date in dates {
        if date == expected {
            streak += 1;
            expected = expected - Duration::days(1);
        } else if date < expected {
            break;
        }
    }
    streak
}

/// Longest consecutive-day run anywhere in `dates` (unique, any order
/// accepted; only the set matters).
fn longest_streak(dates: &[NaiveDate]) -> u32 {
    if dates.is_empty() {
        return 0;
    }
    let ascending: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut longest = 1u32;
    let mut current = 1u32;
    let mut previous: Option<NaiveDate> = None;
    for date in ascending {
        if let Some(prev) = previous {
            if date - prev == Duration::days(1) {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 1;
            }
        }
        previous = Some(date);
    }
    longest
}

/// Most frequent layer and phase over the trailing 7 days of the
/// window, ties broken by ascending id for determinism.
fn dominant_layer_and_phase(
    catalog: &Catalog,
    entries: &[JournalEntry],
    range: &DateRange,
) -> (Option<i64>, Option<i64>) {
    let trailing = DateRange::new(range.end - Duration::days(7), range.end);
    let mut layer_counts: BTreeMap<i64, u64> = BTreeMap::new();
    let mut phase_counts: BTreeMap<i64, u64> = BTreeMap::new();

    for entry in entries.iter().filter(|e| trailing.contains(e.created_at)) {
        if let Some(found) = catalog.locate_curriculum(entry.curriculum_id) {
            *layer_counts.entry(found.layer.id).or_insert(0) += 1;
            *phase_counts.entry(found.phase.id).or_insert(0) += 1;
        }
    }

    let dominant = |counts: BTreeMap<i64, u64>| {
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    };

    (dominant(layer_counts), dominant(phase_counts))
}

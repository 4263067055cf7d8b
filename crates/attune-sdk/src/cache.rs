//! Session cache backing the local analytics fallback
//!
//! Holds the session catalog and the cached journal entry set. Local
//! analytics fallback is available exactly when both are present. The
//! cache lives in memory for the session only; on-disk persistence is a
//! host concern.

use attune_types::{Catalog, JournalEntry};
use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Immutable view of the cached catalog and entries, handed to the
/// local calculators.
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    pub catalog: Arc<Catalog>,
    pub entries: Arc<Vec<JournalEntry>>,
    /// Offset used to bucket timestamps into local days and hours
    pub utc_offset: FixedOffset,
}

#[derive(Default)]
struct Inner {
    catalog: Option<Arc<Catalog>>,
    entries: Option<Arc<Vec<JournalEntry>>>,
}

/// Session-scoped cache of the catalog and journal entries.
pub struct SessionCache {
    inner: RwLock<Inner>,
    utc_offset: FixedOffset,
}

impl SessionCache {
    /// Create a cache that buckets timestamps at the given UTC offset.
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            utc_offset,
        }
    }

    /// Cache bucketing timestamps in UTC.
    pub fn utc() -> Self {
        Self::new(FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Install the session catalog.
    pub async fn install_catalog(&self, catalog: Catalog) {
        let mut inner = self.inner.write().await;
        inner.catalog = Some(Arc::new(catalog));
    }

    /// Replace the cached entry set wholesale.
    pub async fn install_entries(&self, entries: Vec<JournalEntry>) {
        let mut inner = self.inner.write().await;
        inner.entries = Some(Arc::new(entries));
    }

    /// Append a single entry, typically after a successful submission.
    ///
    /// Creates the entry set if none was installed yet; one recorded
    /// entry is a valid cached set.
    pub async fn record_entry(&self, entry: JournalEntry) {
        let mut inner = self.inner.write().await;
        match inner.entries.as_mut() {
            Some(entries) => Arc::make_mut(entries).push(entry),
            None => inner.entries = Some(Arc::new(vec![entry])),
        }
    }

    /// Snapshot for local computation. `None` until both a catalog and
    /// an entry set have been cached - callers treat that as "fallback
    /// unavailable".
    pub async fn snapshot(&self) -> Option<LocalSnapshot> {
        let inner = self.inner.read().await;
        let catalog = inner.catalog.clone()?;
        let entries = inner.entries.clone()?;
        Some(LocalSnapshot {
            catalog,
            entries,
            utc_offset: self.utc_offset,
        })
    }

    /// Drop everything, e.g. on sign-out.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.catalog = None;
        inner.entries = None;
    }
}

//! Client-side snapshot cache for polled collections.
//!
//! Clients poll the backend on a fixed interval and mirror the
//! response locally. Instead of unconditionally replacing local state
//! on every tick, [`SyncCache`] holds the last snapshot, skips
//! refreshes while the snapshot is inside its staleness window, and
//! reports what actually changed so callers can react to deltas
//! (badge counts, notifications) instead of re-rendering everything.

use chrono::{DateTime, Duration, Utc};

/// Anything cacheable by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for crate::EventDto {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for crate::PreparationDto {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for crate::MessageDto {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Ids that changed between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// A snapshot of one server collection plus the bookkeeping needed to
/// decide when it is stale.
#[derive(Debug, Clone)]
pub struct SyncCache<T> {
    items: Vec<T>,
    fetched_at: Option<DateTime<Utc>>,
    staleness: Duration,
}

impl<T: Keyed + PartialEq + Clone> SyncCache<T> {
    pub fn new(staleness: Duration) -> Self {
        Self {
            items: Vec::new(),
            fetched_at: None,
            staleness,
        }
    }

    /// The current local snapshot. Empty until the first refresh.
    pub fn snapshot(&self) -> &[T] {
        &self.items
    }

    /// True if no fetch has happened yet or the last one is older than
    /// the staleness window.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            None => true,
            Some(at) => now - at >= self.staleness,
        }
    }

    /// Replace the snapshot with freshly fetched data and report the
    /// difference against the previous snapshot.
    pub fn apply(&mut self, now: DateTime<Utc>, fresh: Vec<T>) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for item in &fresh {
            match self.items.iter().find(|old| old.key() == item.key()) {
                None => changes.added.push(item.key().to_owned()),
                Some(old) if old != item => changes.updated.push(item.key().to_owned()),
                Some(_) => {}
            }
        }
        for old in &self.items {
            if !fresh.iter().any(|item| item.key() == old.key()) {
                changes.removed.push(old.key().to_owned());
            }
        }

        self.items = fresh;
        self.fetched_at = Some(now);
        changes
    }

    /// Pull-based refresh: fetches only when stale. Returns `None`
    /// when the snapshot was still fresh and the fetch was skipped.
    pub fn refresh_with<F>(&mut self, now: DateTime<Utc>, fetch: F) -> Option<ChangeSet>
    where
        F: FnOnce() -> Vec<T>,
    {
        if !self.is_stale(now) {
            return None;
        }
        Some(self.apply(now, fetch()))
    }
}

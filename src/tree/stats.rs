//! Tree Statistics
//!
//! Relaxed atomic counters updated by every tree operation. Counters are
//! observational only and never consulted for correctness.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one tree
#[derive(Debug, Default)]
pub struct TreeStats {
    /// Nodes created, prefixes included
    pub nodes_created: AtomicU64,
    /// Creates rejected because the leaf already existed
    pub create_conflicts: AtomicU64,
    /// Searches performed
    pub searches: AtomicU64,
    /// Searches that found nothing
    pub search_misses: AtomicU64,
    /// Successful remove operations
    pub removals: AtomicU64,
    /// Nodes released by removals, descendants included
    pub nodes_removed: AtomicU64,
}

impl TreeStats {
    #[inline]
    pub(crate) fn record_created(&self, count: usize) {
        self.nodes_created.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_conflict(&self) {
        self.create_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_search(&self, found: bool) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        if !found {
            self.search_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_removal(&self, released: usize) {
        self.removals.fetch_add(1, Ordering::Relaxed);
        self.nodes_removed.fetch_add(released as u64, Ordering::Relaxed);
    }

    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> TreeStatsSnapshot {
        TreeStatsSnapshot {
            nodes_created: self.nodes_created.load(Ordering::Relaxed),
            create_conflicts: self.create_conflicts.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            search_misses: self.search_misses.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            nodes_removed: self.nodes_removed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of tree statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatsSnapshot {
    pub nodes_created: u64,
    pub create_conflicts: u64,
    pub searches: u64,
    pub search_misses: u64,
    pub removals: u64,
    pub nodes_removed: u64,
}

impl TreeStatsSnapshot {
    /// Fraction of searches that found their topic
    pub fn search_hit_ratio(&self) -> f64 {
        if self.searches == 0 {
            return 0.0;
        }
        (self.searches - self.search_misses) as f64 / self.searches as f64
    }
}

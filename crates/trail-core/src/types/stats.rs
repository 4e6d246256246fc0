//! Observability counters

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counters reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Number of `expand` calls
    pub expansions: u64,
    /// Number of edges enumerated across all expansions
    pub scanned_index: u64,
    /// Number of `fetch` round trips
    pub round_trips: u64,
    /// Number of vertex documents delivered by `fetch`
    pub documents_fetched: u64,
}

impl AddAssign for ProviderStats {
    fn add_assign(&mut self, other: Self) {
        self.expansions += other.expansions;
        self.scanned_index += other.scanned_index;
        self.round_trips += other.round_trips;
        self.documents_fetched += other.documents_fetched;
    }
}

/// Counters accumulated by one enumerator between `steal_stats` calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorStats {
    /// Combined counters of both balls' providers
    pub provider: ProviderStats,
    pub steps_created: u64,
    pub steps_filtered: u64,
    pub steps_pruned: u64,
    pub candidates_produced: u64,
    /// Combinations rejected by the joined-path check
    pub candidates_rejected: u64,
    pub duplicates_discarded: u64,
    /// Paths rejected by the post-filter
    pub paths_filtered: u64,
    pub paths_produced: u64,
    /// Retries caused by an unresolved candidate
    pub not_ready_retries: u64,
}

impl AddAssign for EnumeratorStats {
    fn add_assign(&mut self, other: Self) {
        self.provider += other.provider;
        self.steps_created += other.steps_created;
        self.steps_filtered += other.steps_filtered;
        self.steps_pruned += other.steps_pruned;
        self.candidates_produced += other.candidates_produced;
        self.candidates_rejected += other.candidates_rejected;
        self.duplicates_discarded += other.duplicates_discarded;
        self.paths_filtered += other.paths_filtered;
        self.paths_produced += other.paths_produced;
        self.not_ready_retries += other.not_ready_retries;
    }
}

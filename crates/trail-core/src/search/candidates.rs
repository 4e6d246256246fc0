//! Meeting-point candidates waiting to be materialized
//!
//! A candidate is a value snapshot: the combined weight plus one step index in
//! each ball's store. Candidates are consumed in non-decreasing weight, equal
//! weights in insertion order.

use crate::error::TrailResult;
use crate::resource::{ResourceCharge, ResourceMonitor};
use crate::search::step::{PathStore, StepIndex};
use rustc_hash::FxHashSet;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

/// A forward step and a backward step that meet at the same vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatedCandidate {
    pub weight: f64,
    /// Step in the left (source) ball's store
    pub forward: StepIndex,
    /// Step in the right (target) ball's store
    pub backward: StepIndex,
}

impl CalculatedCandidate {
    pub fn new(weight: f64, forward: StepIndex, backward: StepIndex) -> Self {
        Self {
            weight,
            forward,
            backward,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    seq: u64,
    candidate: CalculatedCandidate,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.candidate
            .weight
            .total_cmp(&other.candidate.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

const ENTRY_BYTES: usize = std::mem::size_of::<Entry>();

/// Min-heap of candidates keyed by `(weight, insertion order)`
#[derive(Debug)]
pub struct CandidatesStore {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
    charge: ResourceCharge,
}

impl CandidatesStore {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            charge: ResourceCharge::new(monitor),
        }
    }

    pub fn append(&mut self, candidate: CalculatedCandidate) -> TrailResult<()> {
        self.charge.charge(ENTRY_BYTES)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { seq, candidate }));
        Ok(())
    }

    /// The cheapest candidate, without removing it
    pub fn peek(&self) -> Option<&CalculatedCandidate> {
        self.heap.peek().map(|Reverse(entry)| &entry.candidate)
    }

    pub fn pop(&mut self) -> Option<CalculatedCandidate> {
        let Reverse(entry) = self.heap.pop()?;
        self.charge.release(ENTRY_BYTES);
        Some(entry.candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
        self.charge.release_all();
    }

    /// Unresolved forward-chain steps of candidates weighing at most `bound`
    pub fn left_loose_ends(&self, bound: f64, store: &PathStore) -> Vec<StepIndex> {
        self.loose_ends(bound, store, |c| c.forward)
    }

    /// Unresolved backward-chain steps of candidates weighing at most `bound`
    pub fn right_loose_ends(&self, bound: f64, store: &PathStore) -> Vec<StepIndex> {
        self.loose_ends(bound, store, |c| c.backward)
    }

    fn loose_ends(
        &self,
        bound: f64,
        store: &PathStore,
        side: impl Fn(&CalculatedCandidate) -> StepIndex,
    ) -> Vec<StepIndex> {
        let mut seen = FxHashSet::default();
        let mut loose = Vec::new();
        for Reverse(entry) in self.heap.iter() {
            if entry.candidate.weight > bound {
                continue;
            }
            for index in store.unresolved_in_chain(side(&entry.candidate)) {
                if seen.insert(index) {
                    loose.push(index);
                }
            }
        }
        // Heap iteration order is arbitrary; fetch order should not be.
        loose.sort_unstable();
        loose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrailError;
    use crate::graph::provider::Resolution;
    use crate::search::step::Step;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn candidate(weight: f64, forward: usize) -> CalculatedCandidate {
        CalculatedCandidate::new(
            weight,
            StepIndex::for_test(forward),
            StepIndex::for_test(0),
        )
    }

    #[test]
    fn test_pop_order_is_monotonic() {
        let mut store = CandidatesStore::new(ResourceMonitor::unlimited());
        for (i, w) in [4.0, 1.0, 3.0, 1.0, 2.0].into_iter().enumerate() {
            store.append(candidate(w, i)).unwrap();
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.peek().map(|c| c.weight), Some(1.0));

        let popped: Vec<(f64, usize)> = std::iter::from_fn(|| store.pop())
            .map(|c| (c.weight, c.forward.get()))
            .collect();
        // Equal weights keep insertion order.
        assert_eq!(
            popped,
            vec![(1.0, 1), (1.0, 3), (2.0, 4), (3.0, 2), (4.0, 0)]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_charged_and_released() {
        let monitor = ResourceMonitor::unlimited();
        let mut store = CandidatesStore::new(monitor.clone());
        store.append(candidate(1.0, 0)).unwrap();
        store.append(candidate(2.0, 1)).unwrap();
        assert_eq!(monitor.used(), 2 * ENTRY_BYTES);

        store.pop();
        assert_eq!(monitor.used(), ENTRY_BYTES);
        store.clear();
        assert_eq!(monitor.used(), 0);
    }

    #[test]
    fn test_append_over_limit() {
        let mut store = CandidatesStore::new(ResourceMonitor::with_limit(ENTRY_BYTES));
        store.append(candidate(1.0, 0)).unwrap();
        let err = store.append(candidate(1.0, 1)).unwrap_err();
        assert!(matches!(err, TrailError::ResourceExhausted { .. }));
    }

    #[test]
    fn test_loose_ends_respect_bound() {
        let mut steps = PathStore::new(ResourceMonitor::unlimited());
        let center = steps
            .append(Step::center("v/A".into(), Resolution::Resolved(None)))
            .unwrap();
        let near_step = Step::extend(
            (center, steps.get(center)),
            "v/B".into(),
            "e/1".into(),
            1.0,
            Resolution::Pending,
        );
        let near = steps.append(near_step).unwrap();
        let far_step = Step::extend(
            (center, steps.get(center)),
            "v/C".into(),
            "e/2".into(),
            5.0,
            Resolution::Pending,
        );
        let far = steps.append(far_step).unwrap();

        let mut store = CandidatesStore::new(ResourceMonitor::unlimited());
        store
            .append(CalculatedCandidate::new(1.0, near, center))
            .unwrap();
        store
            .append(CalculatedCandidate::new(1.0, near, center))
            .unwrap();
        store
            .append(CalculatedCandidate::new(5.0, far, center))
            .unwrap();

        assert_eq!(store.left_loose_ends(2.0, &steps), vec![near]);
        assert_eq!(store.left_loose_ends(f64::INFINITY, &steps), vec![near, far]);
        assert!(store.right_loose_ends(f64::INFINITY, &steps).is_empty());
    }
}

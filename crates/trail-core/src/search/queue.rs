//! Frontier priority queues
//!
//! A ball pops steps in non-decreasing weight. Equal weights come out in
//! insertion order, which keeps the output order reproducible for identical
//! inputs.

use crate::search::step::StepIndex;
use crate::trace::{timed, SharedTraceRecorder};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A queued step and the weight it is ordered by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    pub weight: f64,
    pub step: StepIndex,
}

/// Min-priority queue of frontier steps
pub trait PriorityQueue: Send {
    fn push(&mut self, entry: QueueEntry);

    /// Remove the cheapest entry
    fn pop(&mut self) -> Option<QueueEntry>;

    fn peek(&self) -> Option<QueueEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Every queued entry, in no particular order
    fn entries(&self) -> Vec<QueueEntry>;
}

/// Heap element: weight first, then insertion sequence
#[derive(Debug, Clone, Copy)]
struct Keyed {
    weight: f64,
    seq: u64,
    step: StepIndex,
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Keyed {}

impl PartialOrd for Keyed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Binary-heap queue ordered by `(weight, insertion order)`
#[derive(Debug, Default)]
pub struct WeightedQueue {
    heap: BinaryHeap<Reverse<Keyed>>,
    next_seq: u64,
}

impl WeightedQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriorityQueue for WeightedQueue {
    fn push(&mut self, entry: QueueEntry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Keyed {
            weight: entry.weight,
            seq,
            step: entry.step,
        }));
    }

    fn pop(&mut self) -> Option<QueueEntry> {
        self.heap.pop().map(|Reverse(k)| QueueEntry {
            weight: k.weight,
            step: k.step,
        })
    }

    fn peek(&self) -> Option<QueueEntry> {
        self.heap.peek().map(|Reverse(k)| QueueEntry {
            weight: k.weight,
            step: k.step,
        })
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    fn entries(&self) -> Vec<QueueEntry> {
        self.heap
            .iter()
            .map(|Reverse(k)| QueueEntry {
                weight: k.weight,
                step: k.step,
            })
            .collect()
    }
}

/// Queue decorator that records call counts and timings
pub struct TracedQueue {
    inner: Box<dyn PriorityQueue>,
    recorder: SharedTraceRecorder,
}

impl TracedQueue {
    pub fn new(inner: Box<dyn PriorityQueue>, recorder: SharedTraceRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl PriorityQueue for TracedQueue {
    fn push(&mut self, entry: QueueEntry) {
        let inner = &mut self.inner;
        timed(&self.recorder, "queue.push", || inner.push(entry))
    }

    fn pop(&mut self) -> Option<QueueEntry> {
        let inner = &mut self.inner;
        timed(&self.recorder, "queue.pop", || inner.pop())
    }

    fn peek(&self) -> Option<QueueEntry> {
        self.inner.peek()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        let inner = &mut self.inner;
        timed(&self.recorder, "queue.clear", || inner.clear())
    }

    fn entries(&self) -> Vec<QueueEntry> {
        timed(&self.recorder, "queue.entries", || self.inner.entries())
    }
}

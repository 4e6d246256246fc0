//! Call counting and timing for the tracing decorators
//!
//! `TracedProvider`, `TracedQueue` and `TracedValidator` all write into one
//! shared [`TraceRecorder`], so a single report covers a whole enumerator.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing summary for one traced operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraceEntry {
    pub calls: u64,
    pub total: Duration,
    pub max: Duration,
}

impl TraceEntry {
    /// Mean time per call (zero when never called)
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Per-operation counters keyed by a static operation name
#[derive(Debug, Default)]
pub struct TraceRecorder {
    entries: FxHashMap<&'static str, TraceEntry>,
}

/// Recorder shared between all decorators of one enumerator
pub type SharedTraceRecorder = Arc<Mutex<TraceRecorder>>;

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTraceRecorder {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn record(&mut self, operation: &'static str, elapsed: Duration) {
        let entry = self.entries.entry(operation).or_default();
        entry.calls += 1;
        entry.total += elapsed;
        entry.max = entry.max.max(elapsed);
    }

    pub fn get(&self, operation: &str) -> Option<TraceEntry> {
        self.entries.get(operation).copied()
    }

    /// All entries sorted by operation name
    pub fn report(&self) -> Vec<(&'static str, TraceEntry)> {
        let mut report: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        report.sort_by(|a, b| a.0.cmp(b.0));
        report
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Run `f`, recording its duration under `operation`
pub(crate) fn timed<T>(
    recorder: &SharedTraceRecorder,
    operation: &'static str,
    f: impl FnOnce() -> T,
) -> T {
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    recorder.lock().record(operation, elapsed);
    tracing::trace!(operation, elapsed_us = elapsed.as_micros() as u64, "traced call");
    out
}

//! Trail Benchmark Suite
//!
//! Criterion benchmarks for the weighted two-sided path enumerator over
//! generated in-memory graphs.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench -p trail-bench
//! ```
//!
//! ## Benchmark Categories
//!
//! - **K Shortest**: Full enumeration in weight order
//! - **Shortest**: Time to the first path
//! - **Lazy Fetch**: Enumeration with batched document round trips

pub mod datasets;

use std::time::{Duration, Instant};
use trail_core::{
    EnumeratorBuilder, EnumeratorConfig, EnumeratorStats, PathResult, TrailResult, VertexRef,
};
use trail_storage::{DocumentMode, MemGraph};

/// Outcome of one enumeration run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub paths: usize,
    pub cheapest: Option<f64>,
    pub stats: EnumeratorStats,
    pub duration: Duration,
}

/// Enumerate up to `limit` paths between two vertices of `graph`
pub fn enumerate(
    graph: &MemGraph,
    mode: DocumentMode,
    config: EnumeratorConfig,
    source: &str,
    target: &str,
    limit: usize,
) -> TrailResult<RunSummary> {
    let timer = Timer::start();
    let mut enumerator =
        EnumeratorBuilder::new(config).build(graph.provider(mode), graph.provider(mode))?;
    enumerator.reset(VertexRef::from(source), VertexRef::from(target), 0)?;

    let mut paths = 0;
    let mut cheapest = None;
    let mut out = PathResult::new();
    while paths < limit && enumerator.get_next_path(&mut out)? {
        if cheapest.is_none() {
            cheapest = Some(out.weight);
        }
        paths += 1;
    }

    Ok(RunSummary {
        paths,
        cheapest,
        stats: enumerator.steal_stats(),
        duration: timer.elapsed(),
    })
}

/// Timer utility for benchmarking
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

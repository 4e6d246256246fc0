//! Two-sided weighted path enumeration
//!
//! # Overview
//!
//! [`WeightedTwoSidedEnumerator`] grows a forward ball from the source and a
//! backward ball from the target, always advancing the ball with the smaller
//! diameter. Meeting points become candidates; a candidate is only emitted
//! once its weight is at most both diameters, because every candidate found
//! later contains a half that is not popped yet and so weighs at least that
//! much. Paths therefore come out in non-decreasing weight.
//!
//! # Lazy resolution
//!
//! Steps may reference vertices whose documents have not been fetched. Before
//! a candidate is materialized, the unresolved steps of every emittable
//! candidate are fetched in one batch per side. Building a path that still
//! hits an unresolved step fetches that chain and retries.
//!
//! # Usage
//!
//! ```ignore
//! let mut enumerator = EnumeratorBuilder::new(EnumeratorConfig::new(PathType::KShortestPaths))
//!     .build(forward_provider, backward_provider)?;
//! enumerator.reset("v/A".into(), "v/D".into(), 0)?;
//! let mut paths = Vec::new();
//! while paths.len() < 3 && enumerator.get_next_path(&mut paths)? {}
//! ```

use crate::error::{TrailError, TrailResult};
use crate::graph::provider::Provider;
use crate::graph::traced::TracedProvider;
use crate::resource::ResourceMonitor;
use crate::search::ball::{Ball, BallLocation};
use crate::search::candidates::{CalculatedCandidate, CandidatesStore};
use crate::search::queue::{PriorityQueue, TracedQueue, WeightedQueue};
use crate::search::result_cache::ResultCache;
use crate::search::validator::{
    BasePathValidator, ForbiddenEdges, ForbiddenVertices, PathValidator, PathValidatorOptions,
    TabooValidator, TracedValidator,
};
use crate::trace::{SharedTraceRecorder, TraceEntry, TraceRecorder};
use crate::types::config::{EnumeratorConfig, PathType};
use crate::types::ids::VertexRef;
use crate::types::path::{PathResult, PathSink};
use crate::types::stats::EnumeratorStats;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Relative tolerance under which two path weights count as equal
const WEIGHT_EPSILON: f64 = 1e-9;

/// Equal up to floating point noise from summing edge weights
fn same_weight(a: f64, b: f64) -> bool {
    (a - b).abs() <= WEIGHT_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Composes the decorator stacks and balls of an enumerator
pub struct EnumeratorBuilder {
    config: EnumeratorConfig,
    forward_options: Option<PathValidatorOptions>,
    backward_options: Option<PathValidatorOptions>,
}

impl EnumeratorBuilder {
    pub fn new(config: EnumeratorConfig) -> Self {
        Self {
            config,
            forward_options: None,
            backward_options: None,
        }
    }

    /// Validator options for both balls
    ///
    /// Uniqueness and depth bounds always come from the config.
    pub fn with_options(mut self, options: PathValidatorOptions) -> Self {
        self.forward_options = Some(options);
        self
    }

    /// Validator options for the backward ball only
    ///
    /// Emitted paths are post-filtered by the forward options alone.
    pub fn with_backward_options(mut self, options: PathValidatorOptions) -> Self {
        self.backward_options = Some(options);
        self
    }

    pub fn build<F, B>(self, forward: F, backward: B) -> TrailResult<WeightedTwoSidedEnumerator>
    where
        F: Provider + 'static,
        B: Provider + 'static,
    {
        self.config.validate()?;

        let monitor = match self.config.memory_limit_bytes {
            Some(limit) => ResourceMonitor::with_limit(limit),
            None => ResourceMonitor::unlimited(),
        };
        let recorder = self.config.tracing.then(TraceRecorder::shared);

        let forward_options = self
            .forward_options
            .clone()
            .unwrap_or_else(|| PathValidatorOptions::new(self.config.effective_uniqueness()));
        let backward_options = self
            .backward_options
            .clone()
            .unwrap_or_else(|| forward_options.clone());

        let left = self.ball(
            BallLocation::Left,
            Box::new(forward),
            forward_options,
            &monitor,
            recorder.as_ref(),
        );
        let right = self.ball(
            BallLocation::Right,
            Box::new(backward),
            backward_options,
            &monitor,
            recorder.as_ref(),
        );

        debug!(
            path_type = ?self.config.path_type,
            uniqueness = ?self.config.effective_uniqueness(),
            min_depth = self.config.min_depth,
            max_depth = ?self.config.max_depth,
            direction = ?self.config.direction,
            tracing = self.config.tracing,
            "enumerator built"
        );

        Ok(WeightedTwoSidedEnumerator {
            candidates: CandidatesStore::new(monitor.clone()),
            config: self.config,
            left,
            right,
            result_cache: ResultCache::new(monitor.clone()),
            monitor,
            recorder,
            stats: EnumeratorStats::default(),
            finished: false,
            destroyed: false,
            failure: None,
            shortest_weight: None,
        })
    }

    fn ball(
        &self,
        location: BallLocation,
        provider: Box<dyn Provider>,
        mut options: PathValidatorOptions,
        monitor: &Arc<ResourceMonitor>,
        recorder: Option<&SharedTraceRecorder>,
    ) -> Ball {
        options.uniqueness = self.config.effective_uniqueness();
        options.min_depth = self.config.min_depth;
        options.max_depth = self.config.max_depth;

        let base = Box::new(BasePathValidator::new(options));
        let mut validator: Box<dyn PathValidator> = Box::new(TabooValidator::new(base));
        let mut queue: Box<dyn PriorityQueue> = Box::new(WeightedQueue::new());
        let mut provider = provider;
        if let Some(recorder) = recorder {
            validator = Box::new(TracedValidator::new(validator, recorder.clone()));
            queue = Box::new(TracedQueue::new(queue, recorder.clone()));
            provider = Box::new(TracedProvider::new(provider, recorder.clone()));
        }

        Ball::new(
            location,
            provider,
            validator,
            queue,
            monitor.clone(),
            self.config.max_depth,
        )
        .with_direction(self.config.direction)
    }
}

/// Pull-based enumerator of weighted paths between two vertices
pub struct WeightedTwoSidedEnumerator {
    config: EnumeratorConfig,
    left: Ball,
    right: Ball,
    candidates: CandidatesStore,
    result_cache: ResultCache,
    monitor: Arc<ResourceMonitor>,
    recorder: Option<SharedTraceRecorder>,
    stats: EnumeratorStats,
    finished: bool,
    destroyed: bool,
    /// First error of the session; replayed until the next reset
    failure: Option<TrailError>,
    /// Weight of the first emitted path, for `AllShortestPaths`
    shortest_weight: Option<f64>,
}

impl WeightedTwoSidedEnumerator {
    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    /// Start a new session between `source` and `target`
    ///
    /// `depth` is the number of edges already in front of `source`.
    pub fn reset(&mut self, source: VertexRef, target: VertexRef, depth: usize) -> TrailResult<()> {
        debug!(%source, %target, depth, "enumerator reset");
        self.candidates.clear();
        self.result_cache.clear();
        self.failure = None;
        self.left.reset(source, depth)?;
        self.right.reset(target, 0)?;
        self.finished = false;
        self.shortest_weight = None;
        Ok(())
    }

    /// True when no further path can be produced until the next reset
    pub fn is_done(&self) -> bool {
        self.finished
            || self.failure.is_some()
            || (self.left.no_path_left()
                && self.right.no_path_left()
                && self.candidates.is_empty())
    }

    /// Write the next path into `out`
    ///
    /// Returns `false`, leaving `out` untouched, once the search is done.
    /// After an error every call returns that error again until `reset`.
    pub fn get_next_path<S>(&mut self, out: &mut S) -> TrailResult<bool>
    where
        S: PathSink + ?Sized,
    {
        match self.checked_next_path()? {
            Some(path) => {
                out.write_path(path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advance past the next path without materializing it for the caller
    pub fn skip_path(&mut self) -> TrailResult<bool> {
        Ok(self.checked_next_path()?.is_some())
    }

    /// Mark the search as done; `is_done` stays true until the next reset
    pub fn set_algorithm_finished(&mut self) {
        if !self.finished {
            debug!("algorithm finished");
        }
        self.finished = true;
    }

    pub fn set_forbidden_vertices(&mut self, vertices: Option<ForbiddenVertices>) {
        self.left.set_forbidden_vertices(vertices.clone());
        self.right.set_forbidden_vertices(vertices);
    }

    pub fn set_forbidden_edges(&mut self, edges: Option<ForbiddenEdges>) {
        self.left.set_forbidden_edges(edges.clone());
        self.right.set_forbidden_edges(edges);
    }

    /// Release remote search resources and finish the search
    ///
    /// Safe to call repeatedly.
    pub fn destroy_engines(&mut self) {
        if !self.destroyed {
            debug!("destroying engines");
            self.left.destroy_engines();
            self.right.destroy_engines();
            self.destroyed = true;
        }
        self.finished = true;
    }

    /// Return and reset all counters accumulated since the last call
    pub fn steal_stats(&mut self) -> EnumeratorStats {
        let mut stats = std::mem::take(&mut self.stats);
        stats += self.left.steal_stats();
        stats += self.right.steal_stats();
        stats
    }

    /// Per-operation timings, when tracing is enabled
    pub fn trace_report(&self) -> Option<Vec<(&'static str, TraceEntry)>> {
        self.recorder.as_ref().map(|recorder| recorder.lock().report())
    }

    /// Bytes currently charged against the memory budget
    pub fn memory_used(&self) -> usize {
        self.monitor.used()
    }

    /// The search state is unusable after an error, so the error sticks
    fn checked_next_path(&mut self) -> TrailResult<Option<PathResult>> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.next_path().map_err(|e| {
            warn!(code = e.code(), error = %e, "enumeration aborted");
            self.failure = Some(e.clone());
            e
        })
    }

    fn next_path(&mut self) -> TrailResult<Option<PathResult>> {
        loop {
            if self.is_done() {
                return Ok(None);
            }

            self.search_more_results()?;
            let bound = self.emission_bound();
            let Some(candidate) = self.candidates.peek().copied() else {
                debug!("search exhausted");
                continue;
            };

            self.fetch_loose_ends(bound)?;
            let path = match self.build_candidate(&candidate) {
                Ok(path) => path,
                Err(TrailError::NotReady { vertex }) => {
                    trace!(%vertex, "candidate not ready, fetching its chain");
                    self.stats.not_ready_retries += 1;
                    self.fetch_candidate(&candidate)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.candidates.pop();

            if !self.result_cache.try_add_result(&path)? {
                self.stats.duplicates_discarded += 1;
                continue;
            }
            if !self.left.post_filter(&path)? {
                self.stats.paths_filtered += 1;
                continue;
            }

            match self.config.path_type {
                PathType::ShortestPath => self.set_algorithm_finished(),
                PathType::AllShortestPaths => match self.shortest_weight {
                    None => self.shortest_weight = Some(path.weight),
                    Some(shortest) if !same_weight(path.weight, shortest) => {
                        self.set_algorithm_finished();
                        return Ok(None);
                    }
                    Some(_) => {}
                },
                PathType::KShortestPaths | PathType::KPaths => {}
            }

            self.stats.paths_produced += 1;
            debug!(weight = path.weight, edges = path.len(), "path produced");
            return Ok(Some(path));
        }
    }

    /// Advance the balls until a candidate can be emitted or both are exhausted
    fn search_more_results(&mut self) -> TrailResult<()> {
        loop {
            let left_empty = self.left.no_path_left();
            let right_empty = self.right.no_path_left();
            if left_empty && right_empty {
                return Ok(());
            }
            if let Some(candidate) = self.candidates.peek() {
                if candidate.weight <= self.emission_bound() {
                    return Ok(());
                }
            }

            let advance_left = match (left_empty, right_empty) {
                (false, true) => true,
                (true, false) => false,
                _ => self.left.get_diameter() <= self.right.get_diameter(),
            };
            if advance_left {
                self.left
                    .compute_neighbourhood_of_next_vertex(&self.right, &mut self.candidates)?;
            } else {
                self.right
                    .compute_neighbourhood_of_next_vertex(&self.left, &mut self.candidates)?;
            }
        }
    }

    /// Weight up to which candidates are final
    fn emission_bound(&self) -> f64 {
        self.left.get_diameter().min(self.right.get_diameter())
    }

    fn fetch_loose_ends(&mut self, bound: f64) -> TrailResult<()> {
        let left = self.candidates.left_loose_ends(bound, self.left.store());
        self.left.fetch_loose_ends(&left)?;
        let right = self.candidates.right_loose_ends(bound, self.right.store());
        self.right.fetch_loose_ends(&right)
    }

    fn fetch_candidate(&mut self, candidate: &CalculatedCandidate) -> TrailResult<()> {
        let left = self.left.store().unresolved_in_chain(candidate.forward);
        self.left.fetch_loose_ends(&left)?;
        let right = self.right.store().unresolved_in_chain(candidate.backward);
        self.right.fetch_loose_ends(&right)
    }

    fn build_candidate(&self, candidate: &CalculatedCandidate) -> TrailResult<PathResult> {
        let mut path = PathResult::new();
        self.left.build_path(candidate.forward, &mut path)?;
        self.right.reverse_build_path(candidate.backward, &mut path)?;
        path.weight = candidate.weight;
        Ok(path)
    }
}

impl Drop for WeightedTwoSidedEnumerator {
    fn drop(&mut self) {
        self.destroy_engines();
    }
}

//! One directional frontier of the two-sided search
//!
//! A [`Ball`] grows Dijkstra-style from its center: steps are popped in
//! non-decreasing weight, validated, recorded as visited and expanded through
//! the ball's own provider. Every popped vertex is also matched against the
//! steps the opposite ball has already visited there, which is where
//! candidates come from.

use crate::error::{TrailError, TrailResult};
use crate::graph::provider::Provider;
use crate::resource::ResourceMonitor;
use crate::search::candidates::{CalculatedCandidate, CandidatesStore};
use crate::search::queue::{PriorityQueue, QueueEntry};
use crate::search::step::{PathStore, Step, StepIndex};
use crate::search::validator::{ForbiddenEdges, ForbiddenVertices, HalfPath, PathValidator};
use crate::types::ids::{Direction, VertexRef};
use crate::types::path::{Document, PathResult};
use crate::types::stats::EnumeratorStats;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{trace, warn};

/// Which end of the path a ball grows from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallLocation {
    /// Grows from the source along the configured direction
    Left,
    /// Grows from the target along the reverse direction
    Right,
}

impl BallLocation {
    /// Direction this ball follows when the search follows `configured`
    pub fn direction(self, configured: Direction) -> Direction {
        match self {
            BallLocation::Left => configured,
            BallLocation::Right => configured.reverse(),
        }
    }
}

pub struct Ball {
    location: BallLocation,
    direction: Direction,
    provider: Box<dyn Provider>,
    validator: Box<dyn PathValidator>,
    queue: Box<dyn PriorityQueue>,
    store: PathStore,
    /// Popped, admissible steps by vertex
    visited: FxHashMap<VertexRef, SmallVec<[StepIndex; 4]>>,
    max_depth: Option<usize>,
    stats: EnumeratorStats,
}

impl Ball {
    pub fn new(
        location: BallLocation,
        provider: Box<dyn Provider>,
        validator: Box<dyn PathValidator>,
        queue: Box<dyn PriorityQueue>,
        monitor: Arc<ResourceMonitor>,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            location,
            direction: location.direction(Direction::Outbound),
            provider,
            validator,
            queue,
            store: PathStore::new(monitor),
            visited: FxHashMap::default(),
            max_depth,
            stats: EnumeratorStats::default(),
        }
    }

    /// Follow `configured` edges from the source side
    pub fn with_direction(mut self, configured: Direction) -> Self {
        self.direction = self.location.direction(configured);
        self
    }

    pub fn location(&self) -> BallLocation {
        self.location
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    /// Re-center the ball on `center`, counted as `depth` edges deep
    ///
    /// Drops every step, queue entry and visited record.
    pub fn reset(&mut self, center: VertexRef, depth: usize) -> TrailResult<()> {
        self.queue.clear();
        self.store.clear();
        self.visited.clear();

        let resolution = self.provider.resolve_local(&center);
        let step = Step::center(center, resolution).at_depth(depth);
        let index = self.store.append(step)?;
        self.queue.push(QueueEntry {
            weight: 0.0,
            step: index,
        });
        Ok(())
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True once nothing is left to pop
    pub fn no_path_left(&self) -> bool {
        self.queue.is_empty()
    }

    /// Lower bound on the weight of any step not yet popped
    pub fn get_diameter(&self) -> f64 {
        self.queue
            .peek()
            .map(|entry| entry.weight)
            .unwrap_or(f64::INFINITY)
    }

    pub fn has_been_visited(&self, vertex: &VertexRef) -> bool {
        self.visited.contains_key(vertex)
    }

    /// Pop the cheapest step, expand it and match it against `other`
    ///
    /// Candidates are appended to `results` with the left ball's step as
    /// the forward half.
    pub fn compute_neighbourhood_of_next_vertex(
        &mut self,
        other: &Ball,
        results: &mut CandidatesStore,
    ) -> TrailResult<()> {
        let Some(next) = self.queue.peek() else {
            return Ok(());
        };
        if self.validator.needs_documents() && !self.store.get(next.step).is_resolved() {
            self.fetch_queue_loose_ends()?;
        }
        let Some(QueueEntry { step: index, .. }) = self.queue.pop() else {
            return Ok(());
        };

        let verdict = self.validator.validate_path(&self.store, index)?;
        let step = self.store.get(index);
        trace!(
            ball = ?self.location,
            vertex = %step.vertex(),
            weight = step.weight(),
            depth = step.depth(),
            ?verdict,
            "popped step"
        );

        if verdict.is_filtered() {
            self.stats.steps_filtered += 1;
            return Ok(());
        }

        let vertex = step.vertex().clone();
        let depth = step.depth();
        self.visited.entry(vertex.clone()).or_default().push(index);

        if verdict.is_pruned() {
            self.stats.steps_pruned += 1;
        } else if self.max_depth.map_or(true, |max| depth < max) {
            self.expand(index, &vertex)?;
        }

        self.match_results_in_shell(index, other, results)
    }

    fn expand(&mut self, index: StepIndex, vertex: &VertexRef) -> TrailResult<()> {
        let neighbours = self.provider.expand(vertex, self.direction)?;
        for neighbour in neighbours {
            if !neighbour.weight.is_finite() || neighbour.weight < 0.0 {
                return Err(TrailError::InvalidWeight {
                    edge: neighbour.edge.to_string(),
                    weight: neighbour.weight,
                });
            }
            let resolution = self.provider.resolve_local(&neighbour.vertex);
            let step = Step::extend(
                (index, self.store.get(index)),
                neighbour.vertex,
                neighbour.edge,
                neighbour.weight,
                resolution,
            );
            let weight = step.weight();
            let step = self.store.append(step)?;
            self.queue.push(QueueEntry { weight, step });
            self.stats.steps_created += 1;
        }
        Ok(())
    }

    /// Join the step at `index` with every step `other` has visited at the same vertex
    pub fn match_results_in_shell(
        &mut self,
        index: StepIndex,
        other: &Ball,
        results: &mut CandidatesStore,
    ) -> TrailResult<()> {
        let own = HalfPath::new(&self.store, index);
        let Some(matches) = other.visited.get(own.tip().vertex()) else {
            return Ok(());
        };

        for &other_index in matches {
            let theirs = HalfPath::new(&other.store, other_index);
            let verdict =
                self.validator
                    .validate_joined(own, other.validator.as_ref(), theirs)?;
            if verdict.is_filtered() {
                self.stats.candidates_rejected += 1;
                continue;
            }

            let weight = own.tip().weight() + theirs.tip().weight();
            let candidate = match self.location {
                BallLocation::Left => CalculatedCandidate::new(weight, index, other_index),
                BallLocation::Right => CalculatedCandidate::new(weight, other_index, index),
            };
            trace!(vertex = %own.tip().vertex(), weight, "candidate");
            results.append(candidate)?;
            self.stats.candidates_produced += 1;
        }
        Ok(())
    }

    /// Append the chain center → `index` to `out`
    pub fn build_path(&self, index: StepIndex, out: &mut PathResult) -> TrailResult<()> {
        self.store.build_path(index, out)
    }

    /// Append the chain `index` → center to `out`, skipping `index`'s vertex
    pub fn reverse_build_path(&self, index: StepIndex, out: &mut PathResult) -> TrailResult<()> {
        self.store.reverse_build_path(index, out)
    }

    pub fn post_filter(&mut self, path: &PathResult) -> TrailResult<bool> {
        self.validator.post_filter(path)
    }

    fn fetch_queue_loose_ends(&mut self) -> TrailResult<()> {
        let mut pending: Vec<StepIndex> = self
            .queue
            .entries()
            .into_iter()
            .map(|entry| entry.step)
            .filter(|&index| !self.store.get(index).is_resolved())
            .collect();
        pending.sort_unstable();
        self.fetch_loose_ends(&pending)
    }

    /// Resolve `steps` with a single provider round trip
    pub fn fetch_loose_ends(&mut self, steps: &[StepIndex]) -> TrailResult<()> {
        if steps.is_empty() {
            return Ok(());
        }

        let mut vertices: Vec<VertexRef> = Vec::with_capacity(steps.len());
        let mut slot: FxHashMap<VertexRef, usize> = FxHashMap::default();
        for &index in steps {
            let vertex = self.store.get(index).vertex();
            if !slot.contains_key(vertex) {
                slot.insert(vertex.clone(), vertices.len());
                vertices.push(vertex.clone());
            }
        }

        let documents = self.provider.fetch(&vertices)?;
        if documents.len() < vertices.len() {
            warn!(
                ball = ?self.location,
                requested = vertices.len(),
                received = documents.len(),
                "provider returned fewer documents than requested"
            );
        }

        for &index in steps {
            let document: Option<Document> = slot
                .get(self.store.get(index).vertex())
                .and_then(|&i| documents.get(i).cloned())
                .flatten();
            self.store.resolve(index, document);
        }
        Ok(())
    }

    pub fn set_forbidden_vertices(&mut self, vertices: Option<ForbiddenVertices>) {
        self.validator.set_forbidden_vertices(vertices);
    }

    pub fn set_forbidden_edges(&mut self, edges: Option<ForbiddenEdges>) {
        self.validator.set_forbidden_edges(edges);
    }

    pub fn destroy_engines(&mut self) {
        self.provider.destroy_engines();
    }

    /// Return and reset this ball's counters, including its provider's
    pub fn steal_stats(&mut self) -> EnumeratorStats {
        let mut stats = std::mem::take(&mut self.stats);
        stats.provider = self.provider.steal_stats();
        stats
    }
}

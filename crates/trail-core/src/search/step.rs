//! Steps and the append-only arena that owns them
//!
//! A [`Step`] is one frontier node: a vertex reached along a specific chain of
//! edges from a ball's center. Steps only ever refer to each other by
//! [`StepIndex`] into the [`PathStore`] of the ball that created them, so the
//! store can grow without invalidating anything that points into it.

use crate::error::{TrailError, TrailResult};
use crate::graph::provider::Resolution;
use crate::resource::{ResourceCharge, ResourceMonitor};
use crate::types::ids::{EdgeRef, VertexRef};
use crate::types::path::{Document, PathResult};
use smallvec::SmallVec;
use std::sync::Arc;

/// Stable position of a step inside its ball's store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepIndex(usize);

impl StepIndex {
    pub fn get(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn for_test(index: usize) -> Self {
        Self(index)
    }
}

/// One frontier node
#[derive(Debug, Clone)]
pub struct Step {
    vertex: VertexRef,
    /// Edge used to reach `vertex`; `None` for the ball's center
    edge: Option<EdgeRef>,
    /// Sum of edge weights from the center
    weight: f64,
    /// Number of edges from the center
    depth: usize,
    previous: Option<StepIndex>,
    resolution: Resolution,
}

impl Step {
    /// The zero-weight step a ball is seeded with
    pub fn center(vertex: VertexRef, resolution: Resolution) -> Self {
        Self {
            vertex,
            edge: None,
            weight: 0.0,
            depth: 0,
            previous: None,
            resolution,
        }
    }

    /// The same center step, counted as already `depth` edges deep
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// A step reached from `previous` over `edge`
    pub fn extend(
        previous: (StepIndex, &Step),
        vertex: VertexRef,
        edge: EdgeRef,
        edge_weight: f64,
        resolution: Resolution,
    ) -> Self {
        let (index, prev) = previous;
        Self {
            vertex,
            edge: Some(edge),
            weight: prev.weight + edge_weight,
            depth: prev.depth + 1,
            previous: Some(index),
            resolution,
        }
    }

    pub fn vertex(&self) -> &VertexRef {
        &self.vertex
    }

    pub fn edge(&self) -> Option<&EdgeRef> {
        self.edge.as_ref()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn previous(&self) -> Option<StepIndex> {
        self.previous
    }

    pub fn is_center(&self) -> bool {
        self.previous.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_resolved()
    }

    pub fn document(&self) -> Option<&Document> {
        self.resolution.document()
    }
}

/// Approximate heap footprint charged per step
const STEP_BYTES: usize = std::mem::size_of::<Step>();

/// Append-only arena of steps, one per ball
///
/// Entries never move or disappear until [`PathStore::clear`]. The only
/// in-place change is resolving a pending step's document.
#[derive(Debug)]
pub struct PathStore {
    steps: Vec<Step>,
    charge: ResourceCharge,
}

impl PathStore {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            steps: Vec::new(),
            charge: ResourceCharge::new(monitor),
        }
    }

    /// Store a step and return its index
    pub fn append(&mut self, step: Step) -> TrailResult<StepIndex> {
        self.charge.charge(STEP_BYTES)?;
        let index = StepIndex(self.steps.len());
        self.steps.push(step);
        Ok(index)
    }

    pub fn get(&self, index: StepIndex) -> &Step {
        &self.steps[index.0]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drop every step and release the memory charge
    pub fn clear(&mut self) {
        self.steps.clear();
        self.charge.release_all();
    }

    pub fn resolve(&mut self, index: StepIndex, document: Option<Document>) {
        self.steps[index.0].resolution = Resolution::Resolved(document);
    }

    /// Walk from `index` back to the center (inclusive)
    pub fn chain(&self, index: StepIndex) -> ChainIter<'_> {
        ChainIter {
            store: self,
            next: Some(index),
        }
    }

    /// Unresolved steps on the chain ending at `index`
    pub fn unresolved_in_chain(&self, index: StepIndex) -> SmallVec<[StepIndex; 8]> {
        self.chain(index)
            .filter(|(_, step)| !step.is_resolved())
            .map(|(idx, _)| idx)
            .collect()
    }

    fn ensure_resolved(&self, index: StepIndex) -> TrailResult<()> {
        match self.chain(index).find(|(_, step)| !step.is_resolved()) {
            Some((_, step)) => Err(TrailError::NotReady {
                vertex: step.vertex.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Append the chain center → `index` to `out` in traversal order
    ///
    /// Fails with `NotReady` (leaving `out` untouched) if any step on the
    /// chain is unresolved.
    pub fn build_path(&self, index: StepIndex, out: &mut PathResult) -> TrailResult<()> {
        self.ensure_resolved(index)?;
        let mut chain: SmallVec<[&Step; 16]> = self.chain(index).map(|(_, s)| s).collect();
        chain.reverse();
        for step in chain {
            if let Some(edge) = &step.edge {
                out.push_edge(edge.clone());
            }
            out.push_vertex(step.vertex.clone(), step.document().cloned());
        }
        Ok(())
    }

    /// Append the chain `index` → center to `out`, skipping `index`'s own vertex
    ///
    /// Used for the backward half of a path, whose first vertex is the meeting
    /// vertex already written by the forward half.
    pub fn reverse_build_path(&self, index: StepIndex, out: &mut PathResult) -> TrailResult<()> {
        self.ensure_resolved(index)?;
        let mut current = self.get(index);
        while let Some(prev_index) = current.previous {
            let prev = self.get(prev_index);
            if let Some(edge) = &current.edge {
                out.push_edge(edge.clone());
            }
            out.push_vertex(prev.vertex.clone(), prev.document().cloned());
            current = prev;
        }
        Ok(())
    }
}

/// Iterator over a step chain, newest first
pub struct ChainIter<'a> {
    store: &'a PathStore,
    next: Option<StepIndex>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (StepIndex, &'a Step);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let step = self.store.get(index);
        self.next = step.previous;
        Some((index, step))
    }
}

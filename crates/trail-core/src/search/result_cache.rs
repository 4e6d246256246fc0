//! Per-session deduplication of emitted paths

use crate::error::TrailResult;
use crate::resource::{ResourceCharge, ResourceMonitor};
use crate::types::ids::{EdgeRef, VertexRef};
use crate::types::path::PathResult;
use rustc_hash::FxHashSet;
use std::mem::size_of;
use std::sync::Arc;

type RouteKey = (Vec<VertexRef>, Vec<EdgeRef>);

/// Remembers the vertex and edge sequence of every accepted path
///
/// Each remembered route is charged against the resource monitor.
#[derive(Debug)]
pub struct ResultCache {
    seen: FxHashSet<RouteKey>,
    charge: ResourceCharge,
}

impl ResultCache {
    pub fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            seen: FxHashSet::default(),
            charge: ResourceCharge::new(monitor),
        }
    }

    /// Record `path` and return true, or return false if an equal route was
    /// already accepted
    pub fn try_add_result(&mut self, path: &PathResult) -> TrailResult<bool> {
        let key = (path.vertices.clone(), path.edges.clone());
        if self.seen.contains(&key) {
            return Ok(false);
        }
        self.charge.charge(route_bytes(&key))?;
        Ok(self.seen.insert(key))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.charge.release_all();
    }
}

fn route_bytes((vertices, edges): &RouteKey) -> usize {
    size_of::<RouteKey>()
        + vertices.len() * size_of::<VertexRef>()
        + edges.len() * size_of::<EdgeRef>()
}

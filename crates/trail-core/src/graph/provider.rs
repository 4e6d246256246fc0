//! Provider abstraction layer (SBIO)
//!
//! This module defines the `Provider` trait that abstracts edge enumeration and
//! document resolution. The search never touches storage directly; every
//! neighbour and every vertex document comes through this boundary.
//!
//! # Resolution Model
//!
//! A provider may hold some vertex documents locally (single server, warm
//! cache) and need a round trip for others (cluster). `resolve_local` answers
//! without I/O; anything it reports as [`Resolution::Pending`] becomes a loose
//! end that is later resolved in a batch through `fetch`.

use crate::error::ProviderError;
use crate::types::ids::{Direction, EdgeRef, VertexRef};
use crate::types::path::Document;
use crate::types::stats::ProviderStats;

/// One edge produced by expanding a vertex
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub edge: EdgeRef,
    /// Vertex at the far end of `edge`, seen from the expanded vertex
    pub vertex: VertexRef,
    pub weight: f64,
}

impl Neighbour {
    pub fn new(edge: impl Into<EdgeRef>, vertex: impl Into<VertexRef>, weight: f64) -> Self {
        Self {
            edge: edge.into(),
            vertex: vertex.into(),
            weight,
        }
    }
}

/// Document state of a vertex from the search's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Content not fetched yet
    Pending,
    /// Content fetched; `None` when the vertex has no document
    Resolved(Option<Document>),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            Resolution::Resolved(Some(doc)) => Some(doc),
            _ => None,
        }
    }
}

/// Abstract graph access (SBIO boundary)
///
/// Each ball owns its own provider instance. Implementations are expected to
/// be cheap to clone over shared graph state.
pub trait Provider: Send {
    /// Enumerate the edges of `vertex` in `direction`
    ///
    /// Finite per call; calling again for the same vertex restarts the
    /// enumeration.
    fn expand(
        &mut self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> Result<Vec<Neighbour>, ProviderError>;

    /// Document state available without a round trip
    fn resolve_local(&self, vertex: &VertexRef) -> Resolution;

    /// Resolve a batch of vertices in one round trip
    ///
    /// The result is parallel to `vertices`.
    fn fetch(&mut self, vertices: &[VertexRef]) -> Result<Vec<Option<Document>>, ProviderError>;

    fn stats(&self) -> ProviderStats;

    /// Return and reset the counters
    fn steal_stats(&mut self) -> ProviderStats;

    /// Release remote search resources; must be idempotent
    fn destroy_engines(&mut self) {}
}

impl Provider for Box<dyn Provider> {
    fn expand(
        &mut self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> Result<Vec<Neighbour>, ProviderError> {
        (**self).expand(vertex, direction)
    }

    fn resolve_local(&self, vertex: &VertexRef) -> Resolution {
        (**self).resolve_local(vertex)
    }

    fn fetch(&mut self, vertices: &[VertexRef]) -> Result<Vec<Option<Document>>, ProviderError> {
        (**self).fetch(vertices)
    }

    fn stats(&self) -> ProviderStats {
        (**self).stats()
    }

    fn steal_stats(&mut self) -> ProviderStats {
        (**self).steal_stats()
    }

    fn destroy_engines(&mut self) {
        (**self).destroy_engines()
    }
}

//! Materialized paths and the sinks they are written into

use crate::types::ids::{EdgeRef, VertexRef};
use serde::Serialize;
use std::sync::Arc;

/// Resolved content of a vertex, as handed out by the provider
pub type Document = Arc<serde_json::Value>;

/// A complete path from source to target
///
/// `vertices` has exactly one more entry than `edges`; `documents` is
/// parallel to `vertices` (`None` when the provider had no content for the
/// vertex).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub vertices: Vec<VertexRef>,
    pub edges: Vec<EdgeRef>,
    pub documents: Vec<Option<Document>>,
    /// Sum of all edge weights
    pub weight: f64,
}

impl PathResult {
    /// Create an empty path (no vertices)
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            documents: Vec::new(),
            weight: 0.0,
        }
    }

    /// Number of edges in the path
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True for a zero-edge path (source == target) or an empty builder
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn start(&self) -> Option<&VertexRef> {
        self.vertices.first()
    }

    pub fn end(&self) -> Option<&VertexRef> {
        self.vertices.last()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.documents.clear();
        self.weight = 0.0;
    }

    pub(crate) fn push_vertex(&mut self, vertex: VertexRef, document: Option<Document>) {
        self.vertices.push(vertex);
        self.documents.push(document);
    }

    pub(crate) fn push_edge(&mut self, edge: EdgeRef) {
        self.edges.push(edge);
    }
}

impl Default for PathResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for paths produced by the enumerator
///
/// The enumerator only calls `write_path` after a path is fully built, so a
/// sink is never left half-written.
pub trait PathSink {
    fn write_path(&mut self, path: PathResult);
}

/// Collects every path in order
impl PathSink for Vec<PathResult> {
    fn write_path(&mut self, path: PathResult) {
        self.push(path);
    }
}

/// Holds the most recent path only
impl PathSink for PathResult {
    fn write_path(&mut self, path: PathResult) {
        *self = path;
    }
}

/// Keeps the path if it is the first one written
impl PathSink for Option<PathResult> {
    fn write_path(&mut self, path: PathResult) {
        if self.is_none() {
            *self = Some(path);
        }
    }
}

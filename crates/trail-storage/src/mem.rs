//! In-memory graph provider
//!
//! `MemGraph` holds vertices, documents and adjacency lists behind a shared
//! lock. Every `MemGraphProvider` handed out by it reads the same state, so
//! the forward and backward balls of an enumerator can each own a provider
//! over one graph.

use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};
use trail_core::{
    Direction, Document, EdgeRef, Neighbour, Provider, ProviderError, ProviderStats, Resolution,
    VertexRef,
};

/// When vertex documents become visible to the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentMode {
    /// Documents are resolved as soon as a step is created
    #[default]
    Eager,
    /// Every document needs a `fetch` round trip
    Lazy,
}

/// How a provider weighs the edges it expands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EdgeWeight {
    /// The weight passed to [`MemGraph::add_edge`]
    #[default]
    Stored,
    /// A numeric attribute of the edge document
    ///
    /// Edges lacking a numeric `name` weigh `default`; with no default they
    /// are not traversed at all.
    Attribute { name: String, default: Option<f64> },
}

impl EdgeWeight {
    pub fn attribute(name: impl Into<String>, default: Option<f64>) -> Self {
        EdgeWeight::Attribute {
            name: name.into(),
            default,
        }
    }
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    id: EdgeRef,
    /// Far end, seen from the vertex the record is listed under
    vertex: VertexRef,
    weight: f64,
    document: Option<Document>,
}

#[derive(Debug, Default)]
struct GraphState {
    documents: FxHashMap<VertexRef, Option<Document>>,
    outbound: FxHashMap<VertexRef, Vec<EdgeRecord>>,
    inbound: FxHashMap<VertexRef, Vec<EdgeRecord>>,
    edge_count: usize,
}

/// Shared in-memory graph
///
/// Uses `RwLock` for thread-safe access. Edges are returned in insertion
/// order, which keeps enumeration deterministic.
///
/// # Usage
///
/// ```ignore
/// use trail_storage::{DocumentMode, MemGraph};
///
/// let graph = MemGraph::new();
/// graph.add_edge("e/AB", "v/A", "v/B", 1.0);
/// let forward = graph.provider(DocumentMode::Eager);
/// let backward = graph.provider(DocumentMode::Eager);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemGraph {
    state: Arc<RwLock<GraphState>>,
}

impl MemGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vertex and its document
    pub fn add_vertex(&self, vertex: impl Into<VertexRef>, document: Option<serde_json::Value>) {
        let mut state = self.write();
        state
            .documents
            .insert(vertex.into(), document.map(Arc::new));
    }

    /// Insert a directed edge; unknown endpoints are added without a document
    pub fn add_edge(
        &self,
        edge: impl Into<EdgeRef>,
        from: impl Into<VertexRef>,
        to: impl Into<VertexRef>,
        weight: f64,
    ) {
        self.insert_edge(edge.into(), from.into(), to.into(), weight, None);
    }

    /// Insert a directed edge carrying a document
    ///
    /// Its stored weight is 1, so without an [`EdgeWeight::Attribute`] every
    /// such edge counts as one hop.
    pub fn add_edge_document(
        &self,
        edge: impl Into<EdgeRef>,
        from: impl Into<VertexRef>,
        to: impl Into<VertexRef>,
        document: serde_json::Value,
    ) {
        self.insert_edge(
            edge.into(),
            from.into(),
            to.into(),
            1.0,
            Some(Arc::new(document)),
        );
    }

    fn insert_edge(
        &self,
        edge: EdgeRef,
        from: VertexRef,
        to: VertexRef,
        weight: f64,
        document: Option<Document>,
    ) {
        let mut state = self.write();
        state.documents.entry(from.clone()).or_insert(None);
        state.documents.entry(to.clone()).or_insert(None);
        state
            .outbound
            .entry(from.clone())
            .or_default()
            .push(EdgeRecord {
                id: edge.clone(),
                vertex: to.clone(),
                weight,
                document: document.clone(),
            });
        state.inbound.entry(to).or_default().push(EdgeRecord {
            id: edge,
            vertex: from,
            weight,
            document,
        });
        state.edge_count += 1;
    }

    /// Replace the document of an existing vertex
    pub fn set_document(
        &self,
        vertex: &VertexRef,
        document: serde_json::Value,
    ) -> Result<(), ProviderError> {
        let mut state = self.write();
        match state.documents.get_mut(vertex) {
            Some(slot) => {
                *slot = Some(Arc::new(document));
                Ok(())
            }
            None => Err(ProviderError::VertexNotFound {
                vertex: vertex.clone(),
            }),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.read().documents.len()
    }

    pub fn edge_count(&self) -> usize {
        self.read().edge_count
    }

    /// A provider over this graph with its own counters
    pub fn provider(&self, mode: DocumentMode) -> MemGraphProvider {
        MemGraphProvider {
            graph: self.clone(),
            mode,
            weight: EdgeWeight::Stored,
            stats: ProviderStats::default(),
            destroyed: false,
        }
    }

    // Lock poisoning is ignored.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, GraphState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, GraphState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Provider over a [`MemGraph`]
#[derive(Debug)]
pub struct MemGraphProvider {
    graph: MemGraph,
    mode: DocumentMode,
    weight: EdgeWeight,
    stats: ProviderStats,
    destroyed: bool,
}

impl MemGraphProvider {
    /// Weigh expanded edges by `weight` instead of their stored weight
    pub fn with_edge_weight(mut self, weight: EdgeWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    /// `None` when the edge cannot be traversed under the weight setting
    fn weight_of(&self, record: &EdgeRecord) -> Option<f64> {
        match &self.weight {
            EdgeWeight::Stored => Some(record.weight),
            EdgeWeight::Attribute { name, default } => record
                .document
                .as_ref()
                .and_then(|document| document.get(name.as_str()))
                .and_then(|value| value.as_f64())
                .or(*default),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> Result<(), ProviderError> {
        if self.destroyed {
            Err(ProviderError::Destroyed)
        } else {
            Ok(())
        }
    }
}

impl Provider for MemGraphProvider {
    fn expand(
        &mut self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> Result<Vec<Neighbour>, ProviderError> {
        self.ensure_alive()?;
        let state = self.graph.read();
        let (first, second) = match direction {
            Direction::Outbound => (state.outbound.get(vertex), None),
            Direction::Inbound => (state.inbound.get(vertex), None),
            Direction::Any => (state.outbound.get(vertex), state.inbound.get(vertex)),
        };

        let mut scanned = 0u64;
        let mut neighbours = Vec::new();
        for record in first.into_iter().chain(second).flatten() {
            scanned += 1;
            if let Some(weight) = self.weight_of(record) {
                neighbours.push(Neighbour {
                    edge: record.id.clone(),
                    vertex: record.vertex.clone(),
                    weight,
                });
            }
        }

        self.stats.expansions += 1;
        self.stats.scanned_index += scanned;
        Ok(neighbours)
    }

    fn resolve_local(&self, vertex: &VertexRef) -> Resolution {
        match self.mode {
            DocumentMode::Lazy => Resolution::Pending,
            DocumentMode::Eager => {
                Resolution::Resolved(self.graph.read().documents.get(vertex).cloned().flatten())
            }
        }
    }

    fn fetch(&mut self, vertices: &[VertexRef]) -> Result<Vec<Option<Document>>, ProviderError> {
        self.ensure_alive()?;
        let state = self.graph.read();
        let documents: Vec<Option<Document>> = vertices
            .iter()
            .map(|v| state.documents.get(v).cloned().flatten())
            .collect();

        self.stats.round_trips += 1;
        self.stats.documents_fetched += documents.iter().filter(|d| d.is_some()).count() as u64;
        tracing::trace!(
            requested = vertices.len(),
            round_trips = self.stats.round_trips,
            "mem graph fetch"
        );
        Ok(documents)
    }

    fn stats(&self) -> ProviderStats {
        self.stats
    }

    fn steal_stats(&mut self) -> ProviderStats {
        std::mem::take(&mut self.stats)
    }

    fn destroy_engines(&mut self) {
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn sample() -> MemGraph {
        let graph = MemGraph::new();
        graph.add_vertex("persons/alice", Some(json!({"name": "Alice"})));
        graph.add_edge("knows/1", "persons/alice", "persons/bob", 1.5);
        graph.add_edge("knows/2", "persons/alice", "persons/carol", 2.0);
        graph
    }

    #[test]
    fn test_new_graph_is_empty() {
        let graph = MemGraph::new();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_registers_endpoints() {
        let graph = sample();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_expand_both_directions() {
        let graph = sample();
        let mut provider = graph.provider(DocumentMode::Eager);

        let out = provider
            .expand(&"persons/alice".into(), Direction::Outbound)
            .unwrap();
        let targets: Vec<_> = out.iter().map(|n| n.vertex.as_str()).collect();
        assert_eq!(targets, vec!["persons/bob", "persons/carol"]);
        assert_eq!(out[0].weight, 1.5);

        let inbound = provider
            .expand(&"persons/bob".into(), Direction::Inbound)
            .unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].vertex.as_str(), "persons/alice");
        assert_eq!(inbound[0].edge.as_str(), "knows/1");

        let stats = provider.stats();
        assert_eq!(stats.expansions, 2);
        assert_eq!(stats.scanned_index, 3);
    }

    #[test]
    fn test_expand_any_direction() {
        let graph = sample();
        graph.add_edge("knows/3", "persons/dave", "persons/alice", 1.0);
        let mut provider = graph.provider(DocumentMode::Eager);

        let any = provider
            .expand(&"persons/alice".into(), Direction::Any)
            .unwrap();
        let edges: Vec<_> = any.iter().map(|n| n.edge.as_str()).collect();
        assert_eq!(edges, vec!["knows/1", "knows/2", "knows/3"]);
        assert_eq!(any[2].vertex.as_str(), "persons/dave");
    }

    #[test]
    fn test_weight_attribute() {
        let graph = MemGraph::new();
        graph.add_edge_document("road/1", "city/a", "city/b", json!({"km": 12.5}));
        graph.add_edge_document("road/2", "city/a", "city/c", json!({"km": "far"}));
        graph.add_edge_document("road/3", "city/a", "city/d", json!({}));

        let mut hops = graph.provider(DocumentMode::Eager);
        let out = hops.expand(&"city/a".into(), Direction::Outbound).unwrap();
        assert!(out.iter().all(|n| n.weight == 1.0));

        let mut with_default = graph
            .provider(DocumentMode::Eager)
            .with_edge_weight(EdgeWeight::attribute("km", Some(3.0)));
        let out = with_default
            .expand(&"city/a".into(), Direction::Outbound)
            .unwrap();
        let weights: Vec<_> = out.iter().map(|n| n.weight).collect();
        assert_eq!(weights, vec![12.5, 3.0, 3.0]);

        let mut strict = graph
            .provider(DocumentMode::Eager)
            .with_edge_weight(EdgeWeight::attribute("km", None));
        let out = strict.expand(&"city/a".into(), Direction::Outbound).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].edge.as_str(), "road/1");
        assert_eq!(strict.stats().scanned_index, 3);
    }

    #[test]
    fn test_expand_unknown_vertex_is_empty() {
        let mut provider = sample().provider(DocumentMode::Eager);
        let out = provider
            .expand(&"persons/nobody".into(), Direction::Outbound)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_eager_resolves_locally() {
        let provider = sample().provider(DocumentMode::Eager);
        let resolution = provider.resolve_local(&"persons/alice".into());
        assert_eq!(
            resolution.document().map(|d| d["name"].clone()),
            Some(json!("Alice"))
        );
        assert_eq!(
            provider.resolve_local(&"persons/bob".into()),
            Resolution::Resolved(None)
        );
    }

    #[test]
    fn test_lazy_needs_fetch() {
        let mut provider = sample().provider(DocumentMode::Lazy);
        assert_eq!(
            provider.resolve_local(&"persons/alice".into()),
            Resolution::Pending
        );

        let docs = provider
            .fetch(&["persons/alice".into(), "persons/bob".into()])
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].is_some());
        assert!(docs[1].is_none());

        let stats = provider.steal_stats();
        assert_eq!(stats.round_trips, 1);
        assert_eq!(stats.documents_fetched, 1);
        assert_eq!(provider.stats(), ProviderStats::default());
    }

    #[test]
    fn test_set_document() {
        let graph = sample();
        graph
            .set_document(&"persons/bob".into(), json!({"name": "Bob"}))
            .unwrap();
        let provider = graph.provider(DocumentMode::Eager);
        assert!(provider
            .resolve_local(&"persons/bob".into())
            .document()
            .is_some());

        match graph.set_document(&"persons/nobody".into(), json!({})) {
            Err(ProviderError::VertexNotFound { vertex }) => {
                assert_eq!(vertex.as_str(), "persons/nobody");
            }
            other => panic!("Expected VertexNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_providers_share_graph() {
        let graph = MemGraph::new();
        let mut provider = graph.provider(DocumentMode::Eager);
        graph.add_edge("e/1", "v/A", "v/B", 1.0);
        let out = provider.expand(&"v/A".into(), Direction::Outbound).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_destroyed_provider_fails() {
        let mut provider = sample().provider(DocumentMode::Eager);
        provider.destroy_engines();
        provider.destroy_engines();
        assert!(provider.is_destroyed());

        let err = provider
            .expand(&"persons/alice".into(), Direction::Outbound)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Destroyed));
        assert!(provider.fetch(&[]).is_err());
    }
}

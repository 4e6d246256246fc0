//! Trail Core - Bidirectional weighted path enumeration
//!
//! This crate implements the search core of Trail:
//! - Steps and the per-ball arena they live in
//! - Path validation (uniqueness, filters, prune, forbidden sets)
//! - Two Dijkstra-style balls meeting in the middle
//! - A pull-based enumerator producing paths in non-decreasing weight
//!
//! # SBIO Architecture
//!
//! This crate follows strict Separation of Business Logic and I/O (SBIO).
//! Graph access goes through the [`Provider`] trait and is never performed
//! directly. Concrete providers live in `trail-storage`.

// Configure WASM tests to run in browser (Node.js has issues with wasm-bindgen-test)
#[cfg(all(target_arch = "wasm32", test))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

pub mod error;
pub mod graph;
pub mod resource;
pub mod search;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ProviderError, TrailError, TrailResult};
pub use graph::{Neighbour, Provider, Resolution, TracedProvider};
pub use resource::ResourceMonitor;
pub use search::{
    EnumeratorBuilder, Expression, ForbiddenEdges, ForbiddenVertices, PathExpression,
    PathValidatorOptions, StepContext, WeightedTwoSidedEnumerator,
};
pub use trace::{SharedTraceRecorder, TraceEntry, TraceRecorder};
pub use types::{
    Direction, Document, EdgeRef, EnumeratorConfig, EnumeratorStats, PathResult, PathSink,
    PathType, ProviderStats, SharedStr, UniquenessLevel, VertexRef,
};

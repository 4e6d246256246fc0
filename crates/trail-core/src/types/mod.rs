//! Core data types for Trail

pub mod config;
pub mod ids;
pub mod path;
pub mod stats;

pub use config::{EnumeratorConfig, PathType, UniquenessLevel};
pub use ids::{Direction, EdgeRef, SharedStr, VertexRef};
pub use path::{Document, PathResult, PathSink};
pub use stats::{EnumeratorStats, ProviderStats};

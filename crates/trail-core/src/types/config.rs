//! Enumerator configuration types
//!
//! # Explicit Parameters
//!
//! Depth bounds and memory limits have no hidden fallbacks: an unbounded
//! search is only accepted when the uniqueness level guarantees termination.
//! Everything else is checked by [`EnumeratorConfig::validate`].

use crate::error::ConfigError;
use crate::types::ids::Direction;
use serde::{Deserialize, Serialize};

/// Which family of path query the enumerator answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    /// Stop after the first (cheapest) path
    ShortestPath,

    /// Every path sharing the cheapest weight, then stop
    AllShortestPaths,

    /// All admissible paths in non-decreasing weight; the caller stops after k
    KShortestPaths,

    /// All paths whose edge count lies in `[min_depth, max_depth]`, cheapest first
    ///
    /// Requires `max_depth`.
    KPaths,
}

/// Granularity at which repetition inside a single path is forbidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessLevel {
    /// Vertices and edges may repeat (requires a depth bound)
    None,
    /// No vertex appears twice on a path
    PathVertex,
    /// No edge appears twice on a path
    PathEdge,
}

impl UniquenessLevel {
    /// The stricter of two levels; PathVertex implies PathEdge
    pub fn strictest(self, other: UniquenessLevel) -> UniquenessLevel {
        use UniquenessLevel::*;
        match (self, other) {
            (PathVertex, _) | (_, PathVertex) => PathVertex,
            (PathEdge, _) | (_, PathEdge) => PathEdge,
            (None, None) => None,
        }
    }
}

/// Enumerator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    pub path_type: PathType,

    /// Uniqueness to enforce; `None` selects the path type's default
    #[serde(default)]
    pub uniqueness: Option<UniquenessLevel>,

    /// Minimum number of edges in an emitted path
    #[serde(default)]
    pub min_depth: usize,

    /// Maximum number of edges in an emitted path
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Edge direction followed from the source; the target side walks the reverse
    #[serde(default)]
    pub direction: Direction,

    /// Budget for steps and candidates held in memory
    #[serde(default)]
    pub memory_limit_bytes: Option<usize>,

    /// Wrap providers, queues and validators in tracing decorators
    #[serde(default)]
    pub tracing: bool,
}

impl EnumeratorConfig {
    pub fn new(path_type: PathType) -> Self {
        Self {
            path_type,
            uniqueness: None,
            min_depth: 0,
            max_depth: None,
            direction: Direction::Outbound,
            memory_limit_bytes: None,
            tracing: false,
        }
    }

    pub fn with_uniqueness(mut self, uniqueness: UniquenessLevel) -> Self {
        self.uniqueness = Some(uniqueness);
        self
    }

    pub fn with_depth(mut self, min_depth: usize, max_depth: Option<usize>) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = Some(bytes);
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Uniqueness level actually enforced
    ///
    /// Every path type defaults to simple paths (`PathVertex`).
    pub fn effective_uniqueness(&self) -> UniquenessLevel {
        self.uniqueness.unwrap_or(UniquenessLevel::PathVertex)
    }

    /// Validate configuration parameters
    ///
    /// Returns error if any parameter is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max_depth) = self.max_depth {
            if self.min_depth > max_depth {
                return Err(ConfigError::InvalidParameter {
                    name: "min_depth",
                    message: format!("must be <= max_depth ({})", max_depth),
                });
            }
        }

        if self.path_type == PathType::KPaths && self.max_depth.is_none() {
            return Err(ConfigError::MissingParameter { name: "max_depth" });
        }

        if self.effective_uniqueness() == UniquenessLevel::None && self.max_depth.is_none() {
            return Err(ConfigError::InvalidParameter {
                name: "max_depth",
                message: "required when uniqueness is none".into(),
            });
        }

        if self.memory_limit_bytes == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "memory_limit_bytes",
                message: "must be > 0".into(),
            });
        }

        Ok(())
    }
}

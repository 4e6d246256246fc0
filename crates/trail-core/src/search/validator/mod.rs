//! Path validation
//!
//! Every popped step passes through a [`PathValidator`] before it is expanded,
//! and every meeting point passes through it again before it becomes a
//! candidate. The base validator enforces uniqueness, depth bounds, collection
//! restrictions and user expressions; decorators add forbidden sets
//! ([`TabooValidator`]) or timing ([`TracedValidator`]) without changing the
//! outcome.

pub mod base;
pub mod taboo;
pub mod traced;

pub use base::BasePathValidator;
pub use taboo::TabooValidator;
pub use traced::TracedValidator;

use crate::error::{TrailError, TrailResult};
use crate::search::step::{PathStore, Step, StepIndex};
use crate::types::config::UniquenessLevel;
use crate::types::ids::{EdgeRef, SharedStr, VertexRef};
use crate::types::path::{Document, PathResult};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;

/// Shared, read-only set of vertices excluded from expansion
pub type ForbiddenVertices = Arc<FxHashSet<VertexRef>>;

/// Shared, read-only set of edges excluded from expansion
pub type ForbiddenEdges = Arc<FxHashSet<EdgeRef>>;

/// Outcome of validating a step or a joined path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// Keep the step and expand it
    Valid,
    /// Keep the step as a possible endpoint but do not expand it
    Pruned,
    /// Drop the step
    Filtered,
}

impl ValidationResult {
    pub fn is_filtered(self) -> bool {
        self == ValidationResult::Filtered
    }

    pub fn is_pruned(self) -> bool {
        self == ValidationResult::Pruned
    }
}

/// What an expression gets to see about a step
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub vertex: &'a VertexRef,
    /// Edge the step was reached by; `None` at a ball's center
    pub edge: Option<&'a EdgeRef>,
    /// Edges from the owning ball's center
    pub depth: usize,
    pub weight: f64,
    /// Vertex document, when resolved
    pub document: Option<&'a Document>,
}

impl<'a> StepContext<'a> {
    pub fn from_step(step: &'a Step) -> Self {
        Self {
            vertex: step.vertex(),
            edge: step.edge(),
            depth: step.depth(),
            weight: step.weight(),
            document: step.document(),
        }
    }

    /// Attribute of the vertex document, if resolved and present
    pub fn attribute(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.document.and_then(|doc| doc.get(name))
    }
}

type StepCondition = dyn Fn(&StepContext<'_>) -> Result<bool, String> + Send + Sync;
type PathCondition = dyn Fn(&PathResult) -> Result<bool, String> + Send + Sync;

/// Named, opaque per-step predicate supplied by the query layer
///
/// An `Err` from the callable is an evaluation failure and aborts the search.
#[derive(Clone)]
pub struct Expression {
    name: SharedStr,
    condition: Arc<StepCondition>,
}

impl Expression {
    pub fn new<F>(name: impl Into<SharedStr>, condition: F) -> Self
    where
        F: Fn(&StepContext<'_>) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Arc::new(condition),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, context: &StepContext<'_>) -> TrailResult<bool> {
        (self.condition)(context).map_err(|message| TrailError::expression(&self.name, message))
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.name).finish()
    }
}

/// Named, opaque predicate over a complete path
#[derive(Clone)]
pub struct PathExpression {
    name: SharedStr,
    condition: Arc<PathCondition>,
}

impl PathExpression {
    pub fn new<F>(name: impl Into<SharedStr>, condition: F) -> Self
    where
        F: Fn(&PathResult) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Arc::new(condition),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, path: &PathResult) -> TrailResult<bool> {
        (self.condition)(path).map_err(|message| TrailError::expression(&self.name, message))
    }
}

impl fmt::Debug for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathExpression").field(&self.name).finish()
    }
}

/// Configuration handed to a validator by the query layer
#[derive(Debug, Clone)]
pub struct PathValidatorOptions {
    pub uniqueness: UniquenessLevel,
    /// Applied to every vertex without a depth-specific filter
    pub vertex_filter: Option<Expression>,
    /// Replaces `vertex_filter` at the given depth
    pub depth_filters: FxHashMap<usize, Expression>,
    /// `true` stops expansion at the vertex
    pub prune: Option<Expression>,
    /// Applied to each assembled path before it is emitted
    pub post_filter: Option<PathExpression>,
    /// Collections a non-center vertex may belong to; `None` allows all
    pub allowed_collections: Option<FxHashSet<String>>,
    pub min_depth: usize,
    pub max_depth: Option<usize>,
}

impl PathValidatorOptions {
    pub fn new(uniqueness: UniquenessLevel) -> Self {
        Self {
            uniqueness,
            vertex_filter: None,
            depth_filters: FxHashMap::default(),
            prune: None,
            post_filter: None,
            allowed_collections: None,
            min_depth: 0,
            max_depth: None,
        }
    }

    pub fn with_vertex_filter(mut self, expression: Expression) -> Self {
        self.vertex_filter = Some(expression);
        self
    }

    pub fn with_depth_filter(mut self, depth: usize, expression: Expression) -> Self {
        self.depth_filters.insert(depth, expression);
        self
    }

    pub fn with_prune(mut self, expression: Expression) -> Self {
        self.prune = Some(expression);
        self
    }

    pub fn with_post_filter(mut self, expression: PathExpression) -> Self {
        self.post_filter = Some(expression);
        self
    }

    pub fn with_allowed_collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_depth(mut self, min_depth: usize, max_depth: Option<usize>) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// True when any per-step expression may read vertex documents
    pub fn needs_documents(&self) -> bool {
        self.vertex_filter.is_some() || !self.depth_filters.is_empty() || self.prune.is_some()
    }

    /// Filter that applies at `depth`, if any
    pub fn filter_for_depth(&self, depth: usize) -> Option<&Expression> {
        self.depth_filters
            .get(&depth)
            .or(self.vertex_filter.as_ref())
    }
}

/// One half of a joined path: a step and the store that owns it
#[derive(Clone, Copy)]
pub struct HalfPath<'a> {
    pub store: &'a PathStore,
    pub step: StepIndex,
}

impl<'a> HalfPath<'a> {
    pub fn new(store: &'a PathStore, step: StepIndex) -> Self {
        Self { store, step }
    }

    pub fn tip(&self) -> &'a Step {
        self.store.get(self.step)
    }
}

/// Gatekeeper for steps and meeting points
pub trait PathValidator: Send {
    /// Validate a single half-path ending at `step`
    fn validate_path(&mut self, store: &PathStore, step: StepIndex)
        -> TrailResult<ValidationResult>;

    /// Validate the path formed by joining `own` and `other` at their shared tip vertex
    fn validate_joined(
        &mut self,
        own: HalfPath<'_>,
        other_validator: &dyn PathValidator,
        other: HalfPath<'_>,
    ) -> TrailResult<ValidationResult>;

    /// Decide whether an assembled path may be emitted
    fn post_filter(&mut self, path: &PathResult) -> TrailResult<bool>;

    fn uniqueness(&self) -> UniquenessLevel;

    /// True when validation reads vertex documents, so steps must be resolved first
    fn needs_documents(&self) -> bool;

    /// Replace the forbidden vertex set; validators without a taboo layer ignore it
    fn set_forbidden_vertices(&mut self, _vertices: Option<ForbiddenVertices>) {}

    /// Replace the forbidden edge set; validators without a taboo layer ignore it
    fn set_forbidden_edges(&mut self, _edges: Option<ForbiddenEdges>) {}
}

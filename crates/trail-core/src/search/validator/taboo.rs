//! Validator decorator that excludes forbidden vertices and edges

use super::{ForbiddenEdges, ForbiddenVertices, HalfPath, PathValidator, ValidationResult};
use crate::error::TrailResult;
use crate::search::step::{PathStore, StepIndex};
use crate::types::config::UniquenessLevel;
use crate::types::path::PathResult;

/// Filters any step whose vertex or incoming edge is forbidden, then defers
/// to the wrapped validator
pub struct TabooValidator {
    inner: Box<dyn PathValidator>,
    forbidden_vertices: Option<ForbiddenVertices>,
    forbidden_edges: Option<ForbiddenEdges>,
}

impl TabooValidator {
    pub fn new(inner: Box<dyn PathValidator>) -> Self {
        Self {
            inner,
            forbidden_vertices: None,
            forbidden_edges: None,
        }
    }

    pub fn forbidden_vertices(&self) -> Option<&ForbiddenVertices> {
        self.forbidden_vertices.as_ref()
    }

    pub fn forbidden_edges(&self) -> Option<&ForbiddenEdges> {
        self.forbidden_edges.as_ref()
    }
}

impl PathValidator for TabooValidator {
    fn validate_path(
        &mut self,
        store: &PathStore,
        step: StepIndex,
    ) -> TrailResult<ValidationResult> {
        let tip = store.get(step);
        if let Some(vertices) = &self.forbidden_vertices {
            if vertices.contains(tip.vertex()) {
                return Ok(ValidationResult::Filtered);
            }
        }
        if let (Some(edges), Some(edge)) = (&self.forbidden_edges, tip.edge()) {
            if edges.contains(edge) {
                return Ok(ValidationResult::Filtered);
            }
        }
        self.inner.validate_path(store, step)
    }

    fn validate_joined(
        &mut self,
        own: HalfPath<'_>,
        other_validator: &dyn PathValidator,
        other: HalfPath<'_>,
    ) -> TrailResult<ValidationResult> {
        self.inner.validate_joined(own, other_validator, other)
    }

    fn post_filter(&mut self, path: &PathResult) -> TrailResult<bool> {
        self.inner.post_filter(path)
    }

    fn uniqueness(&self) -> UniquenessLevel {
        self.inner.uniqueness()
    }

    fn needs_documents(&self) -> bool {
        self.inner.needs_documents()
    }

    fn set_forbidden_vertices(&mut self, vertices: Option<ForbiddenVertices>) {
        self.forbidden_vertices = vertices;
    }

    fn set_forbidden_edges(&mut self, edges: Option<ForbiddenEdges>) {
        self.forbidden_edges = edges;
    }
}

//! Validator decorator that records call counts and timings

use super::{ForbiddenEdges, ForbiddenVertices, HalfPath, PathValidator, ValidationResult};
use crate::error::TrailResult;
use crate::search::step::{PathStore, StepIndex};
use crate::trace::{timed, SharedTraceRecorder};
use crate::types::config::UniquenessLevel;
use crate::types::path::PathResult;

pub struct TracedValidator {
    inner: Box<dyn PathValidator>,
    recorder: SharedTraceRecorder,
}

impl TracedValidator {
    pub fn new(inner: Box<dyn PathValidator>, recorder: SharedTraceRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl PathValidator for TracedValidator {
    fn validate_path(
        &mut self,
        store: &PathStore,
        step: StepIndex,
    ) -> TrailResult<ValidationResult> {
        let inner = &mut self.inner;
        timed(&self.recorder, "validator.validate_path", || {
            inner.validate_path(store, step)
        })
    }

    fn validate_joined(
        &mut self,
        own: HalfPath<'_>,
        other_validator: &dyn PathValidator,
        other: HalfPath<'_>,
    ) -> TrailResult<ValidationResult> {
        let inner = &mut self.inner;
        timed(&self.recorder, "validator.validate_joined", || {
            inner.validate_joined(own, other_validator, other)
        })
    }

    fn post_filter(&mut self, path: &PathResult) -> TrailResult<bool> {
        let inner = &mut self.inner;
        timed(&self.recorder, "validator.post_filter", || {
            inner.post_filter(path)
        })
    }

    fn uniqueness(&self) -> UniquenessLevel {
        self.inner.uniqueness()
    }

    fn needs_documents(&self) -> bool {
        self.inner.needs_documents()
    }

    fn set_forbidden_vertices(&mut self, vertices: Option<ForbiddenVertices>) {
        self.inner.set_forbidden_vertices(vertices)
    }

    fn set_forbidden_edges(&mut self, edges: Option<ForbiddenEdges>) {
        self.inner.set_forbidden_edges(edges)
    }
}

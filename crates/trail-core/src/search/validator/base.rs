//! Base validator: uniqueness, depth bounds, collections and expressions

use super::{HalfPath, PathValidator, PathValidatorOptions, StepContext, ValidationResult};
use crate::error::TrailResult;
use crate::search::step::{PathStore, StepIndex};
use crate::types::config::UniquenessLevel;
use crate::types::path::PathResult;
use rustc_hash::FxHashSet;

/// Validator driven entirely by [`PathValidatorOptions`]
#[derive(Debug, Clone)]
pub struct BasePathValidator {
    options: PathValidatorOptions,
}

impl BasePathValidator {
    pub fn new(options: PathValidatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PathValidatorOptions {
        &self.options
    }

    /// Does the tip of the chain at `step` repeat a vertex or edge earlier on the chain?
    fn repeats_on_half(&self, store: &PathStore, step: StepIndex) -> bool {
        let tip = store.get(step);
        let mut earlier = store.chain(step).skip(1).map(|(_, s)| s);
        match self.options.uniqueness {
            UniquenessLevel::None => false,
            UniquenessLevel::PathVertex => earlier.any(|s| s.vertex() == tip.vertex()),
            UniquenessLevel::PathEdge => match tip.edge() {
                Some(edge) => earlier.any(|s| s.edge() == Some(edge)),
                None => false,
            },
        }
    }
}

impl PathValidator for BasePathValidator {
    fn validate_path(
        &mut self,
        store: &PathStore,
        step: StepIndex,
    ) -> TrailResult<ValidationResult> {
        let tip = store.get(step);

        if !tip.is_center() {
            if let Some(allowed) = &self.options.allowed_collections {
                if !allowed.contains(tip.vertex().collection()) {
                    return Ok(ValidationResult::Filtered);
                }
            }
        }

        if self.repeats_on_half(store, step) {
            return Ok(ValidationResult::Filtered);
        }

        let context = StepContext::from_step(tip);

        if let Some(filter) = self.options.filter_for_depth(tip.depth()) {
            if !filter.evaluate(&context)? {
                return Ok(ValidationResult::Filtered);
            }
        }

        if let Some(prune) = &self.options.prune {
            if prune.evaluate(&context)? {
                return Ok(ValidationResult::Pruned);
            }
        }

        Ok(ValidationResult::Valid)
    }

    fn validate_joined(
        &mut self,
        own: HalfPath<'_>,
        other_validator: &dyn PathValidator,
        other: HalfPath<'_>,
    ) -> TrailResult<ValidationResult> {
        let total_depth = own.tip().depth() + other.tip().depth();
        if total_depth < self.options.min_depth {
            return Ok(ValidationResult::Filtered);
        }
        if let Some(max_depth) = self.options.max_depth {
            if total_depth > max_depth {
                return Ok(ValidationResult::Filtered);
            }
        }

        let uniqueness = self
            .options
            .uniqueness
            .strictest(other_validator.uniqueness());

        let duplicated = match uniqueness {
            UniquenessLevel::None => false,
            UniquenessLevel::PathVertex => {
                // The meeting vertex is shared: include it from one side only.
                let own_vertices: FxHashSet<_> =
                    own.store.chain(own.step).map(|(_, s)| s.vertex()).collect();
                other
                    .store
                    .chain(other.step)
                    .skip(1)
                    .any(|(_, s)| own_vertices.contains(s.vertex()))
            }
            UniquenessLevel::PathEdge => {
                let own_edges: FxHashSet<_> = own
                    .store
                    .chain(own.step)
                    .filter_map(|(_, s)| s.edge())
                    .collect();
                other
                    .store
                    .chain(other.step)
                    .filter_map(|(_, s)| s.edge())
                    .any(|edge| own_edges.contains(edge))
            }
        };

        Ok(if duplicated {
            ValidationResult::Filtered
        } else {
            ValidationResult::Valid
        })
    }

    fn post_filter(&mut self, path: &PathResult) -> TrailResult<bool> {
        match &self.options.post_filter {
            Some(filter) => filter.evaluate(path),
            None => Ok(true),
        }
    }

    fn uniqueness(&self) -> UniquenessLevel {
        self.options.uniqueness
    }

    fn needs_documents(&self) -> bool {
        self.options.needs_documents()
    }
}

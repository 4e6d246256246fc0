//! Provider decorator that records call counts and timings

use crate::error::ProviderError;
use crate::graph::provider::{Neighbour, Provider, Resolution};
use crate::trace::{timed, SharedTraceRecorder};
use crate::types::ids::{Direction, VertexRef};
use crate::types::path::Document;
use crate::types::stats::ProviderStats;

/// Wraps any provider; results and errors pass through unchanged
pub struct TracedProvider {
    inner: Box<dyn Provider>,
    recorder: SharedTraceRecorder,
}

impl TracedProvider {
    pub fn new(inner: Box<dyn Provider>, recorder: SharedTraceRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl Provider for TracedProvider {
    fn expand(
        &mut self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> Result<Vec<Neighbour>, ProviderError> {
        let inner = &mut self.inner;
        timed(&self.recorder, "provider.expand", || inner.expand(vertex, direction))
    }

    fn resolve_local(&self, vertex: &VertexRef) -> Resolution {
        timed(&self.recorder, "provider.resolve_local", || {
            self.inner.resolve_local(vertex)
        })
    }

    fn fetch(&mut self, vertices: &[VertexRef]) -> Result<Vec<Option<Document>>, ProviderError> {
        let inner = &mut self.inner;
        timed(&self.recorder, "provider.fetch", || inner.fetch(vertices))
    }

    fn stats(&self) -> ProviderStats {
        self.inner.stats()
    }

    fn steal_stats(&mut self) -> ProviderStats {
        self.inner.steal_stats()
    }

    fn destroy_engines(&mut self) {
        let inner = &mut self.inner;
        timed(&self.recorder, "provider.destroy_engines", || {
            inner.destroy_engines()
        })
    }
}

//! Provider with configurable failure injection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use trail_core::{
    Direction, Document, Neighbour, Provider, ProviderError, ProviderStats, Resolution, VertexRef,
};
use trail_storage::MemGraphProvider;

/// Provider that delegates to a `MemGraphProvider` but can inject failures
///
/// Set `*_fail_at` to a call count to trigger an I/O error on that call.
/// Set to 0 to disable failure (default).
/// The counters are shared, so a test can keep handles after the provider
/// has been moved into an enumerator.
pub struct FailingProvider {
    inner: MemGraphProvider,
    /// Fail expand on this call number (0 = never)
    pub expand_fail_at: Arc<AtomicU64>,
    /// Fail fetch on this call number (0 = never)
    pub fetch_fail_at: Arc<AtomicU64>,
    /// Number of destroy_engines calls that reached this provider
    pub destroy_calls: Arc<AtomicU64>,
    expand_count: Arc<AtomicU64>,
    fetch_count: Arc<AtomicU64>,
}

impl FailingProvider {
    pub fn new(inner: MemGraphProvider) -> Self {
        Self {
            inner,
            expand_fail_at: Arc::new(AtomicU64::new(0)),
            fetch_fail_at: Arc::new(AtomicU64::new(0)),
            destroy_calls: Arc::new(AtomicU64::new(0)),
            expand_count: Arc::new(AtomicU64::new(0)),
            fetch_count: Arc::new(AtomicU64::new(0)),
        }
    }

    fn should_fail(counter: &AtomicU64, fail_at: &AtomicU64) -> bool {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let target = fail_at.load(Ordering::SeqCst);
        target != 0 && count >= target
    }
}

impl Provider for FailingProvider {
    fn expand(
        &mut self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> Result<Vec<Neighbour>, ProviderError> {
        if Self::should_fail(&self.expand_count, &self.expand_fail_at) {
            return Err(ProviderError::Io {
                message: "Injected expand failure".into(),
            });
        }
        self.inner.expand(vertex, direction)
    }

    fn resolve_local(&self, vertex: &VertexRef) -> Resolution {
        self.inner.resolve_local(vertex)
    }

    fn fetch(&mut self, vertices: &[VertexRef]) -> Result<Vec<Option<Document>>, ProviderError> {
        if Self::should_fail(&self.fetch_count, &self.fetch_fail_at) {
            return Err(ProviderError::Io {
                message: "Injected fetch failure".into(),
            });
        }
        self.inner.fetch(vertices)
    }

    fn stats(&self) -> ProviderStats {
        self.inner.stats()
    }

    fn steal_stats(&mut self) -> ProviderStats {
        self.inner.steal_stats()
    }

    fn destroy_engines(&mut self) {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy_engines();
    }
}

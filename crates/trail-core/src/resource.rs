//! Memory budget for search state
//!
//! Path stores, the candidates store and the result cache charge every allocation against a
//! shared [`ResourceMonitor`]. Growth past the limit fails the current search
//! with [`TrailError::ResourceExhausted`]; there is no retry inside the engine.

use crate::error::{TrailError, TrailResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Error code reported when the budget is exceeded
pub const RESOURCE_EXHAUSTED_CODE: u32 = 50001;

/// Shared byte counter with an optional upper bound
#[derive(Debug)]
pub struct ResourceMonitor {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl ResourceMonitor {
    /// Monitor that only counts
    pub fn unlimited() -> Arc<Self> {
        Arc::new(Self {
            limit: None,
            used: AtomicUsize::new(0),
        })
    }

    pub fn with_limit(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit: Some(limit),
            used: AtomicUsize::new(0),
        })
    }

    /// Charge `bytes`, failing without side effects if the limit would be passed
    pub fn increase(&self, bytes: usize) -> TrailResult<()> {
        let previous = self.used.fetch_add(bytes, Ordering::Relaxed);
        if let Some(limit) = self.limit {
            if previous + bytes > limit {
                self.used.fetch_sub(bytes, Ordering::Relaxed);
                return Err(TrailError::ResourceExhausted {
                    code: RESOURCE_EXHAUSTED_CODE,
                    requested: bytes,
                    used: previous,
                    limit,
                });
            }
        }
        Ok(())
    }

    pub fn decrease(&self, bytes: usize) {
        // Never wraps below zero
        let _ = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

/// Bytes charged by a single owner, released in bulk on `release_all` or drop
#[derive(Debug)]
pub(crate) struct ResourceCharge {
    monitor: Arc<ResourceMonitor>,
    charged: usize,
}

impl ResourceCharge {
    pub(crate) fn new(monitor: Arc<ResourceMonitor>) -> Self {
        Self {
            monitor,
            charged: 0,
        }
    }

    pub(crate) fn charge(&mut self, bytes: usize) -> TrailResult<()> {
        self.monitor.increase(bytes)?;
        self.charged += bytes;
        Ok(())
    }

    pub(crate) fn release(&mut self, bytes: usize) {
        let bytes = bytes.min(self.charged);
        self.monitor.decrease(bytes);
        self.charged -= bytes;
    }

    pub(crate) fn release_all(&mut self) {
        self.monitor.decrease(self.charged);
        self.charged = 0;
    }
}

impl Drop for ResourceCharge {
    fn drop(&mut self) {
        self.release_all();
    }
}

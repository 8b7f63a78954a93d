//! Allocation and draw counters shared by the providers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::provider::ProviderStats;

#[derive(Debug, Default)]
pub(crate) struct Counters {
    live_surfaces: AtomicU64,
    live_bytes: AtomicU64,
    allocations: AtomicU64,
    failed_allocations: AtomicU64,
    draws: AtomicU64,
    clears: AtomicU64,
}

impl Counters {
    /// Records a successful allocation and returns its lifetime guard.
    pub(crate) fn allocated(self: &Arc<Self>, bytes: u64) -> Allocation {
        self.live_surfaces.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Allocation {
            counters: Arc::clone(self),
            bytes,
        }
    }

    pub(crate) fn failed(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn drew(&self) {
        self.draws.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn cleared(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn live_bytes(&self) -> u64 {
        self.live_bytes.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self) -> ProviderStats {
        ProviderStats {
            live_surfaces: self.live_surfaces.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            failed_allocations: self.failed_allocations.load(Ordering::Relaxed),
            draws: self.draws.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

/// Keeps the live counters in sync with the lifetime of a backing store.
#[derive(Debug)]
pub(crate) struct Allocation {
    counters: Arc<Counters>,
    bytes: u64,
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.counters.live_surfaces.fetch_sub(1, Ordering::Relaxed);
        self.counters.live_bytes.fetch_sub(self.bytes, Ordering::Relaxed);
    }
}

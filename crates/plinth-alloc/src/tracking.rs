//! Counting wrapper used to audit allocator layering.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::allocator::Allocator;

/// Wraps an allocator and counts every byte that passes through it.
///
/// Layered allocators draw their extents from a primary; wrapping that
/// primary in a `TrackingAllocator` shows whether every extent comes back
/// (`live_allocations() == 0` once the layer is dropped).
#[derive(Debug, Default)]
pub struct TrackingAllocator<A> {
    inner: A,
    allocations: AtomicU64,
    frees: AtomicU64,
    live_allocations: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Start counting calls forwarded to `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            live_allocations: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Total `allocate` calls.
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Total `free` calls.
    pub fn frees(&self) -> u64 {
        self.frees.load(Ordering::Relaxed)
    }

    /// Allocations not yet freed.
    pub fn live_allocations(&self) -> usize {
        self.live_allocations.load(Ordering::Relaxed)
    }

    /// Bytes allocated and not yet freed.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// High-water mark of `live_bytes`.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }
}

// SAFETY: every pointer comes unchanged from the inner allocator.
unsafe impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        let ptr = self.inner.allocate(size);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.live_allocations.fetch_add(1, Ordering::Relaxed);
        let live = self.live_bytes.fetch_add(size, Ordering::Relaxed) + size;
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);
        ptr
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        unsafe { self.inner.free(ptr, size) };
        self.frees.fetch_add(1, Ordering::Relaxed);
        self.live_allocations.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(size, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::SystemAllocator;

    #[test]
    fn counts_balance_after_free() {
        let tracker = TrackingAllocator::new(SystemAllocator);
        let a = tracker.allocate(48);
        let b = tracker.allocate(16);
        assert_eq!(tracker.live_bytes(), 64);
        // SAFETY: each pointer freed once with its size.
        unsafe {
            tracker.free(a, 48);
            tracker.free(b, 16);
        }
        assert_eq!(tracker.allocations(), 2);
        assert_eq!(tracker.frees(), 2);
        assert_eq!(tracker.live_allocations(), 0);
        assert_eq!(tracker.live_bytes(), 0);
        assert_eq!(tracker.peak_bytes(), 64);
    }
}

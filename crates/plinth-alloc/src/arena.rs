//! Bump-pointer arena with bulk reset and adaptive capacity.
//!
//! An [`ArenaAllocator`] reserves one contiguous extent from a primary
//! allocator and serves requests by advancing an offset. Individual
//! in-arena frees are no-ops; the whole extent is reclaimed by
//! [`reset`](ArenaAllocator::reset), typically once per simulation step.
//! Requests that do not fit are redirected to the primary allocator, so
//! the arena never fails an allocation the primary could serve.

use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

use plinth_core::ConfigError;

use crate::allocator::{align_up, assert_nonzero, Allocator, MAX_ALIGN};
use crate::config::ArenaConfig;
use crate::raw::RawExtent;
use crate::system::SystemAllocator;

/// Counters describing an arena's lifetime activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total `allocate` calls.
    pub allocations: u64,
    /// Calls redirected to the primary allocator.
    pub overflow_allocations: u64,
    /// `free` calls forwarded to the primary allocator.
    pub forwarded_frees: u64,
    /// Completed `reset` calls.
    pub resets: u64,
    /// Times the extent was enlarged.
    pub grows: u64,
    /// Times the extent was reduced.
    pub shrinks: u64,
}

struct ArenaState {
    extent: RawExtent,
    /// Bump pointer: bytes handed out since the last reset.
    offset: usize,
    /// Highest offset reached during the current cycle.
    cycle_peak: usize,
    /// Bytes redirected to the primary during the current cycle.
    cycle_overflow: usize,
    /// Consecutive cycles whose peak utilization stayed under the threshold.
    low_use_streak: u32,
    /// Consecutive cycles in which at least one request overflowed.
    overflow_streak: u32,
    stats: ArenaStats,
}

/// Bump allocator over a single extent, with overflow fallback.
///
/// `allocate` and `free` take the one internal mutex. That makes a shared
/// arena correct under concurrent use but serializes all callers; give
/// each parallel worker its own arena when throughput matters.
pub struct ArenaAllocator<A: Allocator = SystemAllocator> {
    primary: A,
    config: ArenaConfig,
    state: Mutex<ArenaState>,
}

impl ArenaAllocator<SystemAllocator> {
    /// Arena with the default configuration over the system heap.
    pub fn new() -> Self {
        match Self::with_config(ArenaConfig::default(), SystemAllocator) {
            Ok(arena) => arena,
            Err(e) => unreachable!("default arena config is valid: {e}"),
        }
    }
}

impl Default for ArenaAllocator<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> ArenaAllocator<A> {
    /// Create an arena drawing its extent (and overflow) from `primary`.
    pub fn with_config(config: ArenaConfig, primary: A) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = align_up(config.initial_capacity, MAX_ALIGN);
        let extent = RawExtent::new(primary.allocate(capacity), capacity);
        log::debug!("arena reserved {capacity} bytes at {:#x}", extent.base_addr());
        Ok(Self {
            primary,
            config,
            state: Mutex::new(ArenaState {
                extent,
                offset: 0,
                cycle_peak: 0,
                cycle_overflow: 0,
                low_use_streak: 0,
                overflow_streak: 0,
                stats: ArenaStats::default(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ArenaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// The primary allocator backing this arena.
    pub fn primary(&self) -> &A {
        &self.primary
    }

    /// Currently reserved extent size in bytes.
    pub fn capacity(&self) -> usize {
        self.lock().extent.size()
    }

    /// Bytes handed out from the extent since the last reset.
    pub fn used(&self) -> usize {
        self.lock().offset
    }

    /// Bytes still available in the extent.
    pub fn remaining(&self) -> usize {
        let state = self.lock();
        state.extent.size() - state.offset
    }

    /// Address of the first byte of the extent.
    pub fn base_addr(&self) -> usize {
        self.lock().extent.base_addr()
    }

    /// `ptr` lies inside the current extent.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.lock().extent.contains(ptr)
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ArenaStats {
        self.lock().stats
    }

    /// Reclaim every in-arena allocation and re-evaluate capacity.
    ///
    /// The offset returns to zero, so the next in-arena allocation starts
    /// at the base address. Then the cycle's statistics drive the resize
    /// policy: repeated overflow cycles grow the extent, repeated
    /// low-utilization cycles halve it. A resize releases the old extent
    /// to the primary and reserves a new one.
    ///
    /// Taking `&mut self` means nothing that borrows the arena (a shape
    /// factory, and through it every shape handle) can outlive the reset:
    ///
    /// ```compile_fail
    /// use plinth_alloc::{Allocator, ArenaAllocator};
    ///
    /// struct Scratch<'a>(&'a ArenaAllocator);
    ///
    /// let mut arena = ArenaAllocator::new();
    /// let scratch = Scratch(&arena);
    /// arena.reset();
    /// scratch.0.allocate(8);
    /// ```
    ///
    /// Raw pointers obtained from the extent before the reset must not be
    /// used or freed afterwards. Overflow allocations are unaffected and
    /// remain valid until freed.
    pub fn reset(&mut self) {
        let Self {
            primary,
            config,
            state,
        } = self;
        let state = state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let capacity = state.extent.size();
        let peak = state.cycle_peak;
        let overflow = state.cycle_overflow;

        state.offset = 0;
        state.cycle_peak = 0;
        state.cycle_overflow = 0;
        state.stats.resets += 1;

        if overflow > 0 {
            state.low_use_streak = 0;
            state.overflow_streak += 1;
            if state.overflow_streak >= config.grow_after_overflows {
                state.overflow_streak = 0;
                let scaled = (capacity as f64 * config.growth_factor) as usize;
                let demand = peak.saturating_add(overflow);
                let target = align_up(scaled.max(demand).min(config.max_capacity), MAX_ALIGN);
                if target > capacity {
                    resize(primary, state, target);
                    state.stats.grows += 1;
                    log::debug!("arena grew {capacity} -> {target} bytes after repeated overflow");
                }
            }
            return;
        }

        state.overflow_streak = 0;
        let utilization = peak as f64 / capacity as f64;
        if utilization >= config.shrink_threshold {
            state.low_use_streak = 0;
            return;
        }
        state.low_use_streak += 1;
        if state.low_use_streak >= config.shrink_after_cycles {
            state.low_use_streak = 0;
            let target = align_up((capacity / 2).max(config.min_capacity), MAX_ALIGN);
            if target < capacity {
                resize(primary, state, target);
                state.stats.shrinks += 1;
                log::debug!(
                    "arena shrank {capacity} -> {target} bytes after {} low-use cycles",
                    config.shrink_after_cycles
                );
            }
        }
    }
}

fn resize<A: Allocator>(primary: &A, state: &mut ArenaState, new_capacity: usize) {
    let fresh = RawExtent::new(primary.allocate(new_capacity), new_capacity);
    let old = std::mem::replace(&mut state.extent, fresh);
    // SAFETY: `old` was obtained from `primary` with exactly `old.size()`
    // bytes, and `reset` holds the arena exclusively, so nothing still
    // refers to it.
    unsafe { primary.free(old.base(), old.size()) };
}

// SAFETY: in-arena pointers are MAX_ALIGN-aligned, disjoint slices of
// the extent below the bump offset, reclaimed only by `reset(&mut self)`;
// everything else comes unchanged from the primary.
unsafe impl<A: Allocator> Allocator for ArenaAllocator<A> {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        assert_nonzero(size, "allocate");
        let need = align_up(size, MAX_ALIGN);
        let mut state = self.lock();
        state.stats.allocations += 1;

        if let Some(end) = state.offset.checked_add(need) {
            if end <= state.extent.size() {
                let ptr = state.extent.at(state.offset);
                state.offset = end;
                state.cycle_peak = state.cycle_peak.max(end);
                return ptr;
            }
        }

        state.stats.overflow_allocations += 1;
        state.cycle_overflow = state.cycle_overflow.saturating_add(need);
        drop(state);
        log::trace!("arena overflow: redirecting {size} bytes to primary");
        self.primary.allocate(size)
    }

    /// In-arena pointers are ignored (reclaimed by `reset`); any other
    /// pointer is an overflow allocation and is forwarded to the primary.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        assert_nonzero(size, "free");
        let mut state = self.lock();
        if state.extent.contains(ptr) {
            return;
        }
        state.stats.forwarded_frees += 1;
        drop(state);
        // SAFETY: a pointer from this arena that is outside its extent can
        // only be an overflow allocation served by `self.primary` with the
        // same `size`; the caller guarantees it is live.
        unsafe { self.primary.free(ptr, size) }
    }
}

impl<A: Allocator> Drop for ArenaAllocator<A> {
    fn drop(&mut self) {
        let extent = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .extent;
        // SAFETY: the extent was obtained from `self.primary` with this
        // size and is released exactly once, here.
        unsafe { self.primary.free(extent.base(), extent.size()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingAllocator;
    use proptest::prelude::*;

    fn small_arena(capacity: usize) -> ArenaAllocator<TrackingAllocator<SystemAllocator>> {
        ArenaAllocator::with_config(
            ArenaConfig::with_capacity(capacity),
            TrackingAllocator::new(SystemAllocator),
        )
        .unwrap()
    }

    #[test]
    fn sequential_allocations_are_monotonic_and_disjoint() {
        let arena = small_arena(1024);
        let a = arena.allocate(10);
        let b = arena.allocate(40);
        let c = arena.allocate(1);
        let (a, b, c) = (a.as_ptr() as usize, b.as_ptr() as usize, c.as_ptr() as usize);
        assert_eq!(a, arena.base_addr());
        assert!(a + 10 <= b);
        assert!(b + 40 <= c);
        assert_eq!(arena.used(), 16 + 48 + 16);
    }

    #[test]
    fn reset_rewinds_to_base() {
        let mut arena = small_arena(1024);
        arena.allocate(100);
        arena.allocate(200);
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.allocate(8).as_ptr() as usize, arena.base_addr());
    }

    #[test]
    fn overflow_is_redirected_to_primary() {
        let arena = small_arena(256);
        let inside = arena.allocate(128);
        let outside = arena.allocate(512);
        assert!(arena.contains(inside));
        assert!(!arena.contains(outside));
        assert_eq!(arena.stats().overflow_allocations, 1);
        // The overflow does not disturb the bump pointer.
        let next = arena.allocate(64);
        assert_eq!(
            next.as_ptr() as usize,
            inside.as_ptr() as usize + 128
        );
        // SAFETY: `outside` came from this arena with size 512.
        unsafe { arena.free(outside, 512) };
        assert_eq!(arena.stats().forwarded_frees, 1);
    }

    #[test]
    fn in_arena_free_is_a_no_op() {
        let arena = small_arena(256);
        let ptr = arena.allocate(32);
        let live_before = arena.primary().live_allocations();
        // SAFETY: `ptr` came from this arena with size 32.
        unsafe { arena.free(ptr, 32) };
        assert_eq!(arena.used(), 32);
        assert_eq!(arena.primary().live_allocations(), live_before);
        assert_eq!(arena.stats().forwarded_frees, 0);
    }

    #[test]
    fn grows_after_repeated_overflow_cycles() {
        let mut arena = small_arena(256);
        for _ in 0..ArenaConfig::DEFAULT_GROW_AFTER_OVERFLOWS {
            let p = arena.allocate(1024);
            // SAFETY: overflow allocation of 1024 bytes from this arena.
            unsafe { arena.free(p, 1024) };
            arena.reset();
        }
        assert_eq!(arena.stats().grows, 1);
        assert!(arena.capacity() >= 1024);
        assert!(arena.contains(arena.allocate(1024)));
    }

    #[test]
    fn single_overflow_cycle_does_not_grow() {
        let mut arena = small_arena(256);
        let p = arena.allocate(1024);
        // SAFETY: overflow allocation of 1024 bytes from this arena.
        unsafe { arena.free(p, 1024) };
        arena.reset();
        arena.allocate(16);
        arena.reset();
        assert_eq!(arena.stats().grows, 0);
        assert_eq!(arena.capacity(), 256);
    }

    #[test]
    fn shrinks_after_low_use_streak() {
        let config = ArenaConfig {
            initial_capacity: 4096,
            min_capacity: 1024,
            shrink_after_cycles: 3,
            ..ArenaConfig::default()
        };
        let mut arena = ArenaAllocator::with_config(config, SystemAllocator).unwrap();
        for _ in 0..3 {
            arena.allocate(16);
            arena.reset();
        }
        assert_eq!(arena.capacity(), 2048);
        assert_eq!(arena.stats().shrinks, 1);

        for _ in 0..30 {
            arena.reset();
        }
        assert_eq!(arena.capacity(), 1024, "never shrinks below min_capacity");
    }

    #[test]
    fn busy_cycle_breaks_low_use_streak() {
        let config = ArenaConfig {
            initial_capacity: 4096,
            min_capacity: 1024,
            shrink_after_cycles: 2,
            ..ArenaConfig::default()
        };
        let mut arena = ArenaAllocator::with_config(config, SystemAllocator).unwrap();
        arena.reset();
        arena.allocate(3000);
        arena.reset();
        arena.reset();
        assert_eq!(arena.capacity(), 4096);
    }

    #[test]
    fn drop_returns_extent_to_primary() {
        let primary = TrackingAllocator::new(SystemAllocator);
        {
            let arena = ArenaAllocator::with_config(ArenaConfig::with_capacity(512), &primary)
                .unwrap();
            arena.allocate(64);
            assert_eq!(primary.live_allocations(), 1);
        }
        assert_eq!(primary.live_allocations(), 0);
        assert_eq!(primary.live_bytes(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ArenaConfig {
            initial_capacity: 0,
            ..ArenaConfig::default()
        };
        assert!(ArenaAllocator::with_config(config, SystemAllocator).is_err());
    }

    #[test]
    #[should_panic(expected = "size 0")]
    fn zero_size_allocate_panics() {
        small_arena(64).allocate(0);
    }

    #[test]
    fn shared_across_threads() {
        let arena = small_arena(64 * 1024);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        arena.allocate(16);
                    }
                });
            }
        });
        assert_eq!(arena.used(), 4 * 100 * 16);
    }

    proptest! {
        #[test]
        fn allocations_never_overlap(sizes in prop::collection::vec(1usize..200, 1..64)) {
            let arena = small_arena(2048);
            let mut spans: Vec<(usize, usize, bool)> = Vec::new();
            for &size in &sizes {
                let ptr = arena.allocate(size);
                let addr = ptr.as_ptr() as usize;
                prop_assert_eq!(addr % MAX_ALIGN, 0);
                spans.push((addr, size, arena.contains(ptr)));
            }
            let in_arena: Vec<_> = spans.iter().filter(|s| s.2).collect();
            // In-arena pointers are handed out in increasing order already.
            for pair in in_arena.windows(2) {
                prop_assert!(pair[0].0 + pair[0].1 <= pair[1].0);
            }
            prop_assert!(arena.used() <= arena.capacity());
            for (addr, size, inside) in spans {
                if !inside {
                    let ptr = NonNull::new(addr as *mut u8).unwrap();
                    // SAFETY: overflow allocation from this arena with `size`.
                    unsafe { arena.free(ptr, size) };
                }
            }
            prop_assert_eq!(arena.primary().live_allocations(), 1);
        }
    }
}

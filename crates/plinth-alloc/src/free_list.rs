//! Free-block list allocator layered over a primary allocator.
//!
//! Memory is carved out of extents obtained from the primary. Each extent
//! is tiled by blocks, and every block starts with a header
//! followed by its payload. Headers form a single singly linked chain in
//! address order within each extent, with extents appended in the order
//! they were acquired:
//!
//! ```text
//! extent 0                              extent 1
//! ┌────────┬─────────┬────────┬───────┐ ┌────────┬──────────────────┐
//! │ header │ payload │ header │  ...  │→│ header │ payload          │
//! └────────┴─────────┴────────┴───────┘ └────────┴──────────────────┘
//! ```
//!
//! Allocation is first-fit. A block is split when the remainder could
//! hold another header and at least [`MAX_ALIGN`] bytes of payload.
//! Freeing a block coalesces it immediately with its free neighbours in
//! the same extent, so two adjacent free blocks never coexist.

use std::cell::RefCell;
use std::mem::size_of;
use std::ptr::NonNull;

use indexmap::IndexMap;
use plinth_core::ConfigError;

use crate::allocator::{align_up, assert_nonzero, Allocator, MAX_ALIGN};
use crate::config::FreeListConfig;
use crate::raw::{self, RawExtent};
use crate::system::SystemAllocator;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
struct BlockHeader {
    /// Payload bytes following the header.
    size: usize,
    next: Option<NonNull<BlockHeader>>,
    extent: u32,
    allocated: bool,
}

/// Bytes reserved in front of every payload.
const HEADER_SIZE: usize = align_up(size_of::<BlockHeader>(), MAX_ALIGN);

/// Lifetime counters for a [`FreeListAllocator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreeListStats {
    /// Successful `allocate` calls.
    pub allocations: u64,
    /// Successful `free` calls.
    pub frees: u64,
    /// Blocks split to serve a smaller request.
    pub splits: u64,
    /// Neighbour merges performed on free.
    pub coalesces: u64,
    /// Extents requested from the primary.
    pub extents_acquired: u64,
}

struct FreeListState {
    head: Option<NonNull<BlockHeader>>,
    tail: Option<NonNull<BlockHeader>>,
    extents: IndexMap<u32, RawExtent>,
    next_extent_id: u32,
    outstanding: usize,
    stats: FreeListStats,
}

/// First-fit free-list allocator over extents from a primary allocator.
///
/// Not internally synchronized: the type is `Send` but `!Sync`. Share it
/// across threads only behind an external lock.
///
/// # Panics
///
/// Dropping the allocator while any block is still allocated panics with
/// an "outstanding allocation" message.
pub struct FreeListAllocator<A: Allocator = SystemAllocator> {
    primary: A,
    config: FreeListConfig,
    state: RefCell<FreeListState>,
}

// SAFETY: every header pointer addresses memory inside an extent owned
// exclusively by this allocator, so moving the allocator to another
// thread moves sole ownership of that memory with it. `RefCell` keeps
// the type `!Sync`.
unsafe impl<A: Allocator + Send> Send for FreeListAllocator<A> {}

impl FreeListAllocator<SystemAllocator> {
    /// Free list with default extents over the system heap.
    pub fn new() -> Self {
        match Self::with_config(FreeListConfig::default(), SystemAllocator) {
            Ok(list) => list,
            Err(e) => unreachable!("default free-list config is valid: {e}"),
        }
    }
}

impl Default for FreeListAllocator<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> FreeListAllocator<A> {
    /// Create an empty free list that draws extents from `primary`.
    ///
    /// No extent is acquired until the first allocation.
    pub fn with_config(config: FreeListConfig, primary: A) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            primary,
            config,
            state: RefCell::new(FreeListState {
                head: None,
                tail: None,
                extents: IndexMap::new(),
                next_extent_id: 0,
                outstanding: 0,
                stats: FreeListStats::default(),
            }),
        })
    }

    /// The primary allocator backing this free list.
    pub fn primary(&self) -> &A {
        &self.primary
    }

    /// The configuration this free list was built with.
    pub fn config(&self) -> &FreeListConfig {
        &self.config
    }

    /// Number of extents currently held.
    pub fn extent_count(&self) -> usize {
        self.state.borrow().extents.len()
    }

    /// Number of blocks, free or allocated, across all extents.
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// Number of free blocks across all extents.
    pub fn free_block_count(&self) -> usize {
        self.blocks().filter(|h| !h.allocated).count()
    }

    /// Blocks currently allocated and not yet freed.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding
    }

    /// Lifetime counters.
    pub fn stats(&self) -> FreeListStats {
        self.state.borrow().stats
    }

    fn blocks(&self) -> impl Iterator<Item = BlockHeader> {
        let mut cursor = self.state.borrow().head;
        std::iter::from_fn(move || {
            let ptr = cursor?;
            // SAFETY: every pointer in the chain addresses an initialized
            // header inside an extent this allocator still owns.
            let header = unsafe { raw::read(ptr) };
            cursor = header.next;
            Some(header)
        })
    }

    /// Acquire a fresh extent large enough for `need` payload bytes and
    /// append its single free block to the chain.
    fn grow(&self, state: &mut FreeListState, need: usize) -> NonNull<BlockHeader> {
        let size = align_up(self.config.extent_size.max(need + HEADER_SIZE), MAX_ALIGN);
        let extent = RawExtent::new(self.primary.allocate(size), size);
        let id = state.next_extent_id;
        state.next_extent_id += 1;
        state.extents.insert(id, extent);
        state.stats.extents_acquired += 1;
        log::debug!(
            "free list acquired extent {id} ({size} bytes, {} held)",
            state.extents.len()
        );

        let block = extent.base().cast::<BlockHeader>();
        // SAFETY: the extent is fresh, aligned to MAX_ALIGN, and larger
        // than one header.
        unsafe {
            raw::write(
                block,
                BlockHeader {
                    size: size - HEADER_SIZE,
                    next: None,
                    extent: id,
                    allocated: false,
                },
            );
        }
        match state.tail {
            // SAFETY: the tail is a live header in an owned extent.
            Some(tail) => unsafe {
                let mut header = raw::read(tail);
                header.next = Some(block);
                raw::write(tail, header);
            },
            None => state.head = Some(block),
        }
        state.tail = Some(block);
        block
    }

    fn first_fit(state: &FreeListState, need: usize) -> Option<NonNull<BlockHeader>> {
        let mut cursor = state.head;
        while let Some(ptr) = cursor {
            // SAFETY: chain pointers address live headers.
            let header = unsafe { raw::read(ptr) };
            if !header.allocated && header.size >= need {
                return Some(ptr);
            }
            cursor = header.next;
        }
        None
    }

    fn extent_of(state: &FreeListState, ptr: NonNull<u8>) -> Option<u32> {
        state
            .extents
            .iter()
            .find(|(_, extent)| extent.contains(ptr))
            .map(|(&id, _)| id)
    }
}

// SAFETY: payloads sit at MAX_ALIGN boundaries inside extents of the
// primary, a block is handed out only while it is marked free and stays
// marked used until freed, and extents live until the allocator drops.
unsafe impl<A: Allocator> Allocator for FreeListAllocator<A> {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        assert_nonzero(size, "allocate");
        let need = align_up(size, MAX_ALIGN);
        let mut state = self.state.borrow_mut();

        let block = match Self::first_fit(&state, need) {
            Some(block) => block,
            None => self.grow(&mut state, need),
        };

        // SAFETY: `block` is a live free header whose payload spans at
        // least `need` bytes inside its extent. A split header is written
        // at `payload + need`, which lies inside that payload because the
        // split condition leaves room for a full header after it.
        unsafe {
            let mut header = raw::read(block);
            let payload = raw::step_forward(block.cast::<u8>(), HEADER_SIZE);
            if header.size >= need + HEADER_SIZE + MAX_ALIGN {
                let rest = raw::step_forward(payload, need).cast::<BlockHeader>();
                raw::write(
                    rest,
                    BlockHeader {
                        size: header.size - need - HEADER_SIZE,
                        next: header.next,
                        extent: header.extent,
                        allocated: false,
                    },
                );
                header.size = need;
                header.next = Some(rest);
                if state.tail == Some(block) {
                    state.tail = Some(rest);
                }
                state.stats.splits += 1;
            }
            header.allocated = true;
            raw::write(block, header);
            state.outstanding += 1;
            state.stats.allocations += 1;
            payload
        }
    }

    /// # Panics
    ///
    /// Panics if `ptr` does not lie in one of this allocator's extents,
    /// does not address a block payload, addresses a block that is already
    /// free (double free), or `size` exceeds the block's payload.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        assert_nonzero(size, "free");
        let mut state = self.state.borrow_mut();
        let Some(extent) = Self::extent_of(&state, ptr) else {
            panic!("free of {:p}: pointer not owned by this free list", ptr.as_ptr());
        };

        // Locate the block and its predecessor by walking the chain; a
        // pointer that is not a payload start is rejected here.
        let mut prev: Option<NonNull<BlockHeader>> = None;
        let mut cursor = state.head;
        let block = loop {
            let Some(current) = cursor else {
                panic!("free of {:p}: not the start of a block payload", ptr.as_ptr());
            };
            // SAFETY: chain pointers address live headers, and the payload
            // of a live header lies inside its extent.
            let payload = unsafe { raw::step_forward(current.cast::<u8>(), HEADER_SIZE) };
            if payload == ptr {
                break current;
            }
            prev = Some(current);
            // SAFETY: as above.
            cursor = unsafe { raw::read(current) }.next;
        };

        // SAFETY: `block`, `prev`, and any successor are live headers in
        // owned extents. Merges only join blocks tagged with the same
        // extent, which are physically adjacent because blocks tile their
        // extent in chain order.
        unsafe {
            let mut header = raw::read(block);
            debug_assert_eq!(header.extent, extent);
            assert!(
                header.allocated,
                "double free of {:p} (contract violation)",
                ptr.as_ptr()
            );
            assert!(
                align_up(size, MAX_ALIGN) <= header.size,
                "free of {:p} with size {size} larger than its block ({} bytes)",
                ptr.as_ptr(),
                header.size
            );
            header.allocated = false;
            state.outstanding -= 1;
            state.stats.frees += 1;

            if let Some(next) = header.next {
                let following = raw::read(next);
                if !following.allocated && following.extent == header.extent {
                    header.size += HEADER_SIZE + following.size;
                    header.next = following.next;
                    if state.tail == Some(next) {
                        state.tail = Some(block);
                    }
                    state.stats.coalesces += 1;
                }
            }
            raw::write(block, header);

            if let Some(prev) = prev {
                let mut preceding = raw::read(prev);
                if !preceding.allocated && preceding.extent == header.extent {
                    preceding.size += HEADER_SIZE + header.size;
                    preceding.next = header.next;
                    raw::write(prev, preceding);
                    if state.tail == Some(block) {
                        state.tail = Some(prev);
                    }
                    state.stats.coalesces += 1;
                }
            }
        }
    }
}

impl<A: Allocator> Drop for FreeListAllocator<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.outstanding != 0 {
            if std::thread::panicking() {
                return;
            }
            panic!(
                "free list dropped with {} outstanding allocation(s)",
                state.outstanding
            );
        }
        for (_, extent) in state.extents.drain(..) {
            // SAFETY: each extent came from `self.primary` with this size
            // and is released exactly once.
            unsafe { self.primary.free(extent.base(), extent.size()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingAllocator;
    use proptest::prelude::*;

    fn small_list() -> FreeListAllocator<TrackingAllocator<SystemAllocator>> {
        FreeListAllocator::with_config(
            FreeListConfig { extent_size: 1024 },
            TrackingAllocator::new(SystemAllocator),
        )
        .unwrap()
    }

    #[test]
    fn header_is_max_aligned() {
        assert_eq!(HEADER_SIZE % MAX_ALIGN, 0);
        assert!(HEADER_SIZE >= size_of::<BlockHeader>());
    }

    #[test]
    fn first_allocation_acquires_one_extent() {
        let list = small_list();
        assert_eq!(list.extent_count(), 0);
        let p = list.allocate(64);
        assert_eq!(p.as_ptr() as usize % MAX_ALIGN, 0);
        assert_eq!(list.extent_count(), 1);
        assert_eq!(list.block_count(), 2, "allocated block plus split remainder");
        assert_eq!(list.free_block_count(), 1);
        // SAFETY: allocated above with size 64.
        unsafe { list.free(p, 64) };
    }

    #[test]
    fn freed_block_is_reused() {
        let list = small_list();
        let a = list.allocate(100);
        // SAFETY: allocated above with size 100.
        unsafe { list.free(a, 100) };
        let b = list.allocate(100);
        assert_eq!(a, b);
        // SAFETY: allocated above with size 100.
        unsafe { list.free(b, 100) };
    }

    // ── Coalescing ────────────────────────────────────────────

    #[test]
    fn adjacent_frees_coalesce_back_to_one_block() {
        let list = small_list();
        let a = list.allocate(64);
        let b = list.allocate(64);
        let c = list.allocate(64);
        assert_eq!(list.block_count(), 4);
        // SAFETY: each pointer freed once with its allocation size.
        unsafe {
            list.free(a, 64);
            list.free(c, 64);
            assert_eq!(list.free_block_count(), 2, "c merged with the tail remainder");
            list.free(b, 64);
        }
        assert_eq!(list.block_count(), 1);
        assert_eq!(list.free_block_count(), 1);
        assert!(list.stats().coalesces >= 3);
    }

    #[test]
    fn coalesced_block_serves_larger_request_without_new_extent() {
        let list = small_list();
        let a = list.allocate(200);
        let b = list.allocate(200);
        let guard = list.allocate(200);
        // SAFETY: freed once each with their allocation sizes.
        unsafe {
            list.free(a, 200);
            list.free(b, 200);
        }
        let big = list.allocate(400);
        assert_eq!(big, a);
        assert_eq!(list.extent_count(), 1);
        // SAFETY: freed once each with their allocation sizes.
        unsafe {
            list.free(big, 400);
            list.free(guard, 200);
        }
    }

    #[test]
    fn blocks_in_different_extents_do_not_merge() {
        let list = small_list();
        let a = list.allocate(900);
        let b = list.allocate(900);
        assert_eq!(list.extent_count(), 2);
        // SAFETY: freed once each with their allocation sizes.
        unsafe {
            list.free(a, 900);
            list.free(b, 900);
        }
        assert_eq!(list.free_block_count(), 2);
    }

    // ── Growth ────────────────────────────────────────────────

    #[test]
    fn oversized_request_gets_dedicated_extent() {
        let list = small_list();
        let p = list.allocate(10_000);
        assert_eq!(list.extent_count(), 1);
        assert!(list.primary().live_bytes() >= 10_000 + HEADER_SIZE);
        // SAFETY: allocated above with size 10_000.
        unsafe { list.free(p, 10_000) };
    }

    #[test]
    fn drop_returns_every_extent() {
        let primary = TrackingAllocator::new(SystemAllocator);
        {
            let list =
                FreeListAllocator::with_config(FreeListConfig { extent_size: 512 }, &primary)
                    .unwrap();
            let ptrs: Vec<_> = (0..8).map(|_| list.allocate(200)).collect();
            assert!(primary.live_allocations() > 1);
            for p in ptrs {
                // SAFETY: each pointer freed once with size 200.
                unsafe { list.free(p, 200) };
            }
        }
        assert_eq!(primary.live_allocations(), 0);
    }

    // ── Contract violations ───────────────────────────────────

    #[test]
    #[should_panic(expected = "outstanding allocation")]
    fn drop_with_live_block_panics() {
        let list = FreeListAllocator::new();
        list.allocate(32);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn double_free_panics() {
        let list = FreeListAllocator::new();
        let keep = list.allocate(32);
        let p = list.allocate(32);
        // SAFETY: the second free is the violation under test.
        unsafe {
            list.free(p, 32);
            list.free(p, 32);
        }
        let _ = keep;
    }

    #[test]
    #[should_panic(expected = "not owned")]
    fn foreign_pointer_panics() {
        let list = FreeListAllocator::new();
        let keep = list.allocate(32);
        let foreign = SystemAllocator.allocate(32);
        // SAFETY: deliberately violates the ownership contract.
        unsafe { list.free(foreign, 32) };
        let _ = keep;
    }

    #[test]
    #[should_panic(expected = "size 0")]
    fn zero_size_panics() {
        FreeListAllocator::new().allocate(0);
    }

    proptest! {
        #[test]
        fn allocate_free_all_leaves_no_outstanding(
            sizes in prop::collection::vec(1usize..600, 1..40),
            order in any::<u64>(),
        ) {
            let list = small_list();
            let mut live: Vec<(NonNull<u8>, usize)> =
                sizes.iter().map(|&s| (list.allocate(s), s)).collect();

            // Payloads never overlap.
            let mut spans: Vec<(usize, usize)> =
                live.iter().map(|(p, s)| (p.as_ptr() as usize, *s)).collect();
            spans.sort_unstable();
            for w in spans.windows(2) {
                prop_assert!(w[0].0 + w[0].1 <= w[1].0);
            }

            // Free in a scrambled order.
            let mut seed = order;
            while !live.is_empty() {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                let i = (seed >> 33) as usize % live.len();
                let (p, s) = live.swap_remove(i);
                // SAFETY: each pointer is freed exactly once with its size.
                unsafe { list.free(p, s) };
            }
            prop_assert_eq!(list.outstanding(), 0);
            prop_assert_eq!(list.free_block_count(), list.extent_count());
            prop_assert_eq!(list.block_count(), list.extent_count());
        }
    }
}

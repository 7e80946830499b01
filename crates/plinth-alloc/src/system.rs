//! Passthrough allocator over the global heap.

use std::ptr::NonNull;

use crate::allocator::{assert_nonzero, Allocator};
use crate::raw;

/// Forwards directly to the global heap.
///
/// The ultimate fallback of every layered allocator and the allocator for
/// administrative memory. Heap exhaustion here is fatal: there is no
/// further fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Create the passthrough allocator.
    pub const fn new() -> Self {
        Self
    }
}

// SAFETY: `raw::heap_alloc` returns a fresh heap block of `size` bytes
// aligned to MAX_ALIGN, valid until `free`.
unsafe impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        assert_nonzero(size, "allocate");
        raw::heap_alloc(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        assert_nonzero(size, "free");
        // SAFETY: the caller guarantees `ptr` came from `allocate` on a
        // `SystemAllocator` (i.e. `heap_alloc`) with the same size.
        unsafe { raw::heap_free(ptr, size) }
    }
}

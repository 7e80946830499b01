//! Low-level primitives for allocator memory operations.
//!
//! Heap calls, pointer offsetting, and the `Send`/`Sync` assertions for
//! extents are concentrated here so the allocator modules read as plain
//! bookkeeping. Each `unsafe` block carries a `SAFETY:` comment.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::allocator::MAX_ALIGN;

/// Heap layout for a Plinth allocation of `size` bytes.
///
/// # Panics
///
/// Panics if `size` rounded up to [`MAX_ALIGN`] overflows `isize`.
pub(crate) fn layout_for(size: usize) -> Layout {
    match Layout::from_size_align(size, MAX_ALIGN) {
        Ok(layout) => layout,
        Err(_) => panic!("allocation of {size} bytes exceeds the address space"),
    }
}

/// Allocate `size > 0` bytes from the global heap.
pub(crate) fn heap_alloc(size: usize) -> NonNull<u8> {
    let layout = layout_for(size);
    // SAFETY: `layout` has non-zero size (callers assert `size > 0`) and a
    // valid power-of-two alignment.
    let ptr = unsafe { alloc::alloc(layout) };
    match NonNull::new(ptr) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Return memory to the global heap.
///
/// # Safety
///
/// `ptr` must come from [`heap_alloc`] with the same `size`, and must not
/// have been released already.
pub(crate) unsafe fn heap_free(ptr: NonNull<u8>, size: usize) {
    // SAFETY: the caller guarantees `ptr` was allocated by `heap_alloc`
    // with `layout_for(size)`.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout_for(size)) }
}

/// A contiguous extent obtained from a primary allocator.
///
/// The extent is owned exclusively by the allocator that requested it;
/// the raw base pointer is never shared outside of that owner's lock (or
/// its `!Sync` cell).
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawExtent {
    base: NonNull<u8>,
    size: usize,
}

// SAFETY: a `RawExtent` is an owned region of heap memory with no
// thread affinity. Ownership moves with the allocator holding it, and all
// access to its contents is serialized by that allocator.
unsafe impl Send for RawExtent {}
// SAFETY: shared references only expose the address and size, never the
// contents.
unsafe impl Sync for RawExtent {}

impl RawExtent {
    pub(crate) fn new(base: NonNull<u8>, size: usize) -> Self {
        Self { base, size }
    }

    pub(crate) fn base(&self) -> NonNull<u8> {
        self.base
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// `ptr` lies inside `[base, base + size)`.
    pub(crate) fn contains(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as usize;
        addr >= self.base_addr() && addr - self.base_addr() < self.size
    }

    /// Pointer `offset` bytes past the base.
    ///
    /// # Panics
    ///
    /// Panics if `offset > size`.
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.size, "offset {offset} beyond extent of {} bytes", self.size);
        // SAFETY: `offset <= size`, so the result stays within (or one past
        // the end of) the same allocated object and cannot wrap to null.
        unsafe { self.base.add(offset) }
    }
}

/// Pointer `delta` bytes before `ptr`.
///
/// # Safety
///
/// `ptr - delta` must lie within the same allocated object as `ptr`.
pub(crate) unsafe fn step_back(ptr: NonNull<u8>, delta: usize) -> NonNull<u8> {
    // SAFETY: guaranteed in-bounds by the caller.
    unsafe { ptr.sub(delta) }
}

/// Pointer `delta` bytes after `ptr`.
///
/// # Safety
///
/// `ptr + delta` must lie within (or one past) the same allocated object.
pub(crate) unsafe fn step_forward(ptr: NonNull<u8>, delta: usize) -> NonNull<u8> {
    // SAFETY: guaranteed in-bounds by the caller.
    unsafe { ptr.add(delta) }
}

/// Read a `T` stored at `ptr`.
///
/// # Safety
///
/// `ptr` must be aligned and point to an initialized `T` inside a live
/// extent.
pub(crate) unsafe fn read<T: Copy>(ptr: NonNull<T>) -> T {
    // SAFETY: guaranteed by the caller.
    unsafe { ptr.as_ptr().read() }
}

/// Store `value` at `ptr`, overwriting without dropping.
///
/// # Safety
///
/// `ptr` must be aligned and valid for writes of `T` inside a live extent.
pub(crate) unsafe fn write<T>(ptr: NonNull<T>, value: T) {
    // SAFETY: guaranteed by the caller.
    unsafe { ptr.as_ptr().write(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_alloc_is_aligned() {
        let ptr = heap_alloc(24);
        assert_eq!(ptr.as_ptr() as usize % MAX_ALIGN, 0);
        // SAFETY: allocated just above with the same size.
        unsafe { heap_free(ptr, 24) };
    }

    #[test]
    fn extent_contains_is_half_open() {
        let base = heap_alloc(64);
        let extent = RawExtent::new(base, 64);
        assert!(extent.contains(extent.at(0)));
        assert!(extent.contains(extent.at(63)));
        assert!(!extent.contains(extent.at(64)));
        // SAFETY: allocated above with size 64.
        unsafe { heap_free(base, 64) };
    }

    #[test]
    #[should_panic(expected = "beyond extent")]
    fn at_rejects_out_of_range_offset() {
        let base = heap_alloc(16);
        let extent = RawExtent::new(base, 16);
        let _ = extent.at(17);
    }
}

//! The [`Allocator`] capability trait.

use std::ptr::NonNull;
use std::sync::Arc;

/// Alignment of every pointer returned by a Plinth allocator.
///
/// Large enough for any `f32`/`f64`/SIMD-lane aggregate the kernel stores.
pub const MAX_ALIGN: usize = 16;

/// Round `size` up to the next multiple of `align` (a power of two).
pub const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

/// Memory capability consumed by shapes, containers, and layered
/// allocators.
///
/// This is the only interface through which the kernel touches memory.
/// Implementations use interior mutability, so the methods take `&self`
/// and an allocator can be shared by reference.
///
/// # Safety
///
/// Callers write values through the returned pointers without further
/// checks, so an implementation must guarantee that every pointer
/// returned by `allocate(size)`:
///
/// - is aligned to [`MAX_ALIGN`];
/// - is valid for reads and writes of `size` bytes;
/// - does not overlap any other live allocation from this allocator;
/// - stays valid until it is passed to [`free`](Self::free), or until
///   the allocator is dropped or mutably borrowed.
///
/// A safe implementation cannot make these promises:
///
/// ```compile_fail
/// use std::ptr::NonNull;
/// use plinth_alloc::Allocator;
///
/// struct Dangling;
///
/// impl Allocator for Dangling {
///     fn allocate(&self, _size: usize) -> NonNull<u8> {
///         NonNull::dangling()
///     }
///     unsafe fn free(&self, _ptr: NonNull<u8>, _size: usize) {}
/// }
/// ```
pub unsafe trait Allocator {
    /// Allocate `size` bytes aligned to [`MAX_ALIGN`].
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`. Aborts via
    /// [`std::alloc::handle_alloc_error`] if the system heap is exhausted.
    fn allocate(&self, size: usize) -> NonNull<u8>;

    /// Return memory previously obtained from [`allocate`](Self::allocate).
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this same allocator
    /// with the same `size`, must not have been freed already, and must not
    /// be used after this call.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize);
}

// SAFETY: forwards to `A`, which upholds the contract.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        (**self).allocate(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        unsafe { (**self).free(ptr, size) }
    }
}

// SAFETY: forwards to `A`, which upholds the contract.
unsafe impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        (**self).allocate(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        unsafe { (**self).free(ptr, size) }
    }
}

/// Enforce the `size > 0` precondition shared by every implementation.
#[track_caller]
pub(crate) fn assert_nonzero(size: usize, op: &str) {
    assert!(size > 0, "{op} called with size 0 (contract violation)");
}

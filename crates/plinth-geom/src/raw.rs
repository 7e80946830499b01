//! Placement of values in allocator memory.
//!
//! This is the only module in the crate allowed to use `unsafe`.
//! [`AllocBox`] is a minimal owning pointer into memory served by a
//! [`plinth_alloc::Allocator`]: it writes the value on creation, and on
//! drop runs the value's destructor and frees the bytes through the same
//! allocator.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ops::Deref;
use std::ptr::NonNull;

use plinth_alloc::{Allocator, MAX_ALIGN};

pub(crate) struct AllocBox<'a, T, A: Allocator> {
    ptr: NonNull<T>,
    allocator: &'a A,
    _owns: PhantomData<T>,
}

impl<'a, T, A: Allocator> AllocBox<'a, T, A> {
    pub(crate) fn new(allocator: &'a A, value: T) -> Self {
        const { assert!(size_of::<T>() > 0 && align_of::<T>() <= MAX_ALIGN) };
        let ptr = allocator.allocate(size_of::<T>()).cast::<T>();
        // SAFETY: by the `Allocator` contract the pointer is valid for
        // `size_of::<T>()` bytes and aligned to MAX_ALIGN, which satisfies
        // `T`'s alignment.
        unsafe { ptr.as_ptr().write(value) };
        Self {
            ptr,
            allocator,
            _owns: PhantomData,
        }
    }

    pub(crate) fn allocator(&self) -> &'a A {
        self.allocator
    }

    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl<T, A: Allocator> Deref for AllocBox<'_, T, A> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: `ptr` holds an initialized `T` until drop.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T, A: Allocator> Drop for AllocBox<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: the value was written in `new` and is dropped exactly
        // once; the bytes came from `self.allocator` with this size.
        unsafe {
            self.ptr.as_ptr().drop_in_place();
            self.allocator
                .free(self.ptr.cast::<u8>(), size_of::<T>());
        }
    }
}

// SAFETY: `AllocBox` owns its `T` like a `Box`. Moving it to another
// thread moves the `T` and lets that thread free through `&A`, which
// requires `A: Sync`.
unsafe impl<T: Send, A: Allocator + Sync> Send for AllocBox<'_, T, A> {}
// SAFETY: shared access only exposes `&T` and `&A`.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for AllocBox<'_, T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_alloc::{SystemAllocator, TrackingAllocator};
    use std::cell::Cell;

    struct DropFlag<'a>(&'a Cell<bool>);

    impl Drop for DropFlag<'_> {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn value_is_dropped_and_memory_returned() {
        let tracker = TrackingAllocator::new(SystemAllocator);
        let dropped = Cell::new(false);
        {
            let boxed = AllocBox::new(&tracker, DropFlag(&dropped));
            assert_eq!(boxed.addr() % MAX_ALIGN, 0);
            assert_eq!(tracker.live_allocations(), 1);
        }
        assert!(dropped.get());
        assert_eq!(tracker.live_allocations(), 0);
    }
}

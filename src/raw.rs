#![allow(unsafe_code)]

//! The owned heap block behind a [`DynamicArray`](crate::DynamicArray).
//!
//! `RawBuffer<T>` only knows about memory: it allocates `capacity` slots of
//! `T`, hands out a pointer to them and frees them exactly once when dropped.
//! It never reads, writes or drops elements; tracking which slots are live is
//! the array's job.

use alloc::alloc::{Layout, alloc, dealloc};
use core::{marker::PhantomData, ptr::NonNull};

use crate::error::TryReserveError;

pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    phantom: PhantomData<T>,
}

// SAFETY: RawBuffer uniquely owns its allocation, like `Box<[T]>`.
unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    /// A buffer with no slots and no allocation.
    pub(crate) const fn dangling() -> Self {
        RawBuffer {
            ptr: NonNull::dangling(),
            cap: 0,
            phantom: PhantomData,
        }
    }

    /// Allocates room for exactly `cap` elements.
    ///
    /// Nothing is allocated for `cap == 0` or for zero-sized `T`, but `cap` is
    /// still reported back by [`capacity`](Self::capacity).
    pub(crate) fn try_allocate(cap: usize) -> Result<Self, TryReserveError> {
        if cap == 0 {
            return Ok(Self::dangling());
        }

        let layout = Layout::array::<T>(cap).map_err(|_| TryReserveError::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(RawBuffer {
                ptr: NonNull::dangling(),
                cap,
                phantom: PhantomData,
            });
        }

        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        let ptr = NonNull::new(ptr.cast::<T>()).ok_or(TryReserveError::AllocError { layout })?;

        Ok(RawBuffer {
            ptr,
            cap,
            phantom: PhantomData,
        })
    }

    pub(crate) fn allocate(cap: usize) -> Self {
        Self::try_allocate(cap).unwrap_or_else(|err| err.handle())
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// The layout this buffer was allocated with, if it owns an allocation.
    fn allocated_layout(&self) -> Option<Layout> {
        if self.cap == 0 {
            return None;
        }
        // Cannot fail: the same layout was computed successfully in `try_allocate`.
        let layout = Layout::array::<T>(self.cap).ok()?;
        (layout.size() != 0).then_some(layout)
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.allocated_layout() {
            // SAFETY: ptr was returned by `alloc` with exactly this layout and is
            // freed nowhere else.
            unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), layout) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_has_no_capacity() {
        let buf = RawBuffer::<u32>::dangling();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.allocated_layout(), None);
    }

    #[test]
    fn test_allocate_exact_capacity() {
        let buf = RawBuffer::<u64>::allocate(10);
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.allocated_layout(), Some(Layout::array::<u64>(10).unwrap()));
        assert_eq!(buf.as_ptr() as usize % core::mem::align_of::<u64>(), 0);
    }

    #[test]
    fn test_zero_sized_never_allocates() {
        let buf = RawBuffer::<()>::allocate(usize::MAX);
        assert_eq!(buf.capacity(), usize::MAX);
        assert_eq!(buf.allocated_layout(), None);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = RawBuffer::<u64>::try_allocate(usize::MAX).err();
        assert_eq!(err, Some(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn test_slots_are_writable() {
        let buf = RawBuffer::<u16>::allocate(4);
        unsafe {
            for i in 0..4 {
                buf.as_ptr().add(i).write(i as u16 * 3);
            }
            assert_eq!(core::slice::from_raw_parts(buf.as_ptr(), 4), &[0, 3, 6, 9]);
        }
    }
}

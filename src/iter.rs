#![allow(unsafe_code)]

//! [`IntoIter`], the consuming iterator of a [`DynamicArray`](crate::DynamicArray).

use core::{fmt, iter::FusedIterator, ptr, slice};

use crate::raw::RawBuffer;

/// Consuming iterator over a [`DynamicArray`](crate::DynamicArray).
///
/// Elements in `[head, tail)` are still owned by the iterator. Whatever is left
/// when it is dropped gets dropped with it, then the buffer is freed.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    head: usize,
    tail: usize,
}

impl<T> IntoIter<T> {
    /// `buf` must hold `len` live elements at its start.
    pub(crate) fn new(buf: RawBuffer<T>, len: usize) -> Self {
        debug_assert!(len <= buf.capacity());
        IntoIter {
            buf,
            head: 0,
            tail: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [head, tail) are live.
        unsafe {
            let head = self.buf.as_ptr().add(self.head);
            slice::from_raw_parts(head, self.tail - self.head)
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }

        // SAFETY: `head` is live; advancing past it hands ownership to the caller.
        let value = unsafe { self.buf.as_ptr().add(self.head).read() };
        self.head += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tail - self.head;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }

        self.tail -= 1;
        // SAFETY: `tail` was live and is now outside the remaining range.
        Some(unsafe { self.buf.as_ptr().add(self.tail).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: [head, tail) were never yielded. `buf` frees the memory after.
        unsafe {
            let remaining =
                ptr::slice_from_raw_parts_mut(self.buf.as_ptr().add(self.head), self.tail - self.head);
            ptr::drop_in_place(remaining);
        }
    }
}

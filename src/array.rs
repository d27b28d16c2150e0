#![allow(unsafe_code)]

use alloc::vec::Vec;
use core::{
    fmt,
    hash::{Hash, Hasher},
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut, Range},
    ptr, slice,
};

use crate::{SPARE_CAPACITY, error::TryReserveError, iter::IntoIter, raw::RawBuffer};

/// A growable, contiguous array that owns its elements.
///
/// Slots `[0, len)` hold live elements. Slots `[len, capacity)` are allocated
/// but uninitialized. The array is the only owner of its buffer: cloning
/// deep-copies into a fresh buffer, and moving out with [`take`](Self::take)
/// or [`move_assign`](Self::move_assign) hands the buffer over without
/// copying elements.
///
/// # Growth policy
///
/// - [`new`](Self::new) and [`with_size`](Self::with_size) leave
///   [`SPARE_CAPACITY`] empty slots for the first pushes.
/// - [`push`](Self::push) on a full array reserves `2 * capacity + 1` slots.
/// - [`resize`](Self::resize) past the capacity reserves `2 * new_size` slots.
/// - [`reserve`](Self::reserve) allocates exactly what it is asked for.
///
/// # Access
///
/// `DynamicArray<T>` dereferences to `[T]`, so indexing, `get`, `iter`,
/// `iter_mut` and friends are the slice ones. Plain indexing panics on an
/// out-of-range index. The unchecked path is
/// `get_unchecked`, where an out-of-range index is
/// undefined behavior.
///
/// # Iterator validity
///
/// Borrowing iterators cannot outlive a mutation, the borrow checker sees to
/// that. The raw markers returned by [`as_ptr_range`](Self::as_ptr_range) and
/// [`as_mut_ptr_range`](Self::as_mut_ptr_range) are not tracked: any
/// `reserve`, `resize`, growing `push`, `pop` or `remove_last` invalidates
/// them, and dereferencing a stale marker is undefined behavior.
///
/// # Example
///
/// ```
/// use dynarray::DynamicArray;
///
/// let mut array = DynamicArray::new();
/// array.push(5);
/// array.push(7);
/// array.push(9);
/// assert_eq!(array, [5, 7, 9]);
///
/// array.remove_last();
/// assert_eq!(*array.back(), 7);
///
/// array.reserve(100);
/// assert_eq!(array.capacity(), 100);
/// assert_eq!(array, [5, 7]);
/// ```
pub struct DynamicArray<T> {
    buf: RawBuffer<T>,
    len: usize,
}

static_assertions::assert_eq_size!(DynamicArray<u64>, [usize; 3]);
static_assertions::assert_eq_size!(Option<DynamicArray<u64>>, [usize; 3]);
static_assertions::assert_impl_all!(DynamicArray<u64>: Send, Sync);
static_assertions::assert_not_impl_any!(DynamicArray<core::cell::Cell<u8>>: Sync);
static_assertions::assert_not_impl_any!(DynamicArray<alloc::rc::Rc<u8>>: Send, Sync);

impl<T> DynamicArray<T> {
    /// Number of empty slots [`new`](Self::new) and [`with_size`](Self::with_size)
    /// allocate on top of the requested size.
    pub const SPARE_CAPACITY: usize = SPARE_CAPACITY;

    /// An empty array with room for [`SPARE_CAPACITY`] elements.
    pub fn new() -> Self {
        Self::with_capacity(SPARE_CAPACITY)
    }

    /// An empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        DynamicArray {
            buf: RawBuffer::allocate(capacity),
            len: 0,
        }
    }

    /// An array holding `size` default values, with [`SPARE_CAPACITY`] extra
    /// slots.
    pub fn with_size(size: usize) -> Self
    where
        T: Default,
    {
        let capacity = size
            .checked_add(SPARE_CAPACITY)
            .unwrap_or_else(|| TryReserveError::CapacityOverflow.handle());
        let mut array = Self::with_capacity(capacity);
        array.fill_with(size, T::default);
        array
    }

    /// An array with no capacity and no allocation.
    ///
    /// This is the state [`take`](Self::take) leaves behind.
    pub const fn unallocated() -> Self {
        DynamicArray {
            buf: RawBuffer::dangling(),
            len: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Moves the contents out, leaving `self` [unallocated](Self::unallocated).
    ///
    /// No element is copied: the buffer, length and capacity change hands.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::unallocated())
    }

    /// Exchanges buffers, lengths and capacities with `other`.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Move-assigns `rhs` into `self` by exchanging their state.
    ///
    /// The buffer `self` held before is not released here. It now belongs to
    /// `rhs` and is released when `rhs` is dropped or reassigned. Use
    /// `*self = rhs.take()` to release it immediately instead.
    pub fn move_assign(&mut self, rhs: &mut Self) {
        self.swap_with(rhs);
    }

    /// Reallocates to exactly `new_capacity` slots, moving the live elements
    /// over.
    ///
    /// Requests below [`len`](Self::len) are ignored. The request may shrink
    /// the buffer as long as every live element still fits.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `isize::MAX` bytes. Allocation
    /// failure aborts through [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(err) = self.try_reserve(new_capacity) {
            err.handle();
        }
    }

    /// Fallible [`reserve`](Self::reserve).
    ///
    /// On error the array is left exactly as it was: the old buffer is only
    /// released once the new one exists.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        if new_capacity < self.len {
            tracing::trace!(new_capacity, len = self.len, "Ignoring reserve below length");
            return Ok(());
        }

        let new_buf = RawBuffer::try_allocate(new_capacity).inspect_err(|err| {
            tracing::debug!(error = %err, new_capacity, "Reservation failed");
        })?;

        tracing::trace!(
            old_capacity = self.capacity(),
            new_capacity,
            len = self.len,
            "Reallocating buffer"
        );

        // SAFETY: both buffers have at least `len` slots and are distinct
        // allocations. The old slots are treated as uninitialized afterwards,
        // and dropping a RawBuffer only frees memory.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.len);
        }
        self.buf = new_buf;
        Ok(())
    }

    /// Reallocates so that `capacity() == len()`.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            self.reserve(self.len);
        }
    }

    /// Sets the length to `new_size`, filling new slots with `T::default()`.
    ///
    /// If `new_size` exceeds the capacity, the buffer first grows to
    /// `2 * new_size`. Shrinking drops the elements past `new_size` and keeps
    /// the capacity.
    pub fn resize(&mut self, new_size: usize)
    where
        T: Default,
    {
        self.resize_with(new_size, T::default);
    }

    /// Like [`resize`](Self::resize), filling new slots with `f()`.
    pub fn resize_with<F>(&mut self, new_size: usize, f: F)
    where
        F: FnMut() -> T,
    {
        if new_size > self.capacity() {
            let new_capacity = new_size
                .checked_mul(2)
                .unwrap_or_else(|| TryReserveError::CapacityOverflow.handle());
            self.reserve(new_capacity);
        }

        if new_size > self.len {
            self.fill_with(new_size, f);
        } else {
            self.truncate(new_size);
        }
    }

    /// Drops every element past `new_len`. Does nothing if `new_len >= len()`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }

        // SAFETY: [new_len, len) are live. `len` is updated first so a panicking
        // destructor leaks the rest of the tail rather than dropping it twice.
        unsafe {
            let tail =
                ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(new_len), self.len - new_len);
            self.len = new_len;
            ptr::drop_in_place(tail);
        }
    }

    /// Drops every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Appends `value`, growing to `2 * capacity + 1` slots when full.
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_for_push();
        }

        // SAFETY: len < capacity after growing.
        unsafe {
            self.as_mut_ptr().add(self.len).write(value);
        }
        self.len += 1;
    }

    /// Appends a clone of `value`.
    pub fn push_cloned(&mut self, value: &T)
    where
        T: Clone,
    {
        self.push(value.clone());
    }

    /// Appends clones of every element of `values`, in order.
    pub fn extend_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.reserve_for(values.len());
        for value in values {
            self.push(value.clone());
        }
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range.
        Some(unsafe { self.as_ptr().add(self.len).read() })
    }

    /// Drops the last element.
    ///
    /// The array must not be empty. This is asserted in debug builds and
    /// with the `checked` feature; otherwise the call does nothing on an empty
    /// array.
    #[track_caller]
    pub fn remove_last(&mut self) {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(self.len > 0, "remove_last on an empty DynamicArray");
        }
        self.truncate(self.len.saturating_sub(1));
    }

    /// The last live element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        match self.as_slice().last() {
            Some(value) => value,
            None => panic!("back on an empty DynamicArray"),
        }
    }

    /// Mutable [`back`](Self::back).
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        match self.as_mut_slice().last_mut() {
            Some(value) => value,
            None => panic!("back_mut on an empty DynamicArray"),
        }
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) are live and the pointer is non-null and aligned.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Begin and end markers of the live range: `start` points at index 0 and
    /// `end` one past index `len - 1`. Slots past `len` are never covered.
    ///
    /// The markers are invalidated by every operation that reallocates or
    /// changes the length.
    pub fn as_ptr_range(&self) -> Range<*const T> {
        let start = self.as_ptr();
        // SAFETY: `len` slots fit in the allocation, so `start + len` is at most
        // one past its end.
        let end = unsafe { start.add(self.len) };
        start..end
    }

    /// Mutable [`as_ptr_range`](Self::as_ptr_range).
    pub fn as_mut_ptr_range(&mut self) -> Range<*mut T> {
        let start = self.as_mut_ptr();
        // SAFETY: see `as_ptr_range`.
        let end = unsafe { start.add(self.len) };
        start..end
    }

    #[cold]
    fn grow_for_push(&mut self) {
        self.reserve(self.doubled_capacity());
    }

    /// `2 * capacity + 1`, the growth step shared by every append path.
    fn doubled_capacity(&self) -> usize {
        self.capacity()
            .checked_mul(2)
            .and_then(|cap| cap.checked_add(1))
            .unwrap_or_else(|| TryReserveError::CapacityOverflow.handle())
    }

    /// Makes room for `additional` more elements in one reallocation, growing
    /// at least as fast as `push` so repeated bulk appends stay amortized O(1).
    fn reserve_for(&mut self, additional: usize) {
        let needed = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| TryReserveError::CapacityOverflow.handle());
        if needed > self.capacity() {
            self.reserve(needed.max(self.doubled_capacity()));
        }
    }

    /// Pushes `f()` until the length reaches `new_len`. The capacity must
    /// already be large enough.
    fn fill_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        debug_assert!(new_len <= self.capacity());
        while self.len < new_len {
            // SAFETY: len < new_len <= capacity. `len` only grows after the
            // write, so a panicking `f` leaves the array consistent.
            unsafe {
                self.as_mut_ptr().add(self.len).write(f());
            }
            self.len += 1;
        }
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: [0, len) are live and dropped exactly once here. The buffer
        // field frees the memory afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Deep copy into a fresh buffer of the same capacity.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.capacity());
        // Never reallocates: the capacity matches and len <= capacity. If a
        // clone panics, `copy` drops the prefix written so far.
        for value in self.as_slice() {
            copy.push(value.clone());
        }
        copy
    }

    /// Copy-and-swap: the old buffer goes away with the temporary.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap_with(&mut copy);
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_for(lower);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(values: &[T]) -> Self {
        let mut array = Self::new();
        array.extend_from_slice(values);
        array
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        // The iterator takes over the live elements, so the array's own Drop
        // must not run.
        let mut this = ManuallyDrop::new(self);
        let buf = mem::replace(&mut this.buf, RawBuffer::dangling());
        IntoIter::new(buf, this.len)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.as_mut_slice().iter_mut()
    }
}

//! DynamicArray: a growable contiguous array with explicit capacity control.
//!
//! [`DynamicArray<T>`] owns a single heap buffer of `capacity` slots, the first
//! `len` of which hold live elements. It provides:
//!
//! - **Amortized O(1) push**: a full array grows to `2 * capacity + 1` slots
//! - **Spare capacity up front**: [`DynamicArray::new`] leaves [`SPARE_CAPACITY`]
//!   free slots so the first pushes never reallocate
//! - **Manual capacity control**: [`DynamicArray::reserve`] allocates exactly what
//!   it is asked for, and silently ignores requests below the current length
//! - **Value semantics**: `clone` deep-copies into a fresh buffer,
//!   [`DynamicArray::take`] and [`DynamicArray::move_assign`] hand the buffer over
//!   without touching elements
//!
//! # Example
//!
//! ```
//! use dynarray::{DynamicArray, SPARE_CAPACITY};
//!
//! let mut array = DynamicArray::new();
//! assert_eq!(array.capacity(), SPARE_CAPACITY);
//!
//! for i in 0..20 {
//!     array.push(i);
//! }
//! assert_eq!(array.len(), 20);
//! assert_eq!(array.capacity(), 2 * SPARE_CAPACITY + 1);
//!
//! let copy = array.clone();
//! array.resize(5);
//! assert_eq!(array, [0, 1, 2, 3, 4]);
//! assert_eq!(copy.len(), 20);
//! ```
//!
//! # Gotchas
//!
//! - **Preconditions are not errors**: [`DynamicArray::remove_last`] on an empty
//!   array is a contract violation. Debug builds (and the `checked` feature)
//!   assert; release builds do nothing.
//! - **Raw markers go stale**: pointers from [`DynamicArray::as_ptr_range`] are
//!   invalidated by anything that reallocates or changes the length.
//! - **Allocation failure aborts**: only [`DynamicArray::try_reserve`] reports it
//!   as a [`TryReserveError`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod array;
mod error;
mod iter;
mod raw;

pub use array::DynamicArray;
pub use error::TryReserveError;
pub use iter::IntoIter;

/// Free slots allocated on top of the requested size at construction.
pub const SPARE_CAPACITY: usize = 16;

//! Allocation errors reported by [`DynamicArray::try_reserve`].
//!
//! [`DynamicArray::try_reserve`]: crate::DynamicArray::try_reserve

use core::alloc::Layout;

use thiserror::Error;

/// The reasons a reservation can fail.
///
/// Only the fallible entry points return this. Every other growth path turns
/// [`CapacityOverflow`](Self::CapacityOverflow) into a panic and
/// [`AllocError`](Self::AllocError) into [`handle_alloc_error`], the same way
/// `alloc::vec::Vec` does.
///
/// [`handle_alloc_error`]: alloc::alloc::handle_alloc_error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested capacity does not fit in a valid `Layout`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator returned null for this layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError { layout: Layout },
}

impl TryReserveError {
    /// Diverges the way the infallible growth paths do.
    #[cold]
    pub(crate) fn handle(self) -> ! {
        match self {
            TryReserveError::CapacityOverflow => panic!("capacity overflow"),
            TryReserveError::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}

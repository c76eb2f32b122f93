//! The block allocation capability consumed by the stack
//!
//! The container acquires and releases whole storage blocks, counted in
//! `T`-sized slots, and never asks its allocator for anything else — no
//! in-place resize, no per-element allocation. That keeps the strategy
//! swappable per instantiation while staying a leaf dependency: the
//! container's growth logic never inspects how blocks are produced.
//!
//! # Safety
//!
//! `BlockAllocator` is an unsafe trait. Implementors promise:
//! - `acquire_block` returns a pointer valid for reads and writes of
//!   `slots` values of `T`, aligned for `T`, exclusively owned by the
//!   caller until released
//! - Zero-byte requests (zero slots, or zero-sized `T`) yield the dangling
//!   sentinel without touching any real allocation, and releasing such a
//!   block is a no-op
//! - `release_block` invalidates the pointer; double release or releasing
//!   with a mismatched slot count is undefined behavior

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::{StackError, StackResult};

/// Block allocation strategy: reserve and release contiguous uninitialized
/// `T`-slot storage.
///
/// Memory returned by [`acquire_block`](Self::acquire_block) is
/// uninitialized; the caller constructs and destroys elements in place and
/// must return the block via [`release_block`](Self::release_block) with
/// the exact slot count it was acquired with.
///
/// A blanket implementation forwards through `&A`, so a strategy can be
/// shared by reference (e.g. one [`CountingAllocator`] observed by a test
/// while several stacks allocate through it).
///
/// [`CountingAllocator`]: super::CountingAllocator
///
/// # Safety
/// Implementors must uphold the module-level contract: valid, aligned,
/// exclusively owned blocks; dangling sentinel for zero-byte requests;
/// release invalidates.
pub unsafe trait BlockAllocator {
    /// Reserves a contiguous block of `slots` uninitialized `T` values.
    ///
    /// # Safety
    /// - The returned memory is uninitialized and must be initialized
    ///   before any read
    /// - The block must later be released through this allocator with the
    ///   same `slots` count
    ///
    /// # Errors
    /// - [`StackError::AllocationFailed`] if the underlying storage cannot
    ///   be reserved
    /// - [`StackError::CapacityOverflow`] if `slots * size_of::<T>()`
    ///   exceeds the address-space limit
    unsafe fn acquire_block<T>(&self, slots: usize) -> StackResult<NonNull<T>>;

    /// Releases a block previously obtained from [`acquire_block`].
    ///
    /// All elements must already be destroyed; this returns raw storage
    /// only.
    ///
    /// # Safety
    /// - `block` must have been returned by `acquire_block::<T>` on this
    ///   allocator with this exact `slots` count
    /// - `block` must not be used after this call
    /// - Zero-byte blocks (zero `slots`, or zero-sized `T`) are ignored
    ///
    /// [`acquire_block`]: Self::acquire_block
    unsafe fn release_block<T>(&self, block: NonNull<T>, slots: usize);
}

/// Computes the byte layout for a block of `slots` values of `T`.
///
/// Returns a capacity-overflow error when the total byte size would exceed
/// `isize::MAX` (the `Layout::array` limit).
#[inline]
pub(crate) fn block_layout<T>(slots: usize) -> StackResult<Layout> {
    Layout::array::<T>(slots).map_err(|_| StackError::capacity_overflow("block layout"))
}

// ============================================================================
// Blanket implementation for references
// ============================================================================

// SAFETY: Forwarding every call to the underlying `A: BlockAllocator`.
// - No new unsafe operations introduced
// - All safety contracts preserved through delegation
// - `**self` dereference is always safe for `&A`
unsafe impl<A: BlockAllocator + ?Sized> BlockAllocator for &A {
    unsafe fn acquire_block<T>(&self, slots: usize) -> StackResult<NonNull<T>> {
        // SAFETY: Same contract as A::acquire_block, forwarded unchanged.
        unsafe { (**self).acquire_block(slots) }
    }

    unsafe fn release_block<T>(&self, block: NonNull<T>, slots: usize) {
        // SAFETY: Same contract as A::release_block, forwarded unchanged.
        unsafe { (**self).release_block(block, slots) }
    }
}

//! System allocator implementation
//!
//! Provides the default block source: the platform's global allocator via
//! `std::alloc::System`. This is what every stack uses unless a different
//! strategy is injected.

use core::alloc::GlobalAlloc;
use core::ptr::NonNull;
use std::alloc::System;

use super::traits::{BlockAllocator, block_layout};
use crate::error::{StackError, StackResult};

/// Wrapper for the system's default allocator
///
/// Delegates block requests to the platform allocator (glibc malloc,
/// HeapAlloc, libsystem_malloc, ...) while translating failures into the
/// crate's error type.
///
/// # Performance
/// Performance characteristics match the underlying system allocator:
/// generally good average-case behavior for the block sizes a growing
/// stack produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new `SystemAllocator`.
    ///
    /// This is a zero-cost operation; the type carries no state.
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }
}

// SAFETY: SystemAllocator satisfies the BlockAllocator contract.
// - Non-zero-byte blocks come from System.alloc with the exact array layout,
//   so they are valid, aligned, and exclusively owned until released
// - Zero-byte requests return the dangling sentinel and never reach the
//   system allocator; release_block ignores them symmetrically
// - release_block reconstructs the identical layout from the slot count, as
//   the trait contract requires of callers
unsafe impl BlockAllocator for SystemAllocator {
    unsafe fn acquire_block<T>(&self, slots: usize) -> StackResult<NonNull<T>> {
        let layout = block_layout::<T>(slots)?;
        if layout.size() == 0 {
            // Zero slots or zero-sized T: a well-aligned dangling pointer
            // stands in for the block.
            return Ok(NonNull::dangling());
        }

        // SAFETY: layout has non-zero size (checked above) and came from
        // Layout::array, so alignment is valid for T.
        let ptr = unsafe { System.alloc(layout) };

        NonNull::new(ptr.cast::<T>())
            .ok_or_else(|| StackError::allocation_failed(slots, layout.size()))
    }

    unsafe fn release_block<T>(&self, block: NonNull<T>, slots: usize) {
        let Ok(layout) = block_layout::<T>(slots) else {
            // A block this allocator handed out always has a representable
            // layout; nothing sane can be done with a mismatched count.
            return;
        };
        if layout.size() == 0 {
            return; // dangling sentinel, nothing was allocated
        }

        // SAFETY: Caller contract — block came from acquire_block::<T> with
        // this slot count, so the reconstructed layout matches the original
        // allocation exactly.
        unsafe { System.dealloc(block.as_ptr().cast::<u8>(), layout) };
    }
}

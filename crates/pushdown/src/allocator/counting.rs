//! Counting allocator implementation
//!
//! Wraps another block allocator and counts every block that passes
//! through it. The point is observability at the allocation seam: leak
//! tests assert that a drained workload returns every block it acquired,
//! and growth tests assert how many block turnovers a push sequence cost.
//!
//! Counters live in `Cell`s — the wrapper targets the container's
//! single-threaded usage and is deliberately `!Sync`. Share it by
//! reference instead (the `&A` blanket impl of [`BlockAllocator`] keeps
//! the counters visible to the test while stacks allocate through it).

use core::cell::Cell;
use core::ptr::NonNull;

use super::traits::BlockAllocator;
use crate::error::StackResult;

/// A wrapper allocator that counts block traffic
///
/// Transparent for allocation behavior: every request is forwarded to the
/// inner strategy unchanged. Zero-byte blocks (zero slots, or zero-sized
/// element types) are no-ops by contract and are not counted, so
/// acquire/release tallies balance exactly when callers are disciplined.
#[derive(Debug, Default)]
pub struct CountingAllocator<A> {
    /// The underlying allocator
    inner: A,
    acquired_blocks: Cell<usize>,
    released_blocks: Cell<usize>,
    failed_acquires: Cell<usize>,
    outstanding_slots: Cell<usize>,
}

impl<A> CountingAllocator<A> {
    /// Creates a new `CountingAllocator` wrapping the provided allocator
    pub fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            acquired_blocks: Cell::new(0),
            released_blocks: Cell::new(0),
            failed_acquires: Cell::new(0),
            outstanding_slots: Cell::new(0),
        }
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Gets a mutable reference to the underlying allocator
    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    /// Consumes the wrapper and returns the underlying allocator
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Total blocks successfully acquired
    pub fn acquired_blocks(&self) -> usize {
        self.acquired_blocks.get()
    }

    /// Total blocks released
    pub fn released_blocks(&self) -> usize {
        self.released_blocks.get()
    }

    /// Number of acquire calls that returned an error
    pub fn failed_acquires(&self) -> usize {
        self.failed_acquires.get()
    }

    /// Blocks currently acquired but not yet released
    pub fn outstanding_blocks(&self) -> usize {
        self.acquired_blocks
            .get()
            .saturating_sub(self.released_blocks.get())
    }

    /// Slots currently held across all outstanding blocks
    pub fn outstanding_slots(&self) -> usize {
        self.outstanding_slots.get()
    }

    /// Whether any block is still outstanding (a leak once all owners are
    /// gone)
    pub fn has_outstanding(&self) -> bool {
        self.outstanding_blocks() != 0
    }

    /// Reset all counters while leaving outstanding blocks live
    pub fn reset_counts(&self) {
        self.acquired_blocks.set(0);
        self.released_blocks.set(0);
        self.failed_acquires.set(0);
        self.outstanding_slots.set(0);
    }
}

// SAFETY: CountingAllocator forwards every call to the inner allocator.
// - Block validity, alignment, and ownership come entirely from `inner`
// - Counter updates are side-effect only and touch no block memory
// - Zero-byte requests are forwarded (inner returns the dangling sentinel)
//   but excluded from the tallies, mirroring their no-op contract
unsafe impl<A: BlockAllocator> BlockAllocator for CountingAllocator<A> {
    unsafe fn acquire_block<T>(&self, slots: usize) -> StackResult<NonNull<T>> {
        let real = slots != 0 && size_of::<T>() != 0;

        // SAFETY: Same contract as inner.acquire_block, forwarded unchanged.
        match unsafe { self.inner.acquire_block(slots) } {
            Ok(block) => {
                if real {
                    self.acquired_blocks.set(self.acquired_blocks.get() + 1);
                    self.outstanding_slots
                        .set(self.outstanding_slots.get() + slots);
                }
                Ok(block)
            }
            Err(err) => {
                self.failed_acquires.set(self.failed_acquires.get() + 1);
                Err(err)
            }
        }
    }

    unsafe fn release_block<T>(&self, block: NonNull<T>, slots: usize) {
        // SAFETY: Same contract as inner.release_block, forwarded unchanged.
        unsafe { self.inner.release_block(block, slots) };

        if slots != 0 && size_of::<T>() != 0 {
            self.released_blocks.set(self.released_blocks.get() + 1);
            self.outstanding_slots
                .set(self.outstanding_slots.get().saturating_sub(slots));
        }
    }
}

/// Convenience trait for easy wrapping
pub trait CountExt: Sized {
    /// Wrap this allocator with block counting
    fn with_counting(self) -> CountingAllocator<Self>;
}

impl<A> CountExt for A {
    fn with_counting(self) -> CountingAllocator<Self> {
        CountingAllocator::new(self)
    }
}

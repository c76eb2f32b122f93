//! Owning iteration over a consumed stack
//!
//! [`IntoIter`] takes over a stack's block and drains the elements out of
//! it by value. Indices rather than cursor pointers track the unclaimed
//! range, which keeps zero-sized element types on the exact same code
//! path as everything else.

use core::fmt;
use core::iter::FusedIterator;
use core::ptr::{self, NonNull};
use core::slice;

use crate::allocator::{BlockAllocator, SystemAllocator};
use crate::stack::Stack;

/// By-value iterator over a stack's elements, bottom of the stack first.
///
/// Produced by [`Stack::into_iter`]. Iterates in storage order; chain
/// [`rev`](Iterator::rev) to drain in pop order instead. Whatever is left
/// unclaimed when the iterator drops is dropped with it, and the block
/// goes back to the allocator it came from.
pub struct IntoIter<T, A: BlockAllocator = SystemAllocator> {
    ptr: NonNull<T>,
    cap: usize,
    /// Index of the next element to yield from the front
    start: usize,
    /// One past the next element to yield from the back
    end: usize,
    alloc: A,
}

impl<T, A: BlockAllocator> IntoIter<T, A> {
    /// The elements not yet yielded, in storage order
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots start..end are initialized and unclaimed; for a
        // zero-length remainder any aligned pointer is a valid base.
        unsafe {
            slice::from_raw_parts(self.ptr.as_ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T, A: BlockAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }

        let index = self.start;
        self.start += 1;
        // SAFETY: `index` was inside the unclaimed range and the range
        // bound moved past it, so this slot is read exactly once.
        Some(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }

    fn count(self) -> usize {
        self.len()
    }
}

impl<T, A: BlockAllocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }

        self.end -= 1;
        // SAFETY: `end` now names the last unclaimed slot; the bound moved
        // below it, so this slot is read exactly once.
        Some(unsafe { self.ptr.as_ptr().add(self.end).read() })
    }
}

impl<T, A: BlockAllocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: BlockAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: BlockAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY:
        // - slots start..end still hold unclaimed initialized elements
        // - the block handle came from `alloc` with exactly `cap` slots
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(self.start),
                self.end - self.start,
            ));
            self.alloc.release_block(self.ptr, self.cap);
        }
    }
}

impl<T: fmt::Debug, A: BlockAllocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

// SAFETY: the iterator uniquely owns the unclaimed elements and the
// block, exactly like the stack it came from.
unsafe impl<T: Send, A: BlockAllocator + Send> Send for IntoIter<T, A> {}

// SAFETY: shared access only hands out &T via as_slice.
unsafe impl<T: Sync, A: BlockAllocator + Sync> Sync for IntoIter<T, A> {}

impl<T, A: BlockAllocator> IntoIterator for Stack<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Consumes the stack, yielding its elements bottom-first
    fn into_iter(self) -> IntoIter<T, A> {
        let (ptr, len, cap, alloc) = self.into_raw_parts();
        IntoIter {
            ptr,
            cap,
            start: 0,
            end: len,
            alloc,
        }
    }
}

impl<'a, T, A: BlockAllocator> IntoIterator for &'a Stack<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: BlockAllocator> IntoIterator for &'a mut Stack<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

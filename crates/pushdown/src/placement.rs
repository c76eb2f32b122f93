//! Range placement into uninitialized blocks
//!
//! Both stack relocation paths funnel through this module: duplicating a
//! live range into fresh storage (copy construction) and relocating a
//! live range during growth (move construction). The destination is
//! always a raw, uninitialized block straight from the allocator, so
//! everything here is `ptr::write` territory.

use core::ptr::{self, NonNull};

/// Drops the prefix of a destination block that was initialized before a
/// clone panicked. Disarmed by zeroing `constructed` once the whole range
/// is in place.
struct PartialInitGuard<T> {
    dst: *mut T,
    constructed: usize,
}

impl<T> Drop for PartialInitGuard<T> {
    fn drop(&mut self) {
        if self.constructed > 0 {
            // SAFETY:
            // - `dst..dst + constructed` was initialized by the copy loop
            // - The panic unwound before ownership passed to the caller,
            //   so these elements are dropped exactly once, here
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.constructed));
            }
        }
    }
}

/// Clone-constructs every element of `src`, in order, into `dst`.
///
/// Element `i` of the destination is fully constructed before element
/// `i + 1` is attempted. If a clone panics midway, the elements already
/// constructed in `dst` are dropped before the panic continues, leaving
/// the destination block uniformly uninitialized again. The source range
/// is never modified.
///
/// Returns the number of elements written (always `src.len()`).
///
/// # Safety
///
/// - `dst` must point to a block valid for writes of at least
///   `src.len()` elements of `T`
/// - The destination must not overlap `src`
pub(crate) unsafe fn copy_range_into<T: Clone>(src: &[T], dst: NonNull<T>) -> usize {
    let mut guard = PartialInitGuard {
        dst: dst.as_ptr(),
        constructed: 0,
    };

    for (index, value) in src.iter().enumerate() {
        let cloned = value.clone();
        // SAFETY: index < src.len(), and the caller guarantees `dst` holds
        // at least src.len() writable slots.
        unsafe { dst.as_ptr().add(index).write(cloned) };
        guard.constructed = index + 1;
    }

    // Every element is in place; ownership of the range passes to the
    // caller, so the guard must not drop anything.
    guard.constructed = 0;
    src.len()
}

/// Relocates `len` elements from `src` into `dst`, one element at a time.
///
/// Each slot is read out of the source (which retires that slot — the
/// source no longer owns the value) and immediately written into the same
/// index of the destination. Slot `i` is fully relocated before slot
/// `i + 1` is touched. On return the whole source range is uninitialized
/// and the whole destination range is live.
///
/// Returns the number of elements relocated (always `len`).
///
/// # Safety
///
/// - `src` must point to `len` initialized elements of `T`
/// - `dst` must point to a block valid for writes of at least `len`
///   elements of `T`
/// - The two ranges must not overlap
/// - The caller must stop treating the source range as initialized
pub(crate) unsafe fn move_range_into<T>(src: NonNull<T>, len: usize, dst: NonNull<T>) -> usize {
    for index in 0..len {
        // SAFETY:
        // - index < len, so both slots are in range per the caller's
        //   contract
        // - The read takes ownership out of the source slot; the write
        //   installs it in the destination, which cannot alias the source
        unsafe {
            let value = src.as_ptr().add(index).read();
            dst.as_ptr().add(index).write(value);
        }
    }
    len
}

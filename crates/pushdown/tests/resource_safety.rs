//! Resource discipline under every exit path
//!
//! Every element pushed must be dropped exactly once and every block
//! acquired must be released exactly once, no matter how the stack is
//! used: drained, cleared, cloned, consumed by iteration, grown through
//! failures, or just dropped. A counting wrapper audits block traffic and
//! a shared-counter probe audits element drops.

// Test allocators implement the unsafe allocation trait.
#![allow(unsafe_code)]

use std::cell::Cell;
use std::mem;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr::NonNull;
use std::rc::Rc;

use pushdown::allocator::{BlockAllocator, CountExt, CountingAllocator, SystemAllocator};
use pushdown::{Stack, StackError, StackResult};

/// Element that counts its drops through a shared counter
struct Probe {
    drops: Rc<Cell<usize>>,
    panic_on_clone: bool,
}

impl Probe {
    fn new(drops: &Rc<Cell<usize>>) -> Self {
        Self {
            drops: Rc::clone(drops),
            panic_on_clone: false,
        }
    }

    fn panicking(drops: &Rc<Cell<usize>>) -> Self {
        Self {
            drops: Rc::clone(drops),
            panic_on_clone: true,
        }
    }
}

impl Clone for Probe {
    fn clone(&self) -> Self {
        assert!(!self.panic_on_clone, "clone failure injected");
        Self::new(&self.drops)
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Delegates to the system allocator until a fixed number of real
/// acquisitions have happened, then fails every further acquire.
struct BudgetedAllocator {
    inner: SystemAllocator,
    remaining: Cell<usize>,
}

impl BudgetedAllocator {
    fn new(budget: usize) -> Self {
        Self {
            inner: SystemAllocator::new(),
            remaining: Cell::new(budget),
        }
    }
}

// SAFETY: all block ownership rules are the system allocator's; this
// wrapper only decides whether to forward the acquire at all.
unsafe impl BlockAllocator for BudgetedAllocator {
    unsafe fn acquire_block<T>(&self, slots: usize) -> StackResult<NonNull<T>> {
        if slots > 0 && size_of::<T>() > 0 {
            if self.remaining.get() == 0 {
                return Err(StackError::allocation_failed(
                    slots,
                    slots.saturating_mul(size_of::<T>()),
                ));
            }
            self.remaining.set(self.remaining.get() - 1);
        }
        // SAFETY: contract forwarded unchanged to the system allocator.
        unsafe { self.inner.acquire_block(slots) }
    }

    unsafe fn release_block<T>(&self, block: NonNull<T>, slots: usize) {
        // SAFETY: the block came from `inner` via acquire_block above.
        unsafe { self.inner.release_block(block, slots) };
    }
}

fn counted() -> CountingAllocator<SystemAllocator> {
    SystemAllocator::new().with_counting()
}

#[test]
fn dropping_a_stack_drops_every_element_once() {
    let drops = Rc::new(Cell::new(0));

    {
        let mut stack = Stack::new();
        for _ in 0..25 {
            stack.push(Probe::new(&drops)).unwrap();
        }
        assert_eq!(drops.get(), 0);
    }

    assert_eq!(drops.get(), 25);
}

#[test]
fn pop_hands_ownership_to_the_caller() {
    let drops = Rc::new(Cell::new(0));

    let mut stack = Stack::new();
    for _ in 0..4 {
        stack.push(Probe::new(&drops)).unwrap();
    }

    let popped = stack.pop().unwrap();
    assert_eq!(drops.get(), 0);

    drop(popped);
    assert_eq!(drops.get(), 1);

    drop(stack);
    assert_eq!(drops.get(), 4);
}

#[test]
fn clear_drops_elements_but_keeps_the_block() {
    let allocator = counted();
    let drops = Rc::new(Cell::new(0));

    let mut stack = Stack::new_in(&allocator);
    for _ in 0..10 {
        stack.push(Probe::new(&drops)).unwrap();
    }
    let blocks_before = allocator.acquired_blocks();

    stack.clear();

    assert_eq!(drops.get(), 10);
    assert_eq!(allocator.acquired_blocks(), blocks_before);
    assert!(allocator.has_outstanding());

    drop(stack);
    assert!(!allocator.has_outstanding());
}

#[test]
fn growth_releases_every_outgrown_block() {
    let allocator = counted();

    {
        let mut stack = Stack::new_in(&allocator);
        for value in 0..100_u64 {
            stack.push(value).unwrap();
        }

        // Doubling from empty: 4, 8, 16, 32, 64, 128
        assert_eq!(allocator.acquired_blocks(), 6);
        assert_eq!(allocator.released_blocks(), 5);
        assert_eq!(allocator.outstanding_slots(), 128);

        // The wrapper is reachable through the stack as well
        assert_eq!(stack.allocator().outstanding_slots(), 128);
    }

    assert!(!allocator.has_outstanding());
    assert_eq!(allocator.outstanding_slots(), 0);
}

#[test]
fn preallocated_stack_acquires_one_block_up_front() {
    let allocator = counted();

    {
        let stack: Stack<u32, _> = Stack::with_capacity_in(32, &allocator).unwrap();
        assert_eq!(stack.capacity(), 32);
        assert_eq!(allocator.acquired_blocks(), 1);
        assert_eq!(allocator.outstanding_slots(), 32);
    }

    assert!(!allocator.has_outstanding());
}

#[test]
fn try_extend_keeps_the_prefix_pushed_before_the_failure() {
    let allocator = BudgetedAllocator::new(1);
    let mut stack = Stack::new_in(&allocator);

    // A filter defeats the size hint, so storage is grown push by push:
    // the single budgeted block holds four elements, the fifth fails.
    let result = stack.try_extend((0..100_u32).filter(|_| true));

    assert!(result.is_err());
    assert_eq!(stack.as_slice(), &[0, 1, 2, 3]);
    assert_eq!(stack.pop().unwrap(), 3);
}

#[test]
fn mixed_workload_returns_all_blocks() {
    let allocator = counted();
    let drops = Rc::new(Cell::new(0));
    let mut pushed = 0;

    {
        let mut stack = Stack::new_in(&allocator);

        for round in 0..5 {
            for _ in 0..(10 + round * 7) {
                stack.push(Probe::new(&drops)).unwrap();
                pushed += 1;
            }
            for _ in 0..5 {
                stack.pop().unwrap();
            }
            if round % 2 == 1 {
                stack.clear();
            }
        }

        // Rounds 1 and 3 cleared; the stack still holds round 2 and 4
        // leftovers here, so the clone below is a real copy.
        let duplicate = stack.try_clone().unwrap();
        assert!(!duplicate.is_empty());
        pushed += duplicate.len();
    }

    assert_eq!(drops.get(), pushed);
    assert!(!allocator.has_outstanding());
    assert_eq!(allocator.outstanding_slots(), 0);
}

#[test]
fn clone_duplicates_are_dropped_independently() {
    let drops = Rc::new(Cell::new(0));

    let mut original = Stack::new();
    for _ in 0..8 {
        original.push(Probe::new(&drops)).unwrap();
    }

    let duplicate = original.try_clone().unwrap();
    drop(duplicate);
    assert_eq!(drops.get(), 8);

    drop(original);
    assert_eq!(drops.get(), 16);
}

#[test]
fn into_iter_drops_whatever_was_not_claimed() {
    let allocator = counted();
    let drops = Rc::new(Cell::new(0));

    {
        let mut stack = Stack::new_in(&allocator);
        for _ in 0..12 {
            stack.push(Probe::new(&drops)).unwrap();
        }

        let mut iter = stack.into_iter();
        let front = iter.next().unwrap();
        let back = iter.next_back().unwrap();
        drop(front);
        drop(back);
        assert_eq!(drops.get(), 2);
        // `iter` drops here with ten elements unclaimed
    }

    assert_eq!(drops.get(), 12);
    assert!(!allocator.has_outstanding());
}

#[test]
fn failed_growth_leaves_the_stack_intact() {
    // Two real blocks allowed: capacities 4 and 8. The growth to 16 fails.
    let allocator = BudgetedAllocator::new(2);
    let mut stack = Stack::new_in(&allocator);

    for value in 0..8_u32 {
        stack.push(value).unwrap();
    }

    let err = stack.push(8).unwrap_err();
    assert!(matches!(err, StackError::AllocationFailed { .. }));
    assert_eq!(err.code(), "STACK:ALLOC:FAILED");
    assert!(err.is_allocation());

    // Prior state fully preserved and still operable
    assert_eq!(stack.len(), 8);
    assert_eq!(stack.capacity(), 8);
    assert_eq!(stack.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(stack.pop().unwrap(), 7);
    stack.push(70).unwrap();
    assert_eq!(*stack.top().unwrap(), 70);
}

#[test]
fn failed_reserve_leaves_the_stack_intact() {
    let allocator = BudgetedAllocator::new(1);
    let mut stack = Stack::new_in(&allocator);

    for value in 0..3_u32 {
        stack.push(value).unwrap();
    }

    assert!(stack.reserve(1000).is_err());
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.capacity(), 4);
    assert_eq!(stack.as_slice(), &[0, 1, 2]);
}

#[test]
fn failed_clone_leaves_both_sides_intact() {
    let allocator = BudgetedAllocator::new(1);

    let mut source = Stack::new_in(&allocator);
    for value in 0..4_u32 {
        source.push(value).unwrap();
    }

    // Budget exhausted: the duplicate's block cannot be acquired
    let err = source.try_clone().unwrap_err();
    assert!(err.is_allocation());
    assert_eq!(source.as_slice(), &[0, 1, 2, 3]);

    let mut target = Stack::new_in(&allocator);
    assert!(target.try_clone_from(&source).is_err());
    assert!(target.is_empty());
    assert_eq!(source.len(), 4);
}

#[test]
fn panicking_element_clone_leaks_nothing() {
    let allocator = counted();
    let drops = Rc::new(Cell::new(0));

    let mut stack = Stack::new_in(&allocator);
    stack.push(Probe::new(&drops)).unwrap();
    stack.push(Probe::new(&drops)).unwrap();
    stack.push(Probe::panicking(&drops)).unwrap();
    stack.push(Probe::new(&drops)).unwrap();

    let outstanding_before = allocator.outstanding_blocks();

    let result = catch_unwind(AssertUnwindSafe(|| stack.try_clone()));
    assert!(result.is_err());

    // The two clones made before the panic were dropped, the half-built
    // duplicate released its block, and the source is untouched.
    assert_eq!(drops.get(), 2);
    assert_eq!(allocator.outstanding_blocks(), outstanding_before);
    assert_eq!(stack.len(), 4);

    drop(stack);
    assert_eq!(drops.get(), 6);
    assert!(!allocator.has_outstanding());
}

#[test]
fn replacing_a_stack_moves_the_block_wholesale() {
    let allocator = counted();

    let mut stack = Stack::new_in(&allocator);
    for value in 0..10_u32 {
        stack.push(value).unwrap();
    }
    let acquired_before = allocator.acquired_blocks();

    // A move transfers the handle; no block traffic happens
    let moved = mem::replace(&mut stack, Stack::new_in(&allocator));
    assert_eq!(allocator.acquired_blocks(), acquired_before);
    assert_eq!(moved.len(), 10);
    assert_eq!(stack.len(), 0);
    assert_eq!(stack.capacity(), 0);

    stack.push(99).unwrap();
    drop(moved);
    drop(stack);
    assert!(!allocator.has_outstanding());
}

#[test]
fn zero_sized_elements_never_touch_the_allocator() {
    let allocator = counted();

    {
        let mut stack = Stack::new_in(&allocator);
        for _ in 0..1000 {
            stack.push(()).unwrap();
        }
        assert_eq!(stack.len(), 1000);
    }

    assert_eq!(allocator.acquired_blocks(), 0);
    assert_eq!(allocator.released_blocks(), 0);
}

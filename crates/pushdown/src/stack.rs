//! Growable LIFO stack over raw allocated storage
//!
//! The container is three words of state plus its strategy values: a
//! block handle, the live element count, and the slot capacity. Storage
//! arrives from a [`BlockAllocator`] in whole-block units; elements are
//! placement-written into slots on push and read back out on pop, so no
//! slot is ever default-constructed or left half-alive.
//!
//! ## Invariants
//!
//! - `ptr` is the dangling sentinel while the current block is zero
//!   bytes (zero capacity, or a zero-sized `T`); otherwise it is a live
//!   block of exactly `cap` slots acquired from `alloc`
//! - Slots `0..len` hold initialized elements; slots `len..cap` are raw
//!   storage and are never read or dropped
//! - `len <= cap` at every observable point, including across panics
//! - The block is released through the same allocator value that
//!   acquired it, with the same slot count

use core::fmt;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};
use core::slice;

use crate::allocator::{BlockAllocator, SystemAllocator};
use crate::error::{StackError, StackResult};
use crate::placement;
use crate::policy::GrowthPolicy;

/// A dynamically growing LIFO stack on explicitly allocated storage
///
/// Elements live in a single contiguous block obtained from the stack's
/// [`BlockAllocator`]. When a push finds the block full, the stack asks
/// its [`GrowthPolicy`] for a larger capacity, acquires a fresh block,
/// relocates the live elements one at a time, and releases the old block.
///
/// The API is fallible-first: operations that can hit allocation failure
/// or an empty stack return [`StackResult`] instead of panicking. The one
/// deliberate exception is the [`Clone`] impl, which has no way to report
/// failure and panics if duplication fails — use [`Stack::try_clone`]
/// where that matters.
///
/// Moving a stack is a plain Rust move and costs three word copies plus
/// the strategy values. To move out of a slot while leaving a working
/// empty stack behind, use [`core::mem::take`]; the drained source has
/// zero length, zero capacity, and accepts pushes again.
///
/// Growth relocates every element, so no reference or slice obtained from
/// the stack survives a mutating call — the borrow checker enforces this,
/// and it is also the semantic contract: element addresses are not stable
/// across pushes.
///
/// # Examples
///
/// ```
/// use pushdown::{Stack, StackResult};
///
/// fn demo() -> StackResult<()> {
///     let mut stack = Stack::new();
///     stack.push("first")?;
///     stack.push("second")?;
///
///     assert_eq!(*stack.top()?, "second");
///     assert_eq!(stack.pop()?, "second");
///     assert_eq!(stack.len(), 1);
///     Ok(())
/// }
/// # demo().unwrap();
/// ```
pub struct Stack<T, A: BlockAllocator = SystemAllocator> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    alloc: A,
    policy: GrowthPolicy,
}

// ============================================================================
// Construction — system allocator
// ============================================================================

impl<T> Stack<T> {
    /// Creates an empty stack backed by the system allocator.
    ///
    /// No storage is acquired until the first push.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(SystemAllocator::new())
    }

    /// Creates an empty stack with room for `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AllocationFailed`] if the block cannot be
    /// acquired, or [`StackError::CapacityOverflow`] if `capacity` slots
    /// of `T` exceed the address space.
    pub fn with_capacity(capacity: usize) -> StackResult<Self> {
        Self::with_capacity_in(capacity, SystemAllocator::new())
    }

    /// Creates an empty stack that grows according to `policy`.
    #[must_use]
    pub const fn with_policy(policy: GrowthPolicy) -> Self {
        Self::with_policy_in(policy, SystemAllocator::new())
    }
}

// ============================================================================
// Construction — explicit allocator
// ============================================================================

impl<T, A: BlockAllocator> Stack<T, A> {
    /// Creates an empty stack that allocates through `alloc`
    pub const fn new_in(alloc: A) -> Self {
        Self::with_policy_in(GrowthPolicy::doubling(), alloc)
    }

    /// Creates an empty stack with `capacity` slots acquired from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AllocationFailed`] if the block cannot be
    /// acquired, or [`StackError::CapacityOverflow`] if `capacity` slots
    /// of `T` exceed the address space.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> StackResult<Self> {
        let mut stack = Self::new_in(alloc);
        if capacity > 0 {
            stack.regrow(capacity)?;
        }
        Ok(stack)
    }

    /// Creates an empty stack with an explicit growth policy and allocator
    pub const fn with_policy_in(policy: GrowthPolicy, alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            alloc,
            policy,
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of elements currently on the stack
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the stack holds no elements
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots the current block can hold without growing
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// The policy consulted when the stack outgrows its block
    #[must_use]
    pub const fn growth_policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Replaces the growth policy for future growth steps.
    ///
    /// Takes effect on the next growth; the current block is untouched.
    pub fn set_growth_policy(&mut self, policy: GrowthPolicy) {
        self.policy = policy;
    }

    /// The allocation strategy this stack acquires blocks from
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The live elements, bottom of the stack first
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY:
        // - slots 0..len are initialized (type invariant)
        // - the dangling sentinel is aligned and valid for a zero-length
        //   slice
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The live elements, mutably, bottom of the stack first
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: Same as as_slice; &mut self guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Iterates the elements from the bottom of the stack to the top
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Mutable iteration from the bottom of the stack to the top
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    // ========================================================================
    // Stack operations
    // ========================================================================

    /// Pushes `value` on top of the stack.
    ///
    /// Grows the storage block first when it is full, relocating the live
    /// elements into the larger block. If growth fails the stack is left
    /// exactly as it was; `value` is dropped, since ownership passed to
    /// the call.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AllocationFailed`] or
    /// [`StackError::CapacityOverflow`] if a required growth step fails,
    /// and [`StackError::InvalidPolicy`] if the policy cannot produce a
    /// next capacity.
    #[inline]
    pub fn push(&mut self, value: T) -> StackResult<()> {
        if self.len == self.cap {
            self.grow_for_push()?;
        }

        // SAFETY: len < cap after a successful growth step, so slot `len`
        // is in-block raw storage.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::EmptyStack`] when there is nothing to pop.
    #[inline]
    pub fn pop(&mut self) -> StackResult<T> {
        if self.len == 0 {
            return Err(StackError::empty_stack("pop"));
        }

        self.len -= 1;
        // SAFETY: slot `len` held the top element; decrementing first
        // retires the slot so nothing else can observe it initialized.
        Ok(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Borrows the top element.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::EmptyStack`] when the stack is empty.
    #[inline]
    pub fn top(&self) -> StackResult<&T> {
        self.as_slice()
            .last()
            .ok_or_else(|| StackError::empty_stack("top"))
    }

    /// Mutably borrows the top element.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::EmptyStack`] when the stack is empty.
    #[inline]
    pub fn top_mut(&mut self) -> StackResult<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or_else(|| StackError::empty_stack("top"))
    }

    /// Drops every element while keeping the storage block.
    ///
    /// Capacity is unchanged, so a cleared stack re-fills without
    /// reallocating.
    pub fn clear(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        // Retire the slots before dropping: if an element drop panics the
        // stack must not present the remainder as initialized.
        self.len = 0;
        // SAFETY: the slice covers exactly the previously live slots, each
        // dropped once.
        unsafe { ptr::drop_in_place(live) };
    }

    /// Ensures room for at least `additional` more elements.
    ///
    /// The target capacity is the larger of what the growth policy would
    /// pick next and what `additional` requires, so reserving mid-workload
    /// does not defeat amortized growth. Does nothing when the block is
    /// already large enough.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::CapacityOverflow`] if the required capacity
    /// exceeds `usize`, [`StackError::InvalidPolicy`] if the policy cannot
    /// grow, or [`StackError::AllocationFailed`] if the block cannot be
    /// acquired. The stack is unchanged on error.
    pub fn reserve(&mut self, additional: usize) -> StackResult<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| StackError::capacity_overflow("reserve"))?;
        if required <= self.cap {
            return Ok(());
        }

        let target = self.policy.next_capacity(self.cap)?.max(required);
        self.regrow(target)
    }

    /// Pushes every element of `iter`, stopping at the first failure.
    ///
    /// Storage is reserved up front for the iterator's lower size bound.
    /// On error, elements already pushed stay on the stack and the rest of
    /// the iterator is dropped.
    ///
    /// # Errors
    ///
    /// Propagates the first growth failure encountered.
    pub fn try_extend<I>(&mut self, iter: I) -> StackResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > 0 {
            self.reserve(lower)?;
        }

        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    // ========================================================================
    // Duplication
    // ========================================================================

    /// Duplicates the stack, cloning every element.
    ///
    /// The duplicate gets its own block sized to this stack's capacity,
    /// a clone of the allocator, and the same growth policy. The two
    /// stacks share nothing afterwards: mutating one never disturbs the
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AllocationFailed`] if the duplicate's block
    /// cannot be acquired. This stack is never modified.
    pub fn try_clone(&self) -> StackResult<Self>
    where
        T: Clone,
        A: Clone,
    {
        self.duplicate_in(self.alloc.clone(), self.policy)
    }

    /// Replaces this stack's contents with clones of `source`'s elements.
    ///
    /// The replacement is built completely before the current contents are
    /// dropped, so a failure leaves this stack exactly as it was. The
    /// destination keeps its own allocator and growth policy; only the
    /// elements (and capacity) come from `source`.
    ///
    /// Assigning a stack to itself is unrepresentable here: the `&mut
    /// self` receiver cannot coexist with a `&self` borrow of the same
    /// stack, so no runtime aliasing check is needed.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AllocationFailed`] if the replacement block
    /// cannot be acquired.
    pub fn try_clone_from(&mut self, source: &Self) -> StackResult<()>
    where
        T: Clone,
        A: Clone,
    {
        let replacement = source.duplicate_in(self.alloc.clone(), self.policy)?;
        *self = replacement;
        Ok(())
    }

    /// Builds an independent copy of `self` owned by `alloc`.
    ///
    /// Panic-safe: if an element clone panics, the partially filled block
    /// is cleaned up by the placement guard and the half-built stack's
    /// drop releases the block.
    fn duplicate_in(&self, alloc: A, policy: GrowthPolicy) -> StackResult<Self>
    where
        T: Clone,
    {
        let mut duplicate = Self::with_policy_in(policy, alloc);

        if self.cap > 0 {
            // SAFETY: cap slots requested through the duplicate's own
            // strategy; released by its Drop on every later path.
            let block = unsafe { duplicate.alloc.acquire_block::<T>(self.cap)? };
            duplicate.ptr = block;
            duplicate.cap = self.cap;

            // SAFETY:
            // - the block holds cap >= len writable slots
            // - a freshly acquired block cannot overlap the source slice
            duplicate.len = unsafe { placement::copy_range_into(self.as_slice(), block) };
        }

        Ok(duplicate)
    }

    /// Disassembles the stack into `(block, len, cap, allocator)` without
    /// dropping anything. The caller takes over both the elements and the
    /// block.
    pub(crate) fn into_raw_parts(self) -> (NonNull<T>, usize, usize, A) {
        let stack = ManuallyDrop::new(self);
        // SAFETY: ManuallyDrop suppresses Stack::drop, and the allocator is
        // read out exactly once, so every part has a single owner.
        let alloc = unsafe { ptr::read(&stack.alloc) };
        (stack.ptr, stack.len, stack.cap, alloc)
    }

    // ========================================================================
    // Growth
    // ========================================================================

    fn grow_for_push(&mut self) -> StackResult<()> {
        let target = self.policy.next_capacity(self.cap)?;
        self.regrow(target)
    }

    /// Swaps the storage block for one of `new_cap` slots, relocating the
    /// live elements. On failure nothing has been touched.
    fn regrow(&mut self, new_cap: usize) -> StackResult<()> {
        debug_assert!(new_cap >= self.len, "regrow would strand live elements");

        // Acquire first: an allocation failure must leave the stack as it
        // was.
        // SAFETY: the handle is released by Drop (or the next regrow) with
        // this exact slot count.
        let new_block = unsafe { self.alloc.acquire_block::<T>(new_cap)? };

        // SAFETY:
        // - slots 0..len of the old block are initialized
        // - the new block holds new_cap >= len writable slots
        // - the blocks are distinct allocations (zero-byte blocks carry no
        //   bytes, so coinciding sentinels are immaterial)
        unsafe { placement::move_range_into(self.ptr, self.len, new_block) };

        // SAFETY: the old handle came from self.alloc with exactly cap
        // slots, and its elements were relocated out above. Zero-capacity
        // handles release as a no-op.
        unsafe { self.alloc.release_block(self.ptr, self.cap) };

        self.ptr = new_block;
        self.cap = new_cap;
        Ok(())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl<T, A: BlockAllocator> Drop for Stack<T, A> {
    fn drop(&mut self) {
        // SAFETY:
        // - slots 0..len are initialized and are dropped exactly once
        // - the block handle came from self.alloc with exactly cap slots
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len));
            self.alloc.release_block(self.ptr, self.cap);
        }
    }
}

impl<T, A: BlockAllocator + Default> Default for Stack<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: BlockAllocator + Clone> Clone for Stack<T, A> {
    /// Panics if the duplicate's storage cannot be acquired; prefer
    /// [`Stack::try_clone`] when failure must be handled.
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("failed to clone stack: {err}"))
    }

    fn clone_from(&mut self, source: &Self) {
        self.try_clone_from(source)
            .unwrap_or_else(|err| panic!("failed to clone stack: {err}"));
    }
}

impl<T: fmt::Debug, A: BlockAllocator> fmt::Debug for Stack<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq, A: BlockAllocator> PartialEq for Stack<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: BlockAllocator> Eq for Stack<T, A> {}

// SAFETY:
// - The stack uniquely owns its elements and block; sending it sends the
//   `T`s and the allocator with it, hence both must be Send
// - The raw pointer is an ownership handle, not shared state
unsafe impl<T: Send, A: BlockAllocator + Send> Send for Stack<T, A> {}

// SAFETY: shared access only hands out &T and &A; all mutation goes
// through &mut self.
unsafe impl<T: Sync, A: BlockAllocator + Sync> Sync for Stack<T, A> {}

// ============================================================================
// Tests
// ============================================================================

//! # pushdown
//!
//! Growable LIFO stacks on explicitly managed storage.
//!
//! A [`Stack`] keeps its elements in one contiguous block acquired from a
//! pluggable [`BlockAllocator`], tracks the live count and slot capacity
//! separately, and grows by whole-block relocation under a configurable
//! [`GrowthPolicy`]. The API is fallible-first: allocation failure and
//! empty-stack misuse come back as [`StackError`] values instead of
//! panics.
//!
//! ## Highlights
//!
//! - **Injectable storage**: the allocation seam is two operations,
//!   acquire a block of `n` slots and release it again. Bring your own
//!   strategy or use the provided [`SystemAllocator`].
//! - **Auditable**: wrap any allocator in
//!   [`CountingAllocator`](allocator::CountingAllocator) to assert block
//!   traffic in tests.
//! - **Per-instance growth**: doubling by default, constant-step when
//!   predictable footprint beats amortized speed.
//! - **Value semantics done explicitly**: [`Stack::try_clone`] for deep
//!   copies, plain Rust moves (or [`core::mem::take`]) for transfers.
//!
//! ## Quick Start
//!
//! ```
//! use pushdown::{GrowthPolicy, Stack, StackResult};
//!
//! fn demo() -> StackResult<()> {
//!     let mut stack = Stack::new();
//!     for word in ["alpha", "beta", "gamma"] {
//!         stack.push(word)?;
//!     }
//!     assert_eq!(stack.pop()?, "gamma");
//!     assert_eq!(*stack.top()?, "beta");
//!
//!     // Constant-step growth: capacities 5, 10, 15, ...
//!     let mut fixed = Stack::with_policy(GrowthPolicy::fixed(5));
//!     fixed.push(1_u32)?;
//!     assert_eq!(fixed.capacity(), 5);
//!     Ok(())
//! }
//! # demo().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` — emit `tracing` events when errors are constructed
//!   (allocation failures at error level, capacity overflow at warn)

// This crate is the unsafe layer: raw block handles, placement writes,
// and manual drops are its whole job. The workspace warns on unsafe_code;
// we opt out here and pay for it with SAFETY comments at every site.
#![allow(unsafe_code)]

mod error;
mod iter;
mod placement;
mod policy;
mod stack;

pub mod allocator;

pub use allocator::{BlockAllocator, SystemAllocator};
pub use error::{StackError, StackResult};
pub use iter::IntoIter;
pub use policy::GrowthPolicy;
pub use stack::Stack;

/// One-line import for the commonly used types
pub mod prelude {
    pub use crate::allocator::{BlockAllocator, CountExt, CountingAllocator, SystemAllocator};
    pub use crate::error::{StackError, StackResult};
    pub use crate::policy::GrowthPolicy;
    pub use crate::{IntoIter, Stack};
}

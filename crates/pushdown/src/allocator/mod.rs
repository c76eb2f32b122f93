//!
//! Pluggable block allocation for stack storage
//!
//! A [`Stack`](crate::Stack) never talks to the global allocator directly.
//! It acquires and releases whole element blocks through the
//! [`BlockAllocator`] trait, so storage strategy is injectable: the default
//! [`SystemAllocator`] goes to the operating system, and tests wrap any
//! strategy in a [`CountingAllocator`] to audit block traffic.

// Core allocation seam
mod counting;
mod system;
mod traits;

// Re-exports for convenience
pub use counting::{CountExt, CountingAllocator};
pub use system::SystemAllocator;
pub use traits::BlockAllocator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_accessible() {
        let _allocator = SystemAllocator::new().with_counting();
    }
}

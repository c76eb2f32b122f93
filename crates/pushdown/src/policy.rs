//! Capacity growth policies
//!
//! A policy decides how much storage a full stack asks for next. It is
//! plain data attached per stack instance, so two stacks over the same
//! allocator can still grow differently.

use crate::error::{StackError, StackResult};

/// Starting capacity for a doubling stack's first real allocation.
const DOUBLING_SEED: usize = 4;

/// How a stack sizes its next storage block when it runs out of room
///
/// The policy only computes target capacities; the stack performs the
/// actual reallocation and element relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Double the capacity each time (seeded at 4 slots from empty).
    ///
    /// Amortizes relocation cost to O(1) per push and is the default.
    #[default]
    Doubling,

    /// Grow by a constant number of slots each time.
    ///
    /// Keeps peak memory close to the live size at the cost of more
    /// frequent relocation. The increment must be non-zero; a zero
    /// increment is reported as [`StackError::InvalidPolicy`] the first
    /// time the stack tries to grow with it.
    Fixed {
        /// Slots added per growth step
        increment: usize,
    },
}

impl GrowthPolicy {
    /// Doubling growth (the default)
    #[must_use]
    pub const fn doubling() -> Self {
        Self::Doubling
    }

    /// Constant growth by `increment` slots per step
    #[must_use]
    pub const fn fixed(increment: usize) -> Self {
        Self::Fixed { increment }
    }

    /// Computes the capacity to request after outgrowing `current`.
    ///
    /// The result is always strictly greater than `current` on success.
    /// Doubling computes `max(4, current * 2)`, so tiny stacks jump
    /// straight to the seed instead of crawling through 1 and 2.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::CapacityOverflow`] if the next capacity does
    /// not fit in `usize`, and [`StackError::InvalidPolicy`] for a fixed
    /// policy with a zero increment.
    pub fn next_capacity(self, current: usize) -> StackResult<usize> {
        match self {
            Self::Doubling => current
                .checked_mul(2)
                .map(|doubled| doubled.max(DOUBLING_SEED))
                .ok_or_else(|| StackError::capacity_overflow("grow")),
            Self::Fixed { increment } => {
                if increment == 0 {
                    return Err(StackError::invalid_policy(
                        "fixed growth increment must be non-zero",
                    ));
                }
                current
                    .checked_add(increment)
                    .ok_or_else(|| StackError::capacity_overflow("grow"))
            }
        }
    }
}

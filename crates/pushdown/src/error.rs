//! Standalone error types for pushdown
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Type
// ============================================================================

/// Errors surfaced by stack operations.
///
/// Two families exist, and nothing else (see the container docs for the
/// failure model):
/// - precondition errors (`EmptyStack`) — the call was invalid for the
///   current state and the stack is unchanged;
/// - resource errors (`AllocationFailed`, `CapacityOverflow`,
///   `InvalidPolicy`) — storage could not be acquired and the stack keeps
///   its prior contents, capacity, and ordering.
///
/// None of these are retryable in-scope: allocation failure is not treated
/// as transient.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum StackError {
    // --- Resource Errors ---
    #[error("block allocation failed: {slots} slots ({bytes} bytes)")]
    AllocationFailed { slots: usize, bytes: usize },

    #[error("capacity overflow during {operation}")]
    CapacityOverflow { operation: &'static str },

    #[error("invalid growth policy: {reason}")]
    InvalidPolicy { reason: String },

    // --- Precondition Errors ---
    #[error("{operation} called on empty stack")]
    EmptyStack { operation: &'static str },
}

impl StackError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "STACK:ALLOC:FAILED",
            Self::CapacityOverflow { .. } => "STACK:CAP:OVERFLOW",
            Self::InvalidPolicy { .. } => "STACK:POLICY:INVALID",
            Self::EmptyStack { .. } => "STACK:EMPTY",
        }
    }

    /// Check if this error came from the allocation path (resource error)
    #[must_use]
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. }
                | Self::CapacityOverflow { .. }
                | Self::InvalidPolicy { .. }
        )
    }

    /// Check if this error reports a violated call precondition
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::EmptyStack { .. })
    }

    // ========================================================================
    // Convenience Constructors
    // ========================================================================

    /// Create allocation failed error
    pub fn allocation_failed(slots: usize, bytes: usize) -> Self {
        #[cfg(feature = "logging")]
        error!("block allocation failed: {} slots ({} bytes)", slots, bytes);

        Self::AllocationFailed { slots, bytes }
    }

    /// Create capacity overflow error
    pub fn capacity_overflow(operation: &'static str) -> Self {
        #[cfg(feature = "logging")]
        warn!("capacity overflow during {}", operation);

        Self::CapacityOverflow { operation }
    }

    /// Create invalid growth policy error
    pub fn invalid_policy(reason: &str) -> Self {
        Self::InvalidPolicy {
            reason: reason.to_string(),
        }
    }

    /// Create empty stack error
    pub fn empty_stack(operation: &'static str) -> Self {
        Self::EmptyStack { operation }
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// Result type for stack operations
pub type StackResult<T> = core::result::Result<T, StackError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = StackError::allocation_failed(15, 60);
        assert!(error.to_string().contains("15"));
        assert!(error.to_string().contains("60"));
    }

    #[test]
    fn test_error_codes() {
        let error = StackError::allocation_failed(10, 80);
        assert_eq!(error.code(), "STACK:ALLOC:FAILED");

        let error = StackError::empty_stack("pop");
        assert_eq!(error.code(), "STACK:EMPTY");

        let error = StackError::capacity_overflow("grow");
        assert_eq!(error.code(), "STACK:CAP:OVERFLOW");

        let error = StackError::invalid_policy("fixed increment must be non-zero");
        assert_eq!(error.code(), "STACK:POLICY:INVALID");
    }

    #[test]
    fn test_error_categories() {
        assert!(StackError::allocation_failed(1, 8).is_allocation());
        assert!(StackError::capacity_overflow("grow").is_allocation());
        assert!(!StackError::allocation_failed(1, 8).is_precondition());

        assert!(StackError::empty_stack("top").is_precondition());
        assert!(!StackError::empty_stack("top").is_allocation());
    }

    #[test]
    fn test_messages_name_the_operation() {
        let error = StackError::empty_stack("pop");
        assert!(error.to_string().contains("pop"));

        let error = StackError::capacity_overflow("reserve");
        assert!(error.to_string().contains("reserve"));
    }
}

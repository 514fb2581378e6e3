//! # Error Types
//!
//! The error taxonomy shared across Fireside crates.
//!
//! Every mutation is one atomic write set, so no error ever leaves a
//! partially-applied state behind; these types only describe why a
//! request was refused.

use thiserror::Error;

/// Why one item operation inside a cancelled transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// This operation did not cause the cancellation.
    None,
    /// The operation's precondition evaluated false.
    ConditionFailed,
}

/// Errors raised by the transactional store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The write set was rejected before execution.
    #[error("Invalid write set: {0}")]
    InvalidWriteSet(String),

    /// At least one precondition failed; nothing was applied.
    /// `reasons` has one entry per operation, in write-set order.
    #[error("Transaction cancelled")]
    TransactionCanceled { reasons: Vec<CancelReason> },

    /// A single-item conditional update's precondition failed.
    #[error("Conditional check failed for {key}")]
    ConditionFailed { key: String },

    /// A stored item is missing or mistyped an expected attribute.
    #[error("Malformed item: bad attribute {attr}")]
    MalformedItem { attr: String },

    /// Transient backend failure; retryable at the read layer only.
    #[error("Store internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Index of the first operation whose precondition failed, if this
    /// is a cancelled transaction.
    pub fn failed_op_index(&self) -> Option<usize> {
        match self {
            StoreError::TransactionCanceled { reasons } => reasons
                .iter()
                .position(|r| *r == CancelReason::ConditionFailed),
            _ => None,
        }
    }

    /// True for failures worth retrying on the read path.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Internal(_))
    }
}

/// Terminal, caller-visible errors of the core.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Missing or insufficient identity, or an ownership precondition
    /// failed. Deliberately carries no detail about what exists.
    #[error("Unauthorized")]
    Unauthorized,

    /// A quota counter's non-negativity precondition failed. The whole
    /// write set was rolled back; never auto-retried.
    #[error("Quota exceeded for {resource}")]
    QuotaExceeded { resource: &'static str },

    /// A referenced entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A status/ownership precondition failed for an otherwise
    /// authorized actor (e.g. deleting an asset mid-promotion).
    #[error("Conflicting ownership or state")]
    ConflictOwnership,

    /// Malformed input, rejected before any write set was built.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Store-level failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invariant breach inside the core itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The error as surfaced to callers. `ConflictOwnership` is reported
    /// as `Unauthorized` so internal lifecycle state never leaks.
    pub fn public(self) -> CoreError {
        match self {
            CoreError::ConflictOwnership => CoreError::Unauthorized,
            other => other,
        }
    }

    pub fn not_found(entity: &'static str) -> Self {
        CoreError::NotFound { entity }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::ValidationError(msg.into())
    }
}

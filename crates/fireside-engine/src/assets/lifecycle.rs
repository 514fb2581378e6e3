//! Conditioned-update state machine for assets.
//!
//! ```text
//! [PENDING] ──finalise──→ [FINALISING] ──promote──→ [READY]
//!     │
//!     └── expire (sweeper timeout) ──→ [EXPIRED]
//!
//! {PENDING, READY, EXPIRED} ──delete──→ (row removed)
//! ```
//!
//! Every transition is a single conditioned update whose precondition
//! is "current status == expected prior state". `FINALISING` is never a
//! valid delete source, which is what prevents deleting an asset while
//! its variants are being generated.

use fireside_store::{Condition, UpdateAction};
use shared_types::{AssetStatus, AttrValue, Timestamp};

/// Statuses from which delete-asset may proceed.
pub const DELETABLE_STATUSES: [AssetStatus; 3] = [
    AssetStatus::Pending,
    AssetStatus::Ready,
    AssetStatus::Expired,
];

/// One edge of the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTransition {
    /// Upload confirmed; variant generation begins.
    Finalise,
    /// Variants complete.
    Promote,
    /// The upload never completed before the deadline.
    Expire,
}

impl AssetTransition {
    /// The only status this transition may start from.
    pub fn expected_prior(self) -> AssetStatus {
        match self {
            AssetTransition::Finalise => AssetStatus::Pending,
            AssetTransition::Promote => AssetStatus::Finalising,
            AssetTransition::Expire => AssetStatus::Pending,
        }
    }

    /// The status this transition lands in.
    pub fn target(self) -> AssetStatus {
        match self {
            AssetTransition::Finalise => AssetStatus::Finalising,
            AssetTransition::Promote => AssetStatus::Ready,
            AssetTransition::Expire => AssetStatus::Expired,
        }
    }

    /// The conditioned update implementing this transition.
    pub fn update(self, now: Timestamp) -> (Vec<UpdateAction>, Condition) {
        let actions = vec![
            UpdateAction::Set("status".into(), AttrValue::s(self.target().as_str())),
            UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
        ];
        let condition = Condition::eq_s("status", self.expected_prior().as_str());
        (actions, condition)
    }
}

/// Precondition for deleting an asset out of `section_id`.
pub fn delete_condition(section_id: &str) -> Condition {
    Condition::And(vec![
        Condition::in_s("status", DELETABLE_STATUSES.iter().map(|s| s.as_str())),
        Condition::eq_s("section_id", section_id),
    ])
}

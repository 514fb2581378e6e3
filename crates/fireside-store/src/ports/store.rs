//! # Transactional Store Port
//!
//! All cross-request coordination in Fireside is delegated to this
//! port's two atomic primitives:
//!
//! - [`TransactionalStore::update_item`]: single-item conditional
//!   update (compare-and-swap over attributes);
//! - [`TransactionalStore::transact_write`]: multi-item write set,
//!   all-or-nothing and isolated from concurrent readers.
//!
//! No operation spans more than one atomic call. A failed precondition
//! aborts the whole write set with zero side effects.

use crate::domain::{Condition, UpdateAction, WriteSet};
use async_trait::async_trait;
use shared_types::{Item, ItemKey, StoreError};

/// Atomic conditional-write storage.
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    /// Reads one item.
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError>;

    /// Reads several items; the result preserves input order, with
    /// `None` for absent keys.
    async fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<Item>>, StoreError>;

    /// Returns every item whose partition key is `pk` and whose sort
    /// key starts with `sk_prefix`, in sort-key order.
    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError>;

    /// Returns every item whose derived index attribute equals `value`.
    async fn query_index(&self, attr: &str, value: &str) -> Result<Vec<Item>, StoreError>;

    /// Applies update actions to one item iff the condition holds, and
    /// returns the item's new state.
    ///
    /// # Errors
    /// `ConditionFailed` when the precondition evaluates false; nothing
    /// is written.
    async fn update_item(
        &self,
        key: &ItemKey,
        actions: Vec<UpdateAction>,
        condition: Option<Condition>,
    ) -> Result<Item, StoreError>;

    /// Submits a write set atomically: every precondition is evaluated
    /// against one consistent snapshot, then either all operations
    /// apply or none do.
    ///
    /// # Errors
    /// `TransactionCanceled { reasons }` with one entry per operation
    /// when any precondition fails.
    async fn transact_write(&self, writes: WriteSet) -> Result<(), StoreError>;
}

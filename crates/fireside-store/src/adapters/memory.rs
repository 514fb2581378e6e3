//! In-memory implementation of [`TransactionalStore`].
//!
//! The whole table is one `RwLock<BTreeMap>`; the write path holds the
//! write lock across condition evaluation and application, which gives
//! the same guarantee the production store provides natively: every
//! precondition sees one consistent snapshot, writes are all-or-nothing,
//! and no reader observes a partial transaction.
//!
//! Index queries scan the table. Fine for the scales this adapter
//! serves (tests, local single-process deployments).

use crate::domain::{Condition, UpdateAction, WriteOp, WriteSet};
use crate::ports::TransactionalStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{AttrValue, CancelReason, Item, ItemKey, StoreError};
use std::collections::BTreeMap;

/// Configuration for the in-memory store.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Maximum operations per write set.
    pub max_transact_items: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_transact_items: crate::domain::write_set::MAX_TRANSACT_ITEMS,
        }
    }
}

/// Single-table in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<BTreeMap<ItemKey, Item>>,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            table: RwLock::new(BTreeMap::new()),
            config,
        }
    }

    /// Number of items currently stored. Test observability.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    fn apply_op(table: &mut BTreeMap<ItemKey, Item>, op: &WriteOp) {
        match op {
            WriteOp::Put { key, item, .. } => {
                table.insert(key.clone(), item.clone());
            }
            WriteOp::Update { key, actions, .. } => {
                let item = table.entry(key.clone()).or_default();
                for action in actions {
                    action.apply(item);
                }
            }
            WriteOp::Delete { key, .. } => {
                table.remove(key);
            }
        }
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        Ok(self.table.read().get(key).cloned())
    }

    async fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<Item>>, StoreError> {
        let table = self.table.read();
        Ok(keys.iter().map(|k| table.get(k).cloned()).collect())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError> {
        let table = self.table.read();
        let lower = ItemKey::new(pk, sk_prefix);
        Ok(table
            .range(lower..)
            .take_while(|(k, _)| k.pk == pk && k.sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn query_index(&self, attr: &str, value: &str) -> Result<Vec<Item>, StoreError> {
        let table = self.table.read();
        Ok(table
            .values()
            .filter(|item| {
                item.get(attr)
                    .and_then(AttrValue::as_s)
                    .is_some_and(|v| v == value)
            })
            .cloned()
            .collect())
    }

    async fn update_item(
        &self,
        key: &ItemKey,
        actions: Vec<UpdateAction>,
        condition: Option<Condition>,
    ) -> Result<Item, StoreError> {
        let mut table = self.table.write();
        if let Some(cond) = &condition {
            if !cond.eval(table.get(key)) {
                return Err(StoreError::ConditionFailed {
                    key: key.to_string(),
                });
            }
        }
        let item = table.entry(key.clone()).or_default();
        for action in &actions {
            action.apply(item);
        }
        Ok(item.clone())
    }

    async fn transact_write(&self, writes: WriteSet) -> Result<(), StoreError> {
        writes.validate(self.config.max_transact_items)?;

        // Single write lock across evaluate-then-apply: the isolation
        // boundary of the whole engine.
        let mut table = self.table.write();

        let reasons: Vec<CancelReason> = writes
            .ops()
            .iter()
            .map(|op| match op.condition() {
                Some(cond) if !cond.eval(table.get(op.key())) => CancelReason::ConditionFailed,
                _ => CancelReason::None,
            })
            .collect();

        if reasons.iter().any(|r| *r == CancelReason::ConditionFailed) {
            tracing::debug!(
                ops = writes.len(),
                failed = reasons
                    .iter()
                    .filter(|r| **r == CancelReason::ConditionFailed)
                    .count(),
                "write set cancelled by precondition"
            );
            return Err(StoreError::TransactionCanceled { reasons });
        }

        for op in writes.ops() {
            Self::apply_op(&mut table, op);
        }
        Ok(())
    }
}

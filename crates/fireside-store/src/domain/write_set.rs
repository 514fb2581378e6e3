//! Write sets: the unit of mutation.
//!
//! INVARIANT-1: a write set touches each key at most once.
//! INVARIANT-2: a write set never exceeds the configured item limit.
//! Both are validated before execution; violation is a caller bug, not
//! a runtime race.

use super::condition::Condition;
use super::update::UpdateAction;
use serde::{Deserialize, Serialize};
use shared_types::{Item, ItemKey, StoreError};
use std::collections::BTreeSet;

/// Upper bound on operations per write set, mirroring the backing
/// store's transaction limit.
pub const MAX_TRANSACT_ITEMS: usize = 100;

/// One item operation inside a write set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Replace the whole item.
    Put {
        key: ItemKey,
        item: Item,
        condition: Option<Condition>,
    },
    /// Apply update actions (upsert when the item is absent).
    Update {
        key: ItemKey,
        actions: Vec<UpdateAction>,
        condition: Option<Condition>,
    },
    /// Remove the item.
    Delete {
        key: ItemKey,
        condition: Option<Condition>,
    },
}

impl WriteOp {
    pub fn key(&self) -> &ItemKey {
        match self {
            WriteOp::Put { key, .. }
            | WriteOp::Update { key, .. }
            | WriteOp::Delete { key, .. } => key,
        }
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            WriteOp::Put { condition, .. }
            | WriteOp::Update { condition, .. }
            | WriteOp::Delete { condition, .. } => condition.as_ref(),
        }
    }

    pub fn put(key: ItemKey, item: Item) -> Self {
        WriteOp::Put {
            key,
            item,
            condition: None,
        }
    }

    pub fn put_if(key: ItemKey, item: Item, condition: Condition) -> Self {
        WriteOp::Put {
            key,
            item,
            condition: Some(condition),
        }
    }

    pub fn update(key: ItemKey, actions: Vec<UpdateAction>) -> Self {
        WriteOp::Update {
            key,
            actions,
            condition: None,
        }
    }

    pub fn update_if(key: ItemKey, actions: Vec<UpdateAction>, condition: Condition) -> Self {
        WriteOp::Update {
            key,
            actions,
            condition: Some(condition),
        }
    }

    pub fn delete_if(key: ItemKey, condition: Condition) -> Self {
        WriteOp::Delete {
            key,
            condition: Some(condition),
        }
    }
}

/// An ordered, validated group of item operations submitted atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteSet {
    ops: Vec<WriteOp>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn with(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Checks the structural invariants.
    ///
    /// # Errors
    /// `InvalidWriteSet` on emptiness, duplicate keys, or overflow.
    pub fn validate(&self, max_items: usize) -> Result<(), StoreError> {
        if self.ops.is_empty() {
            return Err(StoreError::InvalidWriteSet("empty write set".into()));
        }
        if self.ops.len() > max_items {
            return Err(StoreError::InvalidWriteSet(format!(
                "{} operations exceeds limit of {max_items}",
                self.ops.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for op in &self.ops {
            if !seen.insert(op.key().clone()) {
                return Err(StoreError::InvalidWriteSet(format!(
                    "duplicate key {} in write set",
                    op.key()
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<WriteOp> for WriteSet {
    fn from_iter<I: IntoIterator<Item = WriteOp>>(iter: I) -> Self {
        WriteSet {
            ops: iter.into_iter().collect(),
        }
    }
}

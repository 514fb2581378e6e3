//! Update actions.
//!
//! An update is an ordered list of actions applied to one item. Actions
//! are total: applying to a missing attribute creates it (numeric `Add`
//! starts from zero, set/list actions start from empty), mirroring the
//! upsert semantics of the backing store's update expressions.

use serde::{Deserialize, Serialize};
use shared_types::{AttrValue, Item};
use std::collections::BTreeSet;

/// One attribute mutation inside an Update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateAction {
    /// Overwrite the attribute.
    Set(String, AttrValue),
    /// Numeric increment (negative delta decrements). Quota counters
    /// only move through this action, guarded by a condition.
    Add(String, i64),
    /// Insert into a string set (idempotent).
    AddToSet(String, String),
    /// Remove from a string set (no-op when absent).
    DeleteFromSet(String, String),
    /// Append to a list.
    ListAppend(String, AttrValue),
    /// Remove every list element equal to the value.
    ListRemove(String, AttrValue),
    /// Drop the attribute entirely.
    Remove(String),
}

impl UpdateAction {
    /// Applies this action to the item in place.
    pub fn apply(&self, item: &mut Item) {
        match self {
            UpdateAction::Set(attr, value) => {
                item.insert(attr.clone(), value.clone());
            }
            UpdateAction::Add(attr, delta) => {
                let current = item.get(attr).and_then(AttrValue::as_n).unwrap_or(0);
                item.insert(attr.clone(), AttrValue::N(current + delta));
            }
            UpdateAction::AddToSet(attr, member) => {
                let mut set = item
                    .get(attr)
                    .and_then(AttrValue::as_string_set)
                    .cloned()
                    .unwrap_or_else(BTreeSet::new);
                set.insert(member.clone());
                item.insert(attr.clone(), AttrValue::StringSet(set));
            }
            UpdateAction::DeleteFromSet(attr, member) => {
                if let Some(AttrValue::StringSet(set)) = item.get_mut(attr) {
                    set.remove(member);
                }
            }
            UpdateAction::ListAppend(attr, value) => {
                let mut list = item
                    .get(attr)
                    .and_then(AttrValue::as_list)
                    .map(<[AttrValue]>::to_vec)
                    .unwrap_or_default();
                list.push(value.clone());
                item.insert(attr.clone(), AttrValue::List(list));
            }
            UpdateAction::ListRemove(attr, value) => {
                if let Some(AttrValue::List(list)) = item.get_mut(attr) {
                    list.retain(|v| v != value);
                }
            }
            UpdateAction::Remove(attr) => {
                item.remove(attr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_creates_from_zero() {
        let mut item = Item::new();
        UpdateAction::Add("remaining_assets".into(), -1).apply(&mut item);
        assert_eq!(item.get("remaining_assets").unwrap().as_n(), Some(-1));
    }

    #[test]
    fn test_add_increments_existing() {
        let mut item = Item::new();
        item.insert("remaining_sections".into(), AttrValue::N(3));
        UpdateAction::Add("remaining_sections".into(), 1).apply(&mut item);
        assert_eq!(item.get("remaining_sections").unwrap().as_n(), Some(4));
    }

    #[test]
    fn test_add_to_set_is_idempotent() {
        let mut item = Item::new();
        UpdateAction::AddToSet("players".into(), "u-1".into()).apply(&mut item);
        UpdateAction::AddToSet("players".into(), "u-1".into()).apply(&mut item);
        assert_eq!(item.get("players").unwrap().as_string_set().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_from_missing_set_is_noop() {
        let mut item = Item::new();
        UpdateAction::DeleteFromSet("players".into(), "u-1".into()).apply(&mut item);
        assert!(!item.contains_key("players"));
    }

    #[test]
    fn test_list_append_and_remove() {
        let mut item = Item::new();
        UpdateAction::ListAppend("assets".into(), AttrValue::s("a-1")).apply(&mut item);
        UpdateAction::ListAppend("assets".into(), AttrValue::s("a-2")).apply(&mut item);
        UpdateAction::ListRemove("assets".into(), AttrValue::s("a-1")).apply(&mut item);
        assert_eq!(
            item.get("assets").unwrap().as_list().unwrap(),
            &[AttrValue::s("a-2")]
        );
    }

    #[test]
    fn test_remove_drops_attribute() {
        let mut item = Item::new();
        item.insert("label".into(), AttrValue::s("x"));
        UpdateAction::Remove("label".into()).apply(&mut item);
        assert!(!item.contains_key("label"));
    }
}

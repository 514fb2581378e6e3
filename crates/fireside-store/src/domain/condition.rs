//! Precondition expressions.
//!
//! A condition is evaluated against the item's current attributes at
//! transaction time, under the same isolation as the writes themselves.
//! Comparisons against a missing item or missing attribute are false;
//! only [`Condition::NotExists`] and [`Condition::ItemNotExists`] can
//! hold for an absent value.

use serde::{Deserialize, Serialize};
use shared_types::{AttrValue, Item};

/// An equality/inequality expression over one item's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `attr == value`
    Eq(String, AttrValue),
    /// `attr != value` (false when the attribute is absent)
    Ne(String, AttrValue),
    /// `attr > value`, numeric only.
    Gt(String, i64),
    /// `attr` equals one of the listed values.
    In(String, Vec<AttrValue>),
    /// The attribute is present.
    Exists(String),
    /// The attribute is absent.
    NotExists(String),
    /// The item itself exists.
    ItemExists,
    /// The item itself does not exist (create-only puts).
    ItemNotExists,
    /// Every sub-condition holds.
    And(Vec<Condition>),
    /// At least one sub-condition holds.
    Or(Vec<Condition>),
}

impl Condition {
    /// Evaluates against the current item (`None` = item absent).
    pub fn eval(&self, item: Option<&Item>) -> bool {
        match self {
            Condition::Eq(attr, value) => {
                item.and_then(|i| i.get(attr)).is_some_and(|v| v == value)
            }
            Condition::Ne(attr, value) => {
                item.and_then(|i| i.get(attr)).is_some_and(|v| v != value)
            }
            Condition::Gt(attr, bound) => item
                .and_then(|i| i.get(attr))
                .and_then(AttrValue::as_n)
                .is_some_and(|n| n > *bound),
            Condition::In(attr, values) => item
                .and_then(|i| i.get(attr))
                .is_some_and(|v| values.contains(v)),
            Condition::Exists(attr) => item.is_some_and(|i| i.contains_key(attr)),
            Condition::NotExists(attr) => !item.is_some_and(|i| i.contains_key(attr)),
            Condition::ItemExists => item.is_some(),
            Condition::ItemNotExists => item.is_none(),
            Condition::And(conds) => conds.iter().all(|c| c.eval(item)),
            Condition::Or(conds) => conds.iter().any(|c| c.eval(item)),
        }
    }

    /// `attr == string`, the common ownership precondition.
    pub fn eq_s(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Eq(attr.into(), AttrValue::s(value.into()))
    }

    /// `attr > 0`, the quota precondition.
    pub fn positive(attr: impl Into<String>) -> Self {
        Condition::Gt(attr.into(), 0)
    }

    /// `attr` is one of the given strings.
    pub fn in_s<I, T>(attr: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Condition::In(
            attr.into(),
            values.into_iter().map(|v| AttrValue::s(v.into())).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Item;

    fn item(entries: &[(&str, AttrValue)]) -> Item {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_eq_against_missing_item_is_false() {
        assert!(!Condition::eq_s("user_id", "u-1").eval(None));
    }

    #[test]
    fn test_eq_matches_current_value() {
        let i = item(&[("user_id", AttrValue::s("u-1"))]);
        assert!(Condition::eq_s("user_id", "u-1").eval(Some(&i)));
        assert!(!Condition::eq_s("user_id", "u-2").eval(Some(&i)));
    }

    #[test]
    fn test_gt_is_strict() {
        let i = item(&[("remaining_sections", AttrValue::N(1))]);
        assert!(Condition::positive("remaining_sections").eval(Some(&i)));
        let drained = item(&[("remaining_sections", AttrValue::N(0))]);
        assert!(!Condition::positive("remaining_sections").eval(Some(&drained)));
    }

    #[test]
    fn test_gt_on_non_numeric_is_false() {
        let i = item(&[("remaining_sections", AttrValue::s("many"))]);
        assert!(!Condition::positive("remaining_sections").eval(Some(&i)));
    }

    #[test]
    fn test_in_matches_any_listed_value() {
        let i = item(&[("status", AttrValue::s("READY"))]);
        let cond = Condition::in_s("status", ["PENDING", "READY", "EXPIRED"]);
        assert!(cond.eval(Some(&i)));
        let finalising = item(&[("status", AttrValue::s("FINALISING"))]);
        assert!(!cond.eval(Some(&finalising)));
    }

    #[test]
    fn test_not_exists_holds_for_missing_item() {
        assert!(Condition::NotExists("user_id".into()).eval(None));
        assert!(Condition::ItemNotExists.eval(None));
        let i = item(&[("user_id", AttrValue::s("u-1"))]);
        assert!(!Condition::ItemNotExists.eval(Some(&i)));
    }

    #[test]
    fn test_and_or_compose() {
        let i = item(&[
            ("user_id", AttrValue::s("u-1")),
            ("player_type", AttrValue::s("NPC")),
        ]);
        let owner_or_npc = Condition::Or(vec![
            Condition::eq_s("user_id", "someone-else"),
            Condition::eq_s("player_type", "NPC"),
        ]);
        assert!(owner_or_npc.eval(Some(&i)));
        let both = Condition::And(vec![
            Condition::eq_s("user_id", "u-1"),
            Condition::eq_s("player_type", "GM"),
        ]);
        assert!(!both.eval(Some(&i)));
    }
}

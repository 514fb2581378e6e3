//! Attribute model for the single-table store.
//!
//! Items are flat attribute maps; every value is one of the variants
//! below. String sets are kept distinct from lists because set-valued
//! attributes support idempotent add/remove update actions (game
//! membership), while lists preserve order (section asset ids).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// UTF-8 string.
    S(String),
    /// Signed integer. Quota counters live here.
    N(i64),
    /// Boolean flag.
    Bool(bool),
    /// Unordered set of unique strings.
    StringSet(BTreeSet<String>),
    /// Ordered list of values.
    List(Vec<AttrValue>),
    /// Nested attribute map.
    Map(BTreeMap<String, AttrValue>),
    /// Explicit null.
    Null,
}

/// A stored item: one row of the table.
pub type Item = BTreeMap<String, AttrValue>;

impl AttrValue {
    /// Convenience constructor for string attributes.
    pub fn s(value: impl Into<String>) -> Self {
        AttrValue::S(value.into())
    }

    /// Convenience constructor for a string set.
    pub fn string_set<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        AttrValue::StringSet(values.into_iter().map(Into::into).collect())
    }

    /// Convenience constructor for a list of strings.
    pub fn string_list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        AttrValue::List(values.into_iter().map(|v| AttrValue::S(v.into())).collect())
    }

    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<i64> {
        match self {
            AttrValue::N(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_string_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttrValue::StringSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Read a required string attribute, reporting the attribute name on failure.
pub fn require_s(item: &Item, attr: &str) -> Result<String, crate::errors::StoreError> {
    item.get(attr)
        .and_then(AttrValue::as_s)
        .map(str::to_owned)
        .ok_or_else(|| crate::errors::StoreError::MalformedItem {
            attr: attr.to_owned(),
        })
}

/// Read a required integer attribute.
pub fn require_n(item: &Item, attr: &str) -> Result<i64, crate::errors::StoreError> {
    item.get(attr)
        .and_then(AttrValue::as_n)
        .ok_or_else(|| crate::errors::StoreError::MalformedItem {
            attr: attr.to_owned(),
        })
}

/// Read an optional string attribute (absent and Null both read as None).
pub fn optional_s(item: &Item, attr: &str) -> Option<String> {
    item.get(attr).and_then(AttrValue::as_s).map(str::to_owned)
}

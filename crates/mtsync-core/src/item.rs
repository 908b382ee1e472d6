//! The `Item` type: a string-to-string mapping representing one row of a
//! device collection, plus the handful of `.id`-aware helpers every other
//! module in this crate needs.

use std::collections::BTreeMap;

use mtsync_error::{MtsyncError, Result};

use crate::codec;

pub const ID_KEY: &str = ".id";

/// A device row or a desired-state row. `BTreeMap` gives us a stable,
/// deterministic iteration order for diffing and tests; key order carries
/// no semantics here (unlike the desired *tree*, where insertion order of a
/// mapping's values decides whether it is a leaf-settings node — see
/// `tree.rs`).
pub type Item = BTreeMap<String, String>;

/// The numeric id of an item, parsed from its `.id` field.
pub fn id_of(item: &Item) -> Result<u64> {
    let raw = item
        .get(ID_KEY)
        .ok_or_else(|| MtsyncError::invariant("item missing .id key"))?;
    codec::parse_id(raw)
}

pub fn set_id(item: &mut Item, id: u64) {
    item.insert(ID_KEY.to_string(), codec::format_id(id));
}

/// `new_state` with `.id` forced to `id` (string form). Used by `update`,
/// which replaces a current item's payload but keeps its original id.
pub fn with_id(mut new_state: Item, id: u64) -> Item {
    set_id(&mut new_state, id);
    new_state
}

/// Item equality ignoring `.id`, used as the "same value" check.
pub fn without_id(item: &Item) -> Item {
    item.iter()
        .filter(|(k, _)| k.as_str() != ID_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

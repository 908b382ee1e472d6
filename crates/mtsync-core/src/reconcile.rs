//! List reconciler (component D): pairs current items with desired items,
//! emits patch/put/delete actions (phase 1), then plans a reorder (phase
//! 2) against the imagined post-mutation state. Plus the much simpler dict
//! reconciler for leaf settings endpoints.

use std::collections::BTreeSet;

use mtsync_error::{MtsyncError, Result};

use crate::action::{Action, ActionKind};
use crate::codec;
use crate::device::DeviceClient;
use crate::imagined::Imagined;
use crate::item::{self, Item};
use crate::matcher;

/// The union of every desired item's keys, plus `.id` — this is the
/// `.proplist` sent with the collection GET so the device only returns the
/// columns the reconciler cares about.
pub fn build_proplist(desired_items: &[Item]) -> Vec<String> {
    let mut keys: BTreeSet<String> = desired_items
        .iter()
        .flat_map(|item| item.keys().cloned())
        .collect();
    keys.insert(item::ID_KEY.to_string());
    keys.into_iter().collect()
}

/// Phase 1: greedy identity pairing, emitting PATCH for matched pairs that
/// differ, PUT for unmatched desired items, DELETE for unmatched current
/// items. Updates `imagined` in lockstep so phase 2 sees the post-phase-1
/// id layout.
pub fn reconcile_add_remove_patch(
    path: &str,
    current_items: Vec<Item>,
    desired_items: &[Item],
    imagined: &mut Imagined,
) -> Result<Vec<Action>> {
    let mut current_pending = current_items;
    let mut desired_pending: Vec<Item> = desired_items.to_vec();
    let mut actions = Vec::new();

    while !current_pending.is_empty() && !desired_pending.is_empty() {
        let mut best: Option<(usize, usize, usize)> = None;

        for (ci, current) in current_pending.iter().enumerate() {
            for (di, desired) in desired_pending.iter().enumerate() {
                let s = matcher::score(current, desired);
                if best.is_none_or(|(_, _, best_score)| s > best_score) {
                    best = Some((ci, di, s));
                }
            }
        }

        let (ci, di) = best.map(|(ci, di, _)| (ci, di)).ok_or_else(|| {
            MtsyncError::invariant(format!(
                "pairing loop at {path}: no current/desired pair shares any key/value, \
                 but both queues are non-empty"
            ))
        })?;

        let current_item = current_pending.remove(ci);
        let desired_item = desired_pending.remove(di);
        let current_id = item::id_of(&current_item)?;

        let needs_patch = desired_item.iter().any(|(k, v)| match current_item.get(k) {
            None => !v.is_empty(),
            Some(current_v) => current_v != v,
        });

        if needs_patch {
            actions.push(
                Action::new(
                    ActionKind::Patch,
                    format!("{path}/{}", codec::format_id(current_id)),
                )
                .with_set_dict(desired_item.clone())
                .with_current_dict(current_item),
            );
            imagined.update(current_id, &desired_item)?;
        }
    }

    for desired_item in desired_pending {
        actions.push(Action::new(ActionKind::Put, path).with_set_dict(desired_item.clone()));
        imagined.append(&desired_item)?;
    }

    for current_item in current_pending {
        let id = item::id_of(&current_item)?;
        actions.push(
            Action::new(ActionKind::Delete, format!("{path}/{}", codec::format_id(id)))
                .with_current_dict(current_item),
        );
        imagined.delete(id)?;
    }

    Ok(actions)
}

/// Phase 2: walk the desired order position by position; wherever the
/// imagined state disagrees, find the matching item further down and move
/// it up. Always moves "up" (toward lower ids), so `Imagined::move_item`'s
/// `source > destination` precondition always holds here.
pub fn reconcile_reorder(
    path: &str,
    desired_items: &[Item],
    imagined: &mut Imagined,
) -> Result<Vec<Action>> {
    let mut actions = Vec::new();

    for (i, desired) in desired_items.iter().enumerate() {
        if i >= imagined.state.len() {
            break;
        }
        if matcher::equal(desired, &imagined.state[i]) {
            continue;
        }

        let found = imagined.state[i + 1..]
            .iter()
            .position(|it| matcher::equal(it, desired));

        let Some(offset) = found else {
            // Best-effort: add/remove already accounted for the
            // discrepancy, nothing further to do for this position.
            continue;
        };

        let found_idx = i + 1 + offset;
        let source_id = item::id_of(&imagined.state[found_idx])?;
        let destination_id = item::id_of(&imagined.state[i])?;

        let set_dict: Item = [
            ("numbers".to_string(), codec::format_id(source_id)),
            ("destination".to_string(), codec::format_id(destination_id)),
        ]
        .into_iter()
        .collect();

        actions.push(Action::new(ActionKind::Post, format!("{path}/move")).with_set_dict(set_dict));
        imagined.move_item(source_id, destination_id)?;
    }

    Ok(actions)
}

/// Full list reconciliation against one collection path: GET current
/// state, run phase 1, and — unless `path` is in `non_movable` — phase 2.
pub async fn reconcile_list<D: DeviceClient>(
    device: &D,
    path: &str,
    desired_items: &[Item],
    non_movable: &BTreeSet<String>,
) -> Result<Vec<Action>> {
    let proplist = build_proplist(desired_items);
    let current_items = device.get_collection(path, &proplist).await?;

    let mut imagined = Imagined::new(current_items.clone());
    let mut actions = reconcile_add_remove_patch(path, current_items, desired_items, &mut imagined)?;

    if !non_movable.contains(path) {
        actions.extend(reconcile_reorder(path, desired_items, &mut imagined)?);
    }

    Ok(actions)
}

/// Leaf settings reconciliation: GET current state; emit a single POST
/// `<path>/set` with the entire desired dict iff any desired key disagrees
/// with (or is absent from) the current state.
pub async fn reconcile_dict<D: DeviceClient>(
    device: &D,
    path: &str,
    desired: &Item,
) -> Result<Vec<Action>> {
    let current = device.get_leaf(path).await?;

    let changed = desired
        .iter()
        .any(|(k, v)| current.get(k).map(String::as_str) != Some(v.as_str()));

    if changed {
        Ok(vec![Action::new(ActionKind::Post, format!("{path}/set"))
            .with_set_dict(desired.clone())
            .with_current_dict(current)])
    } else {
        Ok(vec![])
    }
}

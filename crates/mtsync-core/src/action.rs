//! The `Action` type — a planned mutation against the device — and its
//! ordering.

use crate::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionKind {
    Patch = 1,
    Put = 2,
    Delete = 3,
    Post = 4,
}

#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    pub path: String,
    pub set_dict: Item,
    /// Carried for human-readable diff output only; has no effect on
    /// execution.
    pub current_dict: Item,
}

impl Action {
    pub fn new(kind: ActionKind, path: impl Into<String>) -> Self {
        Action {
            kind,
            path: path.into(),
            set_dict: Item::new(),
            current_dict: Item::new(),
        }
    }

    pub fn with_set_dict(mut self, set_dict: Item) -> Self {
        self.set_dict = set_dict;
        self
    }

    pub fn with_current_dict(mut self, current_dict: Item) -> Self {
        self.current_dict = current_dict;
        self
    }

    /// Stably sorts `actions` by kind: PATCH < PUT < DELETE < POST. This is
    /// both a safety heuristic (known-id patches before inserts, before
    /// deletes, before reorders) and a correctness requirement, since POST
    /// `move` actions reference imagined ids that are only valid once
    /// every PATCH/PUT/DELETE has executed.
    pub fn sort_for_execution(actions: &mut [Action]) {
        actions.sort_by_key(|a| a.kind);
    }

    /// Per-key before/after lines for every key that changed, for
    /// diagnostic logging. Has no bearing on execution.
    pub fn diff(&self) -> Vec<String> {
        let keys = self
            .set_dict
            .keys()
            .chain(self.current_dict.keys())
            .filter(|k| k.as_str() != ".id")
            .collect::<std::collections::BTreeSet<_>>();

        keys.into_iter()
            .filter_map(|key| {
                let left = self
                    .current_dict
                    .get(key)
                    .map(String::as_str)
                    .unwrap_or("[empty]");
                let right = self
                    .set_dict
                    .get(key)
                    .map(String::as_str)
                    .unwrap_or("[empty]");
                (left != right).then(|| format!("{key}: {left} -> {right}"))
            })
            .collect()
    }
}

//! Imagined list (component B): an in-memory model of a collection's
//! post-mutation state and id layout.
//!
//! Always well-formed: every item carries `.id`, and the set of ids is a
//! compact range `{1, ..., n}`. Each operation below maintains that
//! invariant on its own — see `mtsync-core`'s test suite for the literal
//! scenarios this is checked against.

use mtsync_error::{MtsyncError, Result};

use crate::item::{self, Item};

#[derive(Debug, Clone)]
pub struct Imagined {
    pub state: Vec<Item>,
}

impl Imagined {
    pub fn new(initial_state: Vec<Item>) -> Self {
        Imagined {
            state: initial_state,
        }
    }

    fn max_id(&self) -> Result<u64> {
        let mut max = 0;
        for it in &self.state {
            max = max.max(item::id_of(it)?);
        }
        Ok(max)
    }

    fn position_of(&self, id: u64) -> Option<usize> {
        self.state
            .iter()
            .position(|it| item::id_of(it).ok() == Some(id))
    }

    /// Replaces the item with id `id` by `new_state`, preserving the
    /// original id. No reordering.
    pub fn update(&mut self, id: u64, new_state: &Item) -> Result<()> {
        let pos = self
            .position_of(id)
            .ok_or_else(|| MtsyncError::invariant(format!("update: no item with id {id}")))?;
        self.state[pos] = item::with_id(new_state.clone(), id);
        Ok(())
    }

    /// Appends a copy of `item` with a fresh id of `max_id + 1`.
    pub fn append(&mut self, item: &Item) -> Result<()> {
        let new_id = self.max_id()? + 1;
        self.state.push(item::with_id(item.clone(), new_id));
        Ok(())
    }

    /// Removes the item with id `id`, then decrements every id strictly
    /// greater than `id` by one so the remaining ids stay compact.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        let pos = self
            .position_of(id)
            .ok_or_else(|| MtsyncError::invariant(format!("delete: no item with id {id}")))?;
        self.state.remove(pos);

        for it in self.state.iter_mut() {
            let current = item::id_of(it)?;
            if current > id {
                item::set_id(it, current - 1);
            }
        }
        Ok(())
    }

    /// Moves the item at `source_id` to `destination_id`. Requires
    /// `source_id > destination_id` — this core only ever moves items
    /// "up" (toward lower ids), matching how the reorder planner uses it.
    pub fn move_item(&mut self, source_id: u64, destination_id: u64) -> Result<()> {
        if source_id <= destination_id {
            return Err(MtsyncError::invariant(format!(
                "move requires source ({source_id}) > destination ({destination_id})"
            )));
        }

        let source_pos = self.position_of(source_id);
        let destination_pos = self.position_of(destination_id);

        let (source_pos, destination_pos) = match (source_pos, destination_pos) {
            (Some(s), Some(d)) => (s, d),
            _ => {
                return Err(MtsyncError::invariant(format!(
                    "move: unable to find source id {source_id} or destination id {destination_id}"
                )));
            }
        };

        for it in self.state.iter_mut() {
            let current = item::id_of(it)?;
            if current >= destination_id && current < source_id {
                item::set_id(it, current + 1);
            }
        }

        let moved = self.state[source_pos].clone();
        self.state.insert(destination_pos, moved);
        self.state.remove(source_pos + 1);
        item::set_id(&mut self.state[destination_pos], destination_id);
        Ok(())
    }
}

//! Optimistic reordering
//!
//! A move is two-phase. `move_item` snapshots the list, applies the move and
//! renumbers `order` 1-based so the table reflects it at once; the change
//! then stays tentative until `confirm` (server copy) or `rollback`
//! (snapshot restored exactly).

use crate::error::{AdminError, Result};
use crate::resources::Id;
use tracing::debug;

/// Row with a server id and a display position
pub trait Ordered: Clone {
    fn id(&self) -> Id;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Ids in their new order, as sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReorder {
    pub ids: Vec<Id>,
}

#[derive(Debug, Clone, Default)]
pub struct ReorderableList<T> {
    items: Vec<T>,
    snapshot: Option<Vec<T>>,
}

impl<T: Ordered> ReorderableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, snapshot: None }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// A move is waiting for the server
    pub fn is_pending(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Tentatively move the row at `from` to `to`
    ///
    /// Returns `None` when the row is dropped where it was.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<Option<PendingReorder>> {
        if self.is_pending() {
            return Err(AdminError::InvalidState("a reorder is already in progress".into()));
        }
        let len = self.items.len();
        if from >= len || to >= len {
            return Err(AdminError::InvalidState(format!(
                "move {} -> {} outside list of {}",
                from, to, len
            )));
        }
        if from == to {
            return Ok(None);
        }

        self.snapshot = Some(self.items.clone());
        let item = self.items.remove(from);
        self.items.insert(to, item);
        for (position, item) in self.items.iter_mut().enumerate() {
            item.set_order(position as u32 + 1);
        }
        debug!(from, to, "tentative reorder");

        Ok(Some(PendingReorder { ids: self.items.iter().map(Ordered::id).collect() }))
    }

    /// Take the server's list as authoritative
    pub fn confirm(&mut self, server_items: Vec<T>) {
        self.items = server_items;
        self.snapshot = None;
    }

    /// Keep the tentative order without a server copy
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Restore the list as it was before the tentative move
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!("reorder rolled back");
            self.items = snapshot;
        }
    }

    /// Replace the rows after a plain refresh
    pub fn replace(&mut self, items: Vec<T>) -> Result<()> {
        if self.is_pending() {
            return Err(AdminError::InvalidState("a reorder is in progress".into()));
        }
        self.items = items;
        Ok(())
    }
}

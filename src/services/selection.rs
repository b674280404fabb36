//! Selection service: the shared highlight set and its listeners.
//!
//! DESIGN
//! ======
//! One `SelectionSet` per workbench, shared with panels as an `Arc` snapshot.
//! Mutations copy-on-write through `Arc::make_mut`, so a panel holding an
//! older snapshot never observes a partial update.
//!
//! Listeners run synchronously on the caller's task, in subscription order,
//! exactly once per mutating call. A `clear` on an empty set still notifies:
//! panels treat every notification as "re-read the selection".

use std::sync::Arc;

use tracing::debug;

use crate::state::{EntityId, SelectionSet};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Arc<SelectionSet>) + Send>;

#[derive(Default)]
pub struct SelectionBus {
    current: Arc<SelectionSet>,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for SelectionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionBus")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SelectionBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if selected, add it otherwise. Returns whether `id` is
    /// selected afterwards.
    pub fn toggle(&mut self, id: EntityId) -> bool {
        let selected = Arc::make_mut(&mut self.current).toggle(id);
        debug!(entity = id, selected, size = self.current.len(), "selection: toggled");
        self.notify();
        selected
    }

    /// Append every id in `ids` that is not already selected, as one
    /// mutation. Listeners are notified once, and only when something was
    /// added. Returns how many ids were added.
    pub fn extend(&mut self, ids: &[EntityId]) -> usize {
        let missing: Vec<EntityId> = ids.iter().copied().filter(|id| !self.current.contains(*id)).collect();
        if missing.is_empty() {
            return 0;
        }
        let set = Arc::make_mut(&mut self.current);
        let mut added = 0;
        for id in missing {
            // EDGE: duplicates inside `ids` are added once.
            if !set.contains(id) {
                set.toggle(id);
                added += 1;
            }
        }
        debug!(added, size = self.current.len(), "selection: extended");
        self.notify();
        added
    }

    /// Empty the selection unconditionally.
    pub fn clear(&mut self) {
        Arc::make_mut(&mut self.current).clear();
        debug!("selection: cleared");
        self.notify();
    }

    /// Register a listener. It is not called for the current state.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Arc<SelectionSet>) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<SelectionSet> {
        Arc::clone(&self.current)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.current.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn notify(&mut self) {
        let snapshot = Arc::clone(&self.current);
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;

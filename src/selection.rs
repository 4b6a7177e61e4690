//! Selection set for bulk task actions.

use std::collections::BTreeSet;

/// Task ids the user has marked. Membership is by id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<u64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }

    /// True when the view is non-empty and every id in it is selected.
    pub fn covers(&self, visible: &[u64]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    /// "Select all" toggle: clear when the whole view is already selected,
    /// otherwise select every visible id.
    pub fn toggle_all(&mut self, visible: &[u64]) {
        if self.covers(visible) {
            self.ids.clear();
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }

    /// Drop ids that are no longer visible. Returns how many were removed.
    pub fn retain_visible(&mut self, visible: &[u64]) -> usize {
        let before = self.ids.len();
        let keep: BTreeSet<u64> = visible.iter().copied().collect();
        self.ids.retain(|id| keep.contains(id));
        before - self.ids.len()
    }
}

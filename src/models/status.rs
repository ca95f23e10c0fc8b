//! The last known state of every target, keyed by target id.

use std::collections::{BTreeMap, btree_map};

use super::observed_state::ObservedState;

/// The last observed state of every target, keyed by target id.
///
/// An absent key means the target has never been observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedStatus {
    entries: BTreeMap<String, ObservedState>,
}

impl PersistedStatus {
    /// Creates an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last observed state of `id`, if any.
    pub fn get(&self, id: &str) -> Option<&ObservedState> {
        self.entries.get(id)
    }

    /// Records `state` as the last observation of `id`, returning the
    /// previous one.
    pub fn insert(&mut self, id: impl Into<String>, state: ObservedState) -> Option<ObservedState> {
        self.entries.insert(id.into(), state)
    }

    /// Forgets `id`.
    pub fn remove(&mut self, id: &str) -> Option<ObservedState> {
        self.entries.remove(id)
    }

    /// Keeps only the ids for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|id, _| keep(id));
    }

    /// Number of recorded targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no target has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, state)` pairs in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ObservedState> {
        self.entries.iter()
    }
}

impl FromIterator<(String, ObservedState)> for PersistedStatus {
    fn from_iter<I: IntoIterator<Item = (String, ObservedState)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for PersistedStatus {
    type Item = (String, ObservedState);
    type IntoIter = btree_map::IntoIter<String, ObservedState>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a PersistedStatus {
    type Item = (&'a String, &'a ObservedState);
    type IntoIter = btree_map::Iter<'a, String, ObservedState>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

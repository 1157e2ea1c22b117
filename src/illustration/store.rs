//! Keyed store of page illustration states.
//!
//! Every mutation is a read-modify-write against the current entry, so
//! completions for different keys arriving in any order never overwrite each
//! other's updates.

use std::collections::HashMap;

use super::state::{PageIllustrationState, PageKey};

#[derive(Debug, Default)]
pub struct PageStore {
    pages: HashMap<PageKey, PageIllustrationState>,
}

impl PageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &PageKey) -> Option<&PageIllustrationState> {
        self.pages.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &PageKey) -> bool {
        self.pages.contains_key(key)
    }

    /// Insert an idle state seeded with `draft` unless the key already exists.
    /// Returns `true` when a new entry was created.
    pub fn ensure(&mut self, key: &PageKey, draft: &str) -> bool {
        if self.pages.contains_key(key) {
            return false;
        }
        self.pages.insert(key.clone(), PageIllustrationState::new(draft));
        true
    }

    /// Apply `f` to an existing entry. Unknown keys are left alone.
    pub fn update<R>(&mut self, key: &PageKey, f: impl FnOnce(&mut PageIllustrationState) -> R) -> Option<R> {
        self.pages.get_mut(key).map(f)
    }

    /// Apply `f`, creating the entry from `draft` first if needed.
    pub fn upsert<R>(&mut self, key: &PageKey, draft: &str, f: impl FnOnce(&mut PageIllustrationState) -> R) -> R {
        let state = self
            .pages
            .entry(key.clone())
            .or_insert_with(|| PageIllustrationState::new(draft));
        f(state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

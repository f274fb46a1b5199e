//! Set of participant ids that have already received the welcome message.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Participants who have already been greeted.
///
/// Ids only leave the set when their greeting could not be delivered.
#[derive(Debug, Default)]
pub struct GreetedSet {
    ids: Mutex<HashSet<String>>,
}

impl GreetedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set that already contains the given ids.
    pub fn with_seed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Insert an id. Returns `true` if it was not present.
    ///
    /// Check and insert happen under one lock, so concurrent callers racing on
    /// the same id see exactly one `true`.
    pub fn insert(&self, id: &str) -> bool {
        // A single insert cannot leave the set half-updated.
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if ids.contains(id) {
            false
        } else {
            ids.insert(id.to_string())
        }
    }

    /// Forget an id. Returns `true` if it was present.
    pub fn remove(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

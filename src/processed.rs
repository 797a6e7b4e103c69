use std::collections::HashSet;

/// Remote message ids that have already been turned into local messages.
///
/// Only grows during a conversation; [`ProcessedIdSet::clear`] is reserved for
/// a full reset.
#[derive(Debug, Clone, Default)]
pub struct ProcessedIdSet {
    ids: HashSet<String>,
}

impl ProcessedIdSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`. Returns `false` when it was already recorded.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

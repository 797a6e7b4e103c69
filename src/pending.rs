use std::collections::VecDeque;

/// A submitted prompt waiting for the server to echo it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub local_id: String,
    pub raw_content: String,
}

/// Submitted prompts in submission order.
///
/// Each entry leaves the queue exactly once: consumed by a matching echo or
/// rolled back after a failed send.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a prompt. Returns `false` without queuing when `local_id` is
    /// already pending.
    pub fn enqueue(&mut self, local_id: impl Into<String>, content: impl Into<String>) -> bool {
        let local_id = local_id.into();
        if self.contains(&local_id) {
            return false;
        }

        self.entries.push_back(PendingEntry {
            local_id,
            raw_content: content.into(),
        });
        true
    }

    /// Remove and return the first entry whose trimmed content equals
    /// `normalized_text`.
    ///
    /// When several pending prompts have identical text the oldest one wins,
    /// even if the echo actually belongs to a later one.
    pub fn match_and_consume(&mut self, normalized_text: &str) -> Option<PendingEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.raw_content.trim() == normalized_text)?;
        self.entries.remove(index)
    }

    /// Drop the entry for `local_id`, wherever it sits. Returns whether one
    /// was removed.
    pub fn rollback(&mut self, local_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.local_id != local_id);
        self.entries.len() != before
    }

    #[must_use]
    pub fn contains(&self, local_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.local_id == local_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry> {
        self.entries.iter()
    }
}

use std::collections::HashMap;

use log::debug;

use crate::message::ChatMessage;
use crate::reconcile::ReconcileBatch;

/// Local view of one server-side conversation: its id and the ordered
/// transcript.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    session_id: Option<String>,
    messages: Vec<ChatMessage>,
    index_by_id: HashMap<String, usize>,
}

impl ConversationSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Adopt `id` as the current session id. Returns whether it changed.
    pub fn set_session_id(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.session_id.as_deref() == Some(id.as_str()) {
            return false;
        }
        self.session_id = Some(id);
        true
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.index_by_id
            .get(id)
            .and_then(|index| self.messages.get(*index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append to the tail. A message whose id is already present is dropped
    /// and `false` returned; ids are never reused.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if self.index_by_id.contains_key(&message.id) {
            debug!("dropping message with duplicate local id {}", message.id);
            return false;
        }

        self.index_by_id
            .insert(message.id.clone(), self.messages.len());
        self.messages.push(message);
        true
    }

    /// Attach `remote_id` to the message `local_id` unless it already has one.
    pub fn backfill_remote_id(&mut self, local_id: &str, remote_id: &str) -> bool {
        let Some(index) = self.index_by_id.get(local_id).copied() else {
            return false;
        };
        let message = &mut self.messages[index];
        if message.remote_message_id.is_some() {
            return false;
        }
        message.remote_message_id = Some(remote_id.to_string());
        true
    }

    /// Commit every backfill and append from one reconciliation pass.
    pub fn apply(&mut self, batch: ReconcileBatch) {
        for backfill in &batch.backfills {
            self.backfill_remote_id(&backfill.local_id, &backfill.remote_id);
        }
        for message in batch.appended {
            self.push(message);
        }
    }

    /// Forget the session id and the whole transcript.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.messages.clear();
        self.index_by_id.clear();
    }
}

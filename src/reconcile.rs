//! Turns a chat response into transcript changes.
//!
//! Entries are handled in arrival order. An entry whose normalized text equals
//! a pending prompt is the server echoing that prompt: it only annotates the
//! existing user message. Anything else becomes a new assistant message.

use convo_api::ResponseMessage;
use log::debug;

use crate::message::{timestamp_or_now, ChatMessage};
use crate::normalize::{format_response, Attribution};
use crate::pending::PendingQueue;
use crate::processed::ProcessedIdSet;

/// Remote id to attach to an already visible user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backfill {
    pub local_id: String,
    pub remote_id: String,
}

/// Everything one reconciliation pass wants to change in the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileBatch {
    pub backfills: Vec<Backfill>,
    pub appended: Vec<ChatMessage>,
}

impl ReconcileBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backfills.is_empty() && self.appended.is_empty()
    }
}

/// Reconcile `messages` against the pending prompts.
///
/// Every id seen here is recorded in `processed`, including entries that
/// normalize to nothing, so a repeated payload never yields new messages.
pub fn reconcile(
    messages: &[ResponseMessage],
    pending: &mut PendingQueue,
    processed: &mut ProcessedIdSet,
) -> ReconcileBatch {
    let mut batch = ReconcileBatch::default();

    for message in messages {
        let Some(remote_id) = message.remote_id() else {
            debug!("skipping response entry without id");
            continue;
        };
        if processed.contains(remote_id) {
            debug!("skipping already processed response entry {remote_id}");
            continue;
        }

        let attributions: Vec<Attribution> =
            message.attributions.iter().map(Attribution::from).collect();
        let normalized = format_response(&message.canonical_text(), &attributions);
        processed.insert(remote_id);

        if normalized.is_empty() {
            debug!("discarding response entry {remote_id} with no renderable text");
            continue;
        }

        if let Some(entry) = pending.match_and_consume(&normalized) {
            debug!("response entry {remote_id} echoes pending prompt {}", entry.local_id);
            batch.backfills.push(Backfill {
                local_id: entry.local_id,
                remote_id: remote_id.to_string(),
            });
            continue;
        }

        batch.appended.push(ChatMessage::assistant(
            remote_id,
            normalized,
            timestamp_or_now(message.created_date_time.as_deref()),
        ));
    }

    batch
}

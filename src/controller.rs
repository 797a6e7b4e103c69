//! One owned object per conversation: transcript, pending prompts, processed
//! ids and the last error, driven one turn at a time.

use std::sync::Arc;

use convo_api::{ChatApiClient, ChatApiConfig, ChatApiError, ChatRequest};
use log::{debug, info, warn};
use token_source::TokenProvider;

use crate::error::TurnError;
use crate::message::ChatMessage;
use crate::pending::PendingQueue;
use crate::processed::ProcessedIdSet;
use crate::reconcile::reconcile;
use crate::session::ConversationSession;
use crate::timezone::resolve_time_zone;
use crate::transport::ChatTransport;

/// What became of one submission.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input; nothing was recorded or sent.
    Ignored,
    Completed(TurnSummary),
    Failed(TurnError),
}

impl TurnOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&TurnError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub user_message_id: String,
    pub session_id: String,
    /// Assistant messages added to the transcript by this turn.
    pub appended: usize,
    /// User messages that received a remote id from an echo.
    pub backfilled: usize,
}

pub struct ConversationController {
    transport: Arc<dyn ChatTransport>,
    tokens: Arc<dyn TokenProvider>,
    time_zone: Option<String>,
    session: ConversationSession,
    pending: PendingQueue,
    processed: ProcessedIdSet,
    last_error: Option<String>,
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("time_zone", &self.time_zone)
            .field("session", &self.session)
            .field("pending", &self.pending)
            .field("processed", &self.processed)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl ConversationController {
    pub fn new(transport: Arc<dyn ChatTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            transport,
            tokens,
            time_zone: None,
            session: ConversationSession::new(),
            pending: PendingQueue::new(),
            processed: ProcessedIdSet::new(),
            last_error: None,
        }
    }

    /// Controller backed by the HTTP client built from `config`.
    pub fn from_config(
        config: ChatApiConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ChatApiError> {
        let client = ChatApiClient::new(config)?;
        Ok(Self::new(Arc::new(client), tokens))
    }

    /// Fix the location hint instead of resolving it from the environment.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        let time_zone = time_zone.into();
        self.time_zone = (!time_zone.trim().is_empty()).then_some(time_zone);
        self
    }

    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id()
    }

    #[must_use]
    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    #[must_use]
    pub fn processed(&self) -> &ProcessedIdSet {
        &self.processed
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drop the transcript, session id, pending prompts, processed ids and
    /// last error. The next submission starts a new conversation.
    pub fn reset(&mut self) {
        self.session.reset();
        self.pending.clear();
        self.processed.clear();
        self.last_error = None;
        info!("conversation reset");
    }

    pub async fn submit(&mut self, content: &str) -> TurnOutcome {
        self.submit_with_observer(content, |_| {}).await
    }

    /// Submit one prompt. `observer` sees the transcript once the user message
    /// has been appended, before any network work starts.
    pub async fn submit_with_observer<F>(&mut self, content: &str, observer: F) -> TurnOutcome
    where
        F: FnOnce(&ConversationSession),
    {
        if content.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        self.last_error = None;
        let user = ChatMessage::user(content);
        let local_id = user.id.clone();
        self.session.push(user);
        self.pending.enqueue(local_id.clone(), content);
        observer(&self.session);

        match self.run_turn(content).await {
            Ok((session_id, appended, backfilled)) => TurnOutcome::Completed(TurnSummary {
                user_message_id: local_id,
                session_id,
                appended,
                backfilled,
            }),
            Err(error) => {
                self.pending.rollback(&local_id);
                warn!("turn failed: {error}");
                self.last_error = Some(error.to_string());
                TurnOutcome::Failed(error)
            }
        }
    }

    async fn run_turn(&mut self, content: &str) -> Result<(String, usize, usize), TurnError> {
        let token = self.acquire_token().await?;
        let session_id = self.ensure_session(&token).await?;

        let request = ChatRequest::new(content, resolve_time_zone(self.time_zone.as_deref()));
        let response = self
            .transport
            .send_chat(&token, &session_id, &request)
            .await
            .map_err(TurnError::chat_request)?;

        let session_id = match response.session_id() {
            Some(renamed) if renamed != session_id => {
                info!("conversation {session_id} continued as {renamed}");
                self.session.set_session_id(renamed);
                renamed.to_string()
            }
            _ => session_id,
        };

        let batch = reconcile(&response.messages, &mut self.pending, &mut self.processed);
        let appended = batch.appended.len();
        let backfilled = batch.backfills.len();
        debug!("turn reconciled: {appended} appended, {backfilled} backfilled");
        self.session.apply(batch);

        Ok((session_id, appended, backfilled))
    }

    async fn acquire_token(&self) -> Result<String, TurnError> {
        match self.tokens.acquire_token().await {
            Ok(Some(token)) if !token.trim().is_empty() => Ok(token),
            Ok(_) => Err(TurnError::auth("no access token was returned")),
            Err(error) => Err(TurnError::from_token_error(&error)),
        }
    }

    async fn ensure_session(&mut self, token: &str) -> Result<String, TurnError> {
        if let Some(id) = self.session.session_id() {
            return Ok(id.to_string());
        }

        let created = self
            .transport
            .create_conversation(token)
            .await
            .map_err(TurnError::session_creation)?;
        let id = created
            .session_id()
            .ok_or_else(TurnError::missing_session_id)?
            .to_string();

        info!("created conversation {id}");
        self.session.set_session_id(id.clone());
        Ok(id)
    }
}

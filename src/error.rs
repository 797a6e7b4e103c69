use convo_api::error::status_line;
use convo_api::ChatApiError;
use convo_api::StatusCode;
use thiserror::Error;
use token_source::TokenError;

/// Failure of one submitted turn.
///
/// Every variant is terminal for the turn that produced it; nothing is
/// retried automatically.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("failed to acquire access token: {reason}")]
    Auth { reason: String },

    #[error("conversation creation failed ({status}): {detail}")]
    SessionCreation { status: String, detail: String },

    #[error("chat request failed ({}): {detail}", status_text(.status))]
    ChatRequest { status: StatusCode, detail: String },

    #[error("could not reach conversation endpoint: {0}")]
    Transport(#[source] ChatApiError),

    #[error("conversation endpoint returned an unreadable response: {0}")]
    MalformedResponse(String),
}

impl TurnError {
    #[must_use]
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_token_error(error: &TokenError) -> Self {
        Self::auth(error.to_string())
    }

    /// Maps a failed create-conversation call.
    #[must_use]
    pub fn session_creation(error: ChatApiError) -> Self {
        match error {
            ChatApiError::Status(status, detail) => Self::SessionCreation {
                status: status_line(status),
                detail,
            },
            ChatApiError::Decode(message) => Self::SessionCreation {
                status: "invalid body".to_string(),
                detail: message,
            },
            other => Self::SessionCreation {
                status: "no response".to_string(),
                detail: other.to_string(),
            },
        }
    }

    /// Create-conversation succeeded but carried no usable id.
    #[must_use]
    pub fn missing_session_id() -> Self {
        Self::SessionCreation {
            status: "no id".to_string(),
            detail: "the server did not return a conversation id".to_string(),
        }
    }

    /// Maps a failed chat-turn call.
    #[must_use]
    pub fn chat_request(error: ChatApiError) -> Self {
        match error {
            ChatApiError::Status(status, detail) => Self::ChatRequest { status, detail },
            ChatApiError::Decode(message) => Self::MalformedResponse(message),
            other => Self::Transport(other),
        }
    }

    /// HTTP status carried by the failure, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ChatRequest { status, .. } => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}

fn status_text(status: &StatusCode) -> String {
    status_line(*status)
}

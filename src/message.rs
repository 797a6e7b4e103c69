use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One transcript entry.
///
/// `remote_message_id` starts empty for user messages and is filled in once
/// the server echoes the prompt back; it is never overwritten after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_message_id: Option<String>,
}

impl ChatMessage {
    /// A freshly submitted user prompt with a new local id.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            role: Role::User,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            remote_message_id: None,
        }
    }

    /// An assistant message keyed by its remote id.
    #[must_use]
    pub fn assistant(
        remote_id: impl Into<String>,
        content: impl Into<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        let remote_id = remote_id.into();
        Self {
            id: format!("assistant-{remote_id}"),
            role: Role::Assistant,
            content: content.into(),
            created_at,
            remote_message_id: Some(remote_id),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: format!("system-{}", Uuid::new_v4()),
            role: Role::System,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            remote_message_id: None,
        }
    }
}

/// Parses a server timestamp, falling back to the local clock.
pub(crate) fn timestamp_or_now(value: Option<&str>) -> OffsetDateTime {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

use ::url::Url;

use crate::error::ChatApiError;

/// Default base URL for conversation requests.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/beta/copilot";

/// Normalize a configured base URL.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) surrounding whitespace and trailing `/` are removed
/// 3) the result must be an absolute `http`/`https` URL
pub fn normalize_base_url(input: &str) -> Result<String, ChatApiError> {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).map_err(|error| ChatApiError::InvalidBaseUrl(format!("{trimmed}: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(ChatApiError::InvalidBaseUrl(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// `POST` target that creates a new conversation.
pub fn conversations_url(base_url: &str) -> Result<String, ChatApiError> {
    join_segments(base_url, &["conversations"])
}

/// `POST` target for one chat turn inside `conversation_id`.
///
/// The id is encoded as a single path segment.
pub fn chat_url(base_url: &str, conversation_id: &str) -> Result<String, ChatApiError> {
    join_segments(base_url, &["conversations", conversation_id, "chat"])
}

fn join_segments(base_url: &str, segments: &[&str]) -> Result<String, ChatApiError> {
    let base = normalize_base_url(base_url)?;
    let mut url = Url::parse(&base).map_err(|error| ChatApiError::InvalidBaseUrl(error.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ChatApiError::InvalidBaseUrl(base.clone()))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url.to_string())
}

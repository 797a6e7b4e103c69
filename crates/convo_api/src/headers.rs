use std::collections::BTreeMap;

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_SUBSCRIPTION_KEY: &str = "ocp-apim-subscription-key";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for one conversation request.
pub fn build_headers(
    config: &ChatApiConfig,
    access_token: &str,
) -> Result<BTreeMap<String, String>, ChatApiError> {
    let mut headers = BTreeMap::new();

    let token = access_token.trim();
    if token.is_empty() {
        return Err(ChatApiError::MissingAccessToken);
    }

    headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    if let Some(key) = config.subscription_key.as_deref().and_then(sanitize_nonempty) {
        headers.insert(HEADER_SUBSCRIPTION_KEY.to_owned(), key);
    }

    let ua = config
        .user_agent
        .as_deref()
        .and_then(sanitize_nonempty)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn default_user_agent() -> String {
    format!(
        "convo_api/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

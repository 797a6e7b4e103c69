use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ChatApiConfig;
use crate::error::{error_detail, ChatApiError};
use crate::headers::build_headers;
use crate::payload::{ChatRequest, ChatResponse, CreateConversationResponse};
use crate::url::{chat_url, conversations_url, normalize_base_url};

#[derive(Debug, Clone)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        normalize_base_url(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn build_headers(&self, access_token: &str) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config, access_token)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_create_conversation_request(
        &self,
        access_token: &str,
    ) -> Result<RequestBuilder, ChatApiError> {
        let headers = self.build_headers(access_token)?;
        Ok(self
            .http
            .post(conversations_url(&self.config.base_url)?)
            .headers(headers)
            .json(&serde_json::json!({})))
    }

    pub fn build_chat_request(
        &self,
        access_token: &str,
        conversation_id: &str,
        request: &ChatRequest,
    ) -> Result<RequestBuilder, ChatApiError> {
        let headers = self.build_headers(access_token)?;
        Ok(self
            .http
            .post(chat_url(&self.config.base_url, conversation_id)?)
            .headers(headers)
            .json(request))
    }

    /// `POST {base}/conversations`.
    pub async fn create_conversation(
        &self,
        access_token: &str,
    ) -> Result<CreateConversationResponse, ChatApiError> {
        let request = self.build_create_conversation_request(access_token)?;
        execute(request).await
    }

    /// `POST {base}/conversations/{conversation_id}/chat`.
    pub async fn send_chat(
        &self,
        access_token: &str,
        conversation_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ChatApiError> {
        let request = self.build_chat_request(access_token, conversation_id, request)?;
        execute(request).await
    }
}

async fn execute<T>(request: RequestBuilder) -> Result<T, ChatApiError>
where
    T: DeserializeOwned + Default,
{
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        debug!("conversation endpoint returned {status}: {detail}");
        return Err(ChatApiError::Status(status, detail));
    }

    let bytes = response.bytes().await?;
    decode_body(&bytes)
}

/// Decode a success body, treating any JSON that is not an object as empty.
pub fn decode_body<T>(bytes: &[u8]) -> Result<T, ChatApiError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value = serde_json::from_slice::<Value>(bytes)
        .map_err(|error| ChatApiError::Decode(error.to_string()))?;
    if !value.is_object() {
        warn!("conversation endpoint returned non-object JSON; treating as empty");
        return Ok(T::default());
    }

    serde_json::from_value(value).map_err(ChatApiError::from)
}

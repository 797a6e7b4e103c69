use async_trait::async_trait;
use convo_api::{ChatApiClient, ChatApiError, ChatRequest, ChatResponse, CreateConversationResponse};

/// The two endpoint calls a turn needs.
///
/// [`ChatApiClient`] is the production implementation; tests substitute
/// scripted transports.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn create_conversation(
        &self,
        access_token: &str,
    ) -> Result<CreateConversationResponse, ChatApiError>;

    async fn send_chat(
        &self,
        access_token: &str,
        conversation_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ChatApiError>;
}

#[async_trait]
impl ChatTransport for ChatApiClient {
    async fn create_conversation(
        &self,
        access_token: &str,
    ) -> Result<CreateConversationResponse, ChatApiError> {
        ChatApiClient::create_conversation(self, access_token).await
    }

    async fn send_chat(
        &self,
        access_token: &str,
        conversation_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ChatApiError> {
        ChatApiClient::send_chat(self, access_token, conversation_id, request).await
    }
}

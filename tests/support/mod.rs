#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use convo_api::{
    ChatApiError, ChatRequest, ChatResponse, CreateConversationResponse, StatusCode,
};
use convo_engine::ChatTransport;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateConversation {
        token: String,
    },
    SendChat {
        token: String,
        conversation_id: String,
        request: ChatRequest,
    },
}

#[derive(Default)]
pub struct TransportTrace {
    pub calls: Vec<TransportCall>,
    create_results: VecDeque<Result<CreateConversationResponse, ChatApiError>>,
    chat_results: VecDeque<Result<ChatResponse, ChatApiError>>,
}

/// Transport that replays queued results and records every call.
pub struct ScriptedTransport {
    state: Arc<Mutex<TransportTrace>>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, Arc<Mutex<TransportTrace>>) {
        let state = Arc::new(Mutex::new(TransportTrace::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl TransportTrace {
    pub fn push_created(&mut self, body: Value) {
        self.create_results.push_back(Ok(decode(body)));
    }

    pub fn push_create_error(&mut self, error: ChatApiError) {
        self.create_results.push_back(Err(error));
    }

    pub fn push_chat(&mut self, body: Value) {
        self.chat_results.push_back(Ok(decode(body)));
    }

    pub fn push_chat_error(&mut self, error: ChatApiError) {
        self.chat_results.push_back(Err(error));
    }

    pub fn create_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, TransportCall::CreateConversation { .. }))
            .count()
    }

    pub fn chat_conversation_ids(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::SendChat {
                    conversation_id, ..
                } => Some(conversation_id.clone()),
                TransportCall::CreateConversation { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn create_conversation(
        &self,
        access_token: &str,
    ) -> Result<CreateConversationResponse, ChatApiError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(TransportCall::CreateConversation {
            token: access_token.to_string(),
        });
        state
            .create_results
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }

    async fn send_chat(
        &self,
        access_token: &str,
        conversation_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ChatApiError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(TransportCall::SendChat {
            token: access_token.to_string(),
            conversation_id: conversation_id.to_string(),
            request: request.clone(),
        });
        state
            .chat_results
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }
}

pub fn status_error(status: StatusCode, detail: &str) -> ChatApiError {
    ChatApiError::Status(status, detail.to_string())
}

fn unscripted() -> ChatApiError {
    ChatApiError::Status(
        StatusCode::NOT_IMPLEMENTED,
        "no scripted response".to_string(),
    )
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> T {
    serde_json::from_value(body).expect("scripted body should decode")
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

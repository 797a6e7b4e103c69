//! Transport-only client primitives for the conversational endpoint.
//!
//! This crate owns request building and response decoding for the
//! `conversations` and `conversations/{id}/chat` endpoints only. It contains no
//! token acquisition and no transcript bookkeeping; callers pass a bearer token
//! per request and interpret the decoded payloads themselves.
//!
//! Response decoding is lenient: wrong-typed fields and malformed list items
//! decode as absent.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{
    ChatRequest, ChatResponse, ContentPart, CreateConversationResponse, MessageContent,
    ResponseAttribution, ResponseMessage,
};
pub use crate::url::{chat_url, conversations_url, normalize_base_url, DEFAULT_BASE_URL};
pub use reqwest::StatusCode;

//! Provider-agnostic contract for acquiring a bearer token.
//!
//! This crate defines only the token acquisition capability and the two-phase
//! (silent, then interactive) combinator. It contains no identity-platform
//! protocol code and assumes nothing about how an interactive step is shown to
//! the user.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

/// Error returned while acquiring a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The silent path cannot produce a token without user interaction.
    InteractionRequired(String),
    /// The user or host abandoned the acquisition.
    Cancelled,
    /// Any other acquisition failure.
    Failed(String),
}

impl TokenError {
    /// Creates a generic acquisition failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates an interaction-required signal.
    #[must_use]
    pub fn interaction_required(reason: impl Into<String>) -> Self {
        Self::InteractionRequired(reason.into())
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InteractionRequired(reason) => write!(f, "interaction required: {reason}"),
            Self::Cancelled => f.write_str("token acquisition was cancelled"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<String> for TokenError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for TokenError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}

/// Capability that yields a bearer token for the conversation endpoint.
///
/// Acquisition may suspend for an unbounded time (for example while a user
/// confirms a sign-in prompt). Dropping the returned future abandons the
/// attempt. `Ok(None)` means the provider finished without a token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<Option<String>, TokenError>;
}

#[async_trait]
impl<T> TokenProvider for Arc<T>
where
    T: TokenProvider + ?Sized,
{
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        (**self).acquire_token().await
    }
}

#[async_trait]
impl<T> TokenProvider for Box<T>
where
    T: TokenProvider + ?Sized,
{
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        (**self).acquire_token().await
    }
}

/// Two-phase provider: try `silent` first and fall back to `interactive` only
/// when the silent phase reports [`TokenError::InteractionRequired`].
#[derive(Debug, Clone)]
pub struct SilentThenInteractive<S, I> {
    silent: S,
    interactive: I,
}

impl<S, I> SilentThenInteractive<S, I> {
    #[must_use]
    pub fn new(silent: S, interactive: I) -> Self {
        Self {
            silent,
            interactive,
        }
    }
}

#[async_trait]
impl<S, I> TokenProvider for SilentThenInteractive<S, I>
where
    S: TokenProvider,
    I: TokenProvider,
{
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        match self.silent.acquire_token().await {
            Err(TokenError::InteractionRequired(reason)) => {
                info!("silent token acquisition needs interaction: {reason}");
                self.interactive.acquire_token().await
            }
            other => {
                debug!("silent token acquisition finished without interaction");
                other
            }
        }
    }
}

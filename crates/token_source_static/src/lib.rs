//! Deterministic implementations of the shared `token_source` contract.
//!
//! This crate contains no identity-platform logic and is intended for local
//! development, the command-line driver, and contract-level testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use token_source::{TokenError, TokenProvider};

/// Environment variable read by [`EnvTokenProvider::default`].
pub const ACCESS_TOKEN_ENV_VAR: &str = "CONVO_ACCESS_TOKEN";

/// Always yields the same token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        Ok(Some(self.token.clone()))
    }
}

/// Reads a token from an environment variable on every acquisition.
///
/// A missing or blank variable reports [`TokenError::InteractionRequired`], so
/// this provider fits the silent phase of a two-phase flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(ACCESS_TOKEN_ENV_VAR)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            _ => Err(TokenError::interaction_required(format!(
                "{} is not set",
                self.var
            ))),
        }
    }
}

/// Replays a fixed sequence of outcomes, then repeats the fallback.
#[derive(Debug)]
pub struct ScriptedTokenProvider {
    outcomes: Mutex<VecDeque<Result<Option<String>, TokenError>>>,
    fallback: Result<Option<String>, TokenError>,
    calls: AtomicUsize,
}

impl ScriptedTokenProvider {
    #[must_use]
    pub fn new(outcomes: Vec<Result<Option<String>, TokenError>>) -> Self {
        Self::with_fallback(outcomes, Ok(None))
    }

    #[must_use]
    pub fn with_fallback(
        outcomes: Vec<Result<Option<String>, TokenError>>,
        fallback: Result<Option<String>, TokenError>,
    ) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of acquisitions observed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for ScriptedTokenProvider {
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = lock_unpoisoned(&self.outcomes).pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

//! Client-side conversation engine.
//!
//! A [`ConversationController`] owns one conversation. Each submission appends
//! the user's prompt to the transcript, obtains a bearer token, creates the
//! server-side conversation on first use, sends the turn and reconciles the
//! returned messages back into the transcript.
//!
//! # Public API Overview
//! - Drive turns with [`ConversationController::submit`] and inspect the
//!   outcome through [`TurnOutcome`] and [`TurnError`].
//! - Read the transcript via [`ConversationSession`] and [`ChatMessage`].
//! - Normalize server text with [`format_response`], [`sanitize`] and
//!   [`rewrite_citations`].
//! - Swap the network layer by implementing [`ChatTransport`].

pub mod controller;
pub mod error;
pub mod message;
pub mod normalize;
pub mod pending;
pub mod processed;
pub mod reconcile;
pub mod session;
pub mod timezone;
pub mod transport;

pub use crate::controller::{ConversationController, TurnOutcome, TurnSummary};
pub use crate::error::TurnError;
pub use crate::message::{ChatMessage, Role};
pub use crate::normalize::{
    build_source_appendix, format_response, rewrite_citations, sanitize, Attribution,
    CitationRewrite, SOURCES_HEADER,
};
pub use crate::pending::{PendingEntry, PendingQueue};
pub use crate::processed::ProcessedIdSet;
pub use crate::reconcile::{reconcile, Backfill, ReconcileBatch};
pub use crate::session::ConversationSession;
pub use crate::timezone::{resolve_time_zone, DEFAULT_TIME_ZONE};
pub use crate::transport::ChatTransport;

//! Terminal front end for the conversation engine.
//!
//! ## Configuration
//!
//! Settings come from an optional JSON file named by `CONVO_CONFIG_PATH`,
//! overridden by environment variables:
//!
//! ```json
//! {
//!   "endpoint": "https://graph.microsoft.com/beta/copilot",
//!   "subscription_key": "<optional gateway key>",
//!   "time_zone": "Europe/Berlin",
//!   "timeout_sec": 120
//! }
//! ```
//!
//! - `CONVO_ENDPOINT`, `CONVO_SUBSCRIPTION_KEY`, `CONVO_TIME_ZONE` and
//!   `CONVO_TIMEOUT_SEC` override the matching file fields.
//! - `timeout_sec` must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! ## Tokens
//!
//! The bearer token is read from `CONVO_ACCESS_TOKEN`. When it is unset the
//! user is asked for one on the terminal; that answer is reused for the rest
//! of the process.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to trace
//! reconciliation decisions.

pub mod commands;
pub mod config;
pub mod prompt;
pub mod render;
pub mod repl;

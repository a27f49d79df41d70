//! Unified error types for chatscope.
//!
//! This module provides a single [`ChatScopeError`] enum that covers all error
//! cases in the library, following the single-enum pattern used by popular
//! crates like `reqwest`, `serde_json`, and `csv`.
//!
//! # Error Handling Philosophy
//!
//! The taxonomy mirrors how errors actually flow through the pipeline:
//!
//! - **Configuration errors** (missing credential, invalid channel or date)
//!   are fatal and surface before any fetch begins.
//! - **Transport and permission errors during a fetch** are caught at the
//!   fetcher boundary and converted into an empty-history sentinel, so they
//!   rarely escape as `Err` values at all.
//! - **Backend generation errors** are caught at the summarization and chat
//!   boundaries and rendered as error text instead of aborting the session.

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatscope operations.
///
/// # Example
///
/// ```rust
/// use chatscope::error::Result;
///
/// fn my_function() -> Result<String> {
///     Ok(String::new())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatScopeError>;

/// The error type for all chatscope operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatScopeError {
    /// An I/O error occurred.
    ///
    /// Typically raised when writing dump files or reading interactive input.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A required credential environment variable is not set.
    ///
    /// Which variable is required depends on the selected platform and model
    /// source (`DISCORD_TOKEN`, `SLACK_TOKEN`, `OPENAI_API_KEY`).
    #[error("{var} environment variable is not set")]
    MissingCredential {
        /// Name of the missing environment variable
        var: &'static str,
    },

    /// The channel identifier is not valid for the selected platform.
    ///
    /// Discord channels are numeric snowflake IDs; Slack channels are names.
    #[error("Invalid {platform} channel '{input}': {message}")]
    InvalidChannel {
        /// The platform the channel was meant for
        platform: &'static str,
        /// The channel identifier that was provided
        input: String,
        /// Description of what's wrong
        message: String,
    },

    /// Invalid lookback window.
    #[error("Invalid lookback window: {message}")]
    InvalidWindow {
        /// Description of what's wrong
        message: String,
    },

    /// A platform API reported an error.
    ///
    /// Raised by the gateway implementations for non-OK HTTP statuses and
    /// Slack `ok: false` envelopes. The fetchers catch this at their
    /// boundary and degrade to an empty history.
    #[error("{platform} API error: {message}")]
    Api {
        /// Platform that produced the error
        platform: &'static str,
        /// Error description from the API
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model backend failed to generate a response.
    ///
    /// Contains the backend name and the underlying failure description.
    /// Callers at the summarization and interactive boundaries convert this
    /// into display text rather than propagating it.
    #[error("{backend} backend error: {message}")]
    Backend {
        /// Name of the backend that failed
        backend: String,
        /// Failure description
        message: String,
    },
}

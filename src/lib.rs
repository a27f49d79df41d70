//! # Chatscope
//!
//! A Rust library and CLI for fetching recent chat history from Discord or
//! Slack, summarizing it with a language model, and exploring it through an
//! interactive Q&A session.
//!
//! ## Overview
//!
//! Chatscope runs a fixed pipeline:
//!
//! 1. **Fetch** — pull channel and thread messages newer than a cutoff date
//!    from the platform API, normalizing both platforms into one message
//!    shape with explicit thread attribution.
//! 2. **Standardize** — replace display names with stable `<@id>` tokens so
//!    the model never sees ambiguous names.
//! 3. **Summarize** — generate a structured summary whose style depends on
//!    the age span of the fetched content.
//! 4. **Restore** — map `<@id>` tokens back to `@name` for presentation.
//! 5. **Chat** (optional) — multi-turn Q&A grounded in the transcript.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatscope::fetch::{SlackFetcher, SlackWebClient};
//! use chatscope::llm::{create_backend, ModelSource, SummarySpan, Summarizer};
//! use chatscope::prelude::*;
//! use chrono::{Duration, Utc};
//!
//! fn main() -> Result<()> {
//!     let since = Utc::now() - Duration::days(7);
//!     let mut fetcher = SlackFetcher::new(SlackWebClient::new("xoxb-..."));
//!     let history = fetcher.fetch_messages("general", since);
//!
//!     let transcript = history.user_mapping.standardize(&history.format_as_text());
//!     let backend = create_backend(ModelSource::Local, "llama3", None)?;
//!     let summary = Summarizer::new(backend.as_ref())
//!         .generate_summary(&transcript, SummarySpan::classify(7));
//!     println!("{}", history.user_mapping.restore(&summary));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`fetch`] — platform fetchers behind gateway traits
//!   - [`DiscordFetcher`](fetch::DiscordFetcher), [`SlackFetcher`](fetch::SlackFetcher)
//!   - [`DiscordRestClient`](fetch::DiscordRestClient), [`SlackWebClient`](fetch::SlackWebClient)
//! - [`llm`] — model backends and the services built on them
//!   - [`ModelBackend`](llm::ModelBackend), [`create_backend`](llm::create_backend)
//!   - [`Summarizer`](llm::Summarizer), [`InteractiveSession`](llm::InteractiveSession)
//! - [`identity`] — reversible name/ID substitution ([`UserMapping`])
//! - [`history`] — collected history and transcript builder ([`ChatHistory`])
//! - [`message`] — the normalized message record ([`ChatMessage`])
//! - [`platform`] — the platform enum ([`Platform`])
//! - [`output`] — dump-file naming and writing
//! - [`config`] — credentials, lookback window, channel validation
//! - [`cli`] — CLI argument structure ([`Args`](cli::Args))
//! - [`error`] — unified error types ([`ChatScopeError`], [`Result`])
//! - [`prelude`] — convenient re-exports

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod identity;
pub mod llm;
pub mod message;
pub mod output;
pub mod platform;

// Re-export the main types at the crate root for convenience
pub use error::{ChatScopeError, Result};
pub use history::ChatHistory;
pub use identity::UserMapping;
pub use message::ChatMessage;
pub use platform::Platform;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatscope::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{ChatHistory, ChatMessage, Platform, UserMapping};

    // Error types
    pub use crate::error::{ChatScopeError, Result};

    // Fetchers and their transport clients
    pub use crate::fetch::{DiscordFetcher, DiscordRestClient, SlackFetcher, SlackWebClient};

    // Model backends and services
    pub use crate::llm::{
        create_backend, InteractiveSession, ModelBackend, ModelSource, SessionEnd, SummarySpan,
        Summarizer,
    };

    // Dump files
    pub use crate::output::{dump_filename, write_dump, DumpKind};
}

//! Language-model backends and the services built on them.
//!
//! The model is an opaque text-to-text capability behind the
//! [`ModelBackend`] trait. Exactly one backend variant is constructed up
//! front with [`create_backend`]; nothing downstream ever branches on the
//! model source again.
//!
//! - [`ollama`] — local models over the Ollama HTTP API
//! - [`openai`] — remote models over an OpenAI-compatible chat API
//! - [`summarize`] — one-shot transcript summarization
//! - [`chat`] — the interactive question-answering session

pub mod chat;
pub mod ollama;
pub mod openai;
pub mod summarize;

pub use chat::{InteractiveSession, SessionEnd};
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use summarize::{SummarySpan, Summarizer};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ChatScopeError, Result};

/// Default model name when none is given on the command line.
pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-qwen-7b";

/// Where the model runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// Local model served by Ollama
    #[default]
    Local,

    /// Remote OpenAI-compatible API (requires `OPENAI_API_KEY`)
    Remote,
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Local => write!(f, "local"),
            ModelSource::Remote => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for ModelSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ModelSource::Local),
            "remote" => Ok(ModelSource::Remote),
            _ => Err(format!(
                "Unknown model source: '{s}'. Expected one of: local, remote"
            )),
        }
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking questions
    User,
    /// The model's replies
    Assistant,
}

impl Role {
    /// Wire-format role string shared by both backend APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of an interactive session.
///
/// Turn text is stored raw (identifiers in `<@id>` form, not substituted)
/// so the multi-turn context the backend sees stays self-consistent;
/// substitution is applied only at presentation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke
    pub role: Role,
    /// What was said, in raw form
    pub text: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// An opaque text-to-text generation capability.
///
/// Implementations are synchronous request/response; retry and rate-limit
/// policies are theirs to handle (or not).
pub trait ModelBackend {
    /// Human-readable backend name, used in error text.
    fn name(&self) -> &str;

    /// Single-shot completion: system instructions plus one user message.
    fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Multi-turn completion: system instructions, prior turn history, and
    /// the newest user input.
    fn complete_with_history(
        &self,
        system: &str,
        history: &[ConversationTurn],
        input: &str,
    ) -> Result<String>;
}

/// Constructs the backend for the selected source.
///
/// This is the only place the source is inspected; callers hold a
/// `Box<dyn ModelBackend>` from here on.
///
/// # Errors
///
/// Returns [`ChatScopeError::MissingCredential`] when the remote source is
/// selected without an API key.
pub fn create_backend(
    source: ModelSource,
    model: &str,
    api_key: Option<&str>,
) -> Result<Box<dyn ModelBackend>> {
    match source {
        ModelSource::Local => Ok(Box::new(OllamaBackend::new(model))),
        ModelSource::Remote => {
            let key = api_key.ok_or(ChatScopeError::MissingCredential {
                var: "OPENAI_API_KEY",
            })?;
            Ok(Box::new(OpenAiBackend::new(model, key)))
        }
    }
}

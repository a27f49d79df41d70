//! Local model backend over the Ollama HTTP API.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ChatScopeError, Result};
use crate::llm::{ConversationTurn, ModelBackend};

const OLLAMA_BASE: &str = "http://localhost:11434";

/// [`ModelBackend`] backed by a locally running Ollama server.
pub struct OllamaBackend {
    http: Client,
    model: String,
    base_url: String,
}

impl OllamaBackend {
    /// Creates a backend against the default local Ollama endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(model, OLLAMA_BASE)
    }

    /// Creates a backend against a custom endpoint (used by tests).
    pub fn with_base_url(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn chat(&self, messages: Vec<WireMessage<'_>>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| backend_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(backend_error(format!("HTTP {}", response.status())));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| backend_error(format!("bad response: {e}")))?;
        Ok(body.message.content)
    }
}

impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.chat(vec![
            WireMessage::new("system", system),
            WireMessage::new("user", user),
        ])
    }

    fn complete_with_history(
        &self,
        system: &str,
        history: &[ConversationTurn],
        input: &str,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage::new("system", system));
        for turn in history {
            messages.push(WireMessage::new(turn.role.as_str(), &turn.text));
        }
        messages.push(WireMessage::new("user", input));
        self.chat(messages)
    }
}

fn backend_error(message: String) -> ChatScopeError {
    ChatScopeError::Backend {
        backend: "ollama".to_string(),
        message,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> WireMessage<'a> {
    fn new(role: &'a str, content: &'a str) -> Self {
        Self { role, content }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

//! Remote model backend over an OpenAI-compatible chat completions API.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ChatScopeError, Result};
use crate::llm::{ConversationTurn, ModelBackend};

const OPENAI_BASE: &str = "https://api.openai.com";

/// [`ModelBackend`] backed by a remote OpenAI-compatible API.
pub struct OpenAiBackend {
    http: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    /// Creates a backend against the public OpenAI endpoint.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, OPENAI_BASE)
    }

    /// Creates a backend against a custom endpoint (used by tests and
    /// self-hosted compatible servers).
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn chat(&self, messages: Vec<WireMessage<'_>>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.7,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| backend_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(backend_error(format!("HTTP {}", response.status())));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| backend_error(format!("bad response: {e}")))?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| backend_error("response contained no choices".to_string()))
    }
}

impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
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
        backend: "openai".to_string(),
        message,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
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
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

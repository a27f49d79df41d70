//! The normalized chat message type.
//!
//! Both platform fetchers convert their raw API records into [`ChatMessage`],
//! enabling uniform transcript building regardless of source.
//!
//! # Overview
//!
//! A message consists of:
//! - **Required**: `timestamp`, `author`, `user_id`, `content`
//! - **Optional**: `thread_name` (present only for messages inside a thread)
//!
//! # Examples
//!
//! ```
//! use chatscope::ChatMessage;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
//! let msg = ChatMessage::new(ts, "Alice", "123456", "Hello Bob!");
//! assert_eq!(msg.format(), "[2024-01-15 10:30:00] Alice: Hello Bob!");
//! assert!(!msg.is_thread_message());
//! ```
//!
//! ## Thread membership
//!
//! ```
//! use chatscope::ChatMessage;
//! use chrono::Utc;
//!
//! let msg = ChatMessage::new(Utc::now(), "Bob", "789012", "In here")
//!     .in_thread("design-review");
//! assert!(msg.is_thread_message());
//! assert_eq!(msg.thread_name(), Some("design-review"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat post, normalized across platforms.
///
/// Messages are created by a channel fetcher for each item returned by the
/// platform's history API, are immutable after creation, and are consumed
/// exactly once by the transcript builder in
/// [`ChatHistory`](crate::history::ChatHistory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// When the message was sent (source clock, stored as UTC).
    pub timestamp: DateTime<Utc>,

    /// Display name of the message author.
    ///
    /// Not guaranteed unique over time; the stable identity lives in
    /// [`user_id`](Self::user_id).
    pub author: String,

    /// Stable, opaque user identifier assigned by the platform.
    pub user_id: String,

    /// Raw, unescaped body text.
    pub content: String,

    /// Name of the owning thread, present only for thread messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub thread_name: Option<String>,
}

impl ChatMessage {
    /// Creates a new top-level (non-thread) message.
    pub fn new(
        timestamp: DateTime<Utc>,
        author: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            author: author.into(),
            user_id: user_id.into(),
            content: content.into(),
            thread_name: None,
        }
    }

    /// Builder method marking this message as belonging to a thread.
    #[must_use]
    pub fn in_thread(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = Some(thread_name.into());
        self
    }

    /// Returns the author display name.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the stable user identifier.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the message body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the owning thread name, if this is a thread message.
    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    /// Returns `true` if this message belongs to a thread.
    pub fn is_thread_message(&self) -> bool {
        self.thread_name.is_some()
    }

    /// Formats the message as a single transcript line:
    /// `[YYYY-MM-DD HH:MM:SS] author: content`.
    pub fn format(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.author,
            self.content
        )
    }
}

//! Collected channel history and the transcript builder.
//!
//! [`ChatHistory`] is what a channel fetcher hands to the rest of the
//! pipeline: the ordered message sequence, the identity mapping built while
//! walking it, the first message timestamp, and enough metadata to name dump
//! files. [`format_as_text`](ChatHistory::format_as_text) linearizes the
//! messages into the single transcript string that crosses the boundary to
//! the summarization and interactive components.
//!
//! # Thread markers
//!
//! Messages inside threads are rendered between explicit boundary markers:
//!
//! ```text
//! [2024-01-15 10:30:00] Alice: kicking off
//!
//! --- Thread: design-review ---
//! [2024-01-15 10:31:00] Bob: looks good
//! --- End of Thread ---
//!
//! [2024-01-15 10:40:00] Alice: moving on
//! ```
//!
//! Exactly one marker pair wraps each contiguous run of same-thread messages.
//! A thread re-visited non-contiguously is rendered as two separate regions;
//! messages are kept in emission order, never re-sorted by timestamp across
//! the channel/thread boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserMapping;
use crate::message::ChatMessage;
use crate::platform::Platform;

/// A channel's collected messages plus run metadata.
///
/// Built once per fetch and immutable thereafter. An empty `messages` vector
/// together with `first_message_date == since` is the sentinel a fetcher
/// returns when the upstream API failed or the channel had no activity;
/// callers treat [`is_empty`](Self::is_empty) as "cancel the rest of the
/// pipeline".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Messages in emission order (thread replies contiguous after parents).
    pub messages: Vec<ChatMessage>,

    /// Identity mapping accumulated during the fetch.
    pub user_mapping: UserMapping,

    /// Timestamp of the first message encountered, or the requested
    /// since-date when no messages were found.
    pub first_message_date: DateTime<Utc>,

    /// Platform the history was fetched from.
    pub platform: Platform,

    /// Human-readable channel name (used in dump filenames).
    pub channel_name: String,
}

impl ChatHistory {
    /// Creates a history from collected parts.
    pub fn new(
        messages: Vec<ChatMessage>,
        user_mapping: UserMapping,
        first_message_date: DateTime<Utc>,
        platform: Platform,
        channel_name: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            user_mapping,
            first_message_date,
            platform,
            channel_name: channel_name.into(),
        }
    }

    /// Creates the sentinel history for a failed or empty fetch.
    ///
    /// Carries the original since-date as `first_message_date` so callers
    /// see "no results" rather than a null timestamp.
    pub fn empty(platform: Platform, channel_name: impl Into<String>, since: DateTime<Utc>) -> Self {
        Self::new(Vec::new(), UserMapping::new(), since, platform, channel_name)
    }

    /// Returns `true` if the fetch produced no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Total number of message records.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of distinct users in the identity mapping.
    pub fn user_count(&self) -> usize {
        self.user_mapping.len()
    }

    /// Number of distinct thread names among thread messages.
    pub fn thread_count(&self) -> usize {
        let mut threads: Vec<&str> = self
            .messages
            .iter()
            .filter_map(ChatMessage::thread_name)
            .collect();
        threads.sort_unstable();
        threads.dedup();
        threads.len()
    }

    /// Linearizes the history into a single transcript string.
    ///
    /// Walks messages in emission order keeping a current-thread cursor.
    /// A thread transition emits an end marker for the previous region (if
    /// any) and a begin marker for the new one; leaving a thread emits an
    /// end marker. A trailing open thread is closed after the last message.
    /// Empty input yields an empty string.
    pub fn format_as_text(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.messages.len());
        let mut current_thread: Option<&str> = None;

        for message in &self.messages {
            match message.thread_name() {
                Some(name) if current_thread != Some(name) => {
                    if current_thread.is_some() {
                        lines.push("--- End of Thread ---\n".to_string());
                    }
                    lines.push(format!("\n--- Thread: {name} ---"));
                    current_thread = Some(name);
                }
                None if current_thread.is_some() => {
                    lines.push("--- End of Thread ---\n".to_string());
                    current_thread = None;
                }
                _ => {}
            }

            lines.push(message.format());
        }

        if current_thread.is_some() {
            lines.push("--- End of Thread ---\n".to_string());
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, minute, 0).unwrap()
    }

    fn history(messages: Vec<ChatMessage>) -> ChatHistory {
        let mut mapping = UserMapping::new();
        for msg in &messages {
            mapping.insert(msg.author.clone(), msg.user_id.clone());
        }
        ChatHistory::new(messages, mapping, ts(0), Platform::Discord, "general")
    }

    #[test]
    fn test_empty_history_formats_to_empty_string() {
        let h = history(vec![]);
        assert_eq!(h.format_as_text(), "");
        assert!(h.is_empty());
    }

    #[test]
    fn test_all_non_thread_produces_no_markers() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Alice", "1", "one"),
            ChatMessage::new(ts(2), "Bob", "2", "two"),
        ]);
        let text = h.format_as_text();
        assert!(!text.contains("Thread"));
        assert_eq!(
            text,
            "[2024-01-15 10:01:00] Alice: one\n[2024-01-15 10:02:00] Bob: two"
        );
    }

    #[test]
    fn test_contiguous_thread_gets_one_marker_pair() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Alice", "1", "channel"),
            ChatMessage::new(ts(2), "Bob", "2", "reply 1").in_thread("A"),
            ChatMessage::new(ts(3), "Bob", "2", "reply 2").in_thread("A"),
            ChatMessage::new(ts(4), "Alice", "1", "back in channel"),
        ]);
        let text = h.format_as_text();
        assert_eq!(text.matches("--- Thread: A ---").count(), 1);
        assert_eq!(text.matches("--- End of Thread ---").count(), 1);

        // Markers wrap the thread region, not the channel messages.
        let begin = text.find("--- Thread: A ---").unwrap();
        let end = text.find("--- End of Thread ---").unwrap();
        let back = text.find("back in channel").unwrap();
        assert!(begin < end);
        assert!(end < back);
    }

    #[test]
    fn test_revisited_thread_renders_two_regions() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Bob", "2", "r1").in_thread("A"),
            ChatMessage::new(ts(2), "Alice", "1", "channel"),
            ChatMessage::new(ts(3), "Bob", "2", "r2").in_thread("A"),
        ]);
        let text = h.format_as_text();
        assert_eq!(text.matches("--- Thread: A ---").count(), 2);
        assert_eq!(text.matches("--- End of Thread ---").count(), 2);
    }

    #[test]
    fn test_adjacent_distinct_threads_close_and_reopen() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Bob", "2", "in A").in_thread("A"),
            ChatMessage::new(ts(2), "Bob", "2", "in B").in_thread("B"),
        ]);
        let text = h.format_as_text();
        assert_eq!(text.matches("--- Thread: A ---").count(), 1);
        assert_eq!(text.matches("--- Thread: B ---").count(), 1);
        assert_eq!(text.matches("--- End of Thread ---").count(), 2);
    }

    #[test]
    fn test_trailing_thread_is_closed() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Alice", "1", "channel"),
            ChatMessage::new(ts(2), "Bob", "2", "reply").in_thread("A"),
        ]);
        let text = h.format_as_text();
        assert!(text.trim_end().ends_with("--- End of Thread ---"));
    }

    #[test]
    fn test_counters() {
        let h = history(vec![
            ChatMessage::new(ts(1), "Alice", "1", "channel"),
            ChatMessage::new(ts(2), "Bob", "2", "r").in_thread("A"),
            ChatMessage::new(ts(3), "Alice", "1", "r").in_thread("A"),
            ChatMessage::new(ts(4), "Carol", "3", "r").in_thread("B"),
        ]);
        assert_eq!(h.message_count(), 4);
        assert_eq!(h.user_count(), 3);
        assert_eq!(h.thread_count(), 2);
    }

    #[test]
    fn test_empty_sentinel_carries_since_date() {
        let since = ts(0);
        let h = ChatHistory::empty(Platform::Slack, "general", since);
        assert!(h.is_empty());
        assert_eq!(h.first_message_date, since);
        assert_eq!(h.message_count(), 0);
        assert_eq!(h.user_count(), 0);
        assert_eq!(h.thread_count(), 0);
    }
}

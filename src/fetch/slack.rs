//! Slack channel fetcher.
//!
//! Slack has no thread attribute on messages. A message is a thread parent
//! when its `thread_ts` equals its own `ts`; the replies then have to be
//! pulled with a separate `conversations.replies` call, which returns the
//! parent again as its first record. The fetcher expands each parent in
//! place, skipping the duplicated parent, and labels the region with the
//! parent's `ts` (Slack threads carry no display name).
//!
//! Channel history is paginated with an opaque continuation cursor; the
//! fetcher keeps requesting pages until the API reports `has_more == false`,
//! then normalizes the accumulated records to ascending timestamp order
//! before walking them (the Web API emits newest-first).
//!
//! The network side lives behind the [`SlackGateway`] capability trait;
//! [`SlackWebClient`] is the production implementation over the Slack
//! Web API.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{ChatScopeError, Result};
use crate::fetch::{PAGE_SIZE, placeholder_name};
use crate::history::ChatHistory;
use crate::identity::UserMapping;
use crate::message::ChatMessage;
use crate::platform::Platform;

/// A resolved Slack channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackChannelRef {
    /// Opaque channel ID (e.g. `C024BE91L`).
    pub id: String,
    /// Channel name as configured in the workspace.
    pub name: String,
}

/// One raw message record as returned by the Slack history API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlackRecord {
    /// Message timestamp, also the message's unique key within the channel.
    pub ts: String,
    /// Author user ID; absent for some system messages.
    #[serde(default)]
    pub user: Option<String>,
    /// Body text; records without text are skipped.
    #[serde(default)]
    pub text: Option<String>,
    /// Parent thread key; equals `ts` on a thread parent.
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl SlackRecord {
    /// Returns `true` if this record is a thread parent
    /// (self-referential parent key).
    pub fn is_thread_parent(&self) -> bool {
        self.thread_ts.as_deref() == Some(self.ts.as_str())
    }
}

/// One page of channel history.
#[derive(Debug, Clone, Default)]
pub struct SlackHistoryPage {
    /// Records in API order (newest first).
    pub messages: Vec<SlackRecord>,
    /// Whether further pages exist.
    pub has_more: bool,
    /// Continuation cursor for the next page, if any.
    pub next_cursor: Option<String>,
}

/// Capability boundary for the Slack Web API.
pub trait SlackGateway {
    /// Looks a channel up by name across public and private channels.
    fn find_channel(&mut self, name: &str) -> Result<Option<SlackChannelRef>>;

    /// Fetches one page of channel history at most [`PAGE_SIZE`] records
    /// long, bounded below by `oldest` (Unix seconds).
    fn history_page(
        &mut self,
        channel_id: &str,
        oldest: f64,
        cursor: Option<&str>,
    ) -> Result<SlackHistoryPage>;

    /// Fetches all replies of a thread. The first record is the duplicated
    /// parent message.
    fn thread_replies(&mut self, channel_id: &str, thread_ts: &str) -> Result<Vec<SlackRecord>>;

    /// Resolves a user ID to a display name. `Ok(None)` means the user is
    /// unknown to the workspace.
    fn user_name(&mut self, user_id: &str) -> Result<Option<String>>;
}

/// Channel fetcher for Slack ("cursor-paginated with reply-expansion"
/// variant).
///
/// User names are resolved through the gateway at most once per user per
/// fetch; results are cached for the rest of the run.
#[derive(Debug)]
pub struct SlackFetcher<G> {
    gateway: G,
    user_mapping: UserMapping,
    name_cache: HashMap<String, String>,
}

impl<G: SlackGateway> SlackFetcher<G> {
    /// Creates a fetcher over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            user_mapping: UserMapping::new(),
            name_cache: HashMap::new(),
        }
    }

    /// Returns the identity mapping built during the most recent fetch.
    pub fn user_mapping(&self) -> &UserMapping {
        &self.user_mapping
    }

    /// Fetches all channel messages (threads expanded) since `since`.
    ///
    /// Any gateway error aborts the operation and yields the empty-history
    /// sentinel with `first_message_date` equal to `since`.
    pub fn fetch_messages(&mut self, channel_name: &str, since: DateTime<Utc>) -> ChatHistory {
        self.user_mapping.clear();
        self.name_cache.clear();

        match self.try_fetch(channel_name, since) {
            Ok(history) => history,
            Err(e) => {
                eprintln!("    Slack fetch failed: {e}");
                ChatHistory::empty(Platform::Slack, channel_name, since)
            }
        }
    }

    fn try_fetch(&mut self, channel_name: &str, since: DateTime<Utc>) -> Result<ChatHistory> {
        let Some(channel) = self.gateway.find_channel(channel_name)? else {
            eprintln!("    Slack channel {channel_name} not found");
            return Ok(ChatHistory::empty(Platform::Slack, channel_name, since));
        };

        #[allow(clippy::cast_precision_loss)]
        let oldest = since.timestamp() as f64;

        // Accumulate the full channel stream first, then normalize to
        // ascending order; the Web API emits newest-first within and across
        // pages.
        let mut records: Vec<SlackRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .gateway
                .history_page(&channel.id, oldest, cursor.as_deref())?;
            records.extend(page.messages);

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        records.sort_by(|a, b| {
            ts_seconds(&a.ts)
                .partial_cmp(&ts_seconds(&b.ts))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut messages: Vec<ChatMessage> = Vec::with_capacity(records.len());
        let mut first_message_date: Option<DateTime<Utc>> = None;

        for record in records {
            let expand = record.is_thread_parent();
            let parent_ts = record.ts.clone();

            if let Some(message) = self.to_message(&record, None, &mut first_message_date)? {
                messages.push(message);
            }

            if expand {
                let replies = self.gateway.thread_replies(&channel.id, &parent_ts)?;
                for reply in replies {
                    // conversations.replies repeats the parent as its first
                    // record.
                    if reply.ts == parent_ts {
                        continue;
                    }
                    if let Some(message) =
                        self.to_message(&reply, Some(&parent_ts), &mut first_message_date)?
                    {
                        messages.push(message);
                    }
                }
            }
        }

        Ok(ChatHistory::new(
            messages,
            self.user_mapping.clone(),
            first_message_date.unwrap_or(since),
            Platform::Slack,
            channel.name,
        ))
    }

    /// Converts a raw record, or returns `Ok(None)` for textless records.
    fn to_message(
        &mut self,
        record: &SlackRecord,
        thread_name: Option<&str>,
        first_message_date: &mut Option<DateTime<Utc>>,
    ) -> Result<Option<ChatMessage>> {
        let Some(text) = record.text.as_deref() else {
            return Ok(None);
        };

        let timestamp = Utc
            .timestamp_opt(ts_seconds(&record.ts) as i64, 0)
            .single()
            .ok_or_else(|| ChatScopeError::Api {
                platform: "Slack",
                message: format!("bad message timestamp '{}'", record.ts),
            })?;

        if first_message_date.is_none() {
            *first_message_date = Some(timestamp);
        }

        let user_id = record.user.clone().unwrap_or_else(|| "UNKNOWN".to_string());
        let author = self.resolve_name(&user_id)?;
        self.user_mapping.insert(author.clone(), user_id.clone());

        let message = ChatMessage::new(timestamp, author, user_id, text);
        Ok(Some(match thread_name {
            Some(name) => message.in_thread(name),
            None => message,
        }))
    }

    fn resolve_name(&mut self, user_id: &str) -> Result<String> {
        if let Some(name) = self.name_cache.get(user_id) {
            return Ok(name.clone());
        }

        let name = match self.gateway.user_name(user_id) {
            Ok(Some(name)) => name,
            // Unknown or unresolvable users degrade to a placeholder; the
            // fetch continues.
            Ok(None) | Err(_) => placeholder_name(user_id),
        };
        self.name_cache.insert(user_id.to_string(), name.clone());
        Ok(name)
    }
}

fn ts_seconds(ts: &str) -> f64 {
    ts.parse().unwrap_or(0.0)
}

// ============================================================================
// Web API gateway
// ============================================================================

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Production [`SlackGateway`] over the Slack Web API.
pub struct SlackWebClient {
    http: Client,
    token: String,
    base_url: String,
}

impl SlackWebClient {
    /// Creates a client against the public Slack Web API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, SLACK_API_BASE)
    }

    /// Creates a client against a custom base URL (used by tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    fn call(&self, method: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let envelope: serde_json::Value = self
            .http
            .get(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()?
            .json()?;

        if !envelope
            .get("ok")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
        {
            let reason = envelope
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            return Err(ChatScopeError::Api {
                platform: "Slack",
                message: format!("{method}: {reason}"),
            });
        }

        Ok(envelope)
    }

    fn channels_of_type(&self, types: &str, name: &str) -> Result<Option<SlackChannelRef>> {
        let mut cursor = String::new();
        loop {
            let mut query = vec![("types", types), ("limit", "200")];
            if !cursor.is_empty() {
                query.push(("cursor", &cursor));
            }
            let envelope = self.call("conversations.list", &query)?;

            if let Some(channels) = envelope.get("channels").and_then(|c| c.as_array()) {
                for channel in channels {
                    let channel_name = channel.get("name").and_then(|n| n.as_str());
                    if channel_name == Some(name) {
                        let id = channel
                            .get("id")
                            .and_then(|i| i.as_str())
                            .unwrap_or_default()
                            .to_string();
                        return Ok(Some(SlackChannelRef {
                            id,
                            name: name.to_string(),
                        }));
                    }
                }
            }

            match envelope
                .pointer("/response_metadata/next_cursor")
                .and_then(|c| c.as_str())
            {
                Some(next) if !next.is_empty() => cursor = next.to_string(),
                _ => return Ok(None),
            }
        }
    }
}

impl SlackGateway for SlackWebClient {
    fn find_channel(&mut self, name: &str) -> Result<Option<SlackChannelRef>> {
        if let Some(found) = self.channels_of_type("public_channel", name)? {
            return Ok(Some(found));
        }
        self.channels_of_type("private_channel", name)
    }

    fn history_page(
        &mut self,
        channel_id: &str,
        oldest: f64,
        cursor: Option<&str>,
    ) -> Result<SlackHistoryPage> {
        let oldest = format!("{oldest}");
        let limit = PAGE_SIZE.to_string();
        let mut query = vec![
            ("channel", channel_id),
            ("oldest", oldest.as_str()),
            ("limit", limit.as_str()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let envelope = self.call("conversations.history", &query)?;
        let messages: Vec<SlackRecord> = match envelope.get("messages") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let has_more = envelope
            .get("has_more")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let next_cursor = envelope
            .pointer("/response_metadata/next_cursor")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(String::from);

        Ok(SlackHistoryPage {
            messages,
            has_more,
            next_cursor,
        })
    }

    fn thread_replies(&mut self, channel_id: &str, thread_ts: &str) -> Result<Vec<SlackRecord>> {
        let envelope = self.call(
            "conversations.replies",
            &[("channel", channel_id), ("ts", thread_ts)],
        )?;
        match envelope.get("messages") {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn user_name(&mut self, user_id: &str) -> Result<Option<String>> {
        match self.call("users.info", &[("user", user_id)]) {
            Ok(envelope) => Ok(envelope
                .pointer("/user/name")
                .and_then(|n| n.as_str())
                .map(String::from)),
            Err(ChatScopeError::Api { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

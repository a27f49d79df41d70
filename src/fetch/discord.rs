//! Discord channel fetcher.
//!
//! Discord signals threads directly on the parent message: a channel message
//! can carry an attached thread resource. When the fetcher encounters one, it
//! pulls that thread's entire history and inlines the replies immediately
//! after the parent, before resuming the channel iteration.
//!
//! The network side lives behind the [`DiscordGateway`] capability trait so
//! the fetcher logic can be exercised with an in-memory gateway in tests.
//! [`DiscordRestClient`] is the production implementation over the Discord
//! REST API.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{ChatScopeError, Result};
use crate::fetch::{PAGE_SIZE, placeholder_name};
use crate::history::ChatHistory;
use crate::identity::UserMapping;
use crate::message::ChatMessage;
use crate::platform::Platform;

/// A thread attached to a channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    /// Channel ID of the thread itself.
    pub id: u64,
    /// Display name of the thread.
    pub name: String,
}

/// One raw message record as returned by the Discord history API.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscordRecord {
    /// Snowflake message ID.
    pub id: u64,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Stable author ID.
    pub author_id: String,
    /// Author display name; `None` when the author could not be resolved.
    pub author_name: Option<String>,
    /// Message body.
    pub content: String,
    /// Thread attached to this message, if it started one.
    pub thread: Option<ThreadRef>,
}

/// Capability boundary for the Discord history API.
///
/// Implementations must return records in ascending timestamp order and must
/// already be bounded by the requested since-date. Retry/backoff and
/// authentication are the implementation's concern.
pub trait DiscordGateway {
    /// Resolves a channel's display name. `Ok(None)` means the channel does
    /// not exist or is not visible.
    fn channel_name(&mut self, channel_id: u64) -> Result<Option<String>>;

    /// Returns all channel messages newer than `since`, oldest first.
    fn channel_history(
        &mut self,
        channel_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>>;

    /// Returns all messages of a thread newer than `since`, oldest first.
    fn thread_history(
        &mut self,
        thread_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>>;
}

/// Channel fetcher for Discord ("has-thread-attribute" variant).
///
/// # Example
///
/// ```rust,no_run
/// use chatscope::fetch::{DiscordFetcher, DiscordRestClient};
/// use chrono::{Duration, Utc};
///
/// let gateway = DiscordRestClient::new("bot-token");
/// let mut fetcher = DiscordFetcher::new(gateway);
/// let history = fetcher.fetch_messages(123456789, Utc::now() - Duration::days(7));
/// if history.is_empty() {
///     // nothing found, or the fetch failed
/// }
/// ```
#[derive(Debug)]
pub struct DiscordFetcher<G> {
    gateway: G,
    user_mapping: UserMapping,
}

impl<G: DiscordGateway> DiscordFetcher<G> {
    /// Creates a fetcher over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            user_mapping: UserMapping::new(),
        }
    }

    /// Returns the identity mapping built during the most recent fetch.
    pub fn user_mapping(&self) -> &UserMapping {
        &self.user_mapping
    }

    /// Fetches all channel messages (threads inlined) since `since`.
    ///
    /// Any gateway error aborts the operation and yields the empty-history
    /// sentinel with `first_message_date` equal to `since`.
    pub fn fetch_messages(&mut self, channel_id: u64, since: DateTime<Utc>) -> ChatHistory {
        self.user_mapping.clear();

        match self.try_fetch(channel_id, since) {
            Ok(history) => history,
            Err(e) => {
                eprintln!("    Discord fetch failed: {e}");
                ChatHistory::empty(Platform::Discord, channel_id.to_string(), since)
            }
        }
    }

    fn try_fetch(&mut self, channel_id: u64, since: DateTime<Utc>) -> Result<ChatHistory> {
        let Some(channel_name) = self.gateway.channel_name(channel_id)? else {
            eprintln!("    Discord channel {channel_id} not found");
            return Ok(ChatHistory::empty(
                Platform::Discord,
                channel_id.to_string(),
                since,
            ));
        };

        let records = self.gateway.channel_history(channel_id, since)?;

        let mut messages: Vec<ChatMessage> = Vec::with_capacity(records.len());
        let mut first_message_date: Option<DateTime<Utc>> = None;

        for record in records {
            let thread = record.thread.clone();
            messages.push(self.to_message(record, None, &mut first_message_date));

            if let Some(thread) = thread {
                let replies = self.gateway.thread_history(thread.id, since)?;
                for reply in replies {
                    messages.push(self.to_message(
                        reply,
                        Some(&thread.name),
                        &mut first_message_date,
                    ));
                }
            }
        }

        Ok(ChatHistory::new(
            messages,
            self.user_mapping.clone(),
            first_message_date.unwrap_or(since),
            Platform::Discord,
            channel_name,
        ))
    }

    fn to_message(
        &mut self,
        record: DiscordRecord,
        thread_name: Option<&str>,
        first_message_date: &mut Option<DateTime<Utc>>,
    ) -> ChatMessage {
        if first_message_date.is_none() {
            *first_message_date = Some(record.timestamp);
        }

        let author = record
            .author_name
            .unwrap_or_else(|| placeholder_name(&record.author_id));
        self.user_mapping.insert(author.clone(), record.author_id.clone());

        let message = ChatMessage::new(record.timestamp, author, record.author_id, record.content);
        match thread_name {
            Some(name) => message.in_thread(name),
            None => message,
        }
    }
}

// ============================================================================
// REST gateway
// ============================================================================

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Production [`DiscordGateway`] over the Discord REST API.
///
/// Authenticates with a bot token. Pagination uses snowflake `after`
/// cursors; each page is sorted ascending before the next page is requested.
pub struct DiscordRestClient {
    http: Client,
    token: String,
    base_url: String,
}

impl DiscordRestClient {
    /// Creates a client against the public Discord API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    /// Creates a client against a custom base URL (used by tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("Authorization", format!("Bot {}", self.token))
            .send()?;
        Ok(response)
    }

    fn paged_history(&self, channel_id: u64, since: DateTime<Utc>) -> Result<Vec<DiscordRecord>> {
        let mut after = snowflake_for(since);
        let mut all: Vec<DiscordRecord> = Vec::new();

        loop {
            let path = format!("/channels/{channel_id}/messages?after={after}&limit={PAGE_SIZE}");
            let response = self.get(&path)?;
            if !response.status().is_success() {
                return Err(ChatScopeError::Api {
                    platform: "Discord",
                    message: format!("{} fetching {path}", response.status()),
                });
            }

            let batch: Vec<WireMessage> = response.json()?;
            if batch.is_empty() {
                break;
            }

            let mut records = batch
                .into_iter()
                .map(WireMessage::into_record)
                .collect::<Result<Vec<_>>>()?;
            records.sort_by_key(|r| r.id);

            // The API returns newest-first; the highest ID seen becomes the
            // next cursor.
            if let Some(last) = records.last() {
                after = last.id;
            }

            let page_len = records.len();
            all.extend(records);

            if page_len < PAGE_SIZE {
                break;
            }
        }

        Ok(all)
    }
}

impl DiscordGateway for DiscordRestClient {
    fn channel_name(&mut self, channel_id: u64) -> Result<Option<String>> {
        let response = self.get(&format!("/channels/{channel_id}"))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ChatScopeError::Api {
                platform: "Discord",
                message: format!("{} fetching channel {channel_id}", response.status()),
            });
        }

        let channel: WireChannel = response.json()?;
        Ok(Some(channel.name.unwrap_or_else(|| channel_id.to_string())))
    }

    fn channel_history(
        &mut self,
        channel_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>> {
        self.paged_history(channel_id, since)
    }

    fn thread_history(
        &mut self,
        thread_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>> {
        self.paged_history(thread_id, since)
    }
}

/// Smallest snowflake ID created at or after `at`.
fn snowflake_for(at: DateTime<Utc>) -> u64 {
    let ms = (at.timestamp_millis() - DISCORD_EPOCH_MS).max(0);
    #[allow(clippy::cast_sign_loss)]
    let ms = ms as u64;
    ms << 22
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAuthor {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct WireThread {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    timestamp: String,
    #[serde(default)]
    content: String,
    author: Option<WireAuthor>,
    thread: Option<WireThread>,
}

impl WireMessage {
    fn into_record(self) -> Result<DiscordRecord> {
        let id = parse_snowflake(&self.id)?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| ChatScopeError::Api {
                platform: "Discord",
                message: format!("bad timestamp '{}': {e}", self.timestamp),
            })?
            .with_timezone(&Utc);

        let (author_id, author_name) = match self.author {
            Some(author) => (author.id, Some(author.username)),
            None => ("UNKNOWN".to_string(), None),
        };

        let thread = match self.thread {
            Some(t) => Some(ThreadRef {
                id: parse_snowflake(&t.id)?,
                name: t.name,
            }),
            None => None,
        };

        Ok(DiscordRecord {
            id,
            timestamp,
            author_id,
            author_name,
            content: self.content,
            thread,
        })
    }
}

fn parse_snowflake(raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| ChatScopeError::Api {
        platform: "Discord",
        message: format!("bad snowflake ID '{raw}'"),
    })
}

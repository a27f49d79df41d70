//! Integration tests for the full fetch → standardize → summarize → restore
//! pipeline, driven by in-memory gateways and a scripted model backend.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::tempdir;

use chatscope::error::Result;
use chatscope::fetch::{
    DiscordFetcher, DiscordGateway, DiscordRecord, SlackChannelRef, SlackFetcher, SlackGateway,
    SlackHistoryPage, SlackRecord, ThreadRef,
};
use chatscope::llm::{
    ConversationTurn, InteractiveSession, ModelBackend, SessionEnd, SummarySpan, Summarizer,
};
use chatscope::output::{write_dump, DumpKind};

// ============================================================================
// Test doubles
// ============================================================================

/// Backend that echoes a canned reply and records every prompt it saw.
struct ScriptedBackend {
    reply: String,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.prompts.borrow_mut().push(format!("{system}\n{user}"));
        Ok(self.reply.clone())
    }

    fn complete_with_history(
        &self,
        system: &str,
        _history: &[ConversationTurn],
        input: &str,
    ) -> Result<String> {
        self.complete(system, input)
    }
}

struct FakeDiscord {
    history: Vec<DiscordRecord>,
    threads: HashMap<u64, Vec<DiscordRecord>>,
}

impl DiscordGateway for FakeDiscord {
    fn channel_name(&mut self, _channel_id: u64) -> Result<Option<String>> {
        Ok(Some("general".to_string()))
    }

    fn channel_history(
        &mut self,
        _channel_id: u64,
        _since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>> {
        Ok(self.history.clone())
    }

    fn thread_history(
        &mut self,
        thread_id: u64,
        _since: DateTime<Utc>,
    ) -> Result<Vec<DiscordRecord>> {
        Ok(self.threads.get(&thread_id).cloned().unwrap_or_default())
    }
}

struct FakeSlack {
    pages: Vec<SlackHistoryPage>,
    replies: HashMap<String, Vec<SlackRecord>>,
    users: HashMap<String, String>,
    page_calls: usize,
}

impl SlackGateway for FakeSlack {
    fn find_channel(&mut self, name: &str) -> Result<Option<SlackChannelRef>> {
        Ok(Some(SlackChannelRef {
            id: "C024BE91L".to_string(),
            name: name.to_string(),
        }))
    }

    fn history_page(
        &mut self,
        _channel_id: &str,
        _oldest: f64,
        _cursor: Option<&str>,
    ) -> Result<SlackHistoryPage> {
        let page = self.pages.get(self.page_calls).cloned().unwrap_or_default();
        self.page_calls += 1;
        Ok(page)
    }

    fn thread_replies(&mut self, _channel_id: &str, thread_ts: &str) -> Result<Vec<SlackRecord>> {
        Ok(self.replies.get(thread_ts).cloned().unwrap_or_default())
    }

    fn user_name(&mut self, user_id: &str) -> Result<Option<String>> {
        Ok(self.users.get(user_id).cloned())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, minute, 0).unwrap()
}

fn discord_record(id: u64, minute: u32, name: &str, uid: &str, content: &str) -> DiscordRecord {
    DiscordRecord {
        id,
        timestamp: ts(minute),
        author_id: uid.to_string(),
        author_name: Some(name.to_string()),
        content: content.to_string(),
        thread: None,
    }
}

fn slack_record(ts: &str, user: &str, text: &str) -> SlackRecord {
    SlackRecord {
        ts: ts.to_string(),
        user: Some(user.to_string()),
        text: Some(text.to_string()),
        thread_ts: None,
    }
}

fn discord_gateway_with_thread() -> FakeDiscord {
    let mut parent = discord_record(2, 2, "Alice", "100", "opening a thread");
    parent.thread = Some(ThreadRef {
        id: 900,
        name: "design-review".to_string(),
    });

    let mut threads = HashMap::new();
    threads.insert(
        900,
        vec![
            discord_record(3, 3, "Bob", "200", "Alice should check the draft"),
            discord_record(4, 4, "Alice", "100", "will do"),
        ],
    );

    FakeDiscord {
        history: vec![
            discord_record(1, 1, "Alice", "100", "good morning"),
            parent,
            discord_record(5, 5, "Bob", "200", "back to the channel"),
        ],
        threads,
    }
}

// ============================================================================
// Pipeline tests
// ============================================================================

#[test]
fn discord_pipeline_standardizes_summarizes_and_restores() {
    let mut fetcher = DiscordFetcher::new(discord_gateway_with_thread());
    let history = fetcher.fetch_messages(42, ts(0));

    assert_eq!(history.message_count(), 5);
    assert_eq!(history.thread_count(), 1);

    let transcript = history.format_as_text();
    assert!(transcript.contains("--- Thread: design-review ---"));
    assert!(transcript.contains("--- End of Thread ---"));

    // After standardization no display name survives in the text.
    let standardized = history.user_mapping.standardize(&transcript);
    assert!(!standardized.contains("Alice"));
    assert!(!standardized.contains("Bob"));
    assert!(standardized.contains("<@100>"));
    assert!(standardized.contains("<@200>"));

    // The summarizer sees only the standardized form.
    let backend = ScriptedBackend::new("<@100> opened a design review; <@200> will review.");
    let summarizer = Summarizer::new(&backend);
    let summary = summarizer.generate_summary(&standardized, SummarySpan::classify(1));
    assert!(backend.prompts.borrow()[0].contains("<@100>"));
    assert!(!backend.prompts.borrow()[0].contains("Alice should check"));

    let restored = history.user_mapping.restore(&summary);
    assert_eq!(restored, "@Alice opened a design review; @Bob will review.");
}

#[test]
fn slack_pipeline_round_trips_thread_regions() {
    let parent_ts = "1705314600.000100";
    let mut replies = HashMap::new();
    replies.insert(
        parent_ts.to_string(),
        vec![
            SlackRecord {
                thread_ts: Some(parent_ts.to_string()),
                ..slack_record(parent_ts, "U100", "standup time")
            },
            slack_record("1705314660.000200", "U200", "on it"),
        ],
    );

    let gateway = FakeSlack {
        pages: vec![SlackHistoryPage {
            messages: vec![
                slack_record("1705314780.000400", "U200", "done"),
                SlackRecord {
                    thread_ts: Some(parent_ts.to_string()),
                    ..slack_record(parent_ts, "U100", "standup time")
                },
            ],
            has_more: false,
            next_cursor: None,
        }],
        replies,
        users: [
            ("U100".to_string(), "alice".to_string()),
            ("U200".to_string(), "bob".to_string()),
        ]
        .into(),
        page_calls: 0,
    };

    let since = Utc.timestamp_opt(1_705_000_000, 0).single().unwrap();
    let mut fetcher = SlackFetcher::new(gateway);
    let history = fetcher.fetch_messages("standup", since);

    assert_eq!(history.message_count(), 3);
    assert_eq!(history.channel_name, "standup");

    let transcript = history.format_as_text();
    assert!(transcript.contains(&format!("--- Thread: {parent_ts} ---")));

    let standardized = history.user_mapping.standardize(&transcript);
    let restored = history.user_mapping.restore(&standardized);
    assert!(restored.contains("@alice"));
    assert!(restored.contains("@bob"));
}

#[test]
fn dump_files_carry_platform_and_date_range() {
    let mut fetcher = DiscordFetcher::new(discord_gateway_with_thread());
    let history = fetcher.fetch_messages(42, ts(0));

    let dir = tempdir().unwrap();
    let run_date = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();

    let summary_path = write_dump(
        dir.path(),
        &history,
        DumpKind::Summary,
        "summary body",
        run_date,
    )
    .unwrap();
    let transcript_path = write_dump(
        dir.path(),
        &history,
        DumpKind::Transcript,
        &history.format_as_text(),
        run_date,
    )
    .unwrap();

    assert_eq!(
        summary_path.file_name().unwrap(),
        "discord_history_summary_general_2024-01-15_2024-01-20.md"
    );
    assert_eq!(
        transcript_path.file_name().unwrap(),
        "discord_history_general_2024-01-15_2024-01-20.md"
    );
    assert!(std::fs::read_to_string(&transcript_path)
        .unwrap()
        .contains("--- Thread: design-review ---"));
}

#[test]
fn interactive_session_over_fetched_history() {
    let mut fetcher = DiscordFetcher::new(discord_gateway_with_thread());
    let history = fetcher.fetch_messages(42, ts(0));
    let standardized = history.user_mapping.standardize(&history.format_as_text());

    let backend = ScriptedBackend::new("<@200> promised to review the draft");
    let mut session = InteractiveSession::new(&backend, standardized, &history.user_mapping, 1);

    let mut out = Vec::new();
    let end = session
        .run(Cursor::new("users\nwho reviews the draft?\nexit\n"), &mut out)
        .unwrap();

    assert_eq!(end, SessionEnd::UserExit);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("@Alice (<@100>)"));
    assert!(text.contains("@Bob promised to review the draft"));
    assert_eq!(session.turns().len(), 2);
}

#[test]
fn failed_fetch_cancels_pipeline_early() {
    struct BrokenDiscord;
    impl DiscordGateway for BrokenDiscord {
        fn channel_name(&mut self, _channel_id: u64) -> Result<Option<String>> {
            Err(chatscope::ChatScopeError::Api {
                platform: "Discord",
                message: "missing access".to_string(),
            })
        }
        fn channel_history(
            &mut self,
            _channel_id: u64,
            _since: DateTime<Utc>,
        ) -> Result<Vec<DiscordRecord>> {
            unreachable!("history must not be requested after a channel lookup failure")
        }
        fn thread_history(
            &mut self,
            _thread_id: u64,
            _since: DateTime<Utc>,
        ) -> Result<Vec<DiscordRecord>> {
            unreachable!()
        }
    }

    let since = ts(0);
    let mut fetcher = DiscordFetcher::new(BrokenDiscord);
    let history = fetcher.fetch_messages(42, since);

    assert!(history.is_empty());
    assert_eq!(history.first_message_date, since);
    assert_eq!(history.format_as_text(), "");
}

//! Command-line interface definition using clap.
//!
//! This module defines [`Args`], the CLI argument structure. The enums it
//! references ([`Platform`], [`ModelSource`]) live in their own modules and
//! are usable outside of CLI context.

use clap::Parser;

use crate::config::DEFAULT_SINCE_DAYS;
use crate::llm::{ModelSource, DEFAULT_MODEL};
use crate::platform::Platform;

/// Fetch recent chat history from Discord or Slack, summarize it with a
/// language model, and optionally explore it interactively.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatscope")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatscope 123456789012345678
    chatscope dc 123456789012345678 --since-days 3
    chatscope --platform slack general --chat
    chatscope sl standup --model-source remote --model gpt-4o-mini
    chatscope 123456789012345678 --dump-file ./dumps --dump-chat-history

CREDENTIALS (environment variables):
    DISCORD_TOKEN    Discord bot token (platform discord)
    SLACK_TOKEN      Slack bot token (platform slack)
    OPENAI_API_KEY   OpenAI key (model source remote)")]
pub struct Args {
    /// Channel to fetch: a numeric ID for Discord, a name for Slack
    pub channel: String,

    /// Chat platform to fetch from
    #[arg(short, long, value_enum, default_value = "discord")]
    pub platform: Platform,

    /// Number of days of history to fetch
    #[arg(short = 'd', long, value_name = "DAYS", default_value_t = DEFAULT_SINCE_DAYS)]
    pub since_days: i64,

    /// Where the model runs
    #[arg(short = 's', long, value_enum, default_value = "local")]
    pub model_source: ModelSource,

    /// Model name to use for summarization and chat
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Dump the summary to a markdown file in the given directory
    #[arg(
        long,
        value_name = "DIR",
        num_args = 0..=1,
        default_missing_value = "."
    )]
    pub dump_file: Option<String>,

    /// Also dump the full transcript alongside the summary
    #[arg(long)]
    pub dump_chat_history: bool,

    /// Start an interactive Q&A session after the summary
    #[arg(short, long)]
    pub chat: bool,
}

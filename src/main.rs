//! # chatscope CLI
//!
//! Command-line interface for the chatscope library.

use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use chrono::Utc;
use clap::Parser as ClapParser;

use chatscope::cli::Args;
use chatscope::config;
use chatscope::fetch::{DiscordFetcher, DiscordRestClient, SlackFetcher, SlackWebClient};
use chatscope::llm::{create_backend, InteractiveSession, SummarySpan, Summarizer};
use chatscope::output::{write_dump, DumpKind};
use chatscope::{ChatHistory, ChatScopeError, Platform};

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatScopeError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    let now = Utc::now();

    let since = config::since_date(args.since_days, now)?;

    // Print header
    println!("🔭 chatscope v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("💬 Platform: {}", args.platform);
    println!("📺 Channel:  {}", args.channel);
    println!("📅 Since:    {} ({} days)", since.format("%Y-%m-%d"), args.since_days);
    println!("🧠 Model:    {} ({})", args.model, args.model_source);
    println!();

    // Resolve everything fallible before touching the network: credentials
    // and the backend, so a missing OPENAI_API_KEY fails before a fetch.
    let token = config::platform_token(args.platform)?;
    let backend = create_backend(
        args.model_source,
        &args.model,
        config::openai_api_key().as_deref(),
    )?;

    // Fetch
    println!("⏳ Fetching messages...");
    let fetch_start = Instant::now();
    let history = match args.platform {
        Platform::Discord => {
            let channel_id = config::parse_discord_channel(&args.channel)?;
            let mut fetcher = DiscordFetcher::new(DiscordRestClient::new(token));
            fetcher.fetch_messages(channel_id, since)
        }
        Platform::Slack => {
            let channel_name = config::parse_slack_channel(&args.channel)?;
            let mut fetcher = SlackFetcher::new(SlackWebClient::new(token));
            fetcher.fetch_messages(&channel_name, since)
        }
        // `Platform` is `#[non_exhaustive]`, so the bin crate needs a wildcard
        // arm even though no other variants exist.
        _ => unreachable!("unsupported platform: {}", args.platform),
    };
    let fetch_time = fetch_start.elapsed();

    if history.is_empty() {
        println!(
            "   No messages found in the last {} days. Nothing to summarize.",
            args.since_days
        );
        return Ok(());
    }

    println!(
        "   Found {} messages from {} users across {} threads ({:.2}s)",
        history.message_count(),
        history.user_count(),
        history.thread_count(),
        fetch_time.as_secs_f64()
    );

    // Standardize: the backend only ever sees stable <@id> tokens.
    let transcript = history.format_as_text();
    let standardized = history.user_mapping.standardize(&transcript);

    let span_days = (now - history.first_message_date).num_days();
    let span = SummarySpan::classify(span_days);

    // Summarize
    println!("🧠 Generating summary...");
    let summary_start = Instant::now();
    let summarizer = Summarizer::new(backend.as_ref());
    let summary = summarizer.generate_summary(&standardized, span);
    let restored_summary = history.user_mapping.restore(&summary);
    println!("   Done ({:.2}s)", summary_start.elapsed().as_secs_f64());

    println!();
    println!("{}", "━".repeat(34));
    println!("{}", restored_summary);
    println!("{}", "━".repeat(34));

    // Dump files
    if let Some(ref dir) = args.dump_file {
        dump_outputs(Path::new(dir), &history, &restored_summary, &transcript, &args)?;
    }

    // Interactive session
    if args.chat {
        println!();
        let mut session = InteractiveSession::new(
            backend.as_ref(),
            &standardized,
            &history.user_mapping,
            span_days,
        );
        let stdin = io::stdin();
        session.run(stdin.lock(), io::stdout())?;
    }

    println!();
    println!("✅ Done in {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

/// Writes the summary dump, and the transcript dump when requested.
fn dump_outputs(
    dir: &Path,
    history: &ChatHistory,
    summary: &str,
    transcript: &str,
    args: &Args,
) -> Result<(), ChatScopeError> {
    let now = Utc::now();

    let path = write_dump(dir, history, DumpKind::Summary, summary, now)?;
    println!("💾 Summary saved to {}", path.display());

    if args.dump_chat_history {
        let path = write_dump(dir, history, DumpKind::Transcript, transcript, now)?;
        println!("💾 Transcript saved to {}", path.display());
    }

    Ok(())
}

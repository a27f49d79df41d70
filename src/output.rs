//! Dump-file naming and writing.
//!
//! Transcripts and summaries can be dumped to markdown files whose names
//! encode the platform, channel, and date range, so a directory of dumps
//! stays self-describing:
//!
//! ```text
//! discord_history_general_2024-01-10_2024-01-15.md
//! slack_history_summary_standup_2024-01-10_2024-01-15.md
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::history::ChatHistory;

/// What a dump file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// The full formatted transcript
    Transcript,
    /// A generated summary
    Summary,
}

impl DumpKind {
    fn tag(self) -> &'static str {
        match self {
            DumpKind::Transcript => "history",
            DumpKind::Summary => "history_summary",
        }
    }
}

/// Replaces filesystem-hostile characters in a channel name.
///
/// Slack channel names are already safe, but Discord channel names can carry
/// arbitrary unicode and separators.
fn sanitize_channel(name: &str) -> String {
    let cleaned: String = name
        .trim_start_matches('#')
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "channel".to_string()
    } else {
        cleaned
    }
}

/// Builds the dump filename for a history.
///
/// The date range runs from the first message date to the run date, both as
/// calendar dates.
pub fn dump_filename(history: &ChatHistory, kind: DumpKind, run_date: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}_{}_{}.md",
        history.platform.key(),
        kind.tag(),
        sanitize_channel(&history.channel_name),
        history.first_message_date.format("%Y-%m-%d"),
        run_date.format("%Y-%m-%d"),
    )
}

/// Writes `content` to a dump file under `dir` and returns the full path.
///
/// The directory is created if it does not exist. An existing file with the
/// same name is overwritten; repeated runs on the same day replace the
/// previous dump rather than accumulating copies.
///
/// # Errors
///
/// Returns [`ChatScopeError::Io`](crate::error::ChatScopeError::Io) when the
/// directory cannot be created or the file cannot be written.
pub fn write_dump(
    dir: &Path,
    history: &ChatHistory,
    kind: DumpKind,
    content: &str,
    run_date: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(dump_filename(history, kind, run_date));
    fs::write(&path, content)?;
    Ok(path)
}

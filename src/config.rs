//! Run configuration: credentials, lookback window, channel validation.
//!
//! Everything here resolves *before* any network call: credentials come from
//! the environment, the lookback window becomes a concrete UTC timestamp, and
//! the channel identifier is validated for the selected platform. A failure
//! in this module is a configuration error and aborts the run; nothing past
//! this point should discover a missing token.

use std::env;

use chrono::{DateTime, Duration, Utc};

use crate::error::{ChatScopeError, Result};
use crate::platform::Platform;

/// Default lookback window when none is given on the command line.
pub const DEFAULT_SINCE_DAYS: i64 = 7;

/// Environment variable holding the API token for a platform.
pub fn credential_var(platform: Platform) -> &'static str {
    match platform {
        Platform::Discord => "DISCORD_TOKEN",
        Platform::Slack => "SLACK_TOKEN",
    }
}

/// Reads the platform API token from the environment.
///
/// # Errors
///
/// Returns [`ChatScopeError::MissingCredential`] when the variable is unset
/// or empty.
pub fn platform_token(platform: Platform) -> Result<String> {
    let var = credential_var(platform);
    match env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ChatScopeError::MissingCredential { var }),
    }
}

/// Reads the OpenAI API key from the environment, if set.
///
/// Absence is not an error here: the key is only required when the remote
/// model source is selected, and that check lives in backend construction.
pub fn openai_api_key() -> Option<String> {
    env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Converts a lookback window in days into a concrete since-timestamp.
///
/// # Errors
///
/// Returns [`ChatScopeError::InvalidWindow`] for a negative window.
pub fn since_date(days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if days < 0 {
        return Err(ChatScopeError::InvalidWindow {
            message: format!("lookback days must be non-negative, got {days}"),
        });
    }
    Ok(now - Duration::days(days))
}

/// Validates and parses a Discord channel identifier.
///
/// Discord channels are numeric snowflake IDs.
///
/// # Errors
///
/// Returns [`ChatScopeError::InvalidChannel`] when the input is not a
/// positive integer.
pub fn parse_discord_channel(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| ChatScopeError::InvalidChannel {
            platform: "Discord",
            input: input.to_string(),
            message: "expected a numeric channel ID".to_string(),
        })
}

/// Validates a Slack channel name.
///
/// Slack channels are addressed by name; a leading `#` is tolerated and
/// stripped.
///
/// # Errors
///
/// Returns [`ChatScopeError::InvalidChannel`] for an empty name.
pub fn parse_slack_channel(input: &str) -> Result<String> {
    let name = input.trim().trim_start_matches('#');
    if name.is_empty() {
        return Err(ChatScopeError::InvalidChannel {
            platform: "Slack",
            input: input.to_string(),
            message: "expected a non-empty channel name".to_string(),
        });
    }
    Ok(name.to_string())
}

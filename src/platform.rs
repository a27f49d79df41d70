//! Supported chat platforms.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Chat platform a history can be fetched from.
///
/// # Example
///
/// ```rust
/// use chatscope::Platform;
/// use std::str::FromStr;
///
/// let platform = Platform::from_str("slack").unwrap();
/// assert_eq!(platform, Platform::Slack);
///
/// // Aliases are supported
/// let platform = Platform::from_str("dc").unwrap();
/// assert_eq!(platform, Platform::Discord);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Platform {
    /// Discord channels, addressed by numeric channel ID
    #[default]
    #[value(alias = "dc")]
    #[serde(alias = "dc")]
    Discord,

    /// Slack channels, addressed by channel name
    #[value(alias = "sl")]
    #[serde(alias = "sl")]
    Slack,
}

impl Platform {
    /// Lowercase key used in dump filenames.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Discord => "discord",
            Platform::Slack => "slack",
        }
    }

    /// Returns all platform names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["discord", "dc", "slack", "sl"]
    }

    /// Returns all available platforms.
    pub fn all() -> &'static [Platform] {
        &[Platform::Discord, Platform::Slack]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Discord => write!(f, "Discord"),
            Platform::Slack => write!(f, "Slack"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" | "dc" => Ok(Platform::Discord),
            "slack" | "sl" => Ok(Platform::Slack),
            _ => Err(format!(
                "Unknown platform: '{}'. Expected one of: {}",
                s,
                Platform::all_names().join(", ")
            )),
        }
    }
}

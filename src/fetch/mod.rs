//! Channel fetchers for the supported platforms.
//!
//! Every fetcher implements the same contract: given a channel and a
//! since-date, walk the channel's message stream and any attached threads in
//! emission order, build an identity mapping as users are encountered, and
//! return a [`ChatHistory`](crate::history::ChatHistory).
//!
//! # Contract
//!
//! - The identity mapping is cleared at the start of every fetch; it is
//!   owned by the fetcher instance and not safe to share across concurrent
//!   fetches.
//! - Thread replies are emitted contiguously at the point their parent
//!   message appears in the channel stream (parent-contiguous, not merged
//!   into global timestamp order).
//! - Fetching stops when the upstream API reports no further pages.
//! - A transport or permission error anywhere in the fetch aborts the whole
//!   operation and yields the empty-history sentinel carrying the original
//!   since-date. Callers cannot distinguish this from a legitimately empty
//!   channel; [`ChatHistory::is_empty`](crate::history::ChatHistory::is_empty)
//!   means "cancel the rest of the pipeline" either way.
//! - A message whose author cannot be resolved gets the deterministic
//!   placeholder from [`placeholder_name`], which is still registered in
//!   the identity mapping.
//!
//! The two variants differ in how threads are discovered:
//!
//! - [`discord`] — a channel message carries an attached thread resource;
//!   the fetcher pulls that thread's entire history and inlines it.
//! - [`slack`] — thread membership is signalled by a shared parent-timestamp
//!   key; a self-referential parent triggers one paginated replies call.

pub mod discord;
pub mod slack;

pub use discord::{DiscordFetcher, DiscordGateway, DiscordRecord, DiscordRestClient, ThreadRef};
pub use slack::{
    SlackChannelRef, SlackFetcher, SlackGateway, SlackHistoryPage, SlackRecord, SlackWebClient,
};

/// Maximum number of records requested per history page.
pub const PAGE_SIZE: usize = 100;

/// Deterministic display name for a user whose identity could not be
/// resolved. The placeholder is registered in the identity mapping like any
/// real name, so standardize/restore still round-trip over it.
pub fn placeholder_name(user_id: &str) -> String {
    format!("User_{user_id}")
}

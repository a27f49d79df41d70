//! Reversible substitution between display names and stable user IDs.
//!
//! Chat text refers to people by display name, but display names are neither
//! stable nor unique. [`UserMapping`] holds the run-scoped association between
//! a display name and the platform's stable identifier, and exposes the two
//! substitution directions:
//!
//! - [`standardize`](UserMapping::standardize) — replace every mapped display
//!   name in a text with the canonical `<@id>` token, so the model backend
//!   sees only stable identifiers.
//! - [`restore`](UserMapping::restore) — replace every known `<@id>` token
//!   with `@name` for presentation. Unknown identifiers are left verbatim.
//!
//! Both operations are pure and total: missing keys are simply not replaced,
//! and empty input returns unchanged.
//!
//! # Substitution order
//!
//! Name replacement is a single pass over the text using an alternation of
//! escaped names sorted longest-first, so a name that is a substring of
//! another (`"Al"` inside `"Alice"`) can never corrupt the longer name.
//!
//! # Example
//!
//! ```
//! use chatscope::UserMapping;
//!
//! let mut mapping = UserMapping::new();
//! mapping.insert("Alice", "123456");
//! mapping.insert("Bob", "789012");
//!
//! let text = "[2024-01-15 10:30:00] Alice: Hello Bob!";
//! let standardized = mapping.standardize(text);
//! assert_eq!(standardized, "[2024-01-15 10:30:00] <@123456>: Hello <@789012>!");
//!
//! let restored = mapping.restore(&standardized);
//! assert_eq!(restored, "[2024-01-15 10:30:00] @Alice: Hello @Bob!");
//! ```

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Run-scoped mapping from display name to stable user identifier.
///
/// Owned by exactly one fetcher per run: the fetcher clears it at the start
/// of every fetch, fills it while walking messages, and moves it into the
/// resulting [`ChatHistory`](crate::history::ChatHistory). It is never shared
/// ambient state.
///
/// Display names are overwritten on collision: if a platform lets a name be
/// reused by two distinct identifiers within one run, the most recently seen
/// identifier survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMapping {
    names: HashMap<String, String>,
}

impl UserMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a display name with its stable identifier.
    ///
    /// Last writer wins on name collisions.
    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.names.insert(name.into(), id.into());
    }

    /// Returns the identifier registered for `name`, if any.
    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Returns the number of distinct display names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no users have been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Removes all entries. Called at the start of every fetch.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Iterates over `(name, id)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(n, i)| (n.as_str(), i.as_str()))
    }

    /// Replaces every occurrence of a mapped display name with `<@id>`.
    ///
    /// The replacement is a single left-to-right pass; at each position the
    /// longest mapped name wins, so overlapping names are handled
    /// deterministically. Text with no mapped names is returned unchanged.
    pub fn standardize(&self, text: &str) -> String {
        if self.names.is_empty() || text.is_empty() {
            return text.to_string();
        }

        // Longest-first alternation: the regex engine picks the first
        // alternative that matches at a position.
        let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        // Escaped literal alternations always compile.
        let re = Regex::new(&pattern).unwrap();

        re.replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[0];
            match self.names.get(name) {
                Some(id) => format!("<@{id}>"),
                None => name.to_string(),
            }
        })
        .into_owned()
    }

    /// Replaces every `<@id>` token with `@name` for a known identifier.
    ///
    /// Identifiers not present in the mapping are left completely untouched,
    /// so unknown users stay visible as raw tokens rather than being masked
    /// by a synthetic label.
    pub fn restore(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let by_id: HashMap<&str, &str> = self
            .names
            .iter()
            .map(|(name, id)| (id.as_str(), name.as_str()))
            .collect();

        let re = Regex::new(r"<@([A-Za-z0-9_.\-]+)>").unwrap();
        re.replace_all(text, |caps: &regex::Captures<'_>| {
            match by_id.get(&caps[1]) {
                Some(name) => format!("@{name}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for UserMapping {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (name, id) in iter {
            mapping.insert(name, id);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> UserMapping {
        [("Alice", "123456"), ("Bob", "789012")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_standardize_basic() {
        let text = "[2024-01-15 10:30:00] Alice: Hello Bob!";
        assert_eq!(
            mapping().standardize(text),
            "[2024-01-15 10:30:00] <@123456>: Hello <@789012>!"
        );
    }

    #[test]
    fn test_standardize_empty_mapping_is_identity() {
        let empty = UserMapping::new();
        assert_eq!(empty.standardize("Alice says hi"), "Alice says hi");
    }

    #[test]
    fn test_standardize_empty_text() {
        assert_eq!(mapping().standardize(""), "");
    }

    #[test]
    fn test_standardize_no_mapped_names_unchanged() {
        let text = "Nobody here but us chickens.";
        assert_eq!(mapping().standardize(text), text);
    }

    #[test]
    fn test_standardize_longest_match_wins() {
        let mapping: UserMapping = [("Al", "111"), ("Alice", "123456")].into_iter().collect();
        assert_eq!(
            mapping.standardize("Alice and Al talked"),
            "<@123456> and <@111> talked"
        );
    }

    #[test]
    fn test_standardize_name_with_regex_metacharacters() {
        let mapping: UserMapping = [("dev.ops+1", "555")].into_iter().collect();
        assert_eq!(mapping.standardize("ping dev.ops+1 now"), "ping <@555> now");
        // The dot must not match arbitrary characters.
        assert_eq!(mapping.standardize("devXops+1"), "devXops+1");
    }

    #[test]
    fn test_restore_basic() {
        let text = "[2024-01-15 10:30:00] <@123456>: Hello <@789012>!";
        assert_eq!(
            mapping().restore(text),
            "[2024-01-15 10:30:00] @Alice: Hello @Bob!"
        );
    }

    #[test]
    fn test_restore_unknown_id_left_verbatim() {
        let mapping: UserMapping = [("Alice", "123456")].into_iter().collect();
        assert_eq!(
            mapping.restore("Hey <@123456>, and also <@999999> (unknown user)."),
            "Hey @Alice, and also <@999999> (unknown user)."
        );
    }

    #[test]
    fn test_restore_empty_mapping_is_identity() {
        let empty = UserMapping::new();
        let text = "Hello <@123456>!";
        assert_eq!(empty.restore(text), text);
    }

    #[test]
    fn test_round_trip_adds_at_marker() {
        let m = mapping();
        let text = "[2024-01-15 10:30:00] Alice: Hello Bob!";
        let round = m.restore(&m.standardize(text));
        assert_eq!(round, "[2024-01-15 10:30:00] @Alice: Hello @Bob!");
    }

    #[test]
    fn test_last_writer_wins_on_name_collision() {
        let mut m = UserMapping::new();
        m.insert("Alice", "111");
        m.insert("Alice", "222");
        assert_eq!(m.len(), 1);
        assert_eq!(m.id_for("Alice"), Some("222"));
        assert_eq!(m.standardize("Alice"), "<@222>");
    }

    #[test]
    fn test_clear_resets_mapping() {
        let mut m = mapping();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.standardize("Alice"), "Alice");
    }

    #[test]
    fn test_slack_style_ids_restore() {
        let m: UserMapping = [("jane", "U024BE7LH")].into_iter().collect();
        assert_eq!(m.restore("cc <@U024BE7LH>"), "cc @jane");
    }
}

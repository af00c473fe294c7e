//! Restart-stable identities for browser windows.
//!
//! Browser windows have no identity of their own across restarts, so each
//! one is matched to a previously seen window by the overlap of its tab
//! URLs. Matching is greedy: callers feed windows largest-first, and every
//! known identity is handed out at most once per matcher.

use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

pub const IDENTITIES_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEntry {
    pub uuid: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitiesFile {
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<IdentityEntry>,
}

impl Default for IdentitiesFile {
    fn default() -> Self {
        Self {
            version: IDENTITIES_VERSION,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrlMatcher {
    entries: Vec<IdentityEntry>,
    available: BTreeSet<usize>,
}

impl UrlMatcher {
    pub fn new(entries: Vec<IdentityEntry>) -> Self {
        let available = (0..entries.len()).collect();
        Self { entries, available }
    }

    pub fn from_file(file: IdentitiesFile) -> Self {
        Self::new(file.entries)
    }

    /// Returns the identity for a window with these tab URLs.
    ///
    /// Picks the unclaimed identity with the largest URL overlap; with no
    /// overlap anywhere, reuses the oldest unclaimed identity; with none
    /// left, mints a new one. The chosen identity's URLs are replaced.
    pub fn match_or_create(&mut self, urls: &[String]) -> String {
        let wanted: HashSet<&str> = urls.iter().map(String::as_str).collect();

        let mut best: Option<(usize, usize)> = None;
        for &idx in &self.available {
            let overlap = self.entries[idx]
                .urls
                .iter()
                .filter(|u| wanted.contains(u.as_str()))
                .count();
            if overlap > 0 && best.is_none_or(|(_, o)| overlap > o) {
                best = Some((idx, overlap));
            }
        }

        let chosen = best
            .map(|(idx, _)| idx)
            .or_else(|| self.available.first().copied());

        match chosen {
            Some(idx) => {
                self.available.remove(&idx);
                self.entries[idx].urls = urls.to_vec();
                self.entries[idx].uuid.clone()
            }
            None => {
                let uuid = Uuid::new_v4().to_string();
                self.entries.push(IdentityEntry {
                    uuid: uuid.clone(),
                    urls: urls.to_vec(),
                });
                uuid
            }
        }
    }

    pub fn entries(&self) -> &[IdentityEntry] {
        &self.entries
    }

    pub fn into_file(self) -> IdentitiesFile {
        IdentitiesFile {
            version: IDENTITIES_VERSION,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    fn entry(uuid: &str, list: &[&str]) -> IdentityEntry {
        IdentityEntry {
            uuid: uuid.to_string(),
            urls: urls(list),
        }
    }

    #[test]
    fn test_creates_identity_when_empty() {
        let mut matcher = UrlMatcher::new(Vec::new());
        let id = matcher.match_or_create(&urls(&["https://a"]));
        assert_eq!(id.len(), 36);
        assert_eq!(matcher.entries().len(), 1);
        assert_eq!(matcher.entries()[0].urls, urls(&["https://a"]));
    }

    #[test]
    fn test_best_overlap_wins() {
        let mut matcher = UrlMatcher::new(vec![
            entry("one", &["https://a", "https://x"]),
            entry("two", &["https://a", "https://b", "https://c"]),
        ]);

        let id = matcher.match_or_create(&urls(&["https://a", "https://b", "https://z"]));

        assert_eq!(id, "two");
        assert_eq!(
            matcher.entries()[1].urls,
            urls(&["https://a", "https://b", "https://z"])
        );
    }

    #[test]
    fn test_identity_is_claimed_once() {
        let mut matcher = UrlMatcher::new(vec![entry("one", &["https://a"])]);

        assert_eq!(matcher.match_or_create(&urls(&["https://a"])), "one");
        let second = matcher.match_or_create(&urls(&["https://a"]));
        assert_ne!(second, "one");
        assert_eq!(matcher.entries().len(), 2);
    }

    #[test]
    fn test_falls_back_to_oldest_unclaimed() {
        let mut matcher = UrlMatcher::new(vec![
            entry("one", &["https://a"]),
            entry("two", &["https://b"]),
        ]);

        assert_eq!(matcher.match_or_create(&urls(&["https://q"])), "one");
        assert_eq!(matcher.match_or_create(&urls(&["https://r"])), "two");
    }

    #[test]
    fn test_file_round_trip_keeps_entries() {
        let mut matcher = UrlMatcher::new(Vec::new());
        let id = matcher.match_or_create(&urls(&["https://a"]));
        let file = matcher.into_file();

        let json = serde_json::to_string(&file).unwrap();
        let back: IdentitiesFile = serde_json::from_str(&json).unwrap();

        assert_eq!(back.version, IDENTITIES_VERSION);
        assert_eq!(back.entries[0].uuid, id);
    }
}

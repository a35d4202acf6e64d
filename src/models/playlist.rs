use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered key/value attribute map with last-write-wins semantics.
///
/// Keys stay in first-seen order; inserting an existing key replaces its
/// value in place. Playlist attribute lists are small (a handful of
/// `tvg-*` keys), so linear lookup is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    pairs: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Single playable record extracted from the playlist.
///
/// An entry is complete only once both an `#EXTINF` line and a following
/// URL line have been consumed; the parser never emits entries without a
/// URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
    /// HTTP headers to send when requesting the stream, accumulated from
    /// `#EXTVLCOPT` directives and URL-embedded parameters.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Convenience duplicate of `headers["user-agent"]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl PlaylistEntry {
    pub fn group_title(&self) -> Option<&str> {
        self.attributes.get("group-title")
    }

    pub fn logo(&self) -> Option<&str> {
        self.attributes.get("tvg-logo")
    }
}

/// Parsed playlist; item order matches appearance order in the source
/// text. Grouping and dedup downstream rely on this order being stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub items: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn stats(&self) -> PlaylistStats {
        let mut groups: Vec<&str> = self
            .items
            .iter()
            .filter_map(|item| item.group_title())
            .collect();
        groups.sort_unstable();
        groups.dedup();

        PlaylistStats {
            total_items: self.items.len(),
            group_count: groups.len(),
        }
    }
}

/// Season/episode info derived from a free-text title. Never stored on
/// the entry itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInfo {
    pub clean_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl EpisodeInfo {
    /// Fallback result when no pattern matched: the trimmed original
    /// title with no season/episode info.
    pub fn miss(title: &str) -> Self {
        Self {
            clean_title: title.trim().to_string(),
            season: None,
            episode: None,
        }
    }

    pub fn has_episode(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }
}

/// Parse summary for logging and host UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStats {
    pub total_items: usize,
    pub group_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_map_last_write_wins() {
        let mut map = AttributeMap::new();
        map.insert("tvg-logo", "a.png");
        map.insert("group-title", "News");
        map.insert("tvg-logo", "b.png");

        assert_eq!(map.get("tvg-logo"), Some("b.png"));
        assert_eq!(map.len(), 2);
        // first-seen order preserved
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["tvg-logo", "group-title"]);
    }

    #[test]
    fn test_stats_counts_distinct_groups() {
        let mut a = PlaylistEntry::default();
        a.attributes.insert("group-title", "News");
        let mut b = PlaylistEntry::default();
        b.attributes.insert("group-title", "News");
        let c = PlaylistEntry::default();

        let playlist = Playlist {
            items: vec![a, b, c],
        };
        let stats = playlist.stats();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.group_count, 1);
    }
}

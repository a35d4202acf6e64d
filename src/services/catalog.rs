use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{CatalogOptions, EpisodeFallback, GroupingStrategy, SearchDedup, SearchOptions};
use crate::error::CatalogError;
use crate::models::{CatalogGroup, CatalogItem, LoadData, Playlist, PlaylistEntry};
use crate::services::episode::EpisodeInfoExtractor;

/// One entry of a show's episode list, ordered by (season, episode).
#[derive(Debug, Clone, PartialEq)]
pub struct ShowEpisode {
    pub season: u32,
    pub episode: u32,
    pub entry: PlaylistEntry,
}

type BucketComparator = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Builds browsable catalog structures out of a parsed playlist:
/// alphabetic index buckets, group listings, search, and per-show
/// episode lists.
pub struct CatalogBuilder {
    options: CatalogOptions,
    bucket_cmp: BucketComparator,
}

impl CatalogBuilder {
    pub fn new(options: CatalogOptions) -> Self {
        Self {
            options,
            bucket_cmp: Arc::new(default_bucket_order),
        }
    }

    /// Replace the bucket ordering with a locale-aware comparator
    /// (collation is the host's concern; the default is plain
    /// lexicographic with `"0-9"` first and `"#"` last).
    pub fn with_bucket_comparator(
        mut self,
        cmp: impl Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.bucket_cmp = Arc::new(cmp);
        self
    }

    /// Grouping key for an entry, per the configured strategy.
    fn show_key(&self, entry: &PlaylistEntry) -> String {
        let title = entry.title.as_deref().unwrap_or("").trim();

        match self.options.grouping {
            GroupingStrategy::CleanTitle => {
                let info = EpisodeInfoExtractor::extract(title);
                if info.has_episode() {
                    info.clean_title
                } else if !title.is_empty() {
                    title.to_string()
                } else {
                    entry.group_title().unwrap_or("").to_string()
                }
            }
            GroupingStrategy::GroupTitle => entry
                .group_title()
                .map(str::to_string)
                .unwrap_or_else(|| title.to_string()),
        }
    }

    /// Build the alphabetic index: one group per bucket, one item per
    /// distinct show key, first occurrence wins.
    pub fn build_index(&self, playlist: &Playlist) -> Result<Vec<CatalogGroup>, CatalogError> {
        let mut buckets: Vec<CatalogGroup> = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for entry in &playlist.items {
            let key = self.show_key(entry);
            let name = if key.is_empty() {
                entry.title.clone().unwrap_or_default()
            } else {
                key.clone()
            };
            if !seen_keys.insert(key.clone()) {
                continue;
            }

            let item = self.catalog_item(entry, &name)?;
            let bucket = bucket_label(&name);

            match buckets.iter_mut().find(|b| b.name == bucket) {
                Some(group) => group.items.push(item),
                None => buckets.push(CatalogGroup {
                    name: bucket,
                    items: vec![item],
                }),
            }
        }

        let cmp = Arc::clone(&self.bucket_cmp);
        buckets.sort_by(|a, b| cmp(&a.name, &b.name));

        tracing::debug!(
            buckets = buckets.len(),
            shows = seen_keys.len(),
            "catalog index built"
        );
        Ok(buckets)
    }

    /// Build one catalog group per `group-title` value, in first-seen
    /// order, one item per distinct show key inside each group.
    pub fn build_groups(&self, playlist: &Playlist) -> Result<Vec<CatalogGroup>, CatalogError> {
        let mut groups: Vec<CatalogGroup> = Vec::new();
        let mut seen_keys: HashSet<(String, String)> = HashSet::new();

        for entry in &playlist.items {
            let group_name = entry.group_title().unwrap_or("").to_string();
            let key = self.show_key(entry);
            if !seen_keys.insert((group_name.clone(), key.clone())) {
                continue;
            }

            let name = if key.is_empty() {
                entry.title.clone().unwrap_or_default()
            } else {
                key
            };
            let item = self.catalog_item(entry, &name)?;

            match groups.iter_mut().find(|g| g.name == group_name) {
                Some(group) => group.items.push(item),
                None => groups.push(CatalogGroup {
                    name: group_name,
                    items: vec![item],
                }),
            }
        }

        Ok(groups)
    }

    /// Case-insensitive substring search over titles (and optionally a
    /// secondary attribute). Matches preserve playlist order; dedup only
    /// when asked for.
    pub fn search<'a>(
        &self,
        playlist: &'a Playlist,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<&'a PlaylistEntry> {
        let needle = query.to_lowercase();
        let mut seen: HashSet<String> = HashSet::new();
        let mut matches = Vec::new();

        for entry in &playlist.items {
            let title_match = entry
                .title
                .as_deref()
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false);

            let attr_match = options.secondary_attribute.as_deref().is_some_and(|attr| {
                entry
                    .attributes
                    .get(attr)
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            });

            if !title_match && !attr_match {
                continue;
            }

            let dedup_key = match options.dedup {
                SearchDedup::None => None,
                SearchDedup::ByUrl => entry.url.clone(),
                SearchDedup::ByTitle => entry.title.clone(),
            };
            if let Some(key) = dedup_key {
                if !seen.insert(key) {
                    continue;
                }
            }

            matches.push(entry);
        }

        matches
    }

    /// Episode list for a show: entries whose derived clean title equals
    /// `show_title`, ordered by (season, episode) ascending regardless
    /// of source order. Entries without extractable episode info are
    /// filtered out or defaulted to (1, 0) per the configured policy.
    pub fn episodes(&self, playlist: &Playlist, show_title: &str) -> Vec<ShowEpisode> {
        let mut episodes: Vec<ShowEpisode> = Vec::new();

        for entry in &playlist.items {
            let title = entry.title.as_deref().unwrap_or("");
            let info = EpisodeInfoExtractor::extract(title);
            if info.clean_title != show_title {
                continue;
            }

            let (season, episode) = match (info.season, info.episode) {
                (Some(season), Some(episode)) => (season, episode),
                _ => match self.options.episode_fallback {
                    EpisodeFallback::Filter => continue,
                    // catalog convention for flat views, not a parse
                    // failure signal
                    EpisodeFallback::Default => (1, 0),
                },
            };

            episodes.push(ShowEpisode {
                season,
                episode,
                entry: entry.clone(),
            });
        }

        episodes.sort_by(|a, b| {
            a.season
                .cmp(&b.season)
                .then_with(|| a.episode.cmp(&b.episode))
        });
        episodes
    }

    fn catalog_item(&self, entry: &PlaylistEntry, name: &str) -> Result<CatalogItem, CatalogError> {
        let info = EpisodeInfoExtractor::extract(entry.title.as_deref().unwrap_or(""));
        let data = LoadData {
            url: entry.url.clone(),
            urls: None,
            title: name.to_string(),
            poster: entry.logo().map(str::to_string),
            group: entry.group_title().map(str::to_string),
            nation: entry.attributes.get("tvg-country").map(str::to_string),
            season: info.season,
            episode: info.episode,
        };

        Ok(CatalogItem {
            name: name.to_string(),
            token: data.encode()?,
            poster: entry.logo().map(str::to_string),
        })
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(CatalogOptions::default())
    }
}

/// Alphabetic bucket for a title: first character uppercased for
/// letters, `"0-9"` for digits, `"#"` for anything else including the
/// empty string. Unicode letters keep their uppercase form (no ASCII
/// folding: "Çukur" buckets under "Ç").
pub fn bucket_label(title: &str) -> String {
    match title.chars().next() {
        Some(c) if c.is_ascii_digit() => "0-9".to_string(),
        Some(c) if c.is_alphabetic() => c.to_uppercase().collect(),
        _ => "#".to_string(),
    }
}

/// Default bucket ordering: `"0-9"` first, `"#"` last, letters in
/// lexicographic order.
fn default_bucket_order(a: &str, b: &str) -> Ordering {
    let rank = |s: &str| match s {
        "0-9" => 0u8,
        "#" => 2,
        _ => 1,
    };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::services::m3u_parser::parse;

    fn playlist(entries: &[(&str, &str, &str)]) -> Playlist {
        // (title, group-title, url)
        let mut content = String::from("#EXTM3U\n");
        for (title, group, url) in entries {
            content.push_str(&format!(
                "#EXTINF:-1 tvg-logo=\"http://logo/x.png\" group-title=\"{}\",{}\n{}\n",
                group, title, url
            ));
        }
        parse(&content, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_bucket_label() {
        assert_eq!(bucket_label("1883"), "0-9");
        assert_eq!(bucket_label("Çukur"), "Ç");
        assert_eq!(bucket_label("*Secret*"), "#");
        assert_eq!(bucket_label(""), "#");
        assert_eq!(bucket_label("show"), "S");
    }

    #[test]
    fn test_build_index_buckets_and_dedup() {
        let playlist = playlist(&[
            ("Show S01E01", "Dizi", "http://s1e1"),
            ("Show S01E02", "Dizi", "http://s1e2"),
            ("1883 S01E01", "Dizi", "http://w1"),
            ("*Secret*", "Misc", "http://sec"),
        ]);

        let index = CatalogBuilder::default().build_index(&playlist).unwrap();
        let names: Vec<&str> = index.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["0-9", "S", "#"]);

        let s_bucket = index.iter().find(|g| g.name == "S").unwrap();
        // both episodes collapse into one "Show" item
        assert_eq!(s_bucket.items.len(), 1);
        assert_eq!(s_bucket.items[0].name, "Show");
        assert_eq!(s_bucket.items[0].poster.as_deref(), Some("http://logo/x.png"));

        // token round-trips the fields downstream consumes
        let data = LoadData::decode(&s_bucket.items[0].token).unwrap();
        assert_eq!(data.title, "Show");
        assert_eq!(data.group.as_deref(), Some("Dizi"));
        assert_eq!(data.url.as_deref(), Some("http://s1e1"));
    }

    #[test]
    fn test_custom_bucket_comparator() {
        let playlist = playlist(&[
            ("Alpha", "G", "http://a"),
            ("Beta", "G", "http://b"),
        ]);

        let index = CatalogBuilder::default()
            .with_bucket_comparator(|a, b| b.cmp(a))
            .build_index(&playlist)
            .unwrap();
        let names: Vec<&str> = index.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_group_title_strategy() {
        let playlist = playlist(&[
            ("Show S01E01", "Dizi", "http://s1"),
            ("News Hour", "Haber", "http://n1"),
        ]);

        let builder = CatalogBuilder::new(CatalogOptions {
            grouping: GroupingStrategy::GroupTitle,
            ..Default::default()
        });
        let groups = builder.build_groups(&playlist).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Dizi", "Haber"]);
    }

    #[test]
    fn test_search_preserves_order_no_dedup() {
        let playlist = playlist(&[
            ("Show S01E02", "Dizi", "http://b"),
            ("Show S01E01", "Dizi", "http://a"),
            ("Other", "Misc", "http://c"),
        ]);

        let builder = CatalogBuilder::default();
        let matches = builder.search(&playlist, "show", &SearchOptions::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].url.as_deref(), Some("http://b"));
        assert_eq!(matches[1].url.as_deref(), Some("http://a"));
    }

    #[test]
    fn test_search_dedup_by_url_and_secondary_attribute() {
        let mut playlist = playlist(&[
            ("Show A", "Dizi", "http://same"),
            ("Show B", "Dizi", "http://same"),
        ]);
        playlist.items[1]
            .attributes
            .insert("tvg-language", "Turkish");

        let builder = CatalogBuilder::default();
        let options = SearchOptions {
            dedup: SearchDedup::ByUrl,
            ..Default::default()
        };
        assert_eq!(builder.search(&playlist, "show", &options).len(), 1);

        // secondary attribute match finds entries the title match misses
        let options = SearchOptions {
            secondary_attribute: Some("tvg-language".to_string()),
            ..Default::default()
        };
        let matches = builder.search(&playlist, "turkish", &options);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title.as_deref(), Some("Show B"));
    }

    #[test]
    fn test_episodes_sorted_regardless_of_source_order() {
        let playlist = playlist(&[
            ("Show S01E02", "Dizi", "http://s1e2"),
            ("Show S02E01", "Dizi", "http://s2e1"),
            ("Show S01E01", "Dizi", "http://s1e1"),
        ]);

        let episodes = CatalogBuilder::default().episodes(&playlist, "Show");
        let order: Vec<(u32, u32)> = episodes.iter().map(|e| (e.season, e.episode)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_episode_fallback_filter_vs_default() {
        let playlist = playlist(&[
            ("Show S01E01", "Dizi", "http://e1"),
            ("Show", "Dizi", "http://flat"),
        ]);

        // episodic view: the flat entry disappears
        let filtered = CatalogBuilder::default().episodes(&playlist, "Show");
        assert_eq!(filtered.len(), 1);

        // flat view: the entry gets the (1, 0) convention
        let builder = CatalogBuilder::new(CatalogOptions {
            episode_fallback: EpisodeFallback::Default,
            ..Default::default()
        });
        let defaulted = builder.episodes(&playlist, "Show");
        assert_eq!(defaulted.len(), 2);
        assert_eq!((defaulted[0].season, defaulted[0].episode), (1, 0));
        assert_eq!((defaulted[1].season, defaulted[1].episode), (1, 1));
    }
}

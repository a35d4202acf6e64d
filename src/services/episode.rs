use lazy_static::lazy_static;
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::models::EpisodeInfo;

// Extraction results are memoized (LRU, 10k entries); large playlists
// repeat the same titles across groups.
lazy_static! {
    static ref EPISODE_CACHE: Mutex<LruCache<String, EpisodeInfo>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(10_000).unwrap()));

    /// Ordered pattern chain; first match wins. Each pattern captures
    /// (show title prefix, season number, episode number).
    static ref EPISODE_PATTERNS: Vec<Regex> = vec![
        // "Breaking Bad S02E05", "showS2E5"
        Regex::new(r"(?i)^(.+?)[\s._-]*S(\d{1,2})\s*E(\d{1,3})").unwrap(),
        // "Çukur 2. Sezon 5. Bölüm"
        Regex::new(r"(?i)^(.+?)\s*(\d{1,2})\s*\.\s*Sezon\s*(\d{1,3})\s*\.\s*Bölüm").unwrap(),
        // "Çukur Sezon 2 Bölüm 5"
        Regex::new(r"(?i)^(.+?)\s*Sezon\s*(\d{1,2})\s*Bölüm\s*(\d{1,3})").unwrap(),
    ];
}

/// Splits a free-text title into (clean show title, season, episode).
pub struct EpisodeInfoExtractor;

impl EpisodeInfoExtractor {
    /// Try the pattern chain in order and return the first match. No
    /// match, or a numeric group that fails to parse, yields the trimmed
    /// original title with no season/episode info — never an error.
    ///
    /// Callers decide what "no episode info" means for their view: the
    /// catalog's flat view substitutes the (season 1, episode 0)
    /// convention, the episodic view filters the entry out.
    pub fn extract(title: &str) -> EpisodeInfo {
        {
            let mut cache = EPISODE_CACHE.lock().unwrap();
            if let Some(cached) = cache.get(title) {
                return cached.clone();
            }
        }

        let info = Self::extract_uncached(title);

        let mut cache = EPISODE_CACHE.lock().unwrap();
        cache.put(title.to_string(), info.clone());
        info
    }

    fn extract_uncached(title: &str) -> EpisodeInfo {
        for pattern in EPISODE_PATTERNS.iter() {
            let Some(caps) = pattern.captures(title) else {
                continue;
            };

            let clean = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let season = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            let episode = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());

            // a matched pattern with an unparseable number degrades to
            // the no-info fallback, same as no match
            let (Some(season), Some(episode)) = (season, episode) else {
                continue;
            };

            if clean.is_empty() {
                continue;
            }

            return EpisodeInfo {
                clean_title: clean.to_string(),
                season: Some(season),
                episode: Some(episode),
            };
        }

        EpisodeInfo::miss(title)
    }

    /// Show title with any recognized season/episode markers stripped.
    pub fn clean_title(title: &str) -> String {
        Self::extract(title).clean_title
    }

    #[cfg(test)]
    pub fn clear_cache() {
        EPISODE_CACHE.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sxxexx() {
        let info = EpisodeInfoExtractor::extract("Show S02E05");
        assert_eq!(info.clean_title, "Show");
        assert_eq!(info.season, Some(2));
        assert_eq!(info.episode, Some(5));
    }

    #[test]
    fn test_extract_sxxexx_case_insensitive_no_separator() {
        let info = EpisodeInfoExtractor::extract("Breaking Bad s01e07 1080p");
        assert_eq!(info.clean_title, "Breaking Bad");
        assert_eq!(info.season, Some(1));
        assert_eq!(info.episode, Some(7));

        let info = EpisodeInfoExtractor::extract("ShowS2E5");
        assert_eq!(info.clean_title, "Show");
        assert_eq!(info.season, Some(2));
        assert_eq!(info.episode, Some(5));
    }

    #[test]
    fn test_extract_dotted_sezon_bolum() {
        let info = EpisodeInfoExtractor::extract("Çukur 2. Sezon 5. Bölüm");
        assert_eq!(info.clean_title, "Çukur");
        assert_eq!(info.season, Some(2));
        assert_eq!(info.episode, Some(5));
    }

    #[test]
    fn test_extract_spaced_sezon_bolum() {
        let info = EpisodeInfoExtractor::extract("Show Sezon 2 Bölüm 5");
        assert_eq!(info.clean_title, "Show");
        assert_eq!(info.season, Some(2));
        assert_eq!(info.episode, Some(5));
    }

    #[test]
    fn test_extract_no_match_returns_trimmed_original() {
        let info = EpisodeInfoExtractor::extract("  Random Title  ");
        assert_eq!(info.clean_title, "Random Title");
        assert_eq!(info.season, None);
        assert_eq!(info.episode, None);
        assert!(!info.has_episode());
    }

    #[test]
    fn test_extract_cached_result_is_identical() {
        EpisodeInfoExtractor::clear_cache();
        let first = EpisodeInfoExtractor::extract("Show S03E09");
        let second = EpisodeInfoExtractor::extract("Show S03E09");
        assert_eq!(first, second);
    }
}

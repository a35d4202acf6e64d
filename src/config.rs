use serde::Deserialize;

/// Where the `#EXTM3U` header is required to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// First non-empty line must start with `#EXTM3U`.
    #[default]
    Strict,
    /// Header accepted anywhere in the playlist.
    Lenient,
}

/// Priority of `|key=value` URL-suffix parameters relative to headers
/// already attached by `#EXTVLCOPT` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlParamPriority {
    /// URL parameters only fill headers not already set.
    #[default]
    Fallback,
    /// URL parameters replace previously set headers.
    Override,
}

/// Parsing options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    #[serde(default)]
    pub header_policy: HeaderPolicy,
    #[serde(default)]
    pub url_param_priority: UrlParamPriority,
    /// Unescape the five standard HTML entities in titles. Some provider
    /// dialects ship entity-escaped titles; off by default.
    #[serde(default)]
    pub unescape_titles: bool,
}

/// How flat playlist entries are grouped into catalog shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingStrategy {
    /// Group by the clean title derived from episode extraction.
    #[default]
    CleanTitle,
    /// Group by the literal `group-title` attribute.
    GroupTitle,
}

/// What to do with entries whose title yields no season/episode info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EpisodeFallback {
    /// Drop the entry from the episode list (episodic view).
    #[default]
    Filter,
    /// Assign season 1, episode 0 (flat movie view). This is a catalog
    /// convention, not a parse-failure signal.
    Default,
}

/// Catalog building options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOptions {
    #[serde(default)]
    pub grouping: GroupingStrategy,
    #[serde(default)]
    pub episode_fallback: EpisodeFallback,
}

/// Deduplication applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchDedup {
    #[default]
    None,
    ByUrl,
    ByTitle,
}

/// Search options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default)]
    pub dedup: SearchDedup,
    /// Secondary attribute also matched against the query
    /// (e.g. `tvg-language`).
    #[serde(default)]
    pub secondary_attribute: Option<String>,
}

/// Options for the playlist service (fetch + cache).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOptions {
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: i64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub parse: ParseOptions,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_cache_ttl_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            parse: ParseOptions::default(),
        }
    }
}

fn default_cache_ttl_ms() -> i64 {
    3_600_000 // 1 hour
}

fn default_fetch_timeout_ms() -> u64 {
    300_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    // VLC user agent avoids IPTV server blocks
    "VLC/3.0.20 LibVLC/3.0.20".to_string()
}

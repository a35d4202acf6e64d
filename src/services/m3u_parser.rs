use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{HeaderPolicy, ParseOptions, ServiceOptions, UrlParamPriority};
use crate::error::CatalogError;
use crate::models::{Playlist, PlaylistEntry};
use crate::services::attributes::{get_url_parameter, parse_attributes, strip_quotes};
use crate::services::cache::PlaylistCache;
use crate::services::fetch::{Fetcher, HttpFetcher};

const EXTM3U: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";
const EXTVLCOPT: &str = "#EXTVLCOPT";

/// Entry under construction: opened by an `#EXTINF` line, optionally
/// enriched by `#EXTVLCOPT` lines, finalized by the URL line. An entry
/// that never sees its URL line is dropped, never emitted.
#[derive(Debug)]
struct PendingEntry {
    entry: PlaylistEntry,
}

impl PendingEntry {
    fn from_extinf(rest: &str, options: &ParseOptions) -> Self {
        let mut entry = PlaylistEntry::default();

        // everything after the first comma is the title; the prefix
        // before it carries the duration and the attribute list
        let (prefix, title) = match rest.split_once(',') {
            Some((prefix, title)) => (prefix, Some(title)),
            None => (rest, None),
        };

        entry.attributes = parse_attributes(prefix);
        entry.title = title.map(|t| {
            let t = strip_quotes(t.trim()).to_string();
            if options.unescape_titles {
                unescape_entities(&t)
            } else {
                t
            }
        });

        Self { entry }
    }

    /// Merge `#EXTVLCOPT` options into the entry headers. Values already
    /// present on the entry are preferred.
    fn apply_vlcopt(&mut self, line: &str) {
        use crate::services::attributes::get_tag_value;

        if let Some(ua) = get_tag_value(line, "http-user-agent") {
            self.entry.headers.entry("user-agent".to_string()).or_insert(ua);
        }
        if let Some(referrer) = get_tag_value(line, "http-referrer") {
            self.entry.headers.entry("referrer".to_string()).or_insert(referrer);
        }
    }

    /// Consume the URL line and close the entry. Text after the first
    /// `|` is a `key=value&key2=value2` parameter string carrying
    /// per-stream headers.
    fn finish(mut self, line: &str, options: &ParseOptions) -> PlaylistEntry {
        let (url, params) = match line.split_once('|') {
            Some((url, params)) => (url, Some(params)),
            None => (line, None),
        };

        self.entry.url = Some(strip_quotes(url.trim()).to_string());

        if let Some(params) = params {
            let user_agent = get_url_parameter(params, "user-agent");
            let referrer = get_url_parameter(params, "referrer")
                .or_else(|| get_url_parameter(params, "referer"));

            for (key, value) in [("user-agent", user_agent), ("referrer", referrer)] {
                let Some(value) = value else { continue };
                match options.url_param_priority {
                    UrlParamPriority::Fallback => {
                        self.entry.headers.entry(key.to_string()).or_insert(value);
                    }
                    UrlParamPriority::Override => {
                        self.entry.headers.insert(key.to_string(), value);
                    }
                }
            }
        }

        self.entry.user_agent = self.entry.headers.get("user-agent").cloned();
        self.entry
    }
}

/// Unescape the five standard HTML entities found in some provider
/// dialects.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Parse extended-M3U playlist text into an ordered [`Playlist`].
///
/// Single pass, line oriented. Fails only on the header check; every
/// other malformation degrades to partial data:
///   - blank lines and unrecognized `#` comments are skipped
///   - an `#EXTINF` with no URL line before the next `#EXTINF` or EOF
///     is discarded
///   - a URL line with no open entry is ignored
pub fn parse(content: &str, options: &ParseOptions) -> Result<Playlist, CatalogError> {
    let mut items: Vec<PlaylistEntry> = Vec::new();
    let mut pending: Option<PendingEntry> = None;
    let mut header_seen = false;
    let mut first_line = true;
    let mut discarded = 0usize;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTM3U) {
            header_seen = true;
            first_line = false;
            continue;
        }

        if first_line {
            first_line = false;
            if options.header_policy == HeaderPolicy::Strict {
                return Err(CatalogError::InvalidHeader);
            }
        }

        if let Some(rest) = line.strip_prefix(EXTINF) {
            if pending.take().is_some() {
                // previous entry never got its URL line
                discarded += 1;
            }
            pending = Some(PendingEntry::from_extinf(rest, options));
            continue;
        }

        if line.starts_with(EXTVLCOPT) {
            if let Some(pending) = pending.as_mut() {
                pending.apply_vlcopt(line);
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        // URL line; a stray one with no open entry is ignored
        if let Some(pending) = pending.take() {
            items.push(pending.finish(line, options));
        }
    }

    if pending.is_some() {
        discarded += 1;
    }

    if !header_seen {
        // lenient mode accepts the header anywhere, but it must exist
        return Err(CatalogError::InvalidHeader);
    }

    if discarded > 0 {
        tracing::debug!(discarded, "dropped entries without a URL line");
    }

    Ok(Playlist { items })
}

/// Playlist loading service: fetch, cache, parse.
///
/// Parsing itself is synchronous and side-effect-free; the fetch is the
/// only suspension point. The cache is shared and TTL-bounded, with
/// last-writer-wins repopulation on expiry.
pub struct M3uService {
    fetcher: Arc<dyn Fetcher>,
    cache: PlaylistCache,
    options: ServiceOptions,
}

impl M3uService {
    pub fn new(options: ServiceOptions) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(&options));
        Self::with_fetcher(fetcher, options)
    }

    /// Use a caller-supplied fetch capability (e.g. the host's HTTP
    /// client).
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, options: ServiceOptions) -> Self {
        let cache = PlaylistCache::new(options.cache_ttl_ms);
        Self {
            fetcher,
            cache,
            options,
        }
    }

    /// Load a playlist by URL, from cache when fresh. A fetch failure
    /// propagates as [`CatalogError::Fetch`], never as an empty
    /// playlist.
    pub async fn load(&self, url: &str) -> Result<Arc<Playlist>, CatalogError> {
        self.load_with_headers(url, &HashMap::new()).await
    }

    pub async fn load_with_headers(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Arc<Playlist>, CatalogError> {
        if let Some(playlist) = self.cache.get(url).await {
            tracing::debug!(url, "playlist cache hit");
            return Ok(playlist);
        }

        let body = self.fetcher.fetch(url, headers).await?;
        let playlist = parse(&body, &self.options.parse)?;

        let stats = playlist.stats();
        tracing::info!(
            url,
            items = stats.total_items,
            groups = stats.group_count,
            "playlist parsed"
        );

        Ok(self.cache.insert(url, playlist).await)
    }

    pub fn cache(&self) -> &PlaylistCache {
        &self.cache
    }
}

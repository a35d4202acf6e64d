use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Playlist;

/// SHA1 hash of a URL, used as the cache key.
pub fn hash_url(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
struct CachedPlaylist {
    playlist: Arc<Playlist>,
    expires_at: i64,
}

/// In-memory playlist cache with a fixed TTL.
///
/// Playlists are rebuilt from scratch on every fetch; this cache only
/// spares refetching within the expiry window. Concurrent readers may
/// race to repopulate an expired key; last writer wins.
pub struct PlaylistCache {
    entries: Arc<RwLock<HashMap<String, CachedPlaylist>>>,
    ttl_ms: i64,
}

impl PlaylistCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_ms,
        }
    }

    pub async fn get(&self, url: &str) -> Option<Arc<Playlist>> {
        let entries = self.entries.read().await;
        let cached = entries.get(&hash_url(url))?;

        if cached.expires_at <= chrono::Utc::now().timestamp_millis() {
            return None;
        }

        Some(Arc::clone(&cached.playlist))
    }

    pub async fn insert(&self, url: &str, playlist: Playlist) -> Arc<Playlist> {
        let playlist = Arc::new(playlist);
        let cached = CachedPlaylist {
            playlist: Arc::clone(&playlist),
            expires_at: chrono::Utc::now().timestamp_millis() + self.ttl_ms,
        };

        let mut entries = self.entries.write().await;
        entries.insert(hash_url(url), cached);
        playlist
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp_millis();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| cached.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Clone for PlaylistCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl_ms: self.ttl_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaylistEntry;

    fn playlist_of(n: usize) -> Playlist {
        Playlist {
            items: (0..n).map(|_| PlaylistEntry::default()).collect(),
        }
    }

    #[test]
    fn test_hash_url_is_stable_hex() {
        let hash = hash_url("http://example.com/playlist.m3u");
        assert_eq!(hash.len(), 40);
        assert_eq!(hash, hash_url("http://example.com/playlist.m3u"));
        assert_ne!(hash, hash_url("http://example.com/other.m3u"));
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = PlaylistCache::new(60_000);
        assert!(cache.get("http://a").await.is_none());

        cache.insert("http://a", playlist_of(2)).await;
        let hit = cache.get("http://a").await.unwrap();
        assert_eq!(hit.items.len(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_misses_and_purges() {
        let cache = PlaylistCache::new(-1); // already expired on insert
        cache.insert("http://a", playlist_of(1)).await;

        assert!(cache.get("http://a").await.is_none());
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_repopulation_last_writer_wins() {
        let cache = PlaylistCache::new(60_000);
        cache.insert("http://a", playlist_of(1)).await;
        cache.insert("http://a", playlist_of(3)).await;

        assert_eq!(cache.get("http://a").await.unwrap().items.len(), 3);
        assert_eq!(cache.len().await, 1);
    }
}

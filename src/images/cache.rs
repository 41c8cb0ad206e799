//! Session-wide image byte cache.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};
use crate::sources::ImageFetcher;

/// Shared key to bytes store, keyed by the absolute URL string.
///
/// Clones share the same storage. Writes are last-writer-wins and nothing is
/// ever evicted, so the cache lives exactly as long as its last clone.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl ImageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored for `url`, if any.
    pub fn get(&self, url: &Url) -> Option<Bytes> {
        self.get_key(url.as_str())
    }

    /// Bytes stored under a raw key, if any.
    pub fn get_key(&self, key: &str) -> Option<Bytes> {
        self.entries.read().get(key).cloned()
    }

    /// Store bytes for `url`, replacing any previous entry.
    pub fn insert(&self, url: &Url, bytes: Bytes) {
        self.insert_key(url.as_str(), bytes);
    }

    /// Store bytes under a raw key. Empty keys are ignored.
    pub fn insert_key(&self, key: &str, bytes: Bytes) {
        if key.is_empty() {
            return;
        }
        trace!("Caching {} bytes for {}", bytes.len(), key);
        self.entries.write().insert(key.to_string(), bytes);
    }

    /// Check if `url` is cached.
    pub fn contains(&self, url: &Url) -> bool {
        self.entries.read().contains_key(url.as_str())
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Fetch `url` and store the result before handing it back.
pub(crate) async fn fetch_and_cache(
    fetcher: &dyn ImageFetcher,
    cache: &ImageCache,
    url: &Url,
) -> Result<Bytes> {
    let bytes = fetcher
        .fetch_image_bytes(url)
        .await
        .map_err(|e| match e {
            e @ Error::ImageFetch { .. } => e,
            other => Error::ImageFetch {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;
    cache.insert(url, bytes.clone());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockImageFetcher;

    fn url(path: &str) -> Url {
        Url::parse("https://images.example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = ImageCache::new();
        let other = cache.clone();

        cache.insert(&url("a.jpg"), Bytes::from_static(b"a"));

        assert_eq!(other.get(&url("a.jpg")), Some(Bytes::from_static(b"a")));
        assert!(other.contains(&url("a.jpg")));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = ImageCache::new();
        cache.insert(&url("a.jpg"), Bytes::from_static(b"first"));
        cache.insert(&url("a.jpg"), Bytes::from_static(b"second"));

        assert_eq!(cache.get(&url("a.jpg")), Some(Bytes::from_static(b"second")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let cache = ImageCache::new();
        cache.insert_key("", Bytes::from_static(b"x"));
        assert!(cache.is_empty());

        cache.insert_key("https://images.example.com/b.jpg", Bytes::from_static(b"b"));
        assert!(cache.contains(&url("b.jpg")));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_and_cache_stores_on_success() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"jpeg")));
        let cache = ImageCache::new();

        let bytes = fetch_and_cache(&fetcher, &cache, &url("c.jpg")).await.unwrap();

        assert_eq!(bytes, Bytes::from_static(b"jpeg"));
        assert_eq!(cache.get(&url("c.jpg")), Some(bytes));
    }

    #[tokio::test]
    async fn test_fetch_and_cache_maps_failures() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .returning(|_| Err(Error::Internal("connection reset".to_string())));
        let cache = ImageCache::new();

        let err = fetch_and_cache(&fetcher, &cache, &url("d.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ImageFetch { .. }));
        assert!(cache.is_empty());
    }
}

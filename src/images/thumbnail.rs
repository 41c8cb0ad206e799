//! Per-cell thumbnail loading.

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::images::cache::{fetch_and_cache, ImageCache};
use crate::sources::ImageFetcher;

/// Loads one thumbnail for a gallery cell.
///
/// Failures are logged and leave the image empty; a cell has no error state.
pub struct ThumbnailLoader {
    url: Url,
    fetcher: Arc<dyn ImageFetcher>,
    cache: ImageCache,
    image_tx: Arc<watch::Sender<Option<Bytes>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ThumbnailLoader {
    /// Create a loader for `url`. Nothing is fetched until [`load`](Self::load).
    pub fn new(url: Url, fetcher: Arc<dyn ImageFetcher>, cache: ImageCache) -> Self {
        let (image_tx, _) = watch::channel(None);
        Self {
            url,
            fetcher,
            cache,
            image_tx: Arc::new(image_tx),
            task: Mutex::new(None),
        }
    }

    /// Thumbnail URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Publish the cached thumbnail, or fetch it.
    ///
    /// A cache hit publishes before this returns. A no-op while a fetch is
    /// in flight.
    pub fn load(&self) {
        if let Some(bytes) = self.cache.get(&self.url) {
            self.image_tx.send_replace(Some(bytes));
            return;
        }

        let mut task = self.task.lock();
        if task.as_ref().map_or(false, |t| !t.is_finished()) {
            debug!("Thumbnail fetch for {} already in flight", self.url);
            return;
        }

        let url = self.url.clone();
        let fetcher = self.fetcher.clone();
        let cache = self.cache.clone();
        let image_tx = self.image_tx.clone();
        *task = Some(tokio::spawn(async move {
            match fetch_and_cache(fetcher.as_ref(), &cache, &url).await {
                Ok(bytes) => {
                    image_tx.send_replace(Some(bytes));
                }
                Err(e) => warn!("Thumbnail fetch failed: {}", e),
            }
        }));
    }

    /// Current thumbnail bytes.
    pub fn image(&self) -> Option<Bytes> {
        self.image_tx.borrow().clone()
    }

    /// Observe the thumbnail bytes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Bytes>> {
        self.image_tx.subscribe()
    }
}

impl Drop for ThumbnailLoader {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sources::MockImageFetcher;
    use crate::testing::settle;

    fn thumb_url() -> Url {
        Url::parse("https://images.example.com/thumbs/7.jpg").unwrap()
    }

    #[tokio::test]
    async fn test_cache_hit_publishes_without_fetch() {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch_image_bytes().times(0);
        let cache = ImageCache::new();
        cache.insert(&thumb_url(), Bytes::from_static(b"cached"));

        let loader = ThumbnailLoader::new(thumb_url(), Arc::new(fetcher), cache);
        loader.load();

        assert_eq!(loader.image(), Some(Bytes::from_static(b"cached")));
    }

    #[tokio::test]
    async fn test_fetch_publishes_and_caches() {
        let mut fetcher = MockImageFetcher::new();
        fetcher
            .expect_fetch_image_bytes()
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"fresh")));
        let cache = ImageCache::new();

        let loader = ThumbnailLoader::new(thumb_url(), Arc::new(fetcher), cache.clone());
        let mut rx = loader.subscribe();
        loader.load();
        rx.changed().await.unwrap();

        assert_eq!(loader.image(), Some(Bytes::from_static(b"fresh")));
        assert_eq!(cache.get(&thumb_url()), Some(Bytes::from_static(b"fresh")));
    }

    #[tokio::test]
    async fn test_failure_leaves_image_empty() {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch_image_bytes().times(1).returning(|url| {
            Err(Error::ImageFetch {
                url: url.to_string(),
                reason: "404".to_string(),
            })
        });
        let cache = ImageCache::new();

        let loader = ThumbnailLoader::new(thumb_url(), Arc::new(fetcher), cache.clone());
        loader.load();
        settle().await;

        assert_eq!(loader.image(), None);
        assert!(cache.is_empty());
    }
}

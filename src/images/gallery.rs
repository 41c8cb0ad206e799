//! Full size image gallery.

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::images::cache::{fetch_and_cache, ImageCache};
use crate::images::state::ImageState;
use crate::sources::ImageFetcher;

/// Navigation hooks of the gallery screen.
#[cfg_attr(test, mockall::automock)]
pub trait GalleryActions: Send + Sync {
    /// Dismiss the gallery.
    fn dismiss(&self) {}
}

/// Fan-out fetch of every gallery image into the shared cache.
///
/// Each URL counts down once when its fetch completes, successful or not.
/// The state moves to `FinishedLoading` exactly once, when the count reaches
/// zero. Failed images are logged and simply stay absent from the cache.
pub struct GalleryStateMachine {
    urls: Vec<Url>,
    page: Option<usize>,
    fetcher: Arc<dyn ImageFetcher>,
    cache: ImageCache,
    actions: Arc<dyn GalleryActions>,
    state_tx: Arc<watch::Sender<ImageState>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl GalleryStateMachine {
    /// Create a gallery over `urls`, optionally opened at `page`.
    pub fn new(
        urls: Vec<Url>,
        page: Option<usize>,
        fetcher: Arc<dyn ImageFetcher>,
        cache: ImageCache,
        actions: Arc<dyn GalleryActions>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ImageState::Loading);
        Self {
            urls,
            page,
            fetcher,
            cache,
            actions,
            state_tx: Arc::new(state_tx),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Fetch every gallery image. A no-op while a previous round is in flight.
    pub fn fetch_gallery_images(&self) {
        let mut tasks = self.tasks.lock();
        if tasks.iter().any(|t| !t.is_finished()) {
            debug!("Gallery fetch already in flight");
            return;
        }
        tasks.clear();

        self.state_tx.send_if_modified(|state| {
            let changed = *state != ImageState::Loading;
            *state = ImageState::Loading;
            changed
        });

        if self.urls.is_empty() {
            self.state_tx.send_replace(ImageState::FinishedLoading);
            return;
        }

        info!("Fetching {} gallery images", self.urls.len());
        let remaining = Arc::new(AtomicUsize::new(self.urls.len()));
        for url in &self.urls {
            if self.cache.contains(url) {
                complete_one(&remaining, &self.state_tx);
                continue;
            }

            let url = url.clone();
            let fetcher = self.fetcher.clone();
            let cache = self.cache.clone();
            let remaining = remaining.clone();
            let state_tx = self.state_tx.clone();
            tasks.push(tokio::spawn(async move {
                if let Err(e) = fetch_and_cache(fetcher.as_ref(), &cache, &url).await {
                    warn!("Gallery image fetch failed: {}", e);
                }
                complete_one(&remaining, &state_tx);
            }));
        }
    }

    /// Current load state.
    pub fn state(&self) -> ImageState {
        *self.state_tx.borrow()
    }

    /// Observe the load state.
    pub fn subscribe_state(&self) -> watch::Receiver<ImageState> {
        self.state_tx.subscribe()
    }

    /// Gallery image URLs in page order.
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Page to open the gallery at.
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    /// Fetched bytes for `url`, if it has loaded.
    pub fn image(&self, url: &Url) -> Option<Bytes> {
        self.cache.get(url)
    }

    pub fn dismiss(&self) {
        self.actions.dismiss();
    }
}

fn complete_one(remaining: &AtomicUsize, state_tx: &watch::Sender<ImageState>) {
    if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
        debug!("Gallery finished loading");
        state_tx.send_replace(ImageState::FinishedLoading);
    }
}

impl Drop for GalleryStateMachine {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

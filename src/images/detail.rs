//! Detail screen of a single matched item.

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::data::{Artist, Item};
use crate::error::ErrorKind;
use crate::images::cache::{fetch_and_cache, ImageCache};
use crate::images::state::ImageState;
use crate::sources::ImageFetcher;

/// Navigation hooks of the detail screen.
#[cfg_attr(test, mockall::automock)]
pub trait DetailActions: Send + Sync {
    /// Open an artist website.
    fn show_website(&self, _url: Url) {}

    /// Open the full size gallery.
    fn show_image_gallery(&self, _urls: Vec<Url>) {}

    /// Open the full size title image.
    fn show_title_image(&self, _url: Url) {}

    /// Dismiss the detail screen.
    fn dismiss(&self) {}
}

struct Outputs {
    state_tx: watch::Sender<ImageState>,
    image_tx: watch::Sender<Option<Bytes>>,
}

impl Outputs {
    fn finish(&self, bytes: Option<Bytes>) {
        if bytes.is_some() {
            self.image_tx.send_replace(bytes);
        }
        self.state_tx.send_replace(ImageState::FinishedLoading);
    }
}

/// One-shot fetch of the title thumbnail of a selected item.
///
/// `Loading` moves to `FinishedLoading` once the thumbnail is published, or
/// to `Error(ImageFetchFailed)`. An item without a thumbnail finishes with
/// no image.
pub struct DetailStateMachine {
    item: Item,
    fetcher: Arc<dyn ImageFetcher>,
    cache: ImageCache,
    actions: Arc<dyn DetailActions>,
    outputs: Arc<Outputs>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DetailStateMachine {
    pub fn new(
        item: Item,
        fetcher: Arc<dyn ImageFetcher>,
        cache: ImageCache,
        actions: Arc<dyn DetailActions>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ImageState::Loading);
        let (image_tx, _) = watch::channel(None);
        Self {
            item,
            fetcher,
            cache,
            actions,
            outputs: Arc::new(Outputs { state_tx, image_tx }),
            task: Mutex::new(None),
        }
    }

    /// Load the title thumbnail.
    ///
    /// The cache is consulted first; a hit publishes before this returns and
    /// issues no fetch. A no-op while a fetch is in flight.
    pub fn fetch_title_image(&self) {
        let Some(url) = self.item.title_image_thumb_url.clone() else {
            debug!("Item {} has no title thumbnail", self.item.id);
            self.outputs.finish(None);
            return;
        };

        if let Some(bytes) = self.cache.get(&url) {
            debug!("Title thumbnail for {} served from cache", self.item.id);
            self.outputs.finish(Some(bytes));
            return;
        }

        let mut task = self.task.lock();
        if task.as_ref().map_or(false, |t| !t.is_finished()) {
            debug!("Title thumbnail fetch already in flight");
            return;
        }

        self.outputs.state_tx.send_if_modified(|state| {
            let changed = *state != ImageState::Loading;
            *state = ImageState::Loading;
            changed
        });

        info!("Fetching title thumbnail {}", url);
        let fetcher = self.fetcher.clone();
        let cache = self.cache.clone();
        let outputs = self.outputs.clone();
        *task = Some(tokio::spawn(async move {
            match fetch_and_cache(fetcher.as_ref(), &cache, &url).await {
                Ok(bytes) => outputs.finish(Some(bytes)),
                Err(e) => {
                    warn!("Title thumbnail fetch failed: {}", e);
                    outputs
                        .state_tx
                        .send_replace(ImageState::Error(ErrorKind::ImageFetchFailed));
                }
            }
        }));
    }

    /// Current load state.
    pub fn state(&self) -> ImageState {
        *self.outputs.state_tx.borrow()
    }

    /// Observe the load state.
    pub fn subscribe_state(&self) -> watch::Receiver<ImageState> {
        self.outputs.state_tx.subscribe()
    }

    /// Title thumbnail bytes, once loaded.
    pub fn title_image(&self) -> Option<Bytes> {
        self.outputs.image_tx.borrow().clone()
    }

    /// Observe the title thumbnail bytes.
    pub fn subscribe_title_image(&self) -> watch::Receiver<Option<Bytes>> {
        self.outputs.image_tx.subscribe()
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn artists(&self) -> &[Artist] {
        &self.item.artists
    }

    /// Thumbnails for the gallery strip.
    pub fn gallery_thumb_urls(&self) -> &[Url] {
        &self.item.gallery_thumb_urls
    }

    /// The cache this screen shares with its cells.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn show_website(&self, url: Url) {
        self.actions.show_website(url);
    }

    /// Open the gallery with the item's full size images.
    pub fn show_image_gallery(&self) {
        self.actions
            .show_image_gallery(self.item.gallery_image_urls.clone());
    }

    /// Open the full size title image, if the item has one.
    pub fn show_title_image(&self) {
        if let Some(url) = self.item.title_image_url.clone() {
            self.actions.show_title_image(url);
        }
    }

    pub fn dismiss(&self) {
        self.actions.dismiss();
    }
}

impl Drop for DetailStateMachine {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

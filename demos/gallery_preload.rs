//! Gallery preload: open the detail screen of one installation, load its
//! title thumbnail, then fetch the full gallery into the shared cache.
//!
//! One gallery image is unreachable; the gallery still finishes loading.
//!
//! Run with: cargo run --example gallery_preload

use artwald_beacon_search::{
    BeaconId, DetailActions, DetailStateMachine, Error, GalleryActions, GalleryStateMachine,
    ImageCache, ImageFetcher, ImageState, Item, Result, ThumbnailLoader,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

struct SimulatedFetcher;

#[async_trait::async_trait]
impl ImageFetcher for SimulatedFetcher {
    async fn fetch_image_bytes(&self, url: &Url) -> Result<Bytes> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        if url.path().ends_with("missing.jpg") {
            return Err(Error::ImageFetch {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            });
        }
        Ok(Bytes::from(format!("jpeg:{}", url.path())))
    }
}

struct PrintActions;

impl DetailActions for PrintActions {
    fn show_image_gallery(&self, urls: Vec<Url>) {
        println!("-> gallery with {} images", urls.len());
    }
}

impl GalleryActions for PrintActions {
    fn dismiss(&self) {
        println!("-> gallery dismissed");
    }
}

async fn wait_done(mut rx: tokio::sync::watch::Receiver<ImageState>) -> ImageState {
    rx.wait_for(|state| state.is_done())
        .await
        .map(|state| *state)
        .unwrap_or(ImageState::Loading)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("artwald_beacon_search=debug".parse().unwrap()),
        )
        .init();

    let base = Url::parse(artwald_beacon_search::config::DEFAULT_BASE_URL)?;
    let mut item = Item::new(BeaconId::new(uuid::Uuid::nil(), 100, 2), "Lichtung");
    item.title_image_url = Some(base.join("images/2.jpg")?);
    item.title_image_thumb_url = Some(base.join("thumbs/2.jpg")?);
    item.gallery_image_urls = vec![
        base.join("images/2a.jpg")?,
        base.join("images/missing.jpg")?,
        base.join("images/2c.jpg")?,
    ];
    item.gallery_thumb_urls = vec![base.join("thumbs/2a.jpg")?, base.join("thumbs/2c.jpg")?];

    let fetcher: Arc<dyn ImageFetcher> = Arc::new(SimulatedFetcher);
    let cache = ImageCache::new();
    let actions = Arc::new(PrintActions);

    let detail = DetailStateMachine::new(item, fetcher.clone(), cache.clone(), actions.clone());
    detail.fetch_title_image();
    println!("Title thumbnail: {}", wait_done(detail.subscribe_state()).await);

    let thumbs: Vec<ThumbnailLoader> = detail
        .gallery_thumb_urls()
        .iter()
        .map(|url| ThumbnailLoader::new(url.clone(), fetcher.clone(), cache.clone()))
        .collect();
    for thumb in &thumbs {
        thumb.load();
    }
    tokio::time::sleep(Duration::from_millis(500)).await;
    for thumb in &thumbs {
        println!(
            "Thumbnail {}: {:?} bytes",
            thumb.url(),
            thumb.image().map(|b| b.len())
        );
    }

    detail.show_image_gallery();
    let gallery = GalleryStateMachine::new(
        detail.item().gallery_image_urls.clone(),
        Some(0),
        fetcher,
        cache.clone(),
        actions,
    );
    gallery.fetch_gallery_images();
    println!("Gallery: {}", wait_done(gallery.subscribe_state()).await);

    for url in gallery.urls() {
        let loaded = gallery.image(url).is_some();
        println!("  {} loaded={}", url, loaded);
    }
    println!("Cached images: {}", cache.len());

    gallery.dismiss();
    Ok(())
}

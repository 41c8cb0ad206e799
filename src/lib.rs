//! # artwald-beacon-search
//!
//! State machines for a proximity-driven art search: a visitor walks
//! through an outdoor exhibition, and installations tagged with Bluetooth
//! beacons show up ranked by how close they are.
//!
//! The platform services (beacon ranging, geofencing, the catalog backend
//! and image download) are supplied by the host through the traits in
//! [`sources`]. This crate merges them into observable state.
//!
//! ## Features
//!
//! - **Search Session**: Catalog fetch, geofence and permission tracking,
//!   and beacon ranging merged into one [`SearchState`]
//! - **Ranked Matches**: Catalog items matched to ranged beacons, closest first
//! - **Independent Cancellation**: Leaving the region stops ranging but keeps
//!   location monitoring alive
//! - **Image Loading**: Detail, gallery and thumbnail loaders sharing one
//!   [`ImageCache`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artwald_beacon_search::{
//!     BeaconScanner, BeaconSnapshot, CatalogSource, Item, LocationMonitor, LocationState,
//!     NoopActions, Result, SearchConfig, SearchSources, SearchStateMachine,
//! };
//! use futures::stream::{self, BoxStream, StreamExt};
//! use std::sync::Arc;
//!
//! struct Backend;
//!
//! #[async_trait::async_trait]
//! impl CatalogSource for Backend {
//!     async fn fetch_all_items(&self) -> Result<Vec<Item>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! impl LocationMonitor for Backend {
//!     fn location_states(&self, _items: &[Item]) -> BoxStream<'static, LocationState> {
//!         stream::pending().boxed()
//!     }
//! }
//!
//! impl BeaconScanner for Backend {
//!     fn find_beacons(&self) -> BoxStream<'static, Result<Vec<BeaconSnapshot>>> {
//!         stream::pending().boxed()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SearchConfig::load("search.toml")?;
//!     let backend = Arc::new(Backend);
//!     let sources = SearchSources::new(backend.clone(), backend.clone(), backend);
//!
//!     let search = SearchStateMachine::new(sources, Arc::new(NoopActions), &config);
//!     let mut states = search.subscribe_state();
//!     search.start();
//!
//!     while states.changed().await.is_ok() {
//!         let state = *states.borrow();
//!         println!("Search state: {}", state);
//!         if state.region_center().is_some() {
//!             search.find_beacons();
//!         }
//!         for item in search.matches() {
//!             println!("  {} ({})", item.title, item.proximity());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Operations spawn tokio tasks and must be called from within a runtime.
//! Each upstream subscription runs as its own task; deliveries are
//! serialized through the session lock, so a late batch from a cancelled
//! subscription never changes state.

// Public modules
pub mod callback;
pub mod config;
pub mod data;
pub mod error;
pub mod images;
pub mod search;
pub mod sources;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use callback::CallbackHandle;
pub use config::SearchConfig;
pub use error::{Error, ErrorKind, Result};
pub use search::{rank_matches, NoopActions, SearchActions, SearchState, SearchStateMachine};
pub use sources::{BeaconScanner, CatalogSource, ImageFetcher, LocationMonitor, SearchSources};

// Re-export commonly used types from submodules
pub use data::{
    Artist, BeaconId, BeaconSnapshot, GeoPoint, Item, ItemCatalog, LocationState, Proximity,
};
pub use images::{
    DetailActions, DetailStateMachine, GalleryActions, GalleryStateMachine, ImageCache,
    ImageState, ThumbnailLoader,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that key types are exported
        let _ = std::any::TypeId::of::<SearchStateMachine>();
        let _ = std::any::TypeId::of::<SearchState>();
        let _ = std::any::TypeId::of::<DetailStateMachine>();
        let _ = std::any::TypeId::of::<GalleryStateMachine>();
        let _ = std::any::TypeId::of::<ImageCache>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<Item>();
    }
}

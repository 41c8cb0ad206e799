//! External collaborators consumed by the state machines.
//!
//! Bluetooth ranging, GPS/geofencing, the catalog backend and image download
//! are provided by the host application. The machines only see these traits.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;
use url::Url;

use crate::data::{BeaconSnapshot, Item, LocationState};
use crate::error::Result;

/// One-shot fetch of every candidate item.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full item list. Resolves exactly once.
    async fn fetch_all_items(&self) -> Result<Vec<Item>>;
}

/// Continuous geofence and permission assessment.
pub trait LocationMonitor: Send + Sync {
    /// Start observing the region spanned by `items`.
    ///
    /// The returned sequence is infinite in normal operation and never fails.
    /// Calling this again starts a fresh observation, which is the only way
    /// to force the platform to re-evaluate permissions.
    fn location_states(&self, items: &[Item]) -> BoxStream<'static, LocationState>;
}

/// Continuous beacon ranging.
pub trait BeaconScanner: Send + Sync {
    /// Start ranging. Every element is one batch of readings.
    ///
    /// An `Err` element is terminal for the subscription.
    fn find_beacons(&self) -> BoxStream<'static, Result<Vec<BeaconSnapshot>>>;
}

/// One-shot download of image bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the bytes behind `url`. Resolves exactly once.
    async fn fetch_image_bytes(&self, url: &Url) -> Result<Bytes>;
}

/// The collaborators a search session is built from.
#[derive(Clone)]
pub struct SearchSources {
    /// Item catalog backend.
    pub catalog: Arc<dyn CatalogSource>,
    /// Location and geofence monitor.
    pub location: Arc<dyn LocationMonitor>,
    /// Beacon ranging.
    pub beacons: Arc<dyn BeaconScanner>,
}

impl SearchSources {
    /// Bundle the three search collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        location: Arc<dyn LocationMonitor>,
        beacons: Arc<dyn BeaconScanner>,
    ) -> Self {
        Self {
            catalog,
            location,
            beacons,
        }
    }
}

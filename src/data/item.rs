//! Art installation items and their beacon identifiers.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::data::Proximity;

/// Identifier triple broadcast by an iBeacon-style transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeaconId {
    /// Proximity UUID shared by all beacons of one deployment.
    pub uuid: Uuid,
    /// Major value, typically one per site.
    pub major: u16,
    /// Minor value, typically one per installation.
    pub minor: u16,
}

impl BeaconId {
    /// Create a new beacon identifier.
    pub fn new(uuid: Uuid, major: u16, minor: u16) -> Self {
        Self { uuid, major, minor }
    }
}

impl std::fmt::Display for BeaconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.uuid, self.major, self.minor)
    }
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An artist credited on an installation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    /// Display name.
    pub name: Option<String>,
    /// Craft or discipline, e.g. "Holzbildhauerei".
    pub artisan_craft: Option<String>,
    /// Artist homepage.
    pub homepage_url: Option<Url>,
    /// Portrait thumbnail.
    pub thumb_image_url: Option<Url>,
}

/// One beacon-tagged art installation.
///
/// Everything except [`proximity`](Item::proximity) is fixed once the
/// catalog has been fetched. Proximity is rewritten by the search machine
/// whenever a ranging batch is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Beacon identifier triple.
    pub id: BeaconId,
    /// Hotspot title.
    pub title: String,
    /// Summary text, may contain simple HTML.
    #[serde(default)]
    pub summary: Option<String>,
    /// Artist credit line.
    #[serde(default)]
    pub artist_title: Option<String>,
    /// Credited artists.
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Full size title image.
    #[serde(default)]
    pub title_image_url: Option<Url>,
    /// Title image thumbnail.
    #[serde(default)]
    pub title_image_thumb_url: Option<Url>,
    /// Full size gallery images.
    #[serde(default)]
    pub gallery_image_urls: Vec<Url>,
    /// Gallery thumbnails, parallel to `gallery_image_urls`.
    #[serde(default)]
    pub gallery_thumb_urls: Vec<Url>,
    /// Installation coordinates.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(skip)]
    proximity: Proximity,
}

impl Item {
    /// Create an item with only an identifier and a title.
    pub fn new(id: BeaconId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            summary: None,
            artist_title: None,
            artists: Vec::new(),
            title_image_url: None,
            title_image_thumb_url: None,
            gallery_image_urls: Vec::new(),
            gallery_thumb_urls: Vec::new(),
            location: None,
            proximity: Proximity::Unknown,
        }
    }

    /// Last proximity merged from a ranging batch.
    pub fn proximity(&self) -> Proximity {
        self.proximity
    }

    /// Minor value of the beacon identifier.
    pub fn minor(&self) -> u16 {
        self.id.minor
    }

    pub(crate) fn set_proximity(&mut self, proximity: Proximity) {
        self.proximity = proximity;
    }

    /// Builder-style proximity setter for fixtures.
    #[cfg(test)]
    pub(crate) fn with_proximity(mut self, proximity: Proximity) -> Self {
        self.proximity = proximity;
        self
    }
}

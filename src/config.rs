//! Search session configuration.
//!
//! Configuration is read from TOML. Every key is optional and falls back to
//! the values used by the ArtWald deployment:
//!
//! ```toml
//! base_url = "https://geoportal.solingen.de/buergerservice1/ressourcen/kunstinwald/"
//! web_link = "https://quartier-wald.de"
//! deeplink_scheme = "solingen"
//! auto_scan_in_range = false
//! skip_first_snapshot = false
//!
//! [default_event_location]
//! latitude = 51.184277
//! longitude = 7.042898
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::data::GeoPoint;
use crate::error::{Error, Result};

/// Default catalog backend.
pub const DEFAULT_BASE_URL: &str =
    "https://geoportal.solingen.de/buergerservice1/ressourcen/kunstinwald/";

/// Default project website.
pub const DEFAULT_WEB_LINK: &str = "https://quartier-wald.de";

/// Default deeplink scheme.
pub const DEFAULT_DEEPLINK_SCHEME: &str = "solingen";

/// Event location used until the location monitor reports a region center.
pub const DEFAULT_EVENT_LOCATION: GeoPoint = GeoPoint {
    latitude: 51.184277,
    longitude: 7.042898,
};

/// Configuration for a search session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Catalog backend base URL. Must parse as an absolute URL.
    pub base_url: String,

    /// Project website opened from the search screen.
    pub web_link: String,

    /// URL scheme of the host app's deeplinks.
    pub deeplink_scheme: String,

    /// Event location shown before a region center is known.
    pub default_event_location: GeoPoint,

    /// Start ranging automatically when the user enters the search region.
    ///
    /// When false, the host calls `find_beacons` after observing
    /// `InGeoRange`.
    pub auto_scan_in_range: bool,

    /// Discard the first batch of every ranging subscription.
    ///
    /// Some platforms replay the last known batch on subscribe.
    pub skip_first_snapshot: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            web_link: DEFAULT_WEB_LINK.to_string(),
            deeplink_scheme: DEFAULT_DEEPLINK_SCHEME.to_string(),
            default_event_location: DEFAULT_EVENT_LOCATION,
            auto_scan_in_range: false,
            skip_first_snapshot: false,
        }
    }
}

impl SearchConfig {
    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is unusable.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading search configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check every value that would otherwise fail at runtime.
    ///
    /// An unparsable base URL is a startup fault; callers should refuse to
    /// build a session from a config that fails here.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url()?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidConfig {
                field: "base_url".to_string(),
                reason: format!("{} cannot be used as a base URL", base),
            });
        }

        self.web_link()?;

        if self.deeplink_scheme.is_empty() {
            return Err(Error::InvalidConfig {
                field: "deeplink_scheme".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let location = self.default_event_location;
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(Error::InvalidConfig {
                field: "default_event_location".to_string(),
                reason: format!(
                    "({}, {}) is not a valid coordinate",
                    location.latitude, location.longitude
                ),
            });
        }

        Ok(())
    }

    /// Parsed catalog backend URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Parsed project website URL.
    pub fn web_link(&self) -> Result<Url> {
        Ok(Url::parse(&self.web_link)?)
    }

    /// Check if a deeplink should open the beacon search.
    pub fn can_open_deeplink(&self, url: &str) -> bool {
        url.starts_with(&format!("{}://art", self.deeplink_scheme))
    }
}

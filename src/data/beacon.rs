//! Beacon ranging readings.

use chrono::{DateTime, Utc};

use crate::data::{BeaconId, Proximity};

/// A point-in-time proximity reading for one beacon.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconSnapshot {
    /// Identifier triple of the ranged beacon.
    pub id: BeaconId,
    /// Estimated proximity bucket.
    pub proximity: Proximity,
    /// Signal strength in dBm, if the platform reported one.
    pub rssi: Option<i16>,
    /// When the reading was taken.
    pub observed_at: DateTime<Utc>,
}

impl BeaconSnapshot {
    /// Create a reading stamped with the current time.
    pub fn new(id: BeaconId, proximity: Proximity) -> Self {
        Self {
            id,
            proximity,
            rssi: None,
            observed_at: Utc::now(),
        }
    }

    /// Attach a signal strength.
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Minor value of the ranged beacon.
    pub fn minor(&self) -> u16 {
        self.id.minor
    }
}

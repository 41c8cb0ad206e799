//! Geofence and permission assessments produced by the location monitor.

use crate::data::GeoPoint;

/// The location monitor's current assessment.
///
/// Produced by a [`LocationMonitor`](crate::sources::LocationMonitor); the
/// search machine only reacts to transitions between these values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationState {
    /// The monitor is starting up.
    #[default]
    Initializing,
    /// A new position fix is being acquired.
    UpdatingLocation,
    /// The user has not granted location permission.
    NoPermission,
    /// The user is outside the search region.
    OutOfGeoRange {
        /// Center of the search region.
        center: GeoPoint,
    },
    /// The user is inside the search region.
    InGeoRange {
        /// Center of the search region.
        center: GeoPoint,
    },
    /// The platform ranged at least one beacon of the region.
    DidRangeBeacon,
}

impl LocationState {
    /// Region center, for the geofence variants.
    pub fn region_center(&self) -> Option<GeoPoint> {
        match self {
            Self::OutOfGeoRange { center } | Self::InGeoRange { center } => Some(*center),
            _ => None,
        }
    }
}

impl std::fmt::Display for LocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing"),
            Self::UpdatingLocation => write!(f, "UpdatingLocation"),
            Self::NoPermission => write!(f, "NoPermission"),
            Self::OutOfGeoRange { .. } => write!(f, "OutOfGeoRange"),
            Self::InGeoRange { .. } => write!(f, "InGeoRange"),
            Self::DidRangeBeacon => write!(f, "DidRangeBeacon"),
        }
    }
}

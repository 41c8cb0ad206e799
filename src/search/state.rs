//! Externally observable search state.

use crate::data::GeoPoint;
use crate::error::ErrorKind;

/// The UI-driving state of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SearchState {
    /// The item catalog is being fetched.
    #[default]
    Loading,
    /// The catalog fetch completed.
    FinishedLoading,
    /// Location permission is missing.
    NoPermission,
    /// The user is outside the search region.
    OutOfGeoRange {
        /// Center of the search region.
        center: GeoPoint,
    },
    /// The user is inside the search region and ranging may start.
    InGeoRange {
        /// Center of the search region.
        center: GeoPoint,
    },
    /// Ranging is active.
    Scanning,
    /// At least one beacon was ranged while scanning.
    DidRangeBeacon,
    /// Ranging or location observation ended.
    FinishedScanning,
    /// An upstream source failed.
    Error(ErrorKind),
}

impl SearchState {
    /// Check if a loading or scanning indicator should be shown.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Scanning)
    }

    /// Check if this is an error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Region center, for the geofence variants.
    pub fn region_center(&self) -> Option<GeoPoint> {
        match self {
            Self::OutOfGeoRange { center } | Self::InGeoRange { center } => Some(*center),
            _ => None,
        }
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::FinishedLoading => write!(f, "FinishedLoading"),
            Self::NoPermission => write!(f, "NoPermission"),
            Self::OutOfGeoRange { center } => write!(
                f,
                "OutOfGeoRange({:.6}, {:.6})",
                center.latitude, center.longitude
            ),
            Self::InGeoRange { center } => write!(
                f,
                "InGeoRange({:.6}, {:.6})",
                center.latitude, center.longitude
            ),
            Self::Scanning => write!(f, "Scanning"),
            Self::DidRangeBeacon => write!(f, "DidRangeBeacon"),
            Self::FinishedScanning => write!(f, "FinishedScanning"),
            Self::Error(kind) => write!(f, "Error({})", kind),
        }
    }
}

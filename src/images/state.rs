//! Load state shared by the image machines.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Progress of an image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageState {
    /// Fetches are in flight.
    #[default]
    Loading,
    /// Every fetch has completed.
    FinishedLoading,
    /// The load failed.
    Error(ErrorKind),
}

impl ImageState {
    /// Check if the load has completed, successfully or not.
    pub fn is_done(&self) -> bool {
        !matches!(self, ImageState::Loading)
    }
}

impl std::fmt::Display for ImageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageState::Loading => write!(f, "Loading"),
            ImageState::FinishedLoading => write!(f, "FinishedLoading"),
            ImageState::Error(kind) => write!(f, "Error({})", kind),
        }
    }
}

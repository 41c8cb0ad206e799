//! Error types for the artwald-beacon-search crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog of candidate items could not be fetched.
    #[error("Catalog fetch failed: {reason}")]
    CatalogFetch {
        /// Description of why the fetch failed.
        reason: String,
    },

    /// Beacon ranging failed or was interrupted by the platform.
    #[error("Beacon scanning failed: {reason}")]
    BeaconScanning {
        /// Description of why ranging failed.
        reason: String,
    },

    /// An image could not be fetched.
    #[error("Image fetch failed for {url}: {reason}")]
    ImageFetch {
        /// The source URL of the image.
        url: String,
        /// Description of why the fetch failed.
        reason: String,
    },

    /// A configuration value is present but unusable.
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// The name of the offending field.
        field: String,
        /// Description of what is wrong with it.
        reason: String,
    },

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The user-facing failure category of this error, if it has one.
    ///
    /// Configuration and internal errors are startup faults and have no
    /// screen-level representation.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::CatalogFetch { .. } => Some(ErrorKind::CatalogFetchFailed),
            Self::BeaconScanning { .. } => Some(ErrorKind::BeaconScanningFailed),
            Self::ImageFetch { .. } => Some(ErrorKind::ImageFetchFailed),
            Self::InvalidConfig { .. }
            | Self::InvalidUrl(_)
            | Self::ConfigParse(_)
            | Self::Io(_)
            | Self::Internal(_) => None,
        }
    }
}

/// Failure category carried by error states.
///
/// Upstream failures never cross an operation boundary as `Err`; they are
/// translated to one of these and published as a terminal state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The item catalog could not be fetched.
    CatalogFetchFailed,
    /// Beacon ranging failed.
    BeaconScanningFailed,
    /// A single image could not be fetched.
    ImageFetchFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogFetchFailed => write!(f, "catalog fetch failed"),
            Self::BeaconScanningFailed => write!(f, "beacon scanning failed"),
            Self::ImageFetchFailed => write!(f, "image fetch failed"),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Data structures for search sessions.
//!
//! This module contains the item, beacon and location types shared by the
//! search machine and the image loaders.

pub mod beacon;
pub mod catalog;
pub mod item;
pub mod location;
pub mod proximity;

pub use beacon::BeaconSnapshot;
pub use catalog::ItemCatalog;
pub use item::{Artist, BeaconId, GeoPoint, Item};
pub use location::LocationState;
pub use proximity::Proximity;

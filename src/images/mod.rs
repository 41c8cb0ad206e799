//! Image loading for the detail and gallery screens.
//!
//! Every loader of a session shares one [`ImageCache`], so a thumbnail fetched
//! by one cell is served from memory to every other consumer.

pub mod cache;
pub mod detail;
pub mod gallery;
pub mod state;
pub mod thumbnail;

pub use cache::ImageCache;
pub use detail::{DetailActions, DetailStateMachine};
pub use gallery::{GalleryActions, GalleryStateMachine};
pub use state::ImageState;
pub use thumbnail::ThumbnailLoader;

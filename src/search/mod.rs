//! Beacon search: catalog, geofence and ranging merged into one state.

pub mod actions;
pub(crate) mod core;
pub mod machine;
pub mod matching;
pub mod state;

pub use actions::{NoopActions, SearchActions};
pub use machine::SearchStateMachine;
pub use matching::rank_matches;
pub use state::SearchState;

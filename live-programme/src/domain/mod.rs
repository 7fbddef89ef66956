//! Domain types shared across services.

pub mod activity;
pub mod state;
pub mod streamer;

pub use activity::ActivityRecord;
pub use state::ObservedState;
pub use streamer::Streamer;

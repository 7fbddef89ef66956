//! Row models for the SQLite schema.

pub mod activity;
pub mod live_status;
pub mod streamer;

pub use activity::ActivityRecordDbModel;
pub use live_status::LiveStatusDbModel;
pub use streamer::{StreamerDbModel, StreamerRankingRow};

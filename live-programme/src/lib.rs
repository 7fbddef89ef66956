//! live-programme library crate.
//!
//! Tracks when streamers go live and predicts weekly live slots from the
//! recorded history.

pub mod cache;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod heatmap;
pub mod live_status;
pub mod logging;
pub mod platform;
pub mod programme;
pub mod services;
pub mod tracker;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};

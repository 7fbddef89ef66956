//! Upstream streaming platforms.
//!
//! Each platform is reached through a [`PlatformAdapter`]; the
//! [`PlatformRegistry`] maps platform names to adapters so new platforms
//! can be added without touching the live status service.

mod adapter;
mod error;
mod twitch;

pub use adapter::{PlatformAdapter, PlatformLiveStatus, PlatformRegistry};
pub use error::PlatformError;
pub use twitch::TwitchAdapter;

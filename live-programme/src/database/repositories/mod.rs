//! Repository layer for database access.
//!
//! Each collaborator store is a trait speaking domain types, with one
//! SQLx implementation. Services depend on the traits only.

pub mod activity;
pub mod follow;
pub mod live_status;
pub mod programme;
pub mod streamer;

pub use activity::*;
pub use follow::*;
pub use live_status::*;
pub use programme::*;
pub use streamer::*;

//! Weekly programme of predicted live slots.

mod model;
mod service;
mod week;

pub use model::{Programme, ProgrammeEntry, ProgrammeSource, ProgrammeStreamer};
pub use service::{ProgrammeConfig, ProgrammeService};
pub use week::Week;

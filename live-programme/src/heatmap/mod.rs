//! Go-live probability heatmaps derived from activity records.

mod model;
mod service;

pub use model::{DAYS_PER_WEEK, HOURS_PER_DAY, Heatmap};
pub use service::{HeatmapConfig, HeatmapService};

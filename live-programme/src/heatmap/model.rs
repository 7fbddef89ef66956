//! Heatmap value type.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;

/// Likelihood of a streamer going live, by hour of day and by day of week.
///
/// The two arrays are independent marginals computed from the same record
/// set. Each sums to 1.0 when `data_points > 0` and is all zero otherwise.
/// Day index 0 is Monday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub streamer_id: String,
    pub hours: [f64; HOURS_PER_DAY],
    pub days_of_week: [f64; DAYS_PER_WEEK],
    pub data_points: u64,
}

impl Heatmap {
    /// Heatmap with no data points.
    pub fn empty(streamer_id: impl Into<String>) -> Self {
        Self {
            streamer_id: streamer_id.into(),
            hours: [0.0; HOURS_PER_DAY],
            days_of_week: [0.0; DAYS_PER_WEEK],
            data_points: 0,
        }
    }

    /// Build from go-live instants, bucketed in `tz`.
    pub fn from_timestamps<I>(streamer_id: impl Into<String>, timestamps: I, tz: Tz) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut hour_counts = [0u64; HOURS_PER_DAY];
        let mut day_counts = [0u64; DAYS_PER_WEEK];
        let mut total = 0u64;

        for ts in timestamps {
            let local = ts.with_timezone(&tz);
            hour_counts[local.hour() as usize] += 1;
            day_counts[local.weekday().num_days_from_monday() as usize] += 1;
            total += 1;
        }

        let mut heatmap = Self::empty(streamer_id);
        if total == 0 {
            return heatmap;
        }

        let total_f = total as f64;
        for (slot, count) in heatmap.hours.iter_mut().zip(hour_counts) {
            *slot = count as f64 / total_f;
        }
        for (slot, count) in heatmap.days_of_week.iter_mut().zip(day_counts) {
            *slot = count as f64 / total_f;
        }
        heatmap.data_points = total;
        heatmap
    }

    /// False when there is nothing to predict from.
    pub fn has_sufficient_data(&self) -> bool {
        self.data_points > 0
    }

    /// Most likely hour, lowest index on ties. `None` without data.
    pub fn peak_hour(&self) -> Option<u8> {
        peak(&self.hours).map(|i| i as u8)
    }

    /// Most likely day (0 = Monday), lowest index on ties. `None` without data.
    pub fn peak_day(&self) -> Option<u8> {
        peak(&self.days_of_week).map(|i| i as u8)
    }

    /// Combined weight of one weekly slot: `days_of_week[day] * hours[hour]`.
    ///
    /// Out-of-range indices yield 0.0.
    pub fn slot_probability(&self, day: u8, hour: u8) -> f64 {
        match (
            self.days_of_week.get(day as usize),
            self.hours.get(hour as usize),
        ) {
            (Some(d), Some(h)) => d * h,
            _ => 0.0,
        }
    }
}

fn peak(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v > 0.0 && best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

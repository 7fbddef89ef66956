//! Programme value types.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::heatmap::Heatmap;

use super::week::Week;

/// One predicted live slot for one streamer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeEntry {
    pub streamer_id: String,
    /// 0 = Monday.
    pub day_of_week: u8,
    pub hour: u8,
    pub probability: f64,
}

/// Where the programme's streamer set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgrammeSource {
    /// The user's own selection.
    Custom,
    /// Most-followed streamers.
    Global,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeStreamer {
    pub streamer_id: String,
    pub name: String,
    pub follower_count: u64,
    pub heatmap: Heatmap,
}

/// Weekly calendar of predicted live slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programme {
    pub week: Week,
    pub source: ProgrammeSource,
    pub streamers: Vec<ProgrammeStreamer>,
    /// Sorted by day, hour, probability descending, then streamer id.
    pub entries: Vec<ProgrammeEntry>,
}

impl Programme {
    /// Build a programme, emitting every slot at or above `min_probability`.
    pub fn build(
        week: Week,
        source: ProgrammeSource,
        streamers: Vec<ProgrammeStreamer>,
        min_probability: f64,
    ) -> Self {
        let mut entries: Vec<ProgrammeEntry> = streamers
            .iter()
            .filter(|s| s.heatmap.has_sufficient_data())
            .flat_map(|s| slots_for(s, min_probability))
            .collect();

        entries.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then(a.hour.cmp(&b.hour))
                .then(b.probability.total_cmp(&a.probability))
                .then_with(|| a.streamer_id.cmp(&b.streamer_id))
        });

        Self {
            week,
            source,
            streamers,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one day, in slot order.
    pub fn entries_for_day(&self, day: u8) -> impl Iterator<Item = &ProgrammeEntry> {
        self.entries.iter().filter(move |e| e.day_of_week == day)
    }
}

fn slots_for(streamer: &ProgrammeStreamer, min_probability: f64) -> Vec<ProgrammeEntry> {
    let mut entries = Vec::new();
    for day in 0..crate::heatmap::DAYS_PER_WEEK as u8 {
        for hour in 0..crate::heatmap::HOURS_PER_DAY as u8 {
            let probability = streamer.heatmap.slot_probability(day, hour);
            if probability > 0.0 && probability >= min_probability {
                entries.push(ProgrammeEntry {
                    streamer_id: streamer.streamer_id.clone(),
                    day_of_week: day,
                    hour,
                    probability,
                });
            }
        }
    }
    entries
}

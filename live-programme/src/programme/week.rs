//! Calendar week addressing.

use chrono::{Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::heatmap::DAYS_PER_WEEK;

/// A Monday-to-Sunday week, identified by its Monday.
///
/// Day indices follow the heatmap convention: 0 = Monday, 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    /// The week containing `anchor`.
    pub fn containing(anchor: NaiveDate) -> Self {
        let offset = anchor.weekday().num_days_from_monday() as u64;
        let start = anchor
            .checked_sub_days(Days::new(offset))
            .unwrap_or(anchor);
        Self { start }
    }

    /// The current week as seen in `tz`.
    pub fn current(tz: Tz) -> Self {
        Self::containing(Utc::now().with_timezone(&tz).date_naive())
    }

    /// Monday of this week.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Date of day `day` (0 = Monday). `None` when `day > 6`.
    pub fn date_of(&self, day: u8) -> Option<NaiveDate> {
        if day as usize >= DAYS_PER_WEEK {
            return None;
        }
        self.start.checked_add_days(Days::new(day as u64))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    pub fn next(&self) -> Self {
        Self::containing(self.start.checked_add_days(Days::new(7)).unwrap_or(self.start))
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start.checked_sub_days(Days::new(7)).unwrap_or(self.start))
    }
}

impl std::fmt::Display for Week {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "week of {}", self.start)
    }
}

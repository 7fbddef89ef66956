//! Heatmap service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::database::repositories::ActivityRepository;
use crate::domain::ActivityRecord;
use crate::{Error, Result};

use super::model::Heatmap;

/// How far into the future a backfilled timestamp may lie, in minutes.
const CLOCK_SKEW_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    /// Only records newer than this count. `None` uses the whole history.
    pub lookback: Option<chrono::Duration>,
    /// Timezone used to bucket hours and days.
    pub timezone: Tz,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            lookback: Some(chrono::Duration::days(365)),
            timezone: Tz::UTC,
        }
    }
}

/// Derives heatmaps from activity records. Holds no state of its own.
pub struct HeatmapService {
    activity: Arc<dyn ActivityRepository>,
    config: HeatmapConfig,
}

impl HeatmapService {
    pub fn new(activity: Arc<dyn ActivityRepository>) -> Self {
        Self::with_config(activity, HeatmapConfig::default())
    }

    pub fn with_config(activity: Arc<dyn ActivityRepository>, config: HeatmapConfig) -> Self {
        Self { activity, config }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Compute the heatmap for a streamer from its activity history.
    ///
    /// A streamer without records gets an empty heatmap, not an error.
    pub async fn generate_heatmap(&self, streamer_id: &str) -> Result<Heatmap> {
        let since = self.config.lookback.map(|lookback| Utc::now() - lookback);
        let records = self.activity.get_by_streamer_id(streamer_id, since).await?;

        let heatmap = Heatmap::from_timestamps(
            streamer_id,
            records.iter().map(|r| r.start_time),
            self.config.timezone,
        );
        debug!(
            streamer_id,
            data_points = heatmap.data_points,
            "Generated heatmap"
        );
        Ok(heatmap)
    }

    /// Insert an activity record for a past go-live, for seeding and backfill.
    pub async fn record_activity(
        &self,
        streamer_id: &str,
        platform: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<ActivityRecord> {
        let streamer_id = streamer_id.trim();
        if streamer_id.is_empty() {
            return Err(Error::validation("streamer id must not be empty"));
        }
        if timestamp > Utc::now() + chrono::Duration::minutes(CLOCK_SKEW_MINUTES) {
            return Err(Error::validation(format!(
                "activity timestamp {timestamp} is in the future"
            )));
        }

        let record = ActivityRecord::live_marker(streamer_id, platform, timestamp);
        self.activity.create(&record).await?;
        info!(streamer_id, platform, %timestamp, "Recorded activity");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryActivity, init_tracing};
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;

    fn service(activity: Arc<InMemoryActivity>) -> HeatmapService {
        init_tracing();
        HeatmapService::with_config(
            activity,
            HeatmapConfig {
                lookback: None,
                timezone: Tz::UTC,
            },
        )
    }

    #[tokio::test]
    async fn test_no_records_is_empty_heatmap() {
        let service = service(InMemoryActivity::new());
        let heatmap = service.generate_heatmap("s1").await.unwrap();
        assert_eq!(heatmap, Heatmap::empty("s1"));
    }

    #[tokio::test]
    async fn test_five_sessions_at_same_hour() {
        let activity = InMemoryActivity::new();
        let service = service(activity.clone());
        for day in 4..9 {
            let ts = Utc.with_ymd_and_hms(2024, 3, day, 14, 0, 0).unwrap();
            service.record_activity("s1", "twitch", ts).await.unwrap();
        }

        let heatmap = service.generate_heatmap("s1").await.unwrap();
        assert_eq!(heatmap.data_points, 5);
        assert_eq!(heatmap.hours[14], 1.0);
        assert_eq!(heatmap.peak_hour(), Some(14));
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let activity = InMemoryActivity::new();
        let service = service(activity.clone());
        for (day, hour) in [(4, 20), (5, 21), (6, 20), (9, 3), (10, 20), (12, 22)] {
            let ts = Utc.with_ymd_and_hms(2024, 3, day, hour, 30, 0).unwrap();
            service.record_activity("s1", "twitch", ts).await.unwrap();
        }

        let a = service.generate_heatmap("s1").await.unwrap();
        let b = service.generate_heatmap("s1").await.unwrap();
        for (x, y) in a.hours.iter().zip(b.hours.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        for (x, y) in a.days_of_week.iter().zip(b.days_of_week.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[tokio::test]
    async fn test_lookback_excludes_old_records() {
        let activity = InMemoryActivity::new();
        let service = HeatmapService::with_config(
            activity.clone(),
            HeatmapConfig {
                lookback: Some(chrono::Duration::days(30)),
                timezone: Tz::UTC,
            },
        );

        service
            .record_activity("s1", "twitch", Utc::now() - chrono::Duration::days(400))
            .await
            .unwrap();
        service
            .record_activity("s1", "twitch", Utc::now() - chrono::Duration::days(2))
            .await
            .unwrap();

        let heatmap = service.generate_heatmap("s1").await.unwrap();
        assert_eq!(heatmap.data_points, 1);
        assert_eq!(activity.count_for("s1"), 2);
    }

    #[tokio::test]
    async fn test_backfill_matches_tracker_records() {
        let activity = InMemoryActivity::new();
        let service = service(activity.clone());
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap();

        let record = service.record_activity("s1", "twitch", ts).await.unwrap();
        let marker = ActivityRecord::live_marker("s1", "twitch", ts);

        assert_eq!(record.start_time, marker.start_time);
        assert_eq!(record.end_time, marker.end_time);
        assert_eq!(record.platform, marker.platform);
        assert_eq!(activity.records(), vec![record]);
    }

    #[tokio::test]
    async fn test_record_activity_validation() {
        let service = service(InMemoryActivity::new());

        let err = service
            .record_activity("  ", "twitch", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service
            .record_activity("s1", "twitch", Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let activity = InMemoryActivity::new();
        activity.fail_reads.store(true, Ordering::SeqCst);
        let service = service(activity);

        assert!(service.generate_heatmap("s1").await.is_err());
    }
}
